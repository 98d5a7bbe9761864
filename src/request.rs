use std::{path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use image::Rgba;

use crate::{
	color::parse_color,
	config::AppConfig,
	layout::LayoutConfig,
	present::{DEFAULT_VIEWER_DURATION, DEFAULT_VIEWER_SETTLE, PresentationMode},
};

#[derive(Clone, Debug, Parser)]
#[command(name = "dtext", version)]
#[command(about = "Render text onto a background image for marquee displays")]
pub struct Args {
	/// Text to display. A literal `\n` starts a new paragraph.
	#[arg(long)]
	pub text: String,

	/// Path to a TrueType/OpenType font [default: <pixelcade>/fonts/Orbitron-Regular.ttf]
	#[arg(long)]
	pub font: Option<PathBuf>,

	/// Path to the background image [default: <pixelcade>/backgrounds/background.jpg]
	#[arg(long)]
	pub background: Option<PathBuf>,

	/// Font color name: black, white, red, green, blue, yellow, purple, orange, cyan or magenta [default: white]
	#[arg(long)]
	pub font_color: Option<String>,

	/// Output JPEG path [default: <pixelcade>/dtextout.jpg]
	#[arg(long)]
	pub output: Option<PathBuf>,

	/// Draw white text on a black bar along the bottom edge instead of a centred block.
	#[arg(long)]
	pub bar: bool,

	/// Save the image and show it with the external gsho framebuffer viewer.
	#[arg(long, conflicts_with = "no_display")]
	pub gsho: bool,

	/// Only save the image.
	#[arg(long)]
	pub no_display: bool,

	/// [default: 40]
	#[arg(long)]
	pub top_margin: Option<f32>,

	/// [default: 40]
	#[arg(long)]
	pub bottom_margin: Option<f32>,

	/// [default: 100]
	#[arg(long)]
	pub side_margin: Option<f32>,

	/// [default: 25]
	#[arg(long)]
	pub line_spacing: Option<f32>,

	/// Fixed font size in pixels; 0 picks the largest size that fits.
	#[arg(long, default_value_t = 0.0)]
	pub font_size: f32,

	/// Close the window after this many seconds; 0 waits for quit or Escape.
	#[arg(long, default_value_t = 0)]
	pub timeout: u64,

	/// Config file; defaults to $XDG_CONFIG_HOME/dtext/config.{toml,json,yaml}.
	#[arg(long)]
	pub config: Option<PathBuf>,
}

/// Fully resolved inputs of one render-and-present pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
	/// With real line breaks, one per paragraph.
	pub text: String,
	pub font: PathBuf,
	pub background: PathBuf,
	pub font_color: Rgba<u8>,
	pub output: PathBuf,
	pub layout: LayoutConfig,
	pub font_size: Option<f32>,
	pub bar: bool,
	pub mode: PresentationMode,
}

fn pixelcade_dir(config: &AppConfig) -> PathBuf {
	config
		.pixelcade_dir
		.clone()
		.or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join("pixelcade")))
		.unwrap_or_else(|| PathBuf::from("pixelcade"))
}

impl RenderRequest {
	/// Merge CLI flags over `config` over built-in defaults. Fails on empty text or an unknown color.
	pub fn resolve(args: Args, config: &AppConfig) -> Result<Self> {
		let text = args.text.replace("\\n", "\n");
		if text.trim().is_empty() {
			bail!("--text must not be empty");
		}

		let color_name = args.font_color.or_else(|| config.font_color.clone()).unwrap_or_else(|| "white".to_owned());
		let font_color = parse_color(&color_name)?;

		let root = pixelcade_dir(config);
		let pick = |flag: Option<PathBuf>, configured: &Option<PathBuf>, default: &str| flag.or_else(|| configured.clone()).unwrap_or_else(|| root.join(default));

		let defaults = LayoutConfig::default();
		let layout = LayoutConfig::new(
			args.top_margin.or(config.top_margin).unwrap_or(defaults.top_margin),
			args.bottom_margin.or(config.bottom_margin).unwrap_or(defaults.bottom_margin),
			args.side_margin.or(config.side_margin).unwrap_or(defaults.side_margin),
			args.line_spacing.or(config.line_spacing).unwrap_or(defaults.line_spacing),
		);

		let mode = if args.gsho {
			PresentationMode::FileViewer {
				viewer: pick(None, &config.viewer, "gsho"),
				settle: config.viewer_settle_ms.map(Duration::from_millis).unwrap_or(DEFAULT_VIEWER_SETTLE),
				duration: config.viewer_duration_ms.map(Duration::from_millis).unwrap_or(DEFAULT_VIEWER_DURATION),
			}
		} else if args.no_display {
			PresentationMode::File
		} else {
			PresentationMode::Window {
				timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
			}
		};

		Ok(Self {
			text,
			font: pick(args.font, &config.font, "fonts/Orbitron-Regular.ttf"),
			background: pick(args.background, &config.background, "backgrounds/background.jpg"),
			font_color,
			output: pick(args.output, &config.output, "dtextout.jpg"),
			layout,
			font_size: (args.font_size > 0.0).then_some(args.font_size),
			bar: args.bar,
			mode,
		})
	}
}
