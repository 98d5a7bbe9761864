use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr as _};
use serde::Deserialize;

/// Defaults read from a config file and `DTEXT_*` environment variables. CLI flags override every field.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
	/// Root that the default font, background, output and viewer paths hang off.
	pub pixelcade_dir: Option<PathBuf>,
	pub font: Option<PathBuf>,
	pub background: Option<PathBuf>,
	pub output: Option<PathBuf>,
	pub viewer: Option<PathBuf>,
	pub font_color: Option<String>,
	pub top_margin: Option<f32>,
	pub bottom_margin: Option<f32>,
	pub side_margin: Option<f32>,
	pub line_spacing: Option<f32>,
	pub viewer_settle_ms: Option<u64>,
	pub viewer_duration_ms: Option<u64>,
}

impl AppConfig {
	/// Explicit `path` must exist. Without one, `$XDG_CONFIG_HOME/dtext/config.*` is read if present.
	pub fn read(path: Option<&Path>) -> Result<Self> {
		let app_name = env!("CARGO_PKG_NAME");
		let mut builder = config::Config::builder();

		match path {
			Some(path) => {
				builder = builder.add_source(config::File::from(path).required(true));
			}
			None => {
				let xdg_dirs = xdg::BaseDirectories::with_prefix(app_name);
				if let Some(conf_dir) = xdg_dirs.get_config_home() {
					let location = conf_dir.join("config");
					builder = builder.add_source(config::File::with_name(&location.to_string_lossy()).required(false));
				}
			}
		}

		let raw = builder.add_source(config::Environment::with_prefix(&app_name.to_uppercase())).build()?;
		raw.try_deserialize().wrap_err("Config file is invalid")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_file_is_loaded() {
		let path = std::env::temp_dir().join(format!("dtext-config-{}.toml", std::process::id()));
		std::fs::write(&path, "font_color = \"red\"\ntop_margin = 12.5\nviewer = \"/opt/gsho\"\n").unwrap();

		let config = AppConfig::read(Some(&path)).unwrap();
		assert_eq!(config.font_color.as_deref(), Some("red"));
		assert_eq!(config.top_margin, Some(12.5));
		assert_eq!(config.viewer, Some(PathBuf::from("/opt/gsho")));
		assert_eq!(config.side_margin, None);
		let _ = std::fs::remove_file(&path);
	}

	#[test]
	fn environment_fills_unset_fields() {
		let path = std::env::temp_dir().join(format!("dtext-env-config-{}.toml", std::process::id()));
		std::fs::write(&path, "font_color = \"green\"\n").unwrap();
		// SAFETY: no other test reads or writes DTEXT_BOTTOM_MARGIN
		unsafe { std::env::set_var("DTEXT_BOTTOM_MARGIN", "12.5") };

		let config = AppConfig::read(Some(&path));
		// SAFETY: as above
		unsafe { std::env::remove_var("DTEXT_BOTTOM_MARGIN") };
		let config = config.unwrap();
		assert_eq!(config.bottom_margin, Some(12.5));
		assert_eq!(config.font_color.as_deref(), Some("green"));
		let _ = std::fs::remove_file(&path);
	}

	#[test]
	fn explicit_missing_file_is_an_error() {
		assert!(AppConfig::read(Some(Path::new("/nonexistent/dtext.toml"))).is_err());
	}

	#[test]
	fn malformed_values_are_rejected() {
		let path = std::env::temp_dir().join(format!("dtext-bad-config-{}.toml", std::process::id()));
		std::fs::write(&path, "top_margin = \"lots\"\n").unwrap();
		assert!(AppConfig::read(Some(&path)).is_err());
		let _ = std::fs::remove_file(&path);
	}
}
