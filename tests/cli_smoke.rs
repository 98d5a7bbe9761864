use std::{path::PathBuf, process::Command};

fn dtext() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_dtext"));
	// keep a developer's own config and env out of the run
	cmd.env("XDG_CONFIG_HOME", scratch_dir("xdg")).env_remove("DTEXT_FONT_COLOR");
	cmd
}

fn scratch_dir(name: &str) -> PathBuf {
	let dir = PathBuf::from("target").join("cli_smoke").join(name);
	std::fs::create_dir_all(&dir).unwrap();
	dir
}

#[test]
fn missing_text_prints_usage() {
	let out = dtext().output().unwrap();
	assert!(!out.status.success());
	let stderr = String::from_utf8_lossy(&out.stderr);
	assert!(stderr.contains("--text"), "{stderr}");
}

#[test]
fn unknown_color_fails_without_output() {
	let output = scratch_dir("color").join("out.jpg");
	let _ = std::fs::remove_file(&output);

	let out = dtext()
		.args(["--text", "hello", "--font-color", "teal", "--no-display", "--output"])
		.arg(&output)
		.output()
		.unwrap();
	assert!(!out.status.success());
	assert!(String::from_utf8_lossy(&out.stderr).contains("unsupported color: teal"));
	assert!(!output.exists());
}

#[test]
fn missing_background_fails_without_output() {
	let dir = scratch_dir("background");
	let output = dir.join("out.jpg");
	let _ = std::fs::remove_file(&output);

	let out = dtext()
		.args(["--text", "hello", "--no-display", "--background"])
		.arg(dir.join("missing.jpg"))
		.arg("--output")
		.arg(&output)
		.output()
		.unwrap();
	assert!(!out.status.success());
	assert!(String::from_utf8_lossy(&out.stderr).contains("missing.jpg"));
	assert!(!output.exists());
}

#[test]
fn missing_font_fails_without_output() {
	let dir = scratch_dir("font");
	let background = dir.join("bg.png");
	image::RgbaImage::from_pixel(32, 32, image::Rgba([0, 0, 0, 255])).save(&background).unwrap();
	let output = dir.join("out.jpg");
	let _ = std::fs::remove_file(&output);

	let out = dtext()
		.args(["--text", "hello", "--no-display", "--font"])
		.arg(dir.join("missing.ttf"))
		.arg("--background")
		.arg(&background)
		.arg("--output")
		.arg(&output)
		.output()
		.unwrap();
	assert!(!out.status.success());
	assert!(String::from_utf8_lossy(&out.stderr).contains("missing.ttf"));
	assert!(!output.exists());
}

fn system_font() -> Option<PathBuf> {
	[
		"/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
		"/usr/share/fonts/dejavu/DejaVuSans.ttf",
		"/usr/share/fonts/TTF/DejaVuSans.ttf",
		"/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
		"/System/Library/Fonts/Supplemental/Arial.ttf",
	]
	.iter()
	.map(PathBuf::from)
	.find(|p| p.exists())
}

/// Render onto a flat 320x240 background with `--no-display`; returns the decoded output.
fn render_to_file(name: &str, extra: &[&str]) -> Option<image::DynamicImage> {
	let font = system_font()?;
	let dir = scratch_dir(name);
	let background = dir.join("bg.png");
	image::RgbaImage::from_pixel(320, 240, image::Rgba([0, 0, 0, 255])).save(&background).unwrap();
	let output = dir.join("out.jpg");
	let _ = std::fs::remove_file(&output);

	let out = dtext()
		.args(["--text", r"Now Playing Pacman\nAl 99,999", "--no-display", "--font-color", "red"])
		.args(extra)
		.arg("--font")
		.arg(&font)
		.arg("--background")
		.arg(&background)
		.arg("--output")
		.arg(&output)
		.output()
		.unwrap();
	assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
	Some(image::open(&output).unwrap())
}

#[test]
fn centered_run_writes_jpeg() {
	let Some(rendered) = render_to_file("centered", &[]) else { return };
	assert_eq!((rendered.width(), rendered.height()), (320, 240));
	let rgb = rendered.to_rgb8();
	assert!(rgb.pixels().any(|p| p[0] > 128 && p[1] < 100 && p[2] < 100), "no red text drawn");
}

#[test]
fn bar_run_writes_jpeg() {
	let Some(rendered) = render_to_file("bar", &["--bar"]) else { return };
	assert_eq!((rendered.width(), rendered.height()), (320, 240));
	let rgb = rendered.to_rgb8();
	// white bar text on a black background; the requested color is ignored
	assert!(rgb.pixels().any(|p| p[0] > 200 && p[1] > 200 && p[2] > 200), "no bar text drawn");
	assert!(!rgb.pixels().any(|p| p[0] > 128 && p[1] < 100 && p[2] < 100));
}
