use color_eyre::eyre::{Result, bail};
use image::Rgba;

/// Names accepted by `--font-color`, in the order they are listed in usage output.
pub const PALETTE: [&str; 10] = ["black", "white", "red", "green", "blue", "yellow", "purple", "orange", "cyan", "magenta"];

/// Resolve a palette name (case-insensitive) to an opaque color.
pub fn parse_color(name: &str) -> Result<Rgba<u8>> {
	let rgb = match name.trim().to_lowercase().as_str() {
		"black" => [0, 0, 0],
		"white" => [255, 255, 255],
		"red" => [255, 0, 0],
		"green" => [0, 255, 0],
		"blue" => [0, 0, 255],
		"yellow" => [255, 255, 0],
		"purple" => [128, 0, 128],
		"orange" => [255, 165, 0],
		"cyan" => [0, 255, 255],
		"magenta" => [255, 0, 255],
		_ => bail!("unsupported color: {name} (expected one of: {})", PALETTE.join(", ")),
	};
	Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// `rgb(r,g,b)` notation for SVG `fill` attributes.
pub fn svg_rgb(color: Rgba<u8>) -> String {
	format!("rgb({},{},{})", color[0], color[1], color[2])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn red_is_opaque_red() {
		assert_eq!(parse_color("red").unwrap(), Rgba([255, 0, 0, 255]));
	}

	#[test]
	fn names_are_case_insensitive() {
		assert_eq!(parse_color("Yellow").unwrap(), Rgba([255, 255, 0, 255]));
		assert_eq!(parse_color(" ORANGE ").unwrap(), Rgba([255, 165, 0, 255]));
	}

	#[test]
	fn whole_palette_resolves_opaque() {
		for name in PALETTE {
			assert_eq!(parse_color(name).unwrap()[3], 255, "{name}");
		}
	}

	#[test]
	fn unknown_name_is_rejected() {
		let err = parse_color("teal").unwrap_err();
		assert!(err.to_string().contains("unsupported color: teal"));
	}

	#[test]
	fn svg_fill_drops_alpha() {
		assert_eq!(svg_rgb(Rgba([128, 0, 128, 255])), "rgb(128,0,128)");
	}
}
