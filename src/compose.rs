use std::path::Path;

use color_eyre::eyre::{Result, WrapErr as _, eyre};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::{
	color::svg_rgb,
	font::FontHandle,
	layout::{LayoutConfig, LayoutResult, PlacedLine, place_bar, place_centered},
};

pub const BAR_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const BAR_TEXT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Background image plus everything drawn onto it.
#[derive(Clone, Debug)]
pub struct Canvas {
	image: RgbaImage,
}

impl Canvas {
	pub fn open(path: &Path) -> Result<Self> {
		let image = image::open(path).wrap_err_with(|| format!("Failed to load background image {}", path.display()))?;
		Ok(Self { image: image.to_rgba8() })
	}

	pub fn from_image(image: RgbaImage) -> Self {
		Self { image }
	}

	pub fn width(&self) -> u32 {
		self.image.width()
	}

	pub fn height(&self) -> u32 {
		self.image.height()
	}

	pub fn image(&self) -> &RgbaImage {
		&self.image
	}

	/// Encode as JPEG. Alpha is dropped.
	pub fn save_jpeg(&self, path: &Path) -> Result<()> {
		DynamicImage::ImageRgba8(self.image.clone())
			.to_rgb8()
			.save_with_format(path, ImageFormat::Jpeg)
			.wrap_err_with(|| format!("Failed to write {}", path.display()))
	}

	/// Row-major 32-bit pixels, `0xAARRGGBB`.
	pub fn to_argb_pixels(&self) -> Vec<u32> {
		self.image
			.pixels()
			.map(|&Rgba([r, g, b, a])| ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
			.collect()
	}

	/// Rasterize `svg` at canvas size and blend it over the current pixels.
	fn blend_svg(&mut self, svg: &str, font: &FontHandle) -> Result<()> {
		let (width, height) = self.image.dimensions();

		let mut options = usvg::Options::default();
		options.fontdb = font.fontdb();
		let tree = usvg::Tree::from_str(svg, &options)?;

		let mut overlay = tiny_skia::Pixmap::new(width, height).ok_or_else(|| eyre!("Failed to create {width}x{height} pixmap"))?;
		resvg::render(&tree, tiny_skia::Transform::default(), &mut overlay.as_mut());

		for (x, y, bg_pixel) in self.image.enumerate_pixels_mut() {
			let Some(px) = overlay.pixel(x, y) else { continue };
			let alpha = px.alpha();
			if alpha == 0 {
				continue;
			}
			// tiny-skia stores premultiplied color
			let px = px.demultiply();
			let alpha_f = alpha as f32 / 255.0;
			for (channel, over) in [px.red(), px.green(), px.blue()].into_iter().enumerate() {
				bg_pixel[channel] = (over as f32 * alpha_f + bg_pixel[channel] as f32 * (1.0 - alpha_f)).round() as u8;
			}
			bg_pixel[3] = bg_pixel[3].max(alpha);
		}
		Ok(())
	}
}

/// Something drawn on the overlay, in canvas pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Element<'a> {
	Rect { x: f32, y: f32, width: f32, height: f32, fill: Rgba<u8> },
	Text { text: &'a str, center_x: f32, baseline: f32, font_size: f32, fill: Rgba<u8> },
}

fn escape_xml(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&apos;")
}

/// CSS `font-family` value for `family`, quoted with whichever quote the name does not contain.
fn css_family(family: &str) -> String {
	if !family.contains('\'') {
		format!("'{family}'")
	} else if !family.contains('"') {
		format!("\"{family}\"")
	} else {
		family.to_owned()
	}
}

/// Standalone SVG document holding `elements` over a transparent `width`x`height` viewport.
pub fn overlay_svg(width: u32, height: u32, family: &str, elements: &[Element]) -> String {
	let body: String = elements
		.iter()
		.map(|element| match element {
			Element::Rect { x, y, width, height, fill } => format!(r#"  <rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"/>"#, svg_rgb(*fill)),
			Element::Text {
				text,
				center_x,
				baseline,
				font_size,
				fill,
			} => format!(
				r#"  <text x="{center_x}" y="{baseline}" font-family="{}" font-size="{font_size}" fill="{}" text-anchor="middle" xml:space="preserve">{}</text>"#,
				escape_xml(&css_family(family)),
				svg_rgb(*fill),
				escape_xml(text)
			),
		})
		.collect::<Vec<_>>()
		.join("\n");

	format!(
		r#"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
{body}
</svg>"#
	)
}

fn text_element<'a>(line: &PlacedLine<'a>, font: &FontHandle, font_size: f32, fill: Rgba<u8>) -> Element<'a> {
	Element::Text {
		text: line.text,
		center_x: line.center_x,
		baseline: font.baseline_for_center(line.center_y, font_size),
		font_size,
		fill,
	}
}

/// Draw `layout` as a block centred between the margins, each line centred horizontally.
pub fn draw_centered(canvas: &mut Canvas, font: &FontHandle, layout: &LayoutResult, color: Rgba<u8>, config: &LayoutConfig) -> Result<()> {
	let placed = place_centered(layout, canvas.width(), canvas.height(), config);
	if placed.is_empty() {
		warn!("nothing to draw");
		return Ok(());
	}
	let elements: Vec<Element> = placed.iter().map(|line| text_element(line, font, layout.font_size, color)).collect();
	debug!(lines = elements.len(), font_size = layout.font_size, "drawing centred block");

	let svg = overlay_svg(canvas.width(), canvas.height(), font.family(), &elements);
	canvas.blend_svg(&svg, font)
}

/// Draw `layout`'s single line as white text on a black strip at the bottom of the canvas.
pub fn draw_bar(canvas: &mut Canvas, font: &FontHandle, layout: &LayoutResult) -> Result<()> {
	let Some(bar) = place_bar(layout, canvas.width(), canvas.height()) else {
		warn!("nothing to draw");
		return Ok(());
	};
	if layout.font_size < 1.0 {
		warn!(font_size = layout.font_size, "bar text does not fit at any size");
	}
	let elements = [
		Element::Rect {
			x: bar.x,
			y: bar.y,
			width: bar.width,
			height: bar.height,
			fill: BAR_FILL,
		},
		text_element(&bar.line, font, layout.font_size, BAR_TEXT),
	];
	debug!(x = bar.x, y = bar.y, width = bar.width, height = bar.height, "drawing bar");

	let svg = overlay_svg(canvas.width(), canvas.height(), font.family(), &elements);
	canvas.blend_svg(&svg, font)
}
