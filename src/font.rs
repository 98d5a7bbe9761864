use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr as _, eyre};

/// Pixel measurement of a single unwrapped string.
///
/// Layout only ever asks this one question, so anything able to answer it (a real font, or a fixed-advance stand-in in tests) can drive the wrapper and both font-size searches.
pub trait TextMeasure {
	/// `(width, height)` in pixels of `text` rendered at `font_size`. Height is the font's line height, independent of which glyphs `text` contains.
	fn measure(&self, text: &str, font_size: f32) -> (f32, f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Metrics {
	units_per_em: f32,
	ascender: f32,
	descender: f32,
	line_gap: f32,
}

/// A TrueType/OpenType face loaded from disk, usable both for measurement and for drawing through `usvg`.
#[derive(Clone)]
pub struct FontHandle {
	data: Arc<Vec<u8>>,
	index: u32,
	metrics: Metrics,
	family: String,
	fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for FontHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FontHandle").field("family", &self.family).field("metrics", &self.metrics).finish()
	}
}

/// Read and validate a font file. Size is not baked in; every measurement takes it explicitly.
pub fn load_font(path: &Path) -> Result<FontHandle> {
	let data = std::fs::read(path).wrap_err_with(|| format!("Failed to read font file {}", path.display()))?;
	FontHandle::from_bytes(data).wrap_err_with(|| format!("Invalid font file {}", path.display()))
}

impl FontHandle {
	pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
		let index = 0;
		let face = ttf_parser::Face::parse(&data, index).map_err(|e| eyre!("failed to parse font: {e}"))?;
		let metrics = Metrics {
			units_per_em: face.units_per_em() as f32,
			ascender: face.ascender() as f32,
			descender: face.descender() as f32,
			line_gap: face.line_gap() as f32,
		};

		let mut db = fontdb::Database::new();
		db.load_font_data(data.clone());
		let family = db
			.faces()
			.next()
			.and_then(|info| info.families.first())
			.map(|(name, _)| name.clone())
			.ok_or_else(|| eyre!("font has no family name"))?;

		Ok(Self {
			data: Arc::new(data),
			index,
			metrics,
			family,
			fontdb: Arc::new(db),
		})
	}

	/// Family name to reference from SVG `font-family`.
	pub fn family(&self) -> &str {
		&self.family
	}

	/// Database holding only this face, for `usvg::Options::fontdb`.
	pub fn fontdb(&self) -> Arc<fontdb::Database> {
		Arc::clone(&self.fontdb)
	}

	fn scale(&self, font_size: f32) -> f32 {
		font_size / self.metrics.units_per_em
	}

	/// Distance from baseline to the top of the em box, positive.
	pub fn ascent(&self, font_size: f32) -> f32 {
		self.metrics.ascender * self.scale(font_size)
	}

	/// Distance from baseline to the bottom of the em box, negative.
	pub fn descent(&self, font_size: f32) -> f32 {
		self.metrics.descender * self.scale(font_size)
	}

	pub fn line_height(&self, font_size: f32) -> f32 {
		(self.metrics.ascender - self.metrics.descender + self.metrics.line_gap) * self.scale(font_size)
	}

	/// Baseline y that vertically centres the ascent/descent box on `center_y`.
	pub fn baseline_for_center(&self, center_y: f32, font_size: f32) -> f32 {
		center_y + (self.ascent(font_size) + self.descent(font_size)) / 2.0
	}

	fn advance_units(&self, text: &str) -> f32 {
		// bytes were validated in `from_bytes`
		let Ok(face) = ttf_parser::Face::parse(&self.data, self.index) else {
			return 0.0;
		};
		text.chars()
			.map(|c| {
				let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
				face.glyph_hor_advance(glyph).unwrap_or(0) as f32
			})
			.sum()
	}
}

impl TextMeasure for FontHandle {
	fn measure(&self, text: &str, font_size: f32) -> (f32, f32) {
		(self.advance_units(text) * self.scale(font_size), self.line_height(font_size))
	}
}
