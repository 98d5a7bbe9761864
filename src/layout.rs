//! Text layout: greedy word wrap, font-size searches and placement of the resulting lines on a canvas.
//!
//! Nothing here touches pixels. Every function takes a [`TextMeasure`], so the whole module runs against a fake measurer in tests.

use tracing::debug;

use crate::font::TextMeasure;

pub const MIN_FONT_SIZE: f32 = 10.0;
pub const MAX_FONT_SIZE: f32 = 200.0;
pub const INITIAL_FONT_SIZE: f32 = 100.0;
/// Per-step shrink factor of the centred-block search.
pub const FONT_SIZE_DECAY: f32 = 0.9;

/// Padding between bar text and bar edge, on every side.
pub const BAR_MARGIN: f32 = 15.0;
/// Share of the canvas height the bar text may occupy.
pub const BAR_HEIGHT_FRACTION: f32 = 0.1;
/// Hard stop for the bar search, reached only by a measurer whose height never grows.
pub const MAX_BAR_FONT_SIZE: u32 = 1000;

/// Margins and spacing, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, derive_new::new)]
pub struct LayoutConfig {
	pub top_margin: f32,
	pub bottom_margin: f32,
	pub side_margin: f32,
	pub line_spacing: f32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self::new(40.0, 40.0, 100.0, 25.0)
	}
}

impl LayoutConfig {
	/// Width lines are wrapped to.
	pub fn available_width(&self, canvas_width: u32) -> f32 {
		canvas_width as f32 - 2.0 * self.side_margin
	}

	/// Height of the band the block is centred in.
	pub fn available_height(&self, canvas_height: u32) -> f32 {
		canvas_height as f32 - self.top_margin - self.bottom_margin
	}

	/// Height budget of the font-size search. Uses the top margin twice, not top + bottom.
	pub fn search_height(&self, canvas_height: u32) -> f32 {
		canvas_height as f32 - 2.0 * self.top_margin
	}
}

/// Lazy greedy word wrap over every paragraph of a text.
///
/// Cloning yields an independent iterator from the same position, so a fresh `wrap_lines` call (or a clone taken before iterating) restarts the sequence.
pub struct WrappedLines<'a, M: ?Sized> {
	paragraphs: std::str::Split<'a, char>,
	words: Option<std::str::SplitWhitespace<'a>>,
	/// Word that overflowed the previous line and opens the next one.
	carry: Option<&'a str>,
	measure: &'a M,
	font_size: f32,
	max_width: f32,
}

impl<M: ?Sized> Clone for WrappedLines<'_, M> {
	fn clone(&self) -> Self {
		Self {
			paragraphs: self.paragraphs.clone(),
			words: self.words.clone(),
			carry: self.carry,
			measure: self.measure,
			font_size: self.font_size,
			max_width: self.max_width,
		}
	}
}

/// Wrap `text` to `max_width` at `font_size`.
///
/// Paragraphs (split on `\n`) are wrapped independently and their lines concatenated in order; an empty paragraph contributes nothing. Words are joined by single spaces and a line is closed as soon as the next word would push its measured width past `max_width`. A word wider than `max_width` on its own still gets a line to itself.
pub fn wrap_lines<'a, M: TextMeasure + ?Sized>(text: &'a str, measure: &'a M, font_size: f32, max_width: f32) -> WrappedLines<'a, M> {
	WrappedLines {
		paragraphs: text.split('\n'),
		words: None,
		carry: None,
		measure,
		font_size,
		max_width,
	}
}

impl<M: TextMeasure + ?Sized> Iterator for WrappedLines<'_, M> {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		loop {
			if self.words.is_none() {
				self.words = Some(self.paragraphs.next()?.split_whitespace());
			}
			let Some(words) = self.words.as_mut() else { continue };

			let Some(first) = self.carry.take().or_else(|| words.next()) else {
				self.words = None;
				continue;
			};

			let mut line = first.to_owned();
			for word in words.by_ref() {
				let candidate = format!("{line} {word}");
				if self.measure.measure(&candidate, self.font_size).0 > self.max_width {
					self.carry = Some(word);
					return Some(line);
				}
				line = candidate;
			}
			self.words = None;
			return Some(line);
		}
	}
}

/// Sum of line heights, spacing excluded.
pub fn stacked_height<M: TextMeasure + ?Sized>(lines: impl IntoIterator<Item = impl AsRef<str>>, measure: &M, font_size: f32) -> f32 {
	lines.into_iter().map(|line| measure.measure(line.as_ref(), font_size).1).sum()
}

/// Largest size in `[MIN_FONT_SIZE, MAX_FONT_SIZE]` whose wrapped block fits `max_height`, found by shrinking from `INITIAL_FONT_SIZE` by `FONT_SIZE_DECAY` per step.
pub fn dynamic_font_size<M: TextMeasure + ?Sized>(text: &str, measure: &M, max_width: f32, max_height: f32) -> f32 {
	let mut font_size = INITIAL_FONT_SIZE;
	loop {
		let total = stacked_height(wrap_lines(text, measure, font_size, max_width), measure, font_size);
		if total <= max_height {
			break;
		}
		debug!(font_size, total, max_height, "block too tall, shrinking");
		font_size *= FONT_SIZE_DECAY;

		if font_size < MIN_FONT_SIZE {
			font_size = MIN_FONT_SIZE;
			break;
		}
		if font_size > MAX_FONT_SIZE {
			font_size = MAX_FONT_SIZE;
			break;
		}
	}
	font_size
}

/// Largest integer size at which `text`, unwrapped, fits both `max_width` and `max_height`. Zero if size 1 already overflows.
pub fn max_font_size<M: TextMeasure + ?Sized>(text: &str, measure: &M, max_width: f32, max_height: f32) -> u32 {
	for font_size in 1..=MAX_BAR_FONT_SIZE {
		let (width, height) = measure.measure(text, font_size as f32);
		if width > max_width || height > max_height {
			return font_size - 1;
		}
	}
	MAX_BAR_FONT_SIZE
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutLine {
	pub text: String,
	pub width: f32,
	pub height: f32,
}

/// Font size plus the measured lines to draw at it.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
	pub font_size: f32,
	pub lines: Vec<LayoutLine>,
	/// Line heights plus spacing between consecutive lines.
	pub total_height: f32,
}

impl LayoutResult {
	fn from_lines<M: TextMeasure + ?Sized>(lines: impl IntoIterator<Item = String>, measure: &M, font_size: f32, line_spacing: f32) -> Self {
		let lines: Vec<LayoutLine> = lines
			.into_iter()
			.map(|text| {
				let (width, height) = measure.measure(&text, font_size);
				LayoutLine { text, width, height }
			})
			.collect();
		let gaps = lines.len().saturating_sub(1) as f32;
		let total_height = lines.iter().map(|l| l.height).sum::<f32>() + gaps * line_spacing;
		Self { font_size, lines, total_height }
	}

	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.lines.iter().map(|l| l.text.as_str())
	}
}

/// Centred-block layout. `font_size_override` skips the search.
pub fn layout_centered<M: TextMeasure + ?Sized>(text: &str, measure: &M, canvas_width: u32, canvas_height: u32, config: &LayoutConfig, font_size_override: Option<f32>) -> LayoutResult {
	let max_width = config.available_width(canvas_width);
	let font_size = match font_size_override {
		Some(size) => size,
		None => dynamic_font_size(text, measure, max_width, config.search_height(canvas_height)),
	};
	LayoutResult::from_lines(wrap_lines(text, measure, font_size, max_width), measure, font_size, config.line_spacing)
}

/// Single-line layout for the bottom bar. Paragraph breaks become spaces.
pub fn layout_bar<M: TextMeasure + ?Sized>(text: &str, measure: &M, canvas_width: u32, canvas_height: u32, font_size_override: Option<f32>) -> LayoutResult {
	let text = text.split('\n').map(str::trim).filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ");
	let font_size = match font_size_override {
		Some(size) => size,
		None => max_font_size(&text, measure, canvas_width as f32 - 2.0 * BAR_MARGIN, canvas_height as f32 * BAR_HEIGHT_FRACTION) as f32,
	};
	let lines = (!text.is_empty()).then_some(text);
	LayoutResult::from_lines(lines, measure, font_size, 0.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine<'a> {
	pub text: &'a str,
	pub center_x: f32,
	pub center_y: f32,
}

/// Centre points of every line, the block centred vertically between the top and bottom margins.
pub fn place_centered<'a>(layout: &'a LayoutResult, canvas_width: u32, canvas_height: u32, config: &LayoutConfig) -> Vec<PlacedLine<'a>> {
	let center_x = canvas_width as f32 / 2.0;
	let mut cursor = config.top_margin + (config.available_height(canvas_height) - layout.total_height) / 2.0;
	layout
		.lines
		.iter()
		.map(|line| {
			let center_y = cursor + line.height / 2.0;
			cursor += line.height + config.line_spacing;
			PlacedLine { text: &line.text, center_x, center_y }
		})
		.collect()
}

/// Opaque strip hugging the canvas bottom, with its text centred inside.
#[derive(Clone, Debug, PartialEq)]
pub struct BarPlacement<'a> {
	pub x: f32,
	pub y: f32,
	pub width: f32,
	pub height: f32,
	pub line: PlacedLine<'a>,
}

pub fn place_bar<'a>(layout: &'a LayoutResult, canvas_width: u32, canvas_height: u32) -> Option<BarPlacement<'a>> {
	let line = layout.lines.first()?;
	let width = line.width + 2.0 * BAR_MARGIN;
	let height = line.height + 2.0 * BAR_MARGIN;
	let x = (canvas_width as f32 - width) / 2.0;
	let y = canvas_height as f32 - height;
	Some(BarPlacement {
		x,
		y,
		width,
		height,
		line: PlacedLine {
			text: &line.text,
			center_x: x + width / 2.0,
			center_y: y + height / 2.0,
		},
	})
}
