pub mod color;
pub mod compose;
pub mod config;
pub mod font;
pub mod layout;
pub mod present;
pub mod request;

use color_eyre::eyre::Result;
use tracing::info;

use crate::{
	compose::{Canvas, draw_bar, draw_centered},
	font::load_font,
	layout::{layout_bar, layout_centered},
	request::RenderRequest,
};

/// Load the background and font, lay the text out and draw it. Nothing is written or shown.
pub fn render(request: &RenderRequest) -> Result<Canvas> {
	let mut canvas = Canvas::open(&request.background)?;
	let font = load_font(&request.font)?;
	let (width, height) = (canvas.width(), canvas.height());
	info!(width, height, family = font.family(), "background and font loaded");

	if request.bar {
		let layout = layout_bar(&request.text, &font, width, height, request.font_size);
		info!(font_size = layout.font_size, "bar layout");
		draw_bar(&mut canvas, &font, &layout)?;
	} else {
		let layout = layout_centered(&request.text, &font, width, height, &request.layout, request.font_size);
		info!(font_size = layout.font_size, lines = layout.lines.len(), block_height = layout.total_height, "centred layout");
		draw_centered(&mut canvas, &font, &layout, request.font_color, &request.layout)?;
	}
	Ok(canvas)
}
