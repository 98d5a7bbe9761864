use std::{
	num::NonZeroU32,
	path::{Path, PathBuf},
	process::{Command, ExitStatus},
	rc::Rc,
	time::{Duration, Instant},
};

use color_eyre::eyre::{Result, eyre};
use tracing::{error, info, warn};
use winit::{
	dpi::PhysicalSize,
	event::{ElementState, Event, KeyEvent, StartCause, WindowEvent},
	event_loop::{ControlFlow, EventLoop},
	keyboard::{Key, NamedKey},
	window::WindowBuilder,
};

use crate::compose::Canvas;

pub const DEFAULT_VIEWER_SETTLE: Duration = Duration::from_millis(200);
pub const DEFAULT_VIEWER_DURATION: Duration = Duration::from_secs(2);

/// How the finished canvas reaches the screen.
#[derive(Clone, Debug, PartialEq)]
pub enum PresentationMode {
	/// Save a JPEG, then let an external framebuffer viewer show it for `duration`.
	FileViewer { viewer: PathBuf, settle: Duration, duration: Duration },
	/// Show in a window until closed, Escape, or the optional timeout.
	Window { timeout: Option<Duration> },
	/// Save a JPEG and stop.
	File,
}

/// Hand the canvas to the configured sink. Only JPEG encoding failures are returned; viewer and display problems are logged.
pub fn present(canvas: &Canvas, mode: &PresentationMode, output: &Path) -> Result<()> {
	match mode {
		PresentationMode::File => {
			canvas.save_jpeg(output)?;
			info!("Image saved to {}", output.display());
		}
		PresentationMode::FileViewer { viewer, settle, duration } => {
			canvas.save_jpeg(output)?;
			info!("Image saved to {}", output.display());
			std::thread::sleep(*settle);
			show_with_viewer(viewer, output, *duration);
		}
		PresentationMode::Window { timeout } =>
			if let Err(e) = show_in_window(canvas, *timeout) {
				error!("Display failed: {e:#}");
			},
	}
	Ok(())
}

/// Launch `viewer -platform linuxfb <image>`, let it run for `duration`, then kill it.
///
/// Returns the viewer's exit status once reaped, `None` if it could not be started, killed or reaped.
pub fn show_with_viewer(viewer: &Path, image: &Path, duration: Duration) -> Option<ExitStatus> {
	let mut child = match Command::new(viewer).args(["-platform", "linuxfb"]).arg(image).spawn() {
		Ok(child) => child,
		Err(e) => {
			error!("Error starting {}: {e}", viewer.display());
			return None;
		}
	};
	info!(pid = child.id(), "viewer started");
	std::thread::sleep(duration);

	if let Err(e) = child.kill() {
		error!("Error killing {}: {e}", viewer.display());
		return None;
	}
	match child.wait() {
		Ok(status) => {
			info!(%status, "viewer stopped");
			Some(status)
		}
		Err(e) => {
			warn!("Error reaping {}: {e}", viewer.display());
			None
		}
	}
}

fn blit(canvas: &Canvas, pixels: &[u32], surface: &mut softbuffer::Surface<Rc<winit::window::Window>, Rc<winit::window::Window>>, size: PhysicalSize<u32>) -> Result<()> {
	let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
		return Ok(());
	};
	surface.resize(width, height).map_err(|e| eyre!("{e}"))?;
	let mut buffer = surface.buffer_mut().map_err(|e| eyre!("{e}"))?;
	buffer.fill(0);

	let (canvas_width, canvas_height) = (canvas.width() as usize, canvas.height() as usize);
	let (window_width, window_height) = (size.width as usize, size.height as usize);
	let copy_width = canvas_width.min(window_width);
	for y in 0..canvas_height.min(window_height) {
		let src = &pixels[y * canvas_width..][..copy_width];
		for (dst, &px) in buffer[y * window_width..][..copy_width].iter_mut().zip(src) {
			// softbuffer expects 0RGB
			*dst = px & 0x00FF_FFFF;
		}
	}
	buffer.present().map_err(|e| eyre!("{e}"))?;
	Ok(())
}

/// Open a window the size of the canvas and block until the user quits, presses Escape, or `timeout` elapses.
pub fn show_in_window(canvas: &Canvas, timeout: Option<Duration>) -> Result<()> {
	let pixels = canvas.to_argb_pixels();

	let event_loop = EventLoop::new()?;
	let window = Rc::new(
		WindowBuilder::new()
			.with_title("dtext")
			.with_inner_size(PhysicalSize::new(canvas.width(), canvas.height()))
			.with_resizable(false)
			.build(&event_loop)?,
	);
	let context = softbuffer::Context::new(window.clone()).map_err(|e| eyre!("{e}"))?;
	let mut surface = softbuffer::Surface::new(&context, window.clone()).map_err(|e| eyre!("{e}"))?;

	let deadline = timeout.map(|t| Instant::now() + t);
	event_loop.set_control_flow(match deadline {
		Some(deadline) => ControlFlow::WaitUntil(deadline),
		None => ControlFlow::Wait,
	});

	event_loop.run(move |event, elwt| match event {
		Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
			info!("timeout reached");
			elwt.exit();
		}
		Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => elwt.exit(),
		Event::WindowEvent {
			event: WindowEvent::KeyboardInput {
				event: KeyEvent {
					logical_key: Key::Named(NamedKey::Escape),
					state: ElementState::Pressed,
					..
				},
				..
			},
			..
		} => elwt.exit(),
		Event::WindowEvent { event: WindowEvent::RedrawRequested, .. } =>
			if let Err(e) = blit(canvas, &pixels, &mut surface, window.inner_size()) {
				error!("Error presenting frame: {e:#}");
				elwt.exit();
			},
		_ => {}
	})?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_viewer_is_not_fatal() {
		assert_eq!(show_with_viewer(Path::new("/nonexistent/gsho"), Path::new("/tmp/none.jpg"), Duration::ZERO), None);
	}

	#[cfg(unix)]
	#[test]
	fn viewer_runs_for_duration_then_is_killed() {
		use std::os::unix::{fs::PermissionsExt as _, process::ExitStatusExt as _};

		// stand-in viewer that ignores its arguments and would outlive the test
		let script = std::env::temp_dir().join(format!("dtext-viewer-{}.sh", std::process::id()));
		std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
		std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

		let duration = Duration::from_millis(300);
		let started = Instant::now();
		let status = show_with_viewer(&script, Path::new("/tmp/none.jpg"), duration).unwrap();
		let elapsed = started.elapsed();

		assert!(elapsed >= duration, "{elapsed:?}");
		assert!(elapsed < Duration::from_secs(10), "{elapsed:?}");
		assert_eq!(status.signal(), Some(9), "{status}");
		let _ = std::fs::remove_file(&script);
	}

	#[test]
	fn file_mode_writes_jpeg() {
		let path = std::env::temp_dir().join(format!("dtext-present-{}.jpg", std::process::id()));
		let canvas = Canvas::from_image(image::RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255])));
		present(&canvas, &PresentationMode::File, &path).unwrap();
		assert!(path.exists());
		let _ = std::fs::remove_file(&path);
	}

	#[test]
	fn unwritable_output_is_fatal() {
		let canvas = Canvas::from_image(image::RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255])));
		assert!(present(&canvas, &PresentationMode::File, Path::new("/nonexistent/dir/out.jpg")).is_err());
	}
}
