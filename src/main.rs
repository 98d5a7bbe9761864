use clap::Parser;
use color_eyre::Result;
use dtext::{
	config::AppConfig,
	present::present,
	request::{Args, RenderRequest},
};
use tracing_subscriber::EnvFilter;

fn main() {
	if let Err(e) = run() {
		eprintln!("Error: {e:?}");
		std::process::exit(1);
	}
}

fn run() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();
	let args = Args::parse();

	let config = AppConfig::read(args.config.as_deref())?;
	let request = RenderRequest::resolve(args, &config)?;

	let canvas = dtext::render(&request)?;
	present(&canvas, &request.mode, &request.output)?;

	Ok(())
}
