use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use shader_bake::driver::Subprocess;
use shader_bake::locate::Locator;
use shader_bake::report::Reporter;
use shader_bake::{run, Config};

fn main() -> Result<()> {
	pretty_env_logger::init();

	let base = env::current_dir()?;
	let config_path = env::args_os().nth(1)
		.map(PathBuf::from)
		.unwrap_or_else(|| Config::default_path(&base));
	log::info!("working directory {}", base.display());
	log::info!("loading config from {}", config_path.display());

	let config = Config::load(&config_path)?;

	// resolved once and handed down, both for display and for compiling
	let compiler = Locator::from_config(&config.compiler).locate();
	let invoker = Subprocess::new(config.compiler.timeout());

	let mut reporter = Reporter::stdout();
	let summary = run(&config, &base, compiler.as_ref(), &invoker, &mut reporter)?;

	if config.strict && summary.failed() > 0 {
		bail!("{} of {} shader files failed to compile", summary.failed().red(), summary.total);
	}
	Ok(())
}
