pub mod command;
pub mod driver;
pub mod locate;
pub mod report;
pub mod scan;
pub mod stage;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use thiserror::Error;

use command::CompileCommand;
use driver::Invoke;
use locate::CompilerHandle;
use report::Reporter;
use stage::Classifier;

pub const DEFAULT_CONFIG_PATH : &str = "config.toml";
pub const LEGACY_CONFIG_PATH : &str = "tools/python/config.json";
pub const DEFAULT_SHADER_DIR : &str = "assets/shaders";
pub const DEFAULT_COMPILER_NAME : &str = "dxc";

const DEFAULT_COMPILER_CANDIDATES : [&str; 4] = [
	"tools/dxc_2025_07_14/bin/x64/dxc.exe",
	"tools/dxc_2025_07_14/dxc.exe",
	"third_party/dxc/dxc.exe",
	"dxc.exe",
];

#[derive(Debug, Error)]
pub enum BuildError {
	#[error("couldn't read config {}: {source}", .path.display())]
	ConfigMissing { path: PathBuf, #[source] source: std::io::Error },
	#[error("couldn't parse config {}: {source}", .path.display())]
	ConfigInvalid { path: PathBuf, #[source] source: ConfigSyntax },
	#[error("shader directory {} does not exist", .0.display())]
	DirectoryMissing(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigSyntax {
	#[error(transparent)]
	Toml(#[from] toml::de::Error),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

/// Run settings. Read from TOML, or from JSON when the file ends in `.json`,
/// so a `tools/python/config.json` holding `{ "path": ... }` keeps working
/// unchanged.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
	pub path : PathBuf,
	pub inspect_source : bool,
	pub strict : bool,
	pub compiler : CompilerConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			path: PathBuf::from(DEFAULT_SHADER_DIR),
			inspect_source: false,
			strict: false,
			compiler: CompilerConfig::default(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
	pub candidates : Vec<PathBuf>,
	pub name : String,
	timeout_secs : Option<u64>,
}

impl Default for CompilerConfig {
	fn default() -> Self {
		Self {
			candidates: DEFAULT_COMPILER_CANDIDATES.iter().map(PathBuf::from).collect(),
			name: DEFAULT_COMPILER_NAME.to_string(),
			timeout_secs: None,
		}
	}
}

impl CompilerConfig {
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout_secs.map(Duration::from_secs)
	}
}

impl Config {
	/// Parses `contents` as JSON if `path` ends in `.json`, as TOML otherwise.
	pub fn parse(contents: &str, path: &Path) -> Result<Config, BuildError> {
		let parsed = if path.extension().map_or(false, |e| e == "json") {
			serde_json::from_str(contents).map_err(ConfigSyntax::from)
		} else {
			toml::from_str(contents).map_err(ConfigSyntax::from)
		};
		parsed.map_err(|source| BuildError::ConfigInvalid { path: path.to_path_buf(), source })
	}

	/// `config.toml` under `base`, unless only the older JSON config exists.
	pub fn default_path(base: &Path) -> PathBuf {
		let preferred = base.join(DEFAULT_CONFIG_PATH);
		let legacy = base.join(LEGACY_CONFIG_PATH);
		if !preferred.exists() && legacy.exists() {
			legacy
		} else {
			preferred
		}
	}

	pub fn load(path: &Path) -> Result<Config, BuildError> {
		let contents = fs::read_to_string(path)
			.map_err(|source| BuildError::ConfigMissing { path: path.to_path_buf(), source })?;
		Self::parse(&contents, path)
	}

	/// Shader root resolved against `base`; an absolute `path` wins.
	pub fn shader_root(&self, base: &Path) -> PathBuf {
		base.join(&self.path)
	}
}

/// How a run ended. `total == 0` means nothing was found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
	pub compiled : usize,
	pub total : usize,
	pub dry_run : bool,
}

impl Summary {
	pub fn failed(&self) -> usize {
		if self.dry_run { 0 } else { self.total - self.compiled }
	}
}

/// Scans, shows what would be run, then compiles every file one after the
/// other with whatever compiler was located. A single file failing never
/// stops the loop.
pub fn run<W: Write>(
	config: &Config,
	base: &Path,
	compiler: Option<&CompilerHandle>,
	invoker: &impl Invoke,
	reporter: &mut Reporter<W>,
) -> Result<Summary> {
	let root = config.shader_root(base);
	if !root.is_dir() {
		return Err(BuildError::DirectoryMissing(root).into());
	}

	reporter.scanning(&root)?;
	let files = scan::find_shader_files(&root);
	if files.is_empty() {
		reporter.no_shaders()?;
		return Ok(Summary::default());
	}
	reporter.found(&files)?;

	let program = compiler
		.map(|handle| handle.program().to_path_buf())
		.unwrap_or_else(|| PathBuf::from(&config.compiler.name));
	let classifier = Classifier::new(config.inspect_source);
	let commands: Vec<CompileCommand> = files.iter()
		.map(|file| CompileCommand::new(program.clone(), classifier.classify(file), file))
		.collect();

	reporter.commands(&commands)?;
	reporter.details(&files)?;

	let compiler = match compiler {
		Some(compiler) => compiler,
		None => {
			reporter.compiler_missing()?;
			reporter.summary(0, files.len())?;
			return Ok(Summary { compiled: 0, total: files.len(), dry_run: true });
		}
	};
	reporter.compiler_found(compiler)?;

	let mut compiled = 0;
	for command in &commands {
		reporter.compiling(&command.input)?;
		match driver::compile(invoker, command) {
			Ok(()) => {
				compiled += 1;
				reporter.compiled(command)?;
			}
			Err(failure) => reporter.failed(command, &failure)?,
		}
	}

	reporter.summary(compiled, commands.len())?;
	Ok(Summary { compiled, total: commands.len(), dry_run: false })
}

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
pub(crate) mod testing;
