use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::CompilerConfig;

const VERSION_ARG : &str = "--version";

/// Resolved compiler executable, either a bundled path or a bare name found on `PATH`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerHandle(PathBuf);

impl CompilerHandle {
	pub fn new(program: impl Into<PathBuf>) -> Self {
		Self(program.into())
	}

	pub fn program(&self) -> &Path {
		&self.0
	}
}

impl fmt::Display for CompilerHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.display())
	}
}

#[derive(Clone, Debug)]
pub struct Locator {
	candidates : Vec<PathBuf>,
	name : String,
}

impl Locator {
	pub fn new(candidates: Vec<PathBuf>, name: impl Into<String>) -> Self {
		Self { candidates, name: name.into() }
	}

	pub fn from_config(config: &CompilerConfig) -> Self {
		Self::new(config.candidates.clone(), config.name.clone())
	}

	/// Checks the candidate paths in order, then asks the bare name for its
	/// version. A failed probe just means there is no compiler.
	pub fn locate(&self) -> Option<CompilerHandle> {
		for candidate in &self.candidates {
			log::debug!("probing compiler candidate {}", candidate.display());
			if candidate.exists() {
				return Some(CompilerHandle::new(candidate));
			}
		}

		log::debug!("probing `{} {}` on the search path", self.name, VERSION_ARG);
		let probe = Command::new(&self.name)
			.arg(VERSION_ARG)
			.stdin(Stdio::null())
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.status();

		match probe {
			Ok(status) if status.success() => Some(CompilerHandle::new(&self.name)),
			Ok(status) => {
				log::debug!("`{}` answered the version probe with {}", self.name, status);
				None
			}
			Err(e) => {
				log::debug!("couldn't start `{}`: {}", self.name, e);
				None
			}
		}
	}
}
