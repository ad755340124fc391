use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::stage::ShaderStage;

pub const ENTRY_POINT : &str = "main";
pub const OUTPUT_EXTENSION : &str = "spv";

/// `shader.vert.hlsl` becomes `shader.vert.spv`, `foo.frag` becomes `foo.spv`.
pub fn output_path(input: &Path) -> PathBuf {
	input.with_extension(OUTPUT_EXTENSION)
}

/// One compiler invocation for one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileCommand {
	pub program : PathBuf,
	pub stage : ShaderStage,
	pub input : PathBuf,
	pub output : PathBuf,
}

impl CompileCommand {
	pub fn new(program: impl Into<PathBuf>, stage: ShaderStage, input: &Path) -> Self {
		Self {
			program: program.into(),
			stage,
			input: input.to_path_buf(),
			output: output_path(input),
		}
	}

	/// Arguments after the program name, in the order the compiler expects.
	pub fn args(&self) -> Vec<OsString> {
		vec![
			"-spirv".into(),
			"-T".into(),
			self.stage.target_profile().into(),
			"-E".into(),
			ENTRY_POINT.into(),
			self.input.clone().into_os_string(),
			"-Fo".into(),
			self.output.clone().into_os_string(),
		]
	}
}

/// Single-quotes an argument for a POSIX shell when it would otherwise be
/// split or reinterpreted.
pub fn shell_quote(arg: &OsStr) -> Cow<'_, str> {
	let arg = arg.to_string_lossy();
	let plain = !arg.is_empty() && arg.chars()
		.all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
	if plain {
		arg
	} else {
		Cow::Owned(format!("'{}'", arg.replace('\'', "'\\''")))
	}
}

impl fmt::Display for CompileCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", shell_quote(self.program.as_os_str()))?;
		for arg in self.args() {
			write!(f, " {}", shell_quote(&arg))?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_replaces_last_extension() {
		assert_eq!(output_path(Path::new("shader.vert.hlsl")), Path::new("shader.vert.spv"));
		assert_eq!(output_path(Path::new("foo.frag")), Path::new("foo.spv"));
		assert_eq!(output_path(Path::new("assets/shaders/sky.hlsl")), Path::new("assets/shaders/sky.spv"));
	}

	#[test]
	fn argument_order() {
		let command = CompileCommand::new("dxc", ShaderStage::Fragment, Path::new("lit.frag.hlsl"));
		let args: Vec<String> = command.args().iter()
			.map(|a| a.to_string_lossy().into_owned())
			.collect();
		assert_eq!(args, [
			"-spirv", "-T", "ps_5_0", "-E", "main", "lit.frag.hlsl", "-Fo", "lit.frag.spv"
		]);
	}

	fn rendered_from_args(command: &CompileCommand) -> String {
		std::iter::once(command.program.clone().into_os_string())
			.chain(command.args())
			.map(|a| shell_quote(&a).into_owned())
			.collect::<Vec<_>>()
			.join(" ")
	}

	#[test]
	fn display_and_args_agree() {
		let command = CompileCommand::new(
			"tools/dxc/dxc.exe", ShaderStage::Vertex, Path::new("assets/a.vert.hlsl"));
		let rendered = command.to_string();

		assert_eq!(rendered, rendered_from_args(&command));
		assert_eq!(rendered, "tools/dxc/dxc.exe -spirv -T vs_5_0 -E main assets/a.vert.hlsl -Fo assets/a.vert.spv");
	}

	#[test]
	fn paths_with_spaces_are_quoted() {
		let command = CompileCommand::new(
			"C:/Program Files/dxc/dxc.exe", ShaderStage::Fragment, Path::new("my shaders/it's.frag"));
		let rendered = command.to_string();

		assert_eq!(rendered, rendered_from_args(&command));
		assert_eq!(rendered, concat!(
			"'C:/Program Files/dxc/dxc.exe' -spirv -T ps_5_0 -E main ",
			"'my shaders/it'\\''s.frag' -Fo 'my shaders/it'\\''s.spv'"
		));
		assert_eq!(command.args()[5], OsString::from("my shaders/it's.frag"));
	}

	#[test]
	fn quoting() {
		assert_eq!(shell_quote(OsStr::new("b.frag.hlsl")), "b.frag.hlsl");
		assert_eq!(shell_quote(OsStr::new("")), "''");
		assert_eq!(shell_quote(OsStr::new("a b")), "'a b'");
		assert_eq!(shell_quote(OsStr::new("$HOME")), "'$HOME'");
	}

	#[test]
	fn building_twice_is_identical() {
		let input = Path::new("b.frag.hlsl");
		let first = CompileCommand::new("dxc", ShaderStage::Fragment, input);
		let second = CompileCommand::new("dxc", ShaderStage::Fragment, input);
		assert_eq!(first, second);
		assert_eq!(first.to_string().into_bytes(), second.to_string().into_bytes());
		assert_eq!(first.args(), second.args());
	}
}
