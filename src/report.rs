use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use owo_colors::OwoColorize;

use crate::command::CompileCommand;
use crate::driver::CompileFailure;
use crate::locate::CompilerHandle;

const PREVIEW_LINES : usize = 5;
const RULE_WIDTH : usize = 50;

const INSTALL_HINTS : [&str; 3] = [
	"download it from https://github.com/microsoft/DirectXShaderCompiler/releases",
	"place dxc.exe under tools/dxc_2025_07_14/",
	"or make sure dxc is on the PATH",
];

/// Console output for a run.
pub struct Reporter<W: Write> {
	out : W,
}

impl Reporter<io::Stdout> {
	pub fn stdout() -> Self {
		Self::new(io::stdout())
	}
}

impl<W: Write> Reporter<W> {
	pub fn new(out: W) -> Self {
		Self { out }
	}

	pub fn into_inner(self) -> W {
		self.out
	}

	pub fn scanning(&mut self, root: &Path) -> io::Result<()> {
		writeln!(self.out, "scanning shader directory {}", root.display().bright_blue())
	}

	pub fn no_shaders(&mut self) -> io::Result<()> {
		writeln!(self.out, "{}", "no shader files found".yellow())
	}

	pub fn found(&mut self, files: &[PathBuf]) -> io::Result<()> {
		writeln!(self.out, "found {} shader files:", files.len().green())?;
		for file in files {
			writeln!(self.out, "  - {}", file.display())?;
		}
		Ok(())
	}

	pub fn commands(&mut self, commands: &[CompileCommand]) -> io::Result<()> {
		writeln!(self.out, "\ngenerated compile commands:")?;
		for command in commands {
			writeln!(self.out, "  {}", command)?;
		}
		Ok(())
	}

	/// Size, modification time and the first few lines of every file.
	pub fn details(&mut self, files: &[PathBuf]) -> io::Result<()> {
		writeln!(self.out, "\nshader file details:")?;
		writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))?;

		for file in files {
			writeln!(self.out, "file: {}", file.display().bright_blue())?;
			match fs::metadata(file) {
				Ok(metadata) => {
					writeln!(self.out, "  size: {} bytes", metadata.len())?;
					let modified = metadata.modified().ok()
						.and_then(|time| time.duration_since(UNIX_EPOCH).ok());
					match modified {
						Some(since_epoch) => writeln!(self.out, "  modified: {:.3}", since_epoch.as_secs_f64())?,
						None => writeln!(self.out, "  modified: unknown")?,
					}
				}
				Err(e) => writeln!(self.out, "  {}", format!("couldn't stat file: {}", e).red())?,
			}

			match preview(file) {
				Ok((lines, truncated)) => {
					writeln!(self.out, "  preview (first {} lines):", PREVIEW_LINES)?;
					for line in lines {
						writeln!(self.out, "    {}", line)?;
					}
					if truncated {
						writeln!(self.out, "    ...")?;
					}
				}
				Err(e) => writeln!(self.out, "  {}", format!("couldn't read contents: {}", e).red())?,
			}
			writeln!(self.out)?;
		}
		Ok(())
	}

	pub fn compiler_found(&mut self, compiler: &CompilerHandle) -> io::Result<()> {
		writeln!(self.out, "found compiler {}", compiler.bright_blue())
	}

	pub fn compiler_missing(&mut self) -> io::Result<()> {
		writeln!(self.out, "\n{}", "compiler not found, skipping compilation".yellow())?;
		writeln!(self.out, "to enable shader compilation:")?;
		for (i, hint) in INSTALL_HINTS.iter().enumerate() {
			writeln!(self.out, "{}. {}", i + 1, hint)?;
		}
		Ok(())
	}

	pub fn compiling(&mut self, input: &Path) -> io::Result<()> {
		let name = input.file_name().map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
		writeln!(self.out, "compiling {}", name)
	}

	pub fn compiled(&mut self, command: &CompileCommand) -> io::Result<()> {
		writeln!(self.out, "{} {} -> {}",
			"compiled".green(), command.input.display(), command.output.display())
	}

	pub fn failed(&mut self, command: &CompileCommand, failure: &CompileFailure) -> io::Result<()> {
		writeln!(self.out, "{} {}: {}", "failed".red(), command.input.display(), failure)
	}

	pub fn summary(&mut self, compiled: usize, total: usize) -> io::Result<()> {
		let count = format!("{}/{}", compiled, total);
		if compiled == total {
			writeln!(self.out, "\ndone, compiled {} shader files", count.green())
		} else {
			writeln!(self.out, "\ndone, compiled {} shader files", count.red())
		}
	}
}

fn preview(path: &Path) -> io::Result<(Vec<String>, bool)> {
	let mut lines = BufReader::new(fs::File::open(path)?).lines();
	let mut head = Vec::with_capacity(PREVIEW_LINES);
	while head.len() < PREVIEW_LINES {
		match lines.next() {
			Some(line) => head.push(line?.trim_end().to_string()),
			None => return Ok((head, false)),
		}
	}
	Ok((head, lines.next().is_some()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::stage::ShaderStage;
	use crate::testing::ScratchDir;

	fn rendered(report: impl FnOnce(&mut Reporter<Vec<u8>>) -> io::Result<()>) -> String {
		let mut reporter = Reporter::new(Vec::new());
		report(&mut reporter).unwrap();
		String::from_utf8(reporter.into_inner()).unwrap()
	}

	#[test]
	fn preview_stops_after_five_lines() {
		let dir = ScratchDir::new("report-preview");
		let long = dir.write("long.hlsl", "1\n2\n3\n4\n5\n6\n7\n");
		let short = dir.write("short.hlsl", "float4 main() : SV_Target\n{\n}\n");

		let (lines, truncated) = preview(&long).unwrap();
		assert_eq!(lines, ["1", "2", "3", "4", "5"]);
		assert!(truncated);

		let (lines, truncated) = preview(&short).unwrap();
		assert_eq!(lines.len(), 3);
		assert!(!truncated);
	}

	#[test]
	fn details_show_size_and_preview() {
		let dir = ScratchDir::new("report-details");
		let file = dir.write("a.vert.hlsl", "line one\nline two\n");
		let text = rendered(|r| r.details(&[file]));
		assert!(text.contains("size: 18 bytes"));
		assert!(text.contains("modified: "));
		assert!(text.contains("    line two"));
		assert!(!text.contains("..."));
	}

	#[test]
	fn details_survive_missing_files() {
		let text = rendered(|r| r.details(&[PathBuf::from("shader-bake/missing.hlsl")]));
		assert!(text.contains("couldn't stat file"));
		assert!(text.contains("couldn't read contents"));
	}

	#[test]
	fn commands_are_listed_verbatim() {
		let command = CompileCommand::new("dxc", ShaderStage::Fragment, Path::new("b.frag.hlsl"));
		let text = rendered(|r| r.commands(&[command.clone()]));
		assert!(text.contains(&command.to_string()));
	}

	#[test]
	fn summary_counts() {
		let text = rendered(|r| r.summary(1, 2));
		assert!(text.contains("1/2"));
	}

	#[test]
	fn missing_compiler_explains_how_to_install() {
		let text = rendered(|r| r.compiler_missing());
		assert!(text.contains("skipping compilation"));
		assert!(text.contains("DirectXShaderCompiler/releases"));
	}
}
