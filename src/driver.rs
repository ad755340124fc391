use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::command::CompileCommand;

const POLL_INTERVAL : Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum CompileFailure {
	#[error("compiler exited with {}: {stderr}", describe_code(.code))]
	Exited { code: Option<i32>, stderr: String },
	#[error("couldn't start compiler {program}: {source}")]
	Spawn { program: String, #[source] source: io::Error },
	#[error("lost track of compiler {program}: {source}")]
	Wait { program: String, #[source] source: io::Error },
	#[error("compiler didn't finish within {0:?}")]
	TimedOut(Duration),
}

fn describe_code(code: &Option<i32>) -> String {
	match code {
		Some(code) => format!("code {}", code),
		None => "no exit code".to_string(),
	}
}

/// What a finished compiler process left behind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
	pub success : bool,
	pub code : Option<i32>,
	pub stdout : String,
	pub stderr : String,
}

impl ProcessOutput {
	fn new(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
		Self {
			success: status.success(),
			code: status.code(),
			stdout: String::from_utf8_lossy(&stdout).into_owned(),
			stderr: String::from_utf8_lossy(&stderr).into_owned(),
		}
	}
}

/// Runs a compile command to completion. Only failures to run the process at
/// all are errors here; the exit status is judged by [`compile`].
pub trait Invoke {
	fn invoke(&self, command: &CompileCommand) -> Result<ProcessOutput, CompileFailure>;
}

/// Spawns the compiler as a child process and blocks until it exits.
#[derive(Clone, Copy, Debug, Default)]
pub struct Subprocess {
	pub timeout : Option<Duration>,
}

impl Subprocess {
	pub fn new(timeout: Option<Duration>) -> Self {
		Self { timeout }
	}
}

impl Invoke for Subprocess {
	fn invoke(&self, command: &CompileCommand) -> Result<ProcessOutput, CompileFailure> {
		let program = command.program.display().to_string();
		log::debug!("spawning {}", command);

		let child = Command::new(&command.program)
			.args(command.args())
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.map_err(|source| CompileFailure::Spawn { program: program.clone(), source })?;

		match self.timeout {
			None => {
				let output = child.wait_with_output()
					.map_err(|source| CompileFailure::Wait { program, source })?;
				Ok(ProcessOutput::new(output.status, output.stdout, output.stderr))
			}
			Some(limit) => wait_with_timeout(child, limit, program),
		}
	}
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> JoinHandle<Vec<u8>> {
	thread::spawn(move || {
		let mut buffer = Vec::new();
		if let Some(mut pipe) = pipe {
			if let Err(e) = pipe.read_to_end(&mut buffer) {
				log::warn!("couldn't read compiler output: {}", e);
			}
		}
		buffer
	})
}

fn wait_with_timeout(mut child: Child, limit: Duration, program: String)
		-> Result<ProcessOutput, CompileFailure> {
	let stdout = drain(child.stdout.take());
	let stderr = drain(child.stderr.take());
	let started = Instant::now();

	let status = loop {
		match child.try_wait() {
			Ok(Some(status)) => break status,
			Ok(None) if started.elapsed() >= limit => {
				log::warn!("killing {} after {:?}", program, limit);
				reap(&mut child, &program);
				return Err(CompileFailure::TimedOut(limit));
			}
			Ok(None) => thread::sleep(POLL_INTERVAL),
			Err(source) => {
				reap(&mut child, &program);
				return Err(CompileFailure::Wait { program, source });
			}
		}
	};

	let stdout = stdout.join().unwrap_or_default();
	let stderr = stderr.join().unwrap_or_default();
	Ok(ProcessOutput::new(status, stdout, stderr))
}

fn reap(child: &mut Child, program: &str) {
	if let Err(e) = child.kill() {
		log::warn!("couldn't kill {}: {}", program, e);
	}
	if let Err(e) = child.wait() {
		log::warn!("couldn't reap {}: {}", program, e);
	}
}

/// Runs one command and turns a non-zero exit into a failure carrying the
/// compiler's diagnostics. No retries.
pub fn compile(invoker: &impl Invoke, command: &CompileCommand) -> Result<(), CompileFailure> {
	let output = invoker.invoke(command)?;
	if !output.stdout.trim().is_empty() {
		log::debug!("{} said: {}", command.program.display(), output.stdout.trim_end());
	}
	if output.success {
		Ok(())
	} else {
		Err(CompileFailure::Exited { code: output.code, stderr: output.stderr })
	}
}
