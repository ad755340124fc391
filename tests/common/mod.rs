#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Throwaway directory under the system temp dir, removed on drop.
pub struct ScratchDir(PathBuf);

impl ScratchDir {
	pub fn new(name: &str) -> Self {
		let path = std::env::temp_dir()
			.join(format!("shader-bake-{}-{}", name, std::process::id()));
		let _ = fs::remove_dir_all(&path);
		fs::create_dir_all(&path).unwrap();
		Self(path)
	}

	pub fn path(&self) -> &Path {
		&self.0
	}

	pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
		let path = self.0.join(relative);
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(&path, contents).unwrap();
		path
	}

	pub fn touch(&self, relative: &str) -> PathBuf {
		self.write(relative, "")
	}

	/// Shader sources under `assets/shaders`, each with a trivial body.
	pub fn shaders(&self, names: &[&str]) -> PathBuf {
		for name in names {
			self.write(&format!("assets/shaders/{}", name), "float4 main() : SV_Position { return 0; }\n");
		}
		self.0.join("assets/shaders")
	}

	/// Executable shell script standing in for the compiler.
	#[cfg(unix)]
	pub fn script(&self, relative: &str, body: &str) -> PathBuf {
		use std::os::unix::fs::PermissionsExt;

		let path = self.write(relative, &format!("#!/bin/sh\n{}\n", body));
		fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
		path
	}
}

impl Drop for ScratchDir {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.0);
	}
}
