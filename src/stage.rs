use std::fs;
use std::path::Path;

/// Pipeline stage a shader source is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
	Vertex,
	Fragment,
}

impl ShaderStage {
	/// Target profile handed to the compiler through `-T`.
	pub fn target_profile(self) -> &'static str {
		match self {
			Self::Vertex => "vs_5_0",
			Self::Fragment => "ps_5_0",
		}
	}

	pub fn keyword(self) -> &'static str {
		match self {
			Self::Vertex => "vert",
			Self::Fragment => "frag",
		}
	}
}

const VERTEX_SUFFIXES : [&str; 2] = [".vert.hlsl", ".vert"];
const FRAGMENT_SUFFIXES : [&str; 2] = [".frag.hlsl", ".frag"];
const VERTEX_TOKENS : [&str; 2] = ["vertex", "vert"];
const FRAGMENT_TOKENS : [&str; 3] = ["pixel", "fragment", "frag"];

const VERTEX_ENTRIES : [&str; 5] = ["VSMain", "main_vs", "main_vert", "main_vertex", "vert"];
const PIXEL_ENTRIES : [&str; 5] = ["PSMain", "main_frag", "main_ps", "main_pixel", "frag"];

/// Infers the stage from the file name alone. First match wins, and anything
/// without a hint is treated as a vertex shader, so this never fails.
pub fn stage_from_name(path: &Path) -> ShaderStage {
	let name = path.file_name()
		.map(|n| n.to_string_lossy().to_lowercase())
		.unwrap_or_default();

	if VERTEX_SUFFIXES.iter().any(|s| name.ends_with(s)) {
		ShaderStage::Vertex
	} else if FRAGMENT_SUFFIXES.iter().any(|s| name.ends_with(s)) {
		ShaderStage::Fragment
	} else if VERTEX_TOKENS.iter().any(|t| name.contains(t)) {
		ShaderStage::Vertex
	} else if FRAGMENT_TOKENS.iter().any(|t| name.contains(t)) {
		ShaderStage::Fragment
	} else {
		ShaderStage::Vertex
	}
}

/// Looks for well-known entry point identifiers in shader source.
///
/// Returns `None` when the source names entries of both stages (a library
/// compiled per entry) or of neither.
pub fn stage_from_source(source: &str) -> Option<ShaderStage> {
	let mut vertex = false;
	let mut pixel = false;

	for ident in source.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
		vertex |= VERTEX_ENTRIES.contains(&ident);
		pixel |= PIXEL_ENTRIES.contains(&ident);
	}

	match (vertex, pixel) {
		(true, false) => Some(ShaderStage::Vertex),
		(false, true) => Some(ShaderStage::Fragment),
		_ => None,
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Classifier {
	pub inspect_source : bool,
}

impl Classifier {
	pub fn new(inspect_source: bool) -> Self {
		Self { inspect_source }
	}

	pub fn classify(&self, path: &Path) -> ShaderStage {
		if self.inspect_source {
			match fs::read_to_string(path) {
				Ok(source) => {
					if let Some(stage) = stage_from_source(&source) {
						log::debug!("{} declares a {} entry", path.display(), stage.keyword());
						return stage;
					}
				}
				Err(e) => log::warn!("couldn't inspect {}: {}", path.display(), e),
			}
		}
		stage_from_name(path)
	}
}
