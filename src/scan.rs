use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const SOURCE_EXTENSIONS : [&str; 3] = ["hlsl", "vert", "frag"];

pub fn is_shader_source(path: &Path) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.map_or(false, |e| SOURCE_EXTENSIONS.contains(&e))
}

/// Every shader source below `root`, in traversal order.
///
/// The caller checks that `root` exists. Entries that can't be read are
/// logged and skipped.
pub fn find_shader_files(root: &Path) -> Vec<PathBuf> {
	WalkDir::new(root)
		.into_iter()
		.filter_map(|entry| match entry {
			Ok(entry) => Some(entry),
			Err(e) => {
				log::warn!("skipping unreadable entry under {}: {}", root.display(), e);
				None
			}
		})
		.filter(|entry| entry.file_type().is_file())
		.map(|entry| entry.into_path())
		.filter(|path| is_shader_source(path))
		.collect()
}
