use std::path::{Path, PathBuf};
use std::{fs, io};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_file<P: AsRef<Path>>(filepath: P) -> io::Result<Vec<String>> {
	Ok(fs::read_to_string(filepath)?.lines().map(str::to_owned).collect())
}

/// Builds a sibling path with a new extension.
///
/// Example:
/// `data/corpus.txt` + `"bin"` → `data/corpus.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();
	if input_path.file_stem().is_none() {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"));
	}
	Ok(input_path.with_extension(extension))
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/model.bin"` → `"model"`
/// - `"model.bin"` → `"model"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;
	Ok(stem.to_string_lossy().into_owned())
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension().is_some_and(|e| e == extension) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().into_owned());
			}
		}
	}
	files.sort();
	Ok(files)
}
