use std::path::{Path, PathBuf};
use std::{fs, io};

use log::{debug, info, warn};

use crate::error::Result;
use crate::model::markov_model::MarkovModel;

/// Reads a whole text corpus into memory.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Builds the cache path of a model trained on `corpus_path` with order `n`.
///
/// Example:
/// `data/frankenstein.txt` + `5` → `data/frankenstein.5.bin`
pub fn cache_path<P: AsRef<Path>>(corpus_path: P, n: usize) -> io::Result<PathBuf> {
	let corpus_path = corpus_path.as_ref();

	let parent = corpus_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = corpus_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Corpus path has no filename"))?;

	let mut file_name = file_stem.to_os_string();
	file_name.push(format!(".{n}.bin"));
	Ok(parent.join(file_name))
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Serializes a model with `postcard`.
pub fn save_model<P: AsRef<Path>>(model: &MarkovModel, path: P) -> Result<()> {
	let bytes = postcard::to_stdvec(model)?;
	fs::write(path, bytes)?;
	Ok(())
}

/// Deserializes a model written by `save_model`.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<MarkovModel> {
	let bytes = fs::read(path)?;
	Ok(postcard::from_bytes(&bytes)?)
}

/// Loads the cached model of a corpus if present, otherwise trains and caches it.
///
/// - The cache lives next to the corpus (see `cache_path`)
/// - A cache that cannot be decoded, or was built with another `n`, is rebuilt
/// - `use_cache == false` always trains and never writes
pub fn load_or_train<P: AsRef<Path>>(corpus_path: P, n: usize, use_cache: bool) -> Result<MarkovModel> {
	let corpus_path = corpus_path.as_ref();
	let binary_path = cache_path(corpus_path, n)?;

	if use_cache && binary_path.exists() {
		match load_model(&binary_path) {
			Ok(model) if model.n() == n => {
				info!("Loaded cached model {}", binary_path.display());
				return Ok(model);
			}
			Ok(model) => warn!("Cached model {} has n = {}, expected {}; retraining", binary_path.display(), model.n(), n),
			Err(e) => warn!("Ignoring unreadable cache {}: {}", binary_path.display(), e),
		}
	}

	let corpus = read_corpus(corpus_path)?;
	debug!("Read {} bytes from {}", corpus.len(), corpus_path.display());
	let model = MarkovModel::train(&corpus, n)?;

	if use_cache {
		save_model(&model, &binary_path)?;
		info!("Cached model to {}", binary_path.display());
	}
	Ok(model)
}
