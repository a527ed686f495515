use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::model::markov_model::MarkovModel;

/// One CSV row: `source,target,probability`.
#[derive(Serialize)]
struct EdgeRecord {
	source: String,
	target: String,
	probability: f64,
}

/// Writes every edge of the model graph as CSV.
///
/// The header is `source,target,probability`; n-grams are written as their
/// tokens separated by single spaces. Rows follow the first-seen order of
/// sources and destinations.
pub fn write_edges_csv<W: Write>(model: &MarkovModel, writer: W) -> Result<W> {
	let mut csv_writer = csv::Writer::from_writer(writer);
	for (source, transition) in model.graph().edges() {
		csv_writer.serialize(EdgeRecord {
			source: model.render(source),
			target: model.render(&transition.target),
			probability: transition.probability,
		})?;
	}
	csv_writer.flush()?;
	let writer = csv_writer.into_inner().map_err(|e| e.into_error())?;
	Ok(writer)
}

/// Renders the edge CSV into a string.
pub fn edges_csv_string(model: &MarkovModel) -> Result<String> {
	let bytes = write_edges_csv(model, Vec::new())?;
	// Tokens come from a `&str` corpus, so the output is always valid UTF-8
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes the edge CSV to a file, replacing it if present.
pub fn export_edges<P: AsRef<Path>>(model: &MarkovModel, path: P) -> Result<()> {
	let file = File::create(path)?;
	write_edges_csv(model, file)?.sync_all()?;
	Ok(())
}
