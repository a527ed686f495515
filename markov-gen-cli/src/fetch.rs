//! Corpus download from Gutendex, the JSON catalogue of Project Gutenberg.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

pub const GUTENDEX_URL: &str = "https://gutendex.com/books";

/// Plain-text formats, in order of preference.
const TEXT_FORMATS: [&str; 2] = ["text/plain; charset=us-ascii", "text/plain; charset=utf-8"];

/// One page of the catalogue.
#[derive(Deserialize, Debug)]
struct BookList {
    #[serde(default)]
    results: Vec<Book>,
}

#[derive(Deserialize, Debug)]
pub struct Book {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<Author>,
    /// MIME type → download URL
    #[serde(default)]
    pub formats: HashMap<String, String>,
}

#[derive(Deserialize, Debug)]
pub struct Author {
    pub name: String,
}

impl Book {
    pub fn author(&self) -> &str {
        self.authors.first().map_or("Unknown Author", |author| author.name.as_str())
    }

    pub fn text_url(&self) -> Option<&str> {
        TEXT_FORMATS.iter().find_map(|format| self.formats.get(*format)).map(String::as_str)
    }
}

/// Catalogue filters.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub author_year_start: i32,
    pub language: String,
}

pub fn parse_books(body: &str) -> serde_json::Result<Vec<Book>> {
    Ok(serde_json::from_str::<BookList>(body)?.results)
}

/// Writes every book that has a plain-text version, each preceded by its
/// title and author and followed by a blank line.
///
/// `download` fetches the text behind a URL; a failed download is logged
/// and the book skipped. Returns the number of books written.
pub fn write_corpus<W, F, E>(writer: &mut W, books: &[Book], mut download: F) -> io::Result<usize>
where
    W: Write,
    F: FnMut(&str) -> Result<String, E>,
    E: Display,
{
    let mut written = 0;
    for (index, book) in books.iter().enumerate() {
        info!("{}. Title: {}, Author: {}", index + 1, book.title, book.author());
        let Some(url) = book.text_url() else {
            continue;
        };
        match download(url) {
            Ok(text) => {
                writeln!(writer, "Title: {}", book.title)?;
                writeln!(writer, "Author: {}", book.author())?;
                writer.write_all(text.as_bytes())?;
                writer.write_all(b"\n\n")?;
                written += 1;
            }
            Err(e) => warn!("Failed to download book: {} ({e})", book.title),
        }
    }
    Ok(written)
}

/// Queries the catalogue and writes the matching books to `output`.
pub fn fetch_corpus(client: &Client, query: &CatalogQuery, output: &Path) -> Result<usize, Box<dyn Error>> {
    let body = client
        .get(GUTENDEX_URL)
        .query(&[("author_year_start", query.author_year_start.to_string()), ("languages", query.language.clone())])
        .send()?
        .error_for_status()?
        .text()?;
    let books = parse_books(&body)?;

    let mut writer = BufWriter::new(File::create(output)?);
    let written = write_corpus(&mut writer, &books, |url| {
        client.get(url).send().and_then(|response| response.error_for_status()).and_then(|response| response.text())
    })?;
    writer.flush()?;

    info!("Downloaded {} of {} books into {}", written, books.len(), output.display());
    Ok(written)
}
