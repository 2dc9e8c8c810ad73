//! CSV import of normalized postings for batch scoring.
//!
//! Expected headers: `title`, `company`, and optionally `location` and `description`.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::engine::JobPosting;

#[derive(Debug)]
pub enum PostingImportError {
    Open { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
}

impl fmt::Display for PostingImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostingImportError::Open { path, source } => {
                write!(f, "could not open postings file {}: {}", path.display(), source)
            }
            PostingImportError::Csv(err) => write!(f, "invalid postings CSV: {}", err),
        }
    }
}

impl std::error::Error for PostingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PostingImportError::Open { source, .. } => Some(source),
            PostingImportError::Csv(err) => Some(err),
        }
    }
}

impl From<csv::Error> for PostingImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct PostingRow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    company: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    description: Option<String>,
}

pub fn read_postings<R: Read>(reader: R) -> Result<Vec<JobPosting>, PostingImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut postings = Vec::new();

    for (index, row) in csv_reader.deserialize::<PostingRow>().enumerate() {
        let row = row?;
        if row.title.is_empty() && row.company.is_empty() {
            debug!(row = index + 1, "skipping blank posting row");
            continue;
        }

        postings.push(JobPosting {
            title: row.title,
            company: row.company,
            location: row.location,
            description: row.description,
        });
    }

    Ok(postings)
}

pub fn read_postings_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<JobPosting>, PostingImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PostingImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_postings(file)
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}
