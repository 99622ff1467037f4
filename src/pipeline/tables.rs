//! Graph tables: load the `*.csv` files other tools drop into `graphs/`.
//!
//! Nothing in this crate writes these files. They are data series that
//! sit next to the page images (for example digitised chart values), and
//! this module only reads them back.

use crate::config::SplitConfig;
use crate::error::PdfSplitError;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One CSV file parsed as a table. The first row is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphTable {
    /// File stem, e.g. `revenue` for `revenue.csv`.
    pub name: String,
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl GraphTable {
    /// Values of the named column, if present.
    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == header)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// Load every `*.csv` in [`SplitConfig::graphs_dir`], ordered by file name.
///
/// A missing directory yields an empty list. Any malformed file fails the
/// whole call.
pub fn load_graph_tables(config: &SplitConfig) -> Result<Vec<GraphTable>, PdfSplitError> {
    let dir = config.graphs_dir();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PdfSplitError::Workspace { path: dir, source: e }),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PdfSplitError::Workspace {
            path: dir.clone(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            paths.push(path);
        }
    }
    paths.sort();

    let tables = paths
        .iter()
        .map(|p| read_table(p))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Loaded {} graph tables from {}", tables.len(), dir.display());
    Ok(tables)
}

fn read_table(path: &Path) -> Result<GraphTable, PdfSplitError> {
    let table_err = |detail: String| PdfSplitError::GraphTable {
        path: path.to_path_buf(),
        detail,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| table_err(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| table_err(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| table_err(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(GraphTable {
        name,
        path: path.to_path_buf(),
        headers,
        rows,
    })
}
