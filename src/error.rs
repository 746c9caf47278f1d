//! Error types for figure generation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("No TrueType font found (searched: {}). Pass one with --font", display_paths(.searched))]
    FontNotFound { searched: Vec<PathBuf> },

    #[error("Failed to read font file: {}", .path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a usable TrueType font: {}", .path.display())]
    InvalidFont { path: PathBuf },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
