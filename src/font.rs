//! Font discovery and registration for the text rasterizer.
//!
//! plotters draws text through ab_glyph, which only knows fonts that were
//! registered by name. Every figure uses the `sans-serif` family, so one
//! TrueType file is registered under that name before anything is drawn.

use crate::error::FigureError;
use anyhow::Result;
use plotters::style::FontStyle;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Family name all charts request
pub const FAMILY: &str = "sans-serif";

/// Common locations of a sans-serif TrueType font
const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Path of the font registered so far, if any
static REGISTERED: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Find a usable font file.
///
/// An explicit path wins and must exist; otherwise the first existing
/// candidate is returned.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, FigureError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(FigureError::FontNotFound {
            searched: vec![path.to_path_buf()],
        });
    }

    CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| FigureError::FontNotFound {
            searched: CANDIDATES.iter().map(PathBuf::from).collect(),
        })
}

/// Locate a font and register it as the `sans-serif` family.
///
/// Only the first call registers anything; later calls return the font that
/// is already in use.
pub fn ensure_registered(explicit: Option<&Path>) -> Result<PathBuf> {
    let mut registered = REGISTERED
        .lock()
        .map_err(|_| anyhow::anyhow!("Font registry lock poisoned"))?;
    if let Some(path) = registered.as_ref() {
        debug!(font = %path.display(), "Font already registered");
        return Ok(path.clone());
    }

    let path = locate(explicit)?;
    let bytes = std::fs::read(&path).map_err(|source| FigureError::FontRead {
        path: path.clone(),
        source,
    })?;
    // The rasterizer keeps a reference for the rest of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| FigureError::InvalidFont { path: path.clone() })?;

    *registered = Some(path.clone());
    Ok(path)
}
