//! Printing the page to a fixed-size PDF poster.

use crate::error::{ErrorKind, Result};
use crate::page::PosterPage;
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

const MM_PER_INCH: f64 = 25.4;
/// PDF user space units (points) per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Physical page geometry handed to the browser's print pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageLayout {
    pub width_mm: f64,
    pub height_mm: f64,
    /// Applied to all four sides.
    pub margin_mm: f64,
    pub print_background: bool,
}
impl PageLayout {
    /// ISO A3 portrait, borderless, with backgrounds.
    pub const A3: Self = Self { width_mm: 297.0, height_mm: 420.0, margin_mm: 0.0, print_background: true };

    pub fn width_in(&self) -> f64 {
        self.width_mm / MM_PER_INCH
    }

    pub fn height_in(&self) -> f64 {
        self.height_mm / MM_PER_INCH
    }

    pub fn margin_in(&self) -> f64 {
        self.margin_mm / MM_PER_INCH
    }

    /// Page size in PDF points, as it appears in a `/MediaBox`.
    pub fn size_pt(&self) -> (f64, f64) {
        (self.width_in() * POINTS_PER_INCH, self.height_in() * POINTS_PER_INCH)
    }
}

/// Print `page` as an A3 poster and write it to `output`.
///
/// Parent directories are created; an existing file is overwritten in place.
#[instrument(skip_all, fields(output = %output.display()))]
pub fn export_pdf<P: PosterPage>(page: &P, output: &Path) -> Result<PathBuf> {
    let pdf = page.print_pdf(&PageLayout::A3)?;
    if pdf.is_empty() {
        exn::bail!(ErrorKind::Export("browser returned an empty document".to_string()));
    }
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).or_raise(|| ErrorKind::Write(output.to_path_buf()))?;
    }
    fs::write(output, &pdf).or_raise(|| ErrorKind::Write(output.to_path_buf()))?;
    tracing::info!(bytes = pdf.len(), "Poster written");
    Ok(output.to_path_buf())
}
