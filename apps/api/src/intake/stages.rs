//! The three text extraction engines, each behind [`ExtractionStage`].
//!
//! Stages return raw text; cleaning and threshold checks belong to the
//! extractor so every engine is judged the same way.

use std::ffi::OsStr;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::OcrConfig;
use crate::intake::cleaning::PAGE_BREAK;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Primary digital-text engine (`pdf-extract`).
    PdfExtract,
    /// Secondary digital-text engine (`lopdf`).
    Lopdf,
    /// OCR over rendered page images.
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::PdfExtract => "pdf_extract",
            ExtractionMethod::Lopdf => "lopdf",
            ExtractionMethod::Ocr => "ocr",
        }
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error("engine error: {0}")]
    Engine(String),

    #[error("engine panicked while parsing the document")]
    Panicked,

    #[error("external tool '{0}' not found")]
    ToolMissing(String),

    #[error("external tool '{tool}' failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One step of the extraction fallback chain.
pub trait ExtractionStage: Send + Sync {
    fn method(&self) -> ExtractionMethod;
    fn extract(&self, document: &[u8]) -> Result<String, StageError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 1: pdf-extract
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfExtractStage;

impl ExtractionStage for PdfExtractStage {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfExtract
    }

    fn extract(&self, document: &[u8]) -> Result<String, StageError> {
        // pdf-extract panics on some malformed inputs instead of returning Err.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(document)
        }))
        .map_err(|_| StageError::Panicked)?;

        result.map_err(|e| StageError::Engine(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 2: lopdf
// ────────────────────────────────────────────────────────────────────────────

pub struct LopdfStage;

impl ExtractionStage for LopdfStage {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Lopdf
    }

    fn extract(&self, document: &[u8]) -> Result<String, StageError> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| -> Result<String, StageError> {
            let doc = lopdf::Document::load_mem(document)
                .map_err(|e| StageError::Engine(e.to_string()))?;

            let mut pages = Vec::new();
            for page_number in doc.get_pages().keys() {
                match doc.extract_text(&[*page_number]) {
                    Ok(text) => pages.push(text),
                    Err(e) => debug!("lopdf could not read page {page_number}: {e}"),
                }
            }
            Ok(pages.join(&PAGE_BREAK.to_string()))
        }))
        .map_err(|_| StageError::Panicked)?;

        result
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 3: OCR (pdftoppm + tesseract)
// ────────────────────────────────────────────────────────────────────────────

pub struct OcrStage {
    pdftoppm_bin: String,
    tesseract_bin: String,
    dpi: u32,
}

impl OcrStage {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            pdftoppm_bin: config.pdftoppm_bin.clone(),
            tesseract_bin: config.tesseract_bin.clone(),
            dpi: config.dpi,
        }
    }

    fn render_pages(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, StageError> {
        let prefix = out_dir.join("page");
        let dpi = self.dpi.to_string();
        run_tool(
            &self.pdftoppm_bin,
            &[
                OsStr::new("-r"),
                OsStr::new(&dpi),
                OsStr::new("-png"),
                pdf_path.as_os_str(),
                prefix.as_os_str(),
            ],
        )?;

        // pdftoppm zero-pads page numbers, so lexical order is page order.
        let mut images: Vec<PathBuf> = std::fs::read_dir(out_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        images.sort();
        Ok(images)
    }
}

impl ExtractionStage for OcrStage {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Ocr
    }

    fn extract(&self, document: &[u8]) -> Result<String, StageError> {
        let work_dir = tempfile::Builder::new().prefix("credx-ocr-").tempdir()?;
        let pdf_path = work_dir.path().join("document.pdf");
        std::fs::write(&pdf_path, document)?;

        let images = self.render_pages(&pdf_path, work_dir.path())?;
        debug!("OCR rendering produced {} page image(s)", images.len());

        let mut pages = Vec::with_capacity(images.len());
        for image in &images {
            let text = run_tool(
                &self.tesseract_bin,
                &[image.as_os_str(), OsStr::new("stdout")],
            )?;
            pages.push(text);
        }
        Ok(pages.join(&PAGE_BREAK.to_string()))
    }
}

fn run_tool(bin: &str, args: &[&OsStr]) -> Result<String, StageError> {
    let output = Command::new(bin).args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StageError::ToolMissing(bin.to_string())
        } else {
            StageError::Io(e)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(StageError::ToolFailed {
            tool: bin.to_string(),
            detail: format!("{} ({})", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extract_rejects_garbage_without_panicking() {
        let result = PdfExtractStage.extract(b"definitely not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_lopdf_rejects_garbage() {
        assert!(LopdfStage.extract(b"%PDF-1.4 truncated").is_err());
    }

    #[test]
    fn test_ocr_missing_tool_is_stage_error() {
        let stage = OcrStage::new(&OcrConfig {
            enabled: true,
            pdftoppm_bin: "credx-no-such-pdftoppm".to_string(),
            tesseract_bin: "credx-no-such-tesseract".to_string(),
            dpi: 300,
        });
        match stage.extract(b"%PDF-1.4") {
            Err(StageError::ToolMissing(tool)) => assert_eq!(tool, "credx-no-such-pdftoppm"),
            other => panic!("expected ToolMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_method_labels() {
        assert_eq!(ExtractionMethod::PdfExtract.as_str(), "pdf_extract");
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::Ocr).unwrap(),
            r#""ocr""#
        );
    }
}
