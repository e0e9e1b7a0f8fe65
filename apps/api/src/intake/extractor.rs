//! TextExtractor: staged fallback from digital text to OCR.
//!
//! Each stage runs only when every earlier stage failed or produced fewer than
//! `stage_threshold` characters after cleaning. When no stage clears the
//! threshold, the longest cleaned output is used as long as it clears
//! `absolute_min`; otherwise extraction fails and no partial text escapes.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::OcrConfig;
use crate::intake::cleaning::clean_text;
use crate::intake::stages::{
    ExtractionMethod, ExtractionStage, LopdfStage, OcrStage, PdfExtractStage,
};

/// A stage result shorter than this triggers the next stage.
pub const STAGE_THRESHOLD_CHARS: usize = 200;
/// Below this, even the best stage output is unusable.
pub const ABSOLUTE_MIN_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageAttempt {
    pub method: ExtractionMethod,
    pub chars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
    pub attempts: Vec<StageAttempt>,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("no extraction stage produced usable text (best result: {best_chars} chars)")]
    NoUsableText {
        best_chars: usize,
        attempts: Vec<StageAttempt>,
    },
}

pub struct TextExtractor {
    stages: Vec<Box<dyn ExtractionStage>>,
    stage_threshold: usize,
    absolute_min: usize,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::from_config(&OcrConfig::default())
    }
}

impl TextExtractor {
    pub fn new(stages: Vec<Box<dyn ExtractionStage>>) -> Self {
        Self {
            stages,
            stage_threshold: STAGE_THRESHOLD_CHARS,
            absolute_min: ABSOLUTE_MIN_CHARS,
        }
    }

    /// The standard chain: pdf-extract, then lopdf, then OCR when enabled.
    pub fn from_config(ocr: &OcrConfig) -> Self {
        let mut stages: Vec<Box<dyn ExtractionStage>> =
            vec![Box::new(PdfExtractStage), Box::new(LopdfStage)];
        if ocr.enabled {
            stages.push(Box::new(OcrStage::new(ocr)));
        }
        Self::new(stages)
    }

    pub fn methods(&self) -> Vec<ExtractionMethod> {
        self.stages.iter().map(|s| s.method()).collect()
    }

    pub fn extract(&self, document: &[u8]) -> Result<ExtractedText, ExtractionError> {
        if document.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let mut attempts = Vec::with_capacity(self.stages.len());
        let mut best: Option<(String, ExtractionMethod)> = None;

        for stage in &self.stages {
            let method = stage.method();
            let cleaned = match stage.extract(document) {
                Ok(raw) => clean_text(&raw),
                Err(e) => {
                    warn!("Extraction stage {} failed: {e}", method.as_str());
                    attempts.push(StageAttempt {
                        method,
                        chars: 0,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            let chars = cleaned.chars().count();
            debug!("Extraction stage {} produced {chars} chars", method.as_str());
            attempts.push(StageAttempt {
                method,
                chars,
                error: None,
            });

            if chars >= self.stage_threshold {
                info!("Text extracted via {} ({chars} chars)", method.as_str());
                return Ok(ExtractedText {
                    text: cleaned,
                    method,
                    attempts,
                });
            }

            let is_better = best
                .as_ref()
                .map_or(true, |(text, _)| chars > text.chars().count());
            if is_better {
                best = Some((cleaned, method));
            }
        }

        match best {
            Some((text, method)) if text.chars().count() >= self.absolute_min => {
                info!(
                    "No stage reached {} chars; using best result from {}",
                    self.stage_threshold,
                    method.as_str()
                );
                Ok(ExtractedText {
                    text,
                    method,
                    attempts,
                })
            }
            best => Err(ExtractionError::NoUsableText {
                best_chars: best.map_or(0, |(text, _)| text.chars().count()),
                attempts,
            }),
        }
    }
}
