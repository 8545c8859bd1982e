use lingua::LanguageDetectorBuilder;
use thiserror::Error;
use tracing::debug;

use crate::model::locale;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("cannot detect the language of empty text")]
    EmptyText,

    #[error("language detector failed: {0}")]
    Detector(String),
}

/// General-purpose language detector returning ISO 639-1 codes.
pub trait LanguageDetector: Send + Sync {
    /// Single most likely language, if the detector commits to one.
    fn best_guess(&self, text: &str) -> Result<Option<String>, DetectError>;

    /// All candidate languages with their probabilities, in any order.
    fn ranked_guesses(&self, text: &str) -> Result<Vec<(String, f64)>, DetectError>;
}

/// Detector backed by `lingua`, built over every language it knows.
pub struct LinguaDetector {
    inner: lingua::LanguageDetector,
}

impl LinguaDetector {
    pub fn new() -> Self {
        LinguaDetector {
            inner: LanguageDetectorBuilder::from_all_languages().build(),
        }
    }
}

impl Default for LinguaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector for LinguaDetector {
    fn best_guess(&self, text: &str) -> Result<Option<String>, DetectError> {
        if text.trim().is_empty() {
            return Err(DetectError::EmptyText);
        }

        Ok(self
            .inner
            .detect_language_of(text)
            .map(|lang| lang.iso_code_639_1().to_string()))
    }

    fn ranked_guesses(&self, text: &str) -> Result<Vec<(String, f64)>, DetectError> {
        if text.trim().is_empty() {
            return Err(DetectError::EmptyText);
        }

        Ok(self
            .inner
            .compute_language_confidence_values(text)
            .into_iter()
            .map(|(lang, confidence)| (lang.iso_code_639_1().to_string(), confidence))
            .collect())
    }
}

/// Picks the source language of `text` among `acceptable` locales.
///
/// The detector's best guess wins when acceptable; otherwise the most probable
/// acceptable candidate. Any failure, or no acceptable candidate at all, yields
/// `default`.
pub fn detect_source_language(
    detector: &dyn LanguageDetector,
    text: &str,
    acceptable: &[String],
    default: &str,
) -> String {
    match constrained_guess(detector, text, acceptable) {
        Ok(Some(code)) => code,
        Ok(None) => {
            debug!(default, "no acceptable language guess, using default");
            default.to_string()
        }
        Err(err) => {
            debug!(default, error = %err, "language detection failed, using default");
            default.to_string()
        }
    }
}

fn constrained_guess(
    detector: &dyn LanguageDetector,
    text: &str,
    acceptable: &[String],
) -> Result<Option<String>, DetectError> {
    if let Some(best) = detector.best_guess(text)? {
        if let Some(found) = locale::match_locale(&best, acceptable) {
            return Ok(Some(found.to_string()));
        }
    }

    let mut ranked = detector.ranked_guesses(text)?;
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(ranked
        .iter()
        .find_map(|(code, _)| locale::match_locale(code, acceptable))
        .map(str::to_string))
}
