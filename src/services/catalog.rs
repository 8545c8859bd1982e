use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::config::Config;
use crate::model::locale;
use crate::model::report::{UpdateOutcome, UpdateReport};
use crate::services::backends::{self, BackendError};
use crate::services::detect::{self, LanguageDetector, LinguaDetector};
use crate::services::store::{CatalogStore, PoFileStore, StoreError};
use crate::services::translator::{RetryPolicy, RetryingTranslator};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fills the empty `msgstr` entries of one locale's catalog.
pub struct CatalogUpdater {
    detector: Box<dyn LanguageDetector>,
    translator: RetryingTranslator,
    store: Box<dyn CatalogStore>,
}

impl CatalogUpdater {
    pub fn new(
        detector: Box<dyn LanguageDetector>,
        translator: RetryingTranslator,
        store: Box<dyn CatalogStore>,
    ) -> Self {
        CatalogUpdater {
            detector,
            translator,
            store,
        }
    }

    /// Production wiring: `lingua` detection, Google backends, `.po` files on disk.
    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        let backends = backends::default_backends(config.request_timeout())?;
        let translator = RetryingTranslator::new(backends, RetryPolicy::from_config(config));

        Ok(Self::new(
            Box::new(LinguaDetector::new()),
            translator,
            Box::new(PoFileStore),
        ))
    }

    pub fn update_locale(&self, config: &Config, target: &str) -> Result<UpdateOutcome, UpdateError> {
        let path = config.catalog_path(target);

        if !self.store.exists(&path) {
            warn!(path = %path.display(), "catalog not found");
            return Ok(UpdateOutcome::Missing { path });
        }

        let mut catalog = self.store.load(&path)?;
        let mut report = UpdateReport::default();

        // Same msgid under different msgctxt is only sent once per run.
        let mut memo: HashMap<(String, String), String> = HashMap::new();

        for index in 0..catalog.entries().len() {
            let message = &catalog.entries()[index];
            if message.is_plural() {
                report.plural_skipped += 1;
                continue;
            }

            if !message.msgstr.is_empty() || message.msgid.is_empty() {
                continue;
            }

            let msgid = message.msgid.clone();
            let source = detect::detect_source_language(
                self.detector.as_ref(),
                &msgid,
                &config.target_locales,
                &config.default_language,
            );

            if source == target {
                debug!(msgid = %preview(&msgid, config.preview_chars), "source already in target language");
                report.skipped_same_language += 1;
                continue;
            }

            let key = (msgid.clone(), source.clone());
            let translated = match memo.get(&key) {
                Some(hit) => Some(hit.clone()),
                None => {
                    let fresh = self.translator.translate(
                        &msgid,
                        &locale::service_code(&source),
                        &locale::service_code(target),
                    );
                    if let Some(text) = &fresh {
                        memo.insert(key, text.clone());
                    }
                    fresh
                }
            };

            let Some(text) = translated else {
                report.failed += 1;
                continue;
            };

            catalog.set_msgstr(index, &text);
            report.translated += 1;

            info!(
                "[{source}→{target}] {} → {}",
                preview(&msgid, config.preview_chars),
                preview(&text, config.preview_chars)
            );
        }

        if report.translated > 0 {
            self.store.save(&catalog, &path)?;
            report.saved = true;
            info!(path = %path.display(), translated = report.translated, "catalog saved with new translations");
        }

        Ok(UpdateOutcome::Processed(report))
    }
}

/// First `max_chars` characters of `text`, with `...` when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_on_char_boundaries() {
        assert_eq!(preview("Hello", 50), "Hello");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("éèêëē", 2), "éè...");
        assert_eq!(preview("", 5), "");
    }
}
