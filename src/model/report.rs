use std::path::PathBuf;

/// Per-catalog counters collected while updating one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub translated: usize,
    pub skipped_same_language: usize,
    pub failed: usize,
    pub plural_skipped: usize,
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No catalog at the expected path; nothing to do for this locale.
    Missing { path: PathBuf },
    Processed(UpdateReport),
}

#[derive(Debug)]
pub struct LocaleResult {
    pub locale: String,
    pub outcome: Result<UpdateOutcome, String>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<LocaleResult>,
}

impl RunSummary {
    pub fn get(&self, locale: &str) -> Option<&LocaleResult> {
        self.results.iter().find(|r| r.locale == locale)
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_err()).count()
    }

    pub fn translated(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                Ok(UpdateOutcome::Processed(report)) => Some(report.translated),
                _ => None,
            })
            .sum()
    }
}
