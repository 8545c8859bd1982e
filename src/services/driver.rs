use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::{error, info, info_span};

use crate::model::config::Config;
use crate::model::report::{LocaleResult, RunSummary, UpdateOutcome};
use crate::services::catalog::CatalogUpdater;

/// Updates every configured locale on a bounded worker pool.
///
/// A failing or panicking locale is logged and recorded; the others still run.
/// Results arrive in completion order.
pub fn run(config: &Config, updater: &CatalogUpdater) -> Result<RunSummary, ThreadPoolBuildError> {
    info!(locales = ?config.target_locales, "translation run started");

    let pool = ThreadPoolBuilder::new()
        .num_threads(worker_count(config.target_locales.len()))
        .thread_name(|i| format!("catalog-worker-{i}"))
        .build()?;

    let mut summary = RunSummary::default();
    let (tx, rx) = mpsc::channel::<LocaleResult>();

    pool.in_place_scope(|scope| {
        for locale in &config.target_locales {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let outcome = run_locale(config, updater, locale);
                // rx is drained below until every sender is gone
                let _ = tx.send(LocaleResult {
                    locale: locale.clone(),
                    outcome,
                });
            });
        }
        drop(tx);

        for result in rx {
            log_result(&result);
            summary.results.push(result);
        }
    });

    info!(
        locales = summary.results.len(),
        failed = summary.failed(),
        translated = summary.translated(),
        "translation run finished"
    );
    Ok(summary)
}

fn worker_count(tasks: usize) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    available.min(tasks).max(1)
}

fn run_locale(config: &Config, updater: &CatalogUpdater, locale: &str) -> Result<UpdateOutcome, String> {
    let span = info_span!("locale", locale = %locale);
    let _enter = span.enter();

    match panic::catch_unwind(AssertUnwindSafe(|| updater.update_locale(config, locale))) {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(format!("worker panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

fn log_result(result: &LocaleResult) {
    match &result.outcome {
        Ok(UpdateOutcome::Missing { path }) => {
            info!(locale = %result.locale, path = %path.display(), "no catalog, nothing to do");
        }
        Ok(UpdateOutcome::Processed(report)) => {
            info!(
                locale = %result.locale,
                translated = report.translated,
                same_language = report.skipped_same_language,
                failed = report.failed,
                plural_skipped = report.plural_skipped,
                saved = report.saved,
                "locale processed"
            );
        }
        Err(err) => {
            error!(locale = %result.locale, error = %err, "failed to process locale");
        }
    }
}
