#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use po_autotranslate::model::config::Config;
use po_autotranslate::parsers::po::PoDocument;
use po_autotranslate::services::backends::{BackendError, TranslationBackend};
use po_autotranslate::services::catalog::CatalogUpdater;
use po_autotranslate::services::detect::{DetectError, LanguageDetector};
use po_autotranslate::services::store::{CatalogStore, PoFileStore, StoreError};
use po_autotranslate::services::translator::{RetryPolicy, RetryingTranslator};

pub const HEADER: &str = r#"msgid ""
msgstr ""
"Project-Id-Version: demo 1.0\n"
"MIME-Version: 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Content-Transfer-Encoding: 8bit\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"
"#;

/// What `django-admin makemessages` writes for a fresh French catalog, plus
/// a translator comment and an obsolete entry.
pub const DJANGO_CATALOG: &str = r#"# SOME DESCRIPTIVE TITLE.
# Copyright (C) YEAR THE PACKAGE'S COPYRIGHT HOLDER
# This file is distributed under the same license as the PACKAGE package.
# FIRST AUTHOR <EMAIL@ADDRESS>, YEAR.
#
#, fuzzy
msgid ""
msgstr ""
"Project-Id-Version: PACKAGE VERSION\n"
"Report-Msgid-Bugs-To: \n"
"POT-Creation-Date: 2026-10-01 12:00+0000\n"
"PO-Revision-Date: YEAR-MO-DA HO:MI+ZONE\n"
"Last-Translator: FULL NAME <EMAIL@ADDRESS>\n"
"Language-Team: LANGUAGE <LL@li.org>\n"
"Language: fr\n"
"MIME-Version: 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Content-Transfer-Encoding: 8bit\n"
"Plural-Forms: nplurals=2; plural=(n > 1);\n"
"X-Generator: Poedit 3.4\n"

# Translator note: shown on the landing page
#: shop/views.py:12
msgid "Hello"
msgstr ""

#: shop/views.py:20
#, python-format
msgid "%(count)s item"
msgid_plural "%(count)s items"
msgstr[0] ""
msgstr[1] ""

#~ msgid "Old greeting"
#~ msgstr "Ancienne salutation"
"#;

pub fn config(dir: &Path) -> Config {
    Config {
        locale_dir: dir.to_path_buf(),
        retry_delay_ms: 0,
        ..Config::default()
    }
}

/// Writes `HEADER` followed by `body` as the catalog of `locale`.
pub fn write_catalog(cfg: &Config, locale: &str, body: &str) -> PathBuf {
    write_raw_catalog(cfg, locale, &format!("{HEADER}\n{body}"))
}

/// Writes `content` as-is as the catalog of `locale`.
pub fn write_raw_catalog(cfg: &Config, locale: &str, content: &str) -> PathBuf {
    let path = cfg.catalog_path(locale);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

pub fn singular(msgid: &str, msgstr: &str) -> String {
    format!("msgid \"{msgid}\"\nmsgstr \"{msgstr}\"\n\n")
}

pub fn read_catalog(path: &Path) -> PoDocument {
    PoDocument::parse(&fs::read_to_string(path).unwrap()).unwrap()
}

/// msgstr of every singular message with this msgid, in file order.
pub fn msgstrs(path: &Path, msgid: &str) -> Vec<String> {
    read_catalog(path)
        .entries()
        .iter()
        .filter(|m| !m.is_plural() && m.msgid == msgid)
        .map(|m| m.msgstr.clone())
        .collect()
}

/// Answers from a fixed text -> language table; unknown text is undetected.
pub struct TableDetector {
    table: HashMap<String, String>,
}

impl TableDetector {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        TableDetector {
            table: pairs
                .iter()
                .map(|(t, l)| (t.to_string(), l.to_string()))
                .collect(),
        }
    }
}

impl LanguageDetector for TableDetector {
    fn best_guess(&self, text: &str) -> Result<Option<String>, DetectError> {
        if text == "explode" {
            panic!("detector blew up on purpose");
        }
        Ok(self.table.get(text).cloned())
    }

    fn ranked_guesses(&self, _text: &str) -> Result<Vec<(String, f64)>, DetectError> {
        Ok(Vec::new())
    }
}

/// Replies from a text -> translation table and counts every call.
#[derive(Clone)]
pub struct TableBackend {
    replies: Arc<HashMap<String, String>>,
    pub calls: Arc<AtomicUsize>,
}

impl TableBackend {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        TableBackend {
            replies: Arc::new(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TranslationBackend for TableBackend {
    fn name(&self) -> &str {
        "table"
    }

    fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies.get(text).cloned().ok_or(BackendError::Status {
            status: 500,
            message: format!("no reply for {text:?}"),
        })
    }
}

/// `PoFileStore` that counts saves.
#[derive(Clone, Default)]
pub struct CountingStore {
    pub saves: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CatalogStore for CountingStore {
    fn exists(&self, path: &Path) -> bool {
        PoFileStore.exists(path)
    }

    fn load(&self, path: &Path) -> Result<PoDocument, StoreError> {
        PoFileStore.load(path)
    }

    fn save(&self, catalog: &PoDocument, path: &Path) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        PoFileStore.save(catalog, path)
    }
}

pub fn updater(
    cfg: &Config,
    detector: TableDetector,
    backend: &TableBackend,
    store: &CountingStore,
) -> CatalogUpdater {
    let backends: Vec<Box<dyn TranslationBackend>> = vec![Box::new(backend.clone())];
    let translator =
        RetryingTranslator::new(backends, RetryPolicy::from_config(cfg)).with_sleep(|_| {});
    CatalogUpdater::new(Box::new(detector), translator, Box::new(store.clone()))
}
