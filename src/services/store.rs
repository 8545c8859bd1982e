use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parsers::po::{PoDocument, PoError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to parse catalog {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: PoError,
    },

    #[error("catalog io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where catalogs are read from and written back to.
pub trait CatalogStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn load(&self, path: &Path) -> Result<PoDocument, StoreError>;

    fn save(&self, catalog: &PoDocument, path: &Path) -> Result<(), StoreError>;
}

/// `.po` files on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct PoFileStore;

impl CatalogStore for PoFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> Result<PoDocument, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        PoDocument::parse(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self, catalog: &PoDocument, path: &Path) -> Result<(), StoreError> {
        let tmp = tmp_path(path);

        if let Some(parent) = tmp.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if let Err(source) = fs::write(&tmp, catalog.render()) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Io { path: tmp, source });
        }

        fs::rename(&tmp, path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "catalog.po".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_sits_next_to_target() {
        assert_eq!(
            tmp_path(Path::new("locale/fr/LC_MESSAGES/django.po")),
            PathBuf::from("locale/fr/LC_MESSAGES/django.po.tmp")
        );
    }

    #[test]
    fn missing_file_is_not_a_catalog() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!PoFileStore.exists(&dir.path().join("django.po")));
        // a directory named like a catalog does not count either
        let fake = dir.path().join("messages.po");
        fs::create_dir(&fake).unwrap();
        assert!(!PoFileStore.exists(&fake));
    }

    #[test]
    fn save_replaces_file_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr/LC_MESSAGES/django.po");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "# keep me\nmsgid \"Hi\"\nmsgstr \"\"\n").unwrap();

        let mut doc = PoFileStore.load(&path).unwrap();
        doc.set_msgstr(0, "Salut");
        PoFileStore.save(&doc, &path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# keep me\nmsgid \"Hi\"\nmsgstr \"Salut\"\n"
        );
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn syntax_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("django.po");
        fs::write(&path, "msgid \"Hi\"\ngarbage\n").unwrap();

        let err = PoFileStore.load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.to_string().contains("django.po"), "{err}");
        assert!(err.to_string().contains("line 2"), "{err}");
    }
}
