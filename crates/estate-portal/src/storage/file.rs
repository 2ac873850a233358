//! File-system [`KeyValueStore`]: one `<key>.json` file per key under a base
//! directory. Writes go to a temporary sibling and are renamed into place, so a
//! reader sees either the previous blob or the new one.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::kv::{KeyValueStore, StoreError};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileKv {
    base: PathBuf,
}

impl FileKv {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base.join(format!("{key}.{EXTENSION}")))
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.base)?;
        let staging = self.base.join(format!(".{key}.{EXTENSION}.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.base) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_lists_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileKv::new(dir.path().join("state"));

        assert_eq!(store.list().expect("list on missing dir"), Vec::<String>::new());
        assert!(store.get("ui_preferences").expect("get").is_none());

        store.set("ui_preferences", r#"{"sidebarCollapsed":true}"#).expect("set");
        store.set("notification_read_states", "{}").expect("set");

        assert_eq!(
            store.get("ui_preferences").expect("get").as_deref(),
            Some(r#"{"sidebarCollapsed":true}"#)
        );
        assert_eq!(
            store.list().expect("list"),
            vec!["notification_read_states".to_string(), "ui_preferences".to_string()]
        );

        store.delete("ui_preferences").expect("delete");
        store.delete("ui_preferences").expect("second delete is a no-op");
        assert_eq!(store.list().expect("list"), vec!["notification_read_states".to_string()]);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileKv::new(dir.path());
        for key in ["../escape", "a/b", "", ".hidden"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StoreError::InvalidKey(_))
            ));
        }
    }
}
