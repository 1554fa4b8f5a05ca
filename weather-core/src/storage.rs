use std::{
    collections::HashMap,
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;

/// Key/value persistence of raw strings. Encoding is the caller's business.
pub trait KeyValueStore: Debug {
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Write `value` under `key`, replacing whatever was there.
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;

    /// Delete `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

/// Process-local storage; contents vanish with the value.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory. Writes go to a sibling temp file
/// that is renamed over the target, so readers never see a partial value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage rooted at the platform data directory.
    pub fn default_location() -> anyhow::Result<Self> {
        let dirs = crate::config::project_dirs()?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.temp_path_for(key);
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path_for(key))
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Storage chosen by the CLI: files under `dir`, or the platform default.
pub fn file_storage(dir: Option<PathBuf>) -> anyhow::Result<FileStorage> {
    match dir {
        Some(dir) => Ok(FileStorage::new(dir)),
        None => FileStorage::default_location().context("Failed to locate data directory"),
    }
}
