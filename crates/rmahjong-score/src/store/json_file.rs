//! データディレクトリ内の JSON ファイルへの保存

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{Store, StoreKind};
use crate::io::open_writer;

/// `<dir>/mahjong_stats.json` などに保存する
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, kind: StoreKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

impl Store for JsonFileStore {
    fn read(&self, kind: StoreKind) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_of(kind)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 一時ファイルに書いてから置き換える（書き込み途中で壊れた文書を残さない）
    fn write(&mut self, kind: StoreKind, contents: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_of(kind);
        let tmp = path.with_extension("json.tmp");
        let mut w = open_writer(&tmp)?;
        w.write_all(contents.as_bytes())?;
        w.close()?;
        fs::rename(&tmp, &path)
    }

    fn write_backup(&mut self, file_name: &str, contents: &str) -> io::Result<String> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        let mut w = open_writer(&path)?;
        w.write_all(contents.as_bytes())?;
        w.close()?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));
        assert!(store.read(StoreKind::History).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_directory_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("data"));
        store.write(StoreKind::Stats, "{}").unwrap();
        store.write(StoreKind::Stats, "{\"stats\": {}}").unwrap();
        assert_eq!(store.read(StoreKind::Stats).unwrap().as_deref(), Some("{\"stats\": {}}"));
        assert!(store.path_of(StoreKind::Stats).ends_with("mahjong_stats.json"));
        assert!(!store.dir().join("mahjong_stats.json.tmp").exists());
    }

    #[test]
    fn test_backup_location_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());
        let location = store.write_backup("mahjong_backup_test.json", "{}").unwrap();
        assert!(location.ends_with("mahjong_backup_test.json"));
        assert_eq!(fs::read_to_string(location).unwrap(), "{}");
    }
}
