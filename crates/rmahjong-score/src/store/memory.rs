//! メモリ上の保存先（テスト・組み込み用）

use std::collections::HashMap;
use std::io;

use super::{Store, StoreKind};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: HashMap<StoreKind, String>,
    backups: Vec<(String, String)>,
    fail_writes: bool,
}

impl MemoryStore {
    /// 以後の書き込みを失敗させる（書き込み権限がない状態の再現）
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn document(&self, kind: StoreKind) -> Option<&str> {
        self.docs.get(&kind).map(String::as_str)
    }

    pub fn backups(&self) -> &[(String, String)] {
        &self.backups
    }

    fn check_writable(&self) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only store"));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn read(&self, kind: StoreKind) -> io::Result<Option<String>> {
        Ok(self.docs.get(&kind).cloned())
    }

    fn write(&mut self, kind: StoreKind, contents: &str) -> io::Result<()> {
        self.check_writable()?;
        self.docs.insert(kind, contents.to_string());
        Ok(())
    }

    fn write_backup(&mut self, file_name: &str, contents: &str) -> io::Result<String> {
        self.check_writable()?;
        self.backups.push((file_name.to_string(), contents.to_string()));
        Ok(format!("memory:{file_name}"))
    }
}
