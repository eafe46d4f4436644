//! 会话持久化存储

use clinic_core::{ClinicError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 键值形式的持久化存储
pub trait SessionStorage: Send + Sync {
    /// 读取键对应的内容，不存在时返回 `None`
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// 覆盖写入键对应的内容
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// 基于本地文件的存储，每个键对应目录下的一个 JSON 文件
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    base_path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.base_path)?;

        // 先写临时文件再重命名，避免进程中断留下半个文件
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let written = std::fs::write(&tmp, value).and_then(|_| std::fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// 内存存储，克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入原始内容，不经过会话序列化
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ClinicError::Storage("session storage lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| ClinicError::Storage("session storage lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ClinicError::Storage("session storage lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!("clinic-session-{}", uuid::Uuid::new_v4()));
        let storage = FileSessionStorage::new(&dir);

        assert_eq!(storage.load("auth-storage").unwrap(), None);

        storage.save("auth-storage", r#"{"isLoggedIn":false}"#).unwrap();
        assert_eq!(
            storage.load("auth-storage").unwrap().as_deref(),
            Some(r#"{"isLoggedIn":false}"#)
        );
        assert!(storage.path_for("auth-storage").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_memory_storage_is_shared_between_clones() {
        let storage = MemorySessionStorage::new();
        let handle = storage.clone();

        storage.save("auth-storage", "{}").unwrap();
        assert_eq!(handle.load("auth-storage").unwrap().as_deref(), Some("{}"));
        assert_eq!(handle.load("other").unwrap(), None);
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = std::env::temp_dir().join(format!("clinic-session-{}", uuid::Uuid::new_v4()));
        let storage = FileSessionStorage::new(&dir);

        // 目标位置已是非空目录，rename 必然失败
        let target = storage.path_for("auth-storage");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        assert!(storage.save("auth-storage", "{}").is_err());
        assert!(!target.with_extension("json.tmp").exists());
        assert!(target.is_dir());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_poisoned_memory_storage_reports_error() {
        let storage = MemorySessionStorage::new();
        let handle = storage.clone();
        let _ = std::thread::spawn(move || {
            let _guard = handle.entries.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(storage.insert_raw("auth-storage", "{}"), Err(ClinicError::Storage(_))));
        assert!(matches!(storage.save("auth-storage", "{}"), Err(ClinicError::Storage(_))));
        assert!(matches!(storage.load("auth-storage"), Err(ClinicError::Storage(_))));
    }
}
