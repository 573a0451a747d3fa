use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::path::PathBuf;

/// 以本機目錄為根的儲存
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn list_files(&self, extension: &str) -> Result<Vec<String>> {
        if !self.base_path.is_dir() {
            return Err(EtlError::DataSourceError {
                path: self.base_path.display().to_string(),
                message: "Data folder not found".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false);

            if matches {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                } else {
                    tracing::warn!("Skipping file with non UTF-8 name: {}", path.display());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn location(&self) -> String {
        self.base_path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Science.csv"), "timestamp,kwh\n").unwrap();
        fs::write(dir.path().join("admin.CSV"), "timestamp,kwh\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let storage = LocalStorage::new(dir.path());
        let files = tokio_test::block_on(storage.list_files("csv")).unwrap();

        assert_eq!(files, vec!["Science.csv".to_string(), "admin.CSV".to_string()]);
    }

    #[test]
    fn test_list_files_missing_directory() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("does-not-exist"));

        let err = tokio_test::block_on(storage.list_files("csv")).unwrap_err();
        assert!(matches!(err, EtlError::DataSourceError { .. }));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("output"));

        tokio_test::block_on(storage.write_file("summary.txt", b"hello")).unwrap();
        let data = tokio_test::block_on(storage.read_file("summary.txt")).unwrap();

        assert_eq!(data, b"hello");
    }
}
