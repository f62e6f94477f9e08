use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Persists downloaded bytes
#[async_trait]
pub trait FileWriter: Send + Sync {
    async fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

#[async_trait]
impl<T: FileWriter + ?Sized> FileWriter for std::sync::Arc<T> {
    async fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        (**self).write_file(path, bytes).await
    }
}

/// Writes to the local filesystem, creating parent directories as needed
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

#[async_trait]
impl FileWriter for FsWriter {
    async fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await
    }
}
