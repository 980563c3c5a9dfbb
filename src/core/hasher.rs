//! SHA-256 file hashing.
//!
//! The reputation service indexes files by their SHA-256 digest, so that is
//! the only algorithm computed here. Digests are returned as lower-case hex.

use crate::core::error::LookupError;
use crate::core::input::FileInput;

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Streams file contents through SHA-256.
///
/// # Examples
///
/// ```rust
/// use vtlookup::core::FileHasher;
///
/// let hasher = FileHasher::new();
/// let digest = hasher.hash_bytes(b"hello world");
/// assert_eq!(digest.len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct FileHasher {
    /// Read buffer size used when streaming files.
    buffer_size: usize,
}

impl Default for FileHasher {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl FileHasher {
    /// Creates a new `FileHasher` with a 64 KiB read buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the digest of in-memory bytes.
    pub fn hash_bytes(&self, data: &[u8]) -> String {
        format!("{:x}", Sha256::digest(data))
    }

    /// Asynchronously computes the digest of a file on disk.
    ///
    /// The file handle lives only for the duration of this call and is
    /// closed on every return path.
    pub async fn hash_file_async(&self, path: &Path) -> Result<String, LookupError> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| open_error(path, e))?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            let n = file.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Asynchronously computes the digest of a `FileInput`.
    pub async fn hash_input_async(&self, input: &FileInput) -> Result<String, LookupError> {
        match input {
            FileInput::Path(path) => self.hash_file_async(path).await,
            FileInput::Bytes { data, .. } => Ok(self.hash_bytes(data)),
        }
    }
}

fn open_error(path: &Path, e: std::io::Error) -> LookupError {
    if e.kind() == std::io::ErrorKind::NotFound {
        LookupError::FileNotFound {
            path: path.display().to_string(),
        }
    } else {
        LookupError::Io(e)
    }
}
