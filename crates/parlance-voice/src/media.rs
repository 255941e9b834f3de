use crate::error::VoiceError;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Filesystem-backed audio store.
///
/// Blobs are written under a root directory and referenced by public URLs
/// built from a configured base. The server exposes the root read-only
/// under `/media`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let mut base = public_base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            root: root.into(),
            public_base_url: base,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores `bytes` at `segments.../filename` under the media root and
    /// returns the public URL for the blob. Parent directories are created
    /// as needed; an existing blob at the same path is overwritten.
    pub async fn store(
        &self,
        segments: &[&str],
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, VoiceError> {
        let mut dir = self.root.clone();
        let mut url_path = String::new();
        for segment in segments {
            let clean = sanitize_segment(segment)?;
            dir.push(&clean);
            url_path.push_str(&clean);
            url_path.push('/');
        }
        let clean_name = sanitize_segment(filename)?;
        url_path.push_str(&clean_name);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| VoiceError::Storage(format!("failed to create {}: {e}", dir.display())))?;

        let path = dir.join(&clean_name);
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| VoiceError::Storage(format!("failed to create {}: {e}", path.display())))?;
        file.write_all(bytes)
            .await
            .map_err(|e| VoiceError::Storage(format!("failed to write {}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| VoiceError::Storage(format!("failed to flush {}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "stored media blob");

        Ok(format!("{}/media/{}", self.public_base_url, url_path))
    }
}

/// Rejects path components that could escape the media root. Identifiers
/// come from the database (UUIDs, guest ids, row ids) so anything else is
/// a bug upstream, not user input to be cleaned up.
fn sanitize_segment(segment: &str) -> Result<String, VoiceError> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(VoiceError::Storage(format!(
            "invalid media path segment: {segment:?}"
        )));
    }
    if segment.contains('/') || segment.contains('\\') || segment.contains('\0') {
        return Err(VoiceError::Storage(format!(
            "invalid media path segment: {segment:?}"
        )));
    }
    Ok(segment.to_string())
}
