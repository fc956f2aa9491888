//! Recursive directory upload for audio libraries

use crate::{GatewayClient, PutRequest, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extensions picked up by [`upload_directory`]
pub const UPLOAD_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "cue"];

/// Content type for an uploaded file, by extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("cue") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn is_uploadable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| UPLOAD_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Object key for `path` below `root`, `/`-separated under `prefix`
pub fn key_for(root: &Path, path: &Path, prefix: &str) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    let prefix = prefix.trim_matches('/');

    Some(if prefix.is_empty() {
        parts.join("/")
    } else {
        format!("{}/{}", prefix, parts.join("/"))
    })
}

/// One successfully uploaded file
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub key: String,
    pub size: u64,
}

/// Result of a directory upload
#[derive(Debug, Default)]
pub struct UploadSummary {
    pub uploaded: Vec<UploadedFile>,
    /// Files that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl UploadSummary {
    pub fn total_bytes(&self) -> u64 {
        self.uploaded.iter().map(|f| f.size).sum()
    }
}

/// Collect uploadable files below `root`, sorted
async fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_uploadable(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Upload every audio/cue file below `root` to `<prefix>/<relative path>`.
///
/// Individual failures are recorded in the summary and do not stop the run.
pub async fn upload_directory(
    client: &GatewayClient,
    root: &Path,
    prefix: &str,
) -> Result<UploadSummary> {
    let files = collect_files(root).await?;
    let mut summary = UploadSummary::default();

    for path in files {
        let Some(key) = key_for(root, &path, prefix) else {
            warn!(path = %path.display(), "Skipping file with non UTF-8 path");
            summary.failed.push((path, "non UTF-8 path".to_string()));
            continue;
        };

        let request = PutRequest::default().with_content_type(content_type_for(&path));
        match client.put_file(&key, &path, request).await {
            Ok(size) => {
                info!(key = %key, size, "Uploaded");
                summary.uploaded.push(UploadedFile { path, key, size });
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Upload failed");
                summary.failed.push((path, e.to_string()));
            }
        }
    }

    Ok(summary)
}
