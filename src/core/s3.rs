//! Recursive S3 prefix download.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::arn::parse_s3_uri;
use crate::aws::S3;
use crate::error::{Error, Result};
use crate::io;

/// Keys are only written beneath the download directory.
fn stays_inside(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Download every object under `uri` into `local_dir`, keeping the key
/// layout relative to the prefix. Returns the written paths.
pub fn download_prefix(s3: &dyn S3, uri: &str, local_dir: &Path) -> Result<Vec<PathBuf>> {
    let (bucket, prefix) = parse_s3_uri(uri)?;

    fs::create_dir_all(local_dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", local_dir.display())))
    })?;

    let mut written = Vec::new();
    for key in s3.list_keys(&bucket, &prefix)? {
        if key.ends_with('/') {
            continue;
        }
        let relative = key
            .strip_prefix(prefix.as_str())
            .unwrap_or(&key)
            .trim_start_matches('/');
        if relative.is_empty() {
            continue;
        }
        if !stays_inside(relative) {
            return Err(Error::validation_invalid_argument(
                "key",
                format!("Object key {} escapes the download directory", key),
                Some(key.clone()),
                None,
            ));
        }

        let target = local_dir.join(relative);
        let content = s3.get_object(&bucket, &key)?;
        io::write_bytes(&target, &content, &format!("write {}", target.display()))?;
        log_status!("s3", "Downloaded {} to {}", key, target.display());
        written.push(target);
    }
    Ok(written)
}
