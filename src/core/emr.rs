//! EMR Studio workspace notebooks into the project repository.

use std::path::Path;

use serde::Serialize;

use crate::aws::{CodeCommit, EmrWorkspaces, PutFile, S3};
use crate::error::{Error, Result};
use crate::io;
use crate::repo::{self, CommitResult};
use crate::s3::download_prefix;

/// Paths containing this marker are never uploaded; committing git metadata
/// breaks later pulls of the repository.
const GIT_MARKER: &str = ".git";

pub fn repository_prefix(studio_id: &str, workspace_id: &str) -> String {
    format!("emr_notebooks/{}/{}", studio_id, workspace_id)
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedFiles {
    #[serde(skip)]
    pub files: Vec<PutFile>,
    pub uploaded: Vec<String>,
    pub ignored: Vec<String>,
}

pub fn require_local_folder(local_folder: &Path) -> Result<()> {
    if local_folder.exists() {
        return Ok(());
    }
    Err(Error::validation_invalid_argument(
        "local_path",
        format!("Local folder {} does not exist", local_folder.display()),
        Some(local_folder.display().to_string()),
        None,
    ))
}

/// Every file under `local_folder`, mapped to its repository path.
pub fn collect_notebook_files(
    local_folder: &Path,
    studio_id: &str,
    workspace_id: &str,
) -> Result<CollectedFiles> {
    require_local_folder(local_folder)?;

    let prefix = repository_prefix(studio_id, workspace_id);
    let mut collected = CollectedFiles::default();

    for entry in walkdir::WalkDir::new(local_folder).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("walk {}", local_folder.display())))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(local_folder)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if relative.contains(GIT_MARKER) {
            log_status!("emr", "Ignoring {}", entry.path().display());
            collected.ignored.push(relative);
            continue;
        }

        let content = io::read_bytes(entry.path(), &format!("read {}", entry.path().display()))?;
        let path = format!("{}/{}", prefix, relative);
        log_status!("emr", "{} -> {}", entry.path().display(), path);
        collected.uploaded.push(path.clone());
        collected.files.push(PutFile { path, content });
    }
    Ok(collected)
}

/// Resolve the workspace's S3 storage location and download it to `dest`.
pub fn download_workspace(
    emr: &dyn EmrWorkspaces,
    s3: &dyn S3,
    workspace_id: &str,
    dest: &Path,
) -> Result<String> {
    let location = emr.workspace_storage_location(workspace_id)?;
    log_status!("emr", "Downloading {} to {}", location, dest.display());
    download_prefix(s3, &location, dest)?;
    Ok(location)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookMigration {
    pub studio_id: String,
    pub workspace_id: String,
    #[serde(flatten)]
    pub files: CollectedFiles,
    pub commit: CommitResult,
}

pub struct NotebookUpload<'a> {
    pub local_folder: &'a Path,
    pub studio_id: &'a str,
    pub workspace_id: &'a str,
    pub repository: &'a str,
    pub branch: &'a str,
    pub batch_size: usize,
}

pub fn upload_notebooks(codecommit: &dyn CodeCommit, upload: &NotebookUpload<'_>) -> Result<NotebookMigration> {
    let files = collect_notebook_files(upload.local_folder, upload.studio_id, upload.workspace_id)?;
    log_status!(
        "emr",
        "Uploading {} file(s) from {} to {}",
        files.files.len(),
        upload.local_folder.display(),
        upload.repository
    );

    let commit = repo::commit_files(
        codecommit,
        upload.repository,
        upload.branch,
        &files.files,
        upload.batch_size,
    )?;

    Ok(NotebookMigration {
        studio_id: upload.studio_id.to_string(),
        workspace_id: upload.workspace_id.to_string(),
        files,
        commit,
    })
}
