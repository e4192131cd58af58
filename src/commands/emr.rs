use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;

use smus_migrate::emr::{self, NotebookMigration, NotebookUpload};
use smus_migrate::validation::{require, require_one_of};
use smus_migrate::{log_status, repo, Error};

use super::{settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct EmrArgs {
    #[command(subcommand)]
    command: EmrCommand,
}

#[derive(Subcommand)]
enum EmrCommand {
    /// Upload EMR Studio workspace notebooks into a project repository
    Notebooks(NotebooksArgs),
}

#[derive(Args)]
struct NotebooksArgs {
    /// CodeCommit repository (instead of --domain-id/--project-id)
    #[arg(long)]
    repo: Option<String>,
    #[arg(long, requires = "project_id")]
    domain_id: Option<String>,
    #[arg(long, requires = "domain_id")]
    project_id: Option<String>,

    /// Local folder holding the workspace files
    #[arg(long, conflicts_with = "download")]
    local_path: Option<PathBuf>,

    #[arg(long)]
    emr_studio_id: Option<String>,
    #[arg(long)]
    emr_workspace_id: Option<String>,

    /// Download the workspace from its S3 storage location first
    #[arg(long)]
    download: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmrOutput {
    command: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    migration: Option<NotebookMigration>,
}

pub fn run(args: EmrArgs, global: &GlobalArgs) -> CmdResult<EmrOutput> {
    match args.command {
        EmrCommand::Notebooks(args) => notebooks(args, global),
    }
}

fn notebooks(args: NotebooksArgs, global: &GlobalArgs) -> CmdResult<EmrOutput> {
    let target = require_one_of(
        args.repo.as_deref(),
        "repo",
        args.domain_id.as_deref().zip(args.project_id.as_deref()),
        "--domain-id/--project-id",
    )?;

    if args.local_path.is_none() && !args.download {
        log_status!("emr", "No --local-path or --download given, nothing to upload");
        return Ok((
            EmrOutput {
                command: "emr.notebooks".to_string(),
                status: "skipped".to_string(),
                storage_location: None,
                migration: None,
            },
            0,
        ));
    }

    let studio_id = require(
        args.emr_studio_id.as_deref(),
        "emr_studio_id",
        "--emr-studio-id is required to upload notebooks",
    )?;
    let workspace_id = require(
        args.emr_workspace_id.as_deref(),
        "emr_workspace_id",
        "--emr-workspace-id is required to upload notebooks",
    )?;

    if let Some(path) = &args.local_path {
        emr::require_local_folder(path)?;
    }

    let defaults = settings();
    let session = global.session()?;
    let repository = repo::resolve_repository(&session.datazone(), target)?;

    let staging = if args.download {
        Some(tempfile::tempdir().map_err(|e| {
            Error::internal_io(e.to_string(), Some("create download directory".to_string()))
        })?)
    } else {
        None
    };

    let (local_folder, storage_location) = match &staging {
        Some(dir) => {
            let workspaces = session.emr_workspaces(Duration::from_secs(defaults.request_timeout_seconds))?;
            let location = emr::download_workspace(&workspaces, &session.s3(), workspace_id, dir.path())?;
            (dir.path().to_path_buf(), Some(location))
        }
        None => {
            let path = require(args.local_path.clone(), "local_path", "--local-path or --download is required")?;
            (path, None)
        }
    };

    let migration = emr::upload_notebooks(
        &session.codecommit(),
        &NotebookUpload {
            local_folder: &local_folder,
            studio_id,
            workspace_id,
            repository: &repository,
            branch: &defaults.branch,
            batch_size: defaults.commit_batch_size,
        },
    )?;

    Ok((
        EmrOutput {
            command: "emr.notebooks".to_string(),
            status: "uploaded".to_string(),
            storage_location,
            migration: Some(migration),
        },
        0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(local_path: &str) -> NotebooksArgs {
        NotebooksArgs {
            repo: None,
            domain_id: Some("dzd_1".to_string()),
            project_id: Some("prj1".to_string()),
            local_path: Some(PathBuf::from(local_path)),
            emr_studio_id: Some("es-1".to_string()),
            emr_workspace_id: Some("e-1".to_string()),
            download: false,
        }
    }

    #[test]
    fn missing_local_folder_fails_before_connecting() {
        let global = GlobalArgs {
            region: Some("us-east-1".to_string()),
            profile: Some("smus-migrate-missing-profile".to_string()),
        };

        let err = notebooks(args("/nonexistent/emr-workspace"), &global).unwrap_err();

        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.details["field"], "local_path");
        assert_eq!(err.details["id"], "/nonexistent/emr-workspace");
    }
}
