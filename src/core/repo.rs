//! Project code repository: lookup through DataZone and batched commits.

use serde::Serialize;

use crate::aws::{CodeCommit, DataZone, PutFile};
use crate::error::{Error, Result};
use crate::utils::validation::Either;

pub const TOOLING_ENVIRONMENT: &str = "Tooling";
const REPOSITORY_RESOURCE: &str = "codeRepositoryName";

/// Name of the CodeCommit repository provisioned by the project's Tooling
/// environment.
pub fn project_repository(datazone: &dyn DataZone, domain_id: &str, project_id: &str) -> Result<String> {
    let environments = datazone.list_environments(domain_id, project_id)?;
    let tooling = environments
        .iter()
        .find(|env| env.name == TOOLING_ENVIRONMENT)
        .ok_or_else(|| Error::repository_not_found(project_id, domain_id))?;

    datazone
        .environment_resources(domain_id, &tooling.id)?
        .into_iter()
        .find(|resource| resource.name == REPOSITORY_RESOURCE)
        .map(|resource| resource.value)
        .ok_or_else(|| Error::repository_not_found(project_id, domain_id))
}

/// Explicit repository name, or the one looked up from a domain/project pair.
pub fn resolve_repository(
    datazone: &dyn DataZone,
    target: Either<&str, (&str, &str)>,
) -> Result<String> {
    match target {
        Either::Left(repo) => Ok(repo.to_string()),
        Either::Right((domain_id, project_id)) => {
            let repo = project_repository(datazone, domain_id, project_id)?;
            log_status!("datazone", "Project {} uses repository {}", project_id, repo);
            Ok(repo)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    pub repository: String,
    pub branch: String,
    pub commit_ids: Vec<String>,
    pub files: usize,
}

/// Commit `files` on top of the branch head, at most `batch_size` per commit.
/// Each batch is parented on the commit created by the previous one.
pub fn commit_files(
    codecommit: &dyn CodeCommit,
    repository: &str,
    branch: &str,
    files: &[PutFile],
    batch_size: usize,
) -> Result<CommitResult> {
    let mut result = CommitResult {
        repository: repository.to_string(),
        branch: branch.to_string(),
        commit_ids: Vec::new(),
        files: files.len(),
    };
    if files.is_empty() {
        return Ok(result);
    }

    let mut parent = codecommit.branch_head(repository, branch)?;
    for batch in files.chunks(batch_size.max(1)) {
        let commit_id = codecommit.create_commit(repository, branch, &parent, batch)?;
        log_status!(
            "codecommit",
            "Committed {} file(s) to {}/{} as {}",
            batch.len(),
            repository,
            branch,
            commit_id
        );
        result.commit_ids.push(commit_id.clone());
        parent = commit_id;
    }
    Ok(result)
}
