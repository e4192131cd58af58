use aws_sdk_codecommit::primitives::Blob;
use aws_sdk_codecommit::types::PutFileEntry;

use super::session::{sdk_error, AwsSession};
use super::{CodeCommit, OwnedField, PutFile};
use crate::{Error, Result};

pub struct SdkCodeCommit {
    session: AwsSession,
    client: aws_sdk_codecommit::Client,
}

impl SdkCodeCommit {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_codecommit::Client) -> Self {
        Self { session, client }
    }
}

impl CodeCommit for SdkCodeCommit {
    fn branch_head(&self, repository: &str, branch: &str) -> Result<String> {
        let output = self
            .session
            .block_on(
                self.client
                    .get_branch()
                    .repository_name(repository)
                    .branch_name(branch)
                    .send(),
            )
            .map_err(|e| sdk_error("codecommit", "GetBranch", e))?;

        output
            .branch()
            .and_then(|b| b.commit_id().owned())
            .ok_or_else(|| {
                Error::aws_service(
                    "codecommit",
                    "GetBranch",
                    None,
                    format!("branch {} of {} has no commit", branch, repository),
                )
            })
    }

    fn create_commit(
        &self,
        repository: &str,
        branch: &str,
        parent_commit_id: &str,
        files: &[PutFile],
    ) -> Result<String> {
        let mut request = self
            .client
            .create_commit()
            .repository_name(repository)
            .branch_name(branch)
            .parent_commit_id(parent_commit_id);

        for file in files {
            let entry = PutFileEntry::builder()
                .file_path(&file.path)
                .file_content(Blob::new(file.content.clone()))
                .build()
                .map_err(|e| Error::internal_unexpected(format!("build put-file entry: {}", e)))?;
            request = request.put_files(entry);
        }

        let output = self
            .session
            .block_on(request.send())
            .map_err(|e| sdk_error("codecommit", "CreateCommit", e))?;

        output.commit_id().owned().ok_or_else(|| {
            Error::aws_service("codecommit", "CreateCommit", None, "no commit id returned")
        })
    }
}
