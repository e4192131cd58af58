use clap::{Args, Subcommand};
use serde::Serialize;

use smus_migrate::athena::{self, NotebookTemplate, QueryMigration, QueryMigrationRequest, WorkgroupBinding};
use smus_migrate::repo;
use smus_migrate::validation::require_one_of;

use super::{settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct AthenaArgs {
    #[command(subcommand)]
    command: AthenaCommand,
}

#[derive(Subcommand)]
enum AthenaCommand {
    /// Convert a workgroup's saved queries into SQL notebooks in a repository
    Queries {
        /// Athena workgroup whose saved queries are migrated
        #[arg(long)]
        workgroup_name: String,
        /// Account id used in notebook ids
        #[arg(long)]
        account_id: String,
        /// CodeCommit repository (instead of --domain-id/--project-id)
        #[arg(long)]
        repo: Option<String>,
        #[arg(long, requires = "project_id")]
        domain_id: Option<String>,
        #[arg(long, requires = "domain_id")]
        project_id: Option<String>,
    },
    /// Migrate saved queries, tag the workgroup and make it the project's Athena workgroup
    Workgroup {
        #[arg(long)]
        workgroup_name: String,
        #[arg(long)]
        domain_id: String,
        #[arg(long)]
        project_id: String,
        #[arg(long)]
        account_id: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AthenaOutput {
    command: String,
    #[serde(flatten)]
    migration: QueryMigration,
    #[serde(skip_serializing_if = "Option::is_none")]
    workgroup_binding: Option<WorkgroupBinding>,
}

pub fn run(args: AthenaArgs, global: &GlobalArgs) -> CmdResult<AthenaOutput> {
    match args.command {
        AthenaCommand::Queries {
            workgroup_name,
            account_id,
            repo,
            domain_id,
            project_id,
        } => {
            let target = require_one_of(
                repo.as_deref(),
                "repo",
                domain_id.as_deref().zip(project_id.as_deref()),
                "--domain-id/--project-id",
            )?;
            let session = global.session()?;
            let region = session.require_region()?;
            let repository = repo::resolve_repository(&session.datazone(), target)?;
            let migration = migrate(&session, &workgroup_name, &account_id, &region, &repository)?;

            Ok((
                AthenaOutput {
                    command: "athena.queries".to_string(),
                    migration,
                    workgroup_binding: None,
                },
                0,
            ))
        }
        AthenaCommand::Workgroup {
            workgroup_name,
            domain_id,
            project_id,
            account_id,
        } => {
            let session = global.session()?;
            let region = session.require_region()?;
            let datazone = session.datazone();
            let repository = repo::project_repository(&datazone, &domain_id, &project_id)?;
            let migration = migrate(&session, &workgroup_name, &account_id, &region, &repository)?;
            let binding = athena::bring_workgroup(
                &session.athena(),
                &datazone,
                &workgroup_name,
                &domain_id,
                &project_id,
                &account_id,
                &region,
            )?;

            Ok((
                AthenaOutput {
                    command: "athena.workgroup".to_string(),
                    migration,
                    workgroup_binding: Some(binding),
                },
                0,
            ))
        }
    }
}

fn migrate(
    session: &smus_migrate::aws::AwsSession,
    workgroup: &str,
    account_id: &str,
    region: &str,
    repository: &str,
) -> smus_migrate::Result<QueryMigration> {
    let defaults = settings();
    let template = NotebookTemplate::resolve(defaults.notebook_template.as_deref())?;
    athena::migrate_queries(
        &session.athena(),
        &session.codecommit(),
        &template,
        &QueryMigrationRequest {
            workgroup,
            account_id,
            region,
            repository,
            branch: &defaults.branch,
            batch_size: defaults.commit_batch_size,
        },
    )
}
