use clap::{Args, Subcommand};
use serde::Serialize;

use smus_migrate::glue::{self, GlueImport, GlueImportRequest};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct GlueArgs {
    #[command(subcommand)]
    command: GlueCommand,
}

#[derive(Subcommand)]
enum GlueCommand {
    /// Grant a project role Lake Formation access to Glue tables
    Import {
        /// Execution role of the project receiving the tables
        #[arg(long)]
        project_role_arn: String,
        #[arg(long)]
        database_name: String,
        /// Single table to import (default: every table in the database)
        #[arg(long)]
        table_name: Option<String>,
        /// Role used to register table locations (default: the Lake Formation service-linked role)
        #[arg(long)]
        iam_role_arn_lf_resource_register: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlueOutput {
    command: String,
    #[serde(flatten)]
    import: GlueImport,
}

pub fn run(args: GlueArgs, global: &GlobalArgs) -> CmdResult<GlueOutput> {
    match args.command {
        GlueCommand::Import {
            project_role_arn,
            database_name,
            table_name,
            iam_role_arn_lf_resource_register,
        } => {
            let session = global.session()?;
            let import = glue::import_glue_assets(
                &session.glue(),
                &session.lakeformation(),
                &GlueImportRequest {
                    project_role_arn,
                    database_name,
                    table_name,
                    register_role_arn: iam_role_arn_lf_resource_register,
                },
            )?;
            Ok((
                GlueOutput {
                    command: "glue.import".to_string(),
                    import,
                },
                0,
            ))
        }
    }
}
