use clap::{Args, Subcommand};
use serde::Serialize;

use smus_migrate::arn::TableBucketArn;
use smus_migrate::s3tables::{self, S3TablesImport, S3TablesImportRequest, TableSelection};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct S3TablesArgs {
    #[command(subcommand)]
    command: S3TablesCommand,
}

#[derive(Subcommand)]
enum S3TablesCommand {
    /// Grant a project role access to tables of an S3 Table Bucket
    Import {
        #[arg(long)]
        project_role_arn: String,
        /// Role Lake Formation uses to access the table buckets
        #[arg(long)]
        iam_role_arn_lf_resource_register: String,
        /// arn:aws:s3tables:<region>:<account-id>:bucket/<name>
        #[arg(long)]
        table_bucket_arn: String,
        /// Import only this namespace (default: every namespace)
        #[arg(long)]
        table_bucket_namespace: Option<String>,
        /// Import only this table; requires --table-bucket-namespace
        #[arg(long)]
        table_name: Option<String>,
        /// Perform the changes (default: report what would change)
        #[arg(long)]
        execute: bool,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3TablesOutput {
    command: String,
    #[serde(flatten)]
    import: S3TablesImport,
}

pub fn run(args: S3TablesArgs, global: &GlobalArgs) -> CmdResult<S3TablesOutput> {
    match args.command {
        S3TablesCommand::Import {
            project_role_arn,
            iam_role_arn_lf_resource_register,
            table_bucket_arn,
            table_bucket_namespace,
            table_name,
            execute,
        } => {
            let bucket = TableBucketArn::parse(&table_bucket_arn)?;
            let selection = TableSelection::from_args(table_bucket_namespace.as_deref(), table_name.as_deref())?;

            let session = global.session()?;
            s3tables::require_bucket_region(&session.require_region()?, &bucket)?;

            let import = s3tables::import_table_bucket(
                &session.lakeformation(),
                &session.glue(),
                &session.s3tables(),
                &S3TablesImportRequest {
                    project_role_arn,
                    register_role_arn: iam_role_arn_lf_resource_register,
                    bucket,
                    selection,
                    execute,
                },
            )?;
            Ok((
                S3TablesOutput {
                    command: "s3_tables.import".to_string(),
                    import,
                },
                0,
            ))
        }
    }
}
