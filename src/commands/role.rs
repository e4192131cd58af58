use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;

use smus_migrate::role::{self, RoleMigration, RoleRequest, RoleServices, Timing};

use super::{settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct RoleArgs {
    #[command(subcommand)]
    command: RoleCommand,
}

#[derive(Args)]
struct RoleTarget {
    #[arg(long)]
    domain_id: String,
    #[arg(long)]
    project_id: String,
    /// ARN of the existing IAM role to bring into the project
    #[arg(long)]
    bring_in_role_arn: String,
    /// Perform the changes (default: report what would change)
    #[arg(long)]
    execute: bool,
}

impl RoleTarget {
    fn request(self) -> RoleRequest {
        RoleRequest {
            domain_id: self.domain_id,
            project_id: self.project_id,
            bring_in_role_arn: self.bring_in_role_arn,
            execute: self.execute,
        }
    }
}

#[derive(Subcommand)]
enum RoleCommand {
    /// Replace the project's execution role with an existing role
    UseYourOwnRole {
        #[command(flatten)]
        target: RoleTarget,
        /// Delete the project's SageMaker apps so its domain role can be updated
        #[arg(long)]
        force_update: bool,
    },
    /// Copy an existing role's permissions onto the project's execution role
    EnhanceProjectRole {
        #[command(flatten)]
        target: RoleTarget,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleOutput {
    command: String,
    #[serde(flatten)]
    migration: RoleMigration,
}

pub fn run(args: RoleArgs, global: &GlobalArgs) -> CmdResult<RoleOutput> {
    let session = global.session()?;
    let iam = session.iam();
    let datazone = session.datazone();
    let lakeformation = session.lakeformation();
    let sagemaker = session.sagemaker();
    let services = RoleServices {
        iam: &iam,
        datazone: &datazone,
        lakeformation: &lakeformation,
        sagemaker: &sagemaker,
    };

    let (command, migration) = match args.command {
        RoleCommand::UseYourOwnRole { target, force_update } => {
            let defaults = settings();
            let timing = Timing {
                polling: defaults.polling,
                subscription_settle: Duration::from_secs(defaults.subscription_settle_seconds),
            };
            (
                "role.use_your_own_role",
                role::replace_project_role(&services, &target.request(), force_update, &timing)?,
            )
        }
        RoleCommand::EnhanceProjectRole { target } => (
            "role.enhance_project_role",
            role::enhance_project_role(&services, &target.request())?,
        ),
    };

    Ok((
        RoleOutput {
            command: command.to_string(),
            migration,
        },
        0,
    ))
}
