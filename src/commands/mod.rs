use clap::Args;

use smus_migrate::aws::AwsSession;
use smus_migrate::defaults::{self, Defaults};

pub type CmdResult<T> = smus_migrate::Result<(T, i32)>;

/// Flags shared by every AWS-backed command.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// AWS region (defaults to the region from the AWS config chain)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Named AWS profile
    #[arg(long, global = true)]
    pub profile: Option<String>,
}

impl GlobalArgs {
    pub fn session(&self) -> smus_migrate::Result<AwsSession> {
        AwsSession::connect(self.region.as_deref(), self.profile.as_deref())
    }
}

/// Settings from config.json, loaded once per command.
pub(crate) fn settings() -> Defaults {
    defaults::load_defaults()
}

pub mod athena;
pub mod config;
pub mod emr;
pub mod glue;
pub mod role;
pub mod s3_tables;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (smus_migrate::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Athena(args) => dispatch!(args, global, athena),
        crate::Commands::Emr(args) => dispatch!(args, global, emr),
        crate::Commands::Role(args) => dispatch!(args, global, role),
        crate::Commands::Glue(args) => dispatch!(args, global, glue),
        crate::Commands::S3Tables(args) => dispatch!(args, global, s3_tables),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
