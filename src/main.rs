use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{athena, config, emr, glue, role, s3_tables, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "smus-migrate")]
#[command(version = VERSION)]
#[command(about = "Bring existing AWS analytics resources into SageMaker Unified Studio projects")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Athena saved queries and workgroups
    Athena(athena::AthenaArgs),
    /// EMR Studio workspace notebooks
    Emr(emr::EmrArgs),
    /// Bring an existing IAM role into a project
    Role(role::RoleArgs),
    /// Bring Glue Data Catalog tables into a project
    Glue(glue::GlueArgs),
    /// Bring S3 Table Bucket tables into a project
    #[command(name = "s3-tables")]
    S3Tables(s3_tables::S3TablesArgs),
    /// Manage smus-migrate configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command, &cli.global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
