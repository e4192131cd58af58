//! Bring existing Glue Data Catalog databases and tables into a project by
//! granting the project role Lake Formation access to them.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::json;

use crate::arn::{s3_path_to_arn, s3_subpaths};
use crate::aws::{Glue, GlueTable, LakeFormation, LfResource, RegisterResource};
use crate::error::Result;
use crate::lakeformation::{ensure_hybrid_opt_in, registered_s3_locations};
use crate::output::{MigrationReport, StepStatus};

const ALL: &str = "ALL";

#[derive(Debug, Clone)]
pub struct GlueImportRequest {
    pub project_role_arn: String,
    pub database_name: String,
    pub table_name: Option<String>,
    /// Role used to register data locations; the service-linked role when absent.
    pub register_role_arn: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlueImport {
    pub database: String,
    pub tables: Vec<GlueTable>,
    pub report: MigrationReport,
}

/// Register `location` unless it or one of its ancestors already is.
/// Newly registered locations are added to `known`.
pub fn register_location(
    lakeformation: &dyn LakeFormation,
    report: &mut MigrationReport,
    location: &str,
    register_role_arn: Option<&str>,
    known: &mut BTreeSet<String>,
) -> Result<()> {
    let location = location.trim_end_matches('/');
    if let Some(covering) = s3_subpaths(location).into_iter().find(|p| known.contains(p)) {
        log_status!("glue", "{} is already registered via {}", location, covering);
        report.record(
            "lakeformation.register_resource",
            location,
            StepStatus::Unchanged,
            Some(json!({ "registeredPath": covering })),
        );
        return Ok(());
    }

    let request = RegisterResource {
        resource_arn: s3_path_to_arn(location),
        role_arn: register_role_arn.map(str::to_string),
        use_service_linked_role: register_role_arn.is_none(),
        hybrid_access_enabled: true,
        with_privileged_access: false,
    };
    log_status!("glue", "Registering {}", location);
    report.apply(
        "lakeformation.register_resource",
        location,
        Some(json!(&request)),
        || lakeformation.register_resource(&request),
    )?;
    known.insert(location.to_string());
    Ok(())
}

pub fn import_glue_assets(
    glue: &dyn Glue,
    lakeformation: &dyn LakeFormation,
    request: &GlueImportRequest,
) -> Result<GlueImport> {
    let mut report = MigrationReport::new(true);
    let database = &request.database_name;
    let principal = request.project_role_arn.as_str();

    ensure_hybrid_opt_in(
        lakeformation,
        &mut report,
        principal,
        &LfResource::database(database),
        database,
    )?;

    let tables = match &request.table_name {
        Some(name) => vec![glue.get_table(database, name)?],
        None => glue.get_tables(database)?,
    };
    log_status!("glue", "{} table(s) to import from {}", tables.len(), database);

    let mut known: BTreeSet<String> = registered_s3_locations(lakeformation)?.into_iter().collect();
    for table in &tables {
        match &table.location {
            Some(location) if !location.is_empty() => register_location(
                lakeformation,
                &mut report,
                location,
                request.register_role_arn.as_deref(),
                &mut known,
            )?,
            _ => report.record(
                "lakeformation.register_resource",
                format!("{}.{}", database, table.name),
                StepStatus::Skipped,
                Some(json!({ "reason": "table has no location" })),
            ),
        }
    }

    let all = vec![ALL.to_string()];
    for table in &tables {
        let label = format!("{}.{}", database, table.name);
        let resource = LfResource::table(database, &table.name);
        ensure_hybrid_opt_in(lakeformation, &mut report, principal, &resource, &label)?;
        report.apply(
            "lakeformation.grant",
            &label,
            Some(json!({ "principal": principal, "permissions": &all, "permissionsWithGrantOption": &all })),
            || lakeformation.grant_permissions(principal, &resource, &all, &all),
        )?;
    }

    Ok(GlueImport {
        database: database.clone(),
        tables,
        report,
    })
}
