//! Lake Formation helpers shared by the role, Glue and S3 Tables commands.

use serde_json::json;

use crate::arn::s3_arn_to_path;
use crate::aws::{LakeFormation, LfResource, PermissionFilter};
use crate::error::Result;
use crate::output::{MigrationReport, StepStatus};

pub const IAM_ALLOWED_PRINCIPALS: &str = "IAM_ALLOWED_PRINCIPALS";
const ALL_TABLES: &str = "ALL_TABLES";

/// Rewrite a resource as returned by the list APIs into a shape the grant
/// and opt-in APIs accept.
pub fn normalize_resource(resource: LfResource) -> LfResource {
    match resource {
        LfResource::Table {
            catalog_id,
            database_name,
            name: Some(_),
            table_wildcard: true,
        } => LfResource::Table {
            catalog_id,
            database_name,
            name: None,
            table_wildcard: true,
        },
        LfResource::TableWithColumns {
            catalog_id,
            database_name,
            name,
            ..
        } if name == ALL_TABLES => LfResource::Table {
            catalog_id,
            database_name,
            name: None,
            table_wildcard: true,
        },
        other => other,
    }
}

/// Registered data locations as `s3://` paths.
pub fn registered_s3_locations(lakeformation: &dyn LakeFormation) -> Result<Vec<String>> {
    Ok(lakeformation
        .list_resources(None)?
        .into_iter()
        .filter(|r| r.resource_arn.contains("s3:::"))
        .filter_map(|r| s3_arn_to_path(&r.resource_arn))
        .collect())
}

/// Whether `IAM_ALLOWED_PRINCIPALS` still holds permissions on `resource`,
/// i.e. access is governed by IAM rather than Lake Formation.
pub fn managed_by_iam(lakeformation: &dyn LakeFormation, resource: &LfResource) -> Result<bool> {
    let filter = PermissionFilter {
        principal: Some(IAM_ALLOWED_PRINCIPALS.to_string()),
        resource: Some(resource.clone()),
    };
    Ok(!lakeformation.list_permissions(&filter)?.is_empty())
}

/// For IAM-managed resources, make sure `principal` is opted in so Lake
/// Formation permissions take effect in hybrid mode.
pub fn ensure_hybrid_opt_in(
    lakeformation: &dyn LakeFormation,
    report: &mut MigrationReport,
    principal: &str,
    resource: &LfResource,
    label: &str,
) -> Result<()> {
    if !managed_by_iam(lakeformation, resource)? {
        log_status!("lakeformation", "{} is already managed via Lake Formation", label);
        report.record(
            "lakeformation.opt_in",
            label,
            StepStatus::Unchanged,
            Some(json!({ "reason": "managed by Lake Formation" })),
        );
        return Ok(());
    }

    log_status!("lakeformation", "{} is managed via IAM access", label);
    if !lakeformation.list_opt_ins(principal, Some(resource))?.is_empty() {
        report.record(
            "lakeformation.opt_in",
            label,
            StepStatus::Unchanged,
            Some(json!({ "principal": principal, "reason": "already opted in" })),
        );
        return Ok(());
    }

    report.apply(
        "lakeformation.opt_in",
        label,
        Some(json!({ "principal": principal, "resource": resource })),
        || lakeformation.create_opt_in(principal, resource),
    )
}

/// Re-grant every permission held by `source` to `destination`.
pub fn copy_grants(
    lakeformation: &dyn LakeFormation,
    report: &mut MigrationReport,
    source: &str,
    destination: &str,
    warn_if_empty: bool,
) -> Result<()> {
    log_status!("lakeformation", "Copying grants of {} to {}", source, destination);
    let grants: Vec<_> = lakeformation
        .list_permissions(&PermissionFilter::default())?
        .into_iter()
        .filter(|g| g.principal == source)
        .collect();

    if grants.is_empty() && warn_if_empty {
        report.warn(format!(
            "No Lake Formation grants found for {}; make sure the caller is a data lake administrator",
            source
        ));
    }

    for grant in grants {
        let resource = normalize_resource(grant.resource);
        let detail = json!({
            "from": source,
            "resource": &resource,
            "permissions": &grant.permissions,
            "permissionsWithGrantOption": &grant.permissions_with_grant_option,
        });
        report.apply("lakeformation.grant", destination, Some(detail), || {
            lakeformation.grant_permissions(
                destination,
                &resource,
                &grant.permissions,
                &grant.permissions_with_grant_option,
            )
        })?;
    }
    Ok(())
}

/// Copy the hybrid-access opt-ins of `source` to `destination`.
pub fn copy_opt_ins(
    lakeformation: &dyn LakeFormation,
    report: &mut MigrationReport,
    source: &str,
    destination: &str,
) -> Result<()> {
    log_status!("lakeformation", "Copying opt-ins of {} to {}", source, destination);
    for resource in lakeformation.list_opt_ins(source, None)? {
        let resource = normalize_resource(resource);
        let detail = json!({ "from": source, "resource": &resource });

        if !report.execute {
            report.record("lakeformation.opt_in", destination, StepStatus::Planned, Some(detail));
            continue;
        }
        match lakeformation.create_opt_in(destination, &resource) {
            Ok(()) => report.record("lakeformation.opt_in", destination, StepStatus::Applied, Some(detail)),
            Err(e) if e.is_aws_code("InvalidInputException") => {
                log_status!("lakeformation", "Opt-in already exists, skipping");
                report.record("lakeformation.opt_in", destination, StepStatus::Unchanged, Some(detail));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
