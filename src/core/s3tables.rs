//! Bring tables of an S3 Table Bucket into a project.
//!
//! The account's table buckets are exposed through the federated Glue
//! catalog `s3tablescatalog`; once the bucket wildcard is registered with
//! Lake Formation, each table can be granted to the project role like any
//! other catalog table.

use serde::Serialize;
use serde_json::json;

use crate::arn::TableBucketArn;
use crate::aws::{FederatedCatalog, Glue, LakeFormation, LfResource, RegisterResource, S3Tables};
use crate::error::{Error, Result};
use crate::output::{MigrationReport, StepStatus};

pub const CATALOG_NAME: &str = "s3tablescatalog";
const CATALOG_CONNECTION: &str = "aws:s3tables";
const ALL: &str = "ALL";

/// Service-linked role Redshift uses to query the catalog.
pub fn redshift_service_role(account_id: &str) -> String {
    format!(
        "arn:aws:iam::{}:role/aws-service-role/redshift.amazonaws.com/AWSServiceRoleForRedshift",
        account_id
    )
}

/// Which tables of the bucket to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSelection {
    AllTables,
    Namespace(String),
    Table { namespace: String, name: String },
}

impl TableSelection {
    pub fn from_args(namespace: Option<&str>, table_name: Option<&str>) -> Result<Self> {
        match (namespace, table_name) {
            (None, None) => Ok(Self::AllTables),
            (Some(ns), None) => Ok(Self::Namespace(ns.to_string())),
            (Some(ns), Some(name)) => Ok(Self::Table {
                namespace: ns.to_string(),
                name: name.to_string(),
            }),
            (None, Some(name)) => Err(Error::validation_invalid_argument(
                "table_bucket_namespace",
                format!("A namespace is required together with table '{}'", name),
                None,
                None,
            )
            .with_hint("Pass --table-bucket-namespace, or drop --table-name to import every table")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3TablesImportRequest {
    pub project_role_arn: String,
    pub register_role_arn: String,
    pub bucket: TableBucketArn,
    pub selection: TableSelection,
    pub execute: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedTable {
    pub namespace: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3TablesImport {
    pub table_bucket_arn: String,
    pub catalog_id: String,
    pub read_only_admins: Vec<String>,
    pub tables: Vec<ImportedTable>,
    pub report: MigrationReport,
}

pub fn require_bucket_region(session_region: &str, bucket: &TableBucketArn) -> Result<()> {
    if session_region == bucket.region {
        return Ok(());
    }
    Err(Error::validation_invalid_argument(
        "region",
        format!(
            "Current region '{}' does not match the table bucket region '{}'",
            session_region, bucket.region
        ),
        Some(bucket.arn.clone()),
        None,
    )
    .with_hint(format!("Re-run with --region {}", bucket.region)))
}

/// `<account>:s3tablescatalog/<bucket>`
pub fn bucket_catalog_id(bucket: &TableBucketArn) -> String {
    format!("{}:{}/{}", bucket.account_id, CATALOG_NAME, bucket.bucket_name)
}

fn add_redshift_read_only_admin(
    lakeformation: &dyn LakeFormation,
    report: &mut MigrationReport,
    account_id: &str,
) -> Result<Vec<String>> {
    let current = lakeformation.data_lake_admins()?.read_only_admins;
    log_status!("s3tables", "Current read-only admins: {:?}", current);

    let redshift = redshift_service_role(account_id);
    if current.contains(&redshift) {
        report.record("lakeformation.read_only_admin", &redshift, StepStatus::Unchanged, None);
        return Ok(current);
    }

    let mut updated = current.clone();
    updated.push(redshift.clone());
    report.apply(
        "lakeformation.read_only_admin",
        &redshift,
        Some(json!({ "readOnlyAdmins": &updated })),
        || lakeformation.set_read_only_admins(&updated),
    )?;
    Ok(current)
}

fn register_buckets(
    lakeformation: &dyn LakeFormation,
    report: &mut MigrationReport,
    bucket: &TableBucketArn,
    register_role_arn: &str,
) -> Result<()> {
    let request = RegisterResource {
        resource_arn: bucket.all_buckets_arn(),
        role_arn: Some(register_role_arn.to_string()),
        use_service_linked_role: false,
        hybrid_access_enabled: false,
        with_privileged_access: true,
    };
    let detail = json!(&request);
    if !report.execute {
        report.record("lakeformation.register_resource", &request.resource_arn, StepStatus::Planned, Some(detail));
        return Ok(());
    }
    match lakeformation.register_resource(&request) {
        Ok(()) => report.record("lakeformation.register_resource", &request.resource_arn, StepStatus::Applied, Some(detail)),
        Err(e) if e.is_aws_code("AlreadyExistsException") => {
            log_status!("s3tables", "{} is already registered", request.resource_arn);
            report.record("lakeformation.register_resource", &request.resource_arn, StepStatus::Unchanged, Some(detail));
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn create_catalog(glue: &dyn Glue, report: &mut MigrationReport, bucket: &TableBucketArn) -> Result<()> {
    let catalog = FederatedCatalog {
        name: CATALOG_NAME.to_string(),
        identifier: bucket.all_buckets_arn(),
        connection_name: CATALOG_CONNECTION.to_string(),
    };
    let detail = json!(&catalog);
    if !report.execute {
        report.record("glue.create_catalog", CATALOG_NAME, StepStatus::Planned, Some(detail));
        return Ok(());
    }
    match glue.create_federated_catalog(&catalog) {
        Ok(()) => report.record("glue.create_catalog", CATALOG_NAME, StepStatus::Applied, Some(detail)),
        Err(e) if e.is_aws_code("AlreadyExistsException") => {
            report.record("glue.create_catalog", CATALOG_NAME, StepStatus::Unchanged, Some(detail));
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn selected_tables(s3tables: &dyn S3Tables, bucket: &TableBucketArn, selection: &TableSelection) -> Result<Vec<ImportedTable>> {
    Ok(match selection {
        TableSelection::AllTables => s3tables
            .list_tables(&bucket.arn, None)?
            .into_iter()
            .flat_map(|table| {
                table.namespace.into_iter().map(move |namespace| ImportedTable {
                    namespace,
                    name: table.name.clone(),
                })
            })
            .collect(),
        TableSelection::Namespace(namespace) => s3tables
            .list_tables(&bucket.arn, Some(namespace))?
            .into_iter()
            .map(|table| ImportedTable {
                namespace: namespace.clone(),
                name: table.name,
            })
            .collect(),
        TableSelection::Table { namespace, name } => vec![ImportedTable {
            namespace: namespace.clone(),
            name: name.clone(),
        }],
    })
}

pub fn import_table_bucket(
    lakeformation: &dyn LakeFormation,
    glue: &dyn Glue,
    s3tables: &dyn S3Tables,
    request: &S3TablesImportRequest,
) -> Result<S3TablesImport> {
    let bucket = &request.bucket;
    let mut report = MigrationReport::new(request.execute);

    let read_only_admins = add_redshift_read_only_admin(lakeformation, &mut report, &bucket.account_id)?;
    register_buckets(lakeformation, &mut report, bucket, &request.register_role_arn)?;
    create_catalog(glue, &mut report, bucket)?;

    let catalog_id = bucket_catalog_id(bucket);
    let tables = selected_tables(s3tables, bucket, &request.selection)?;
    log_status!("s3tables", "{} table(s) selected in {}", tables.len(), bucket.bucket_name);

    let permissions = vec![ALL.to_string()];
    for table in &tables {
        s3tables.get_table(&bucket.arn, &table.namespace, &table.name)?;
        let resource = LfResource::Table {
            catalog_id: Some(catalog_id.clone()),
            database_name: table.namespace.clone(),
            name: Some(table.name.clone()),
            table_wildcard: false,
        };
        report.apply(
            "lakeformation.grant",
            format!("{}.{}", table.namespace, table.name),
            Some(json!({ "principal": &request.project_role_arn, "resource": &resource, "permissions": &permissions })),
            || lakeformation.grant_permissions(&request.project_role_arn, &resource, &permissions, &[]),
        )?;
    }

    Ok(S3TablesImport {
        table_bucket_arn: bucket.arn.clone(),
        catalog_id,
        read_only_admins,
        tables,
        report,
    })
}
