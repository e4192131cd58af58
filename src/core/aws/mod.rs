//! Service seams for the AWS control-plane APIs the migrations use.
//!
//! Each trait covers exactly the calls the orchestration code makes, in
//! domain types rather than SDK shapes. `session` provides SDK-backed
//! implementations that block on a Tokio runtime; tests substitute the
//! in-memory fake in `fake`.

use serde::Serialize;
use serde_json::Value;

use crate::Result;

mod athena;
mod codecommit;
mod datazone;
mod emr;
mod glue;
mod iam;
mod lakeformation;
mod s3;
mod s3tables;
mod sagemaker;
pub mod session;
pub mod sigv4;

#[cfg(test)]
pub mod fake;

pub use session::AwsSession;

// ============================================================================
// Athena / CodeCommit
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedQuery {
    pub id: String,
    pub name: String,
    pub query_string: String,
}

pub trait Athena {
    fn list_named_query_ids(&self, workgroup: &str) -> Result<Vec<String>>;
    fn get_named_query(&self, query_id: &str) -> Result<NamedQuery>;
    fn tag_resource(&self, resource_arn: &str, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutFile {
    pub path: String,
    pub content: Vec<u8>,
}

pub trait CodeCommit {
    fn branch_head(&self, repository: &str, branch: &str) -> Result<String>;
    /// Returns the new commit id.
    fn create_commit(
        &self,
        repository: &str,
        branch: &str,
        parent_commit_id: &str,
        files: &[PutFile],
    ) -> Result<String>;
}

// ============================================================================
// DataZone
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedResource {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionGrant {
    pub id: String,
    pub listing_id: Option<String>,
    pub listing_revision: Option<String>,
}

pub trait DataZone {
    fn list_environments(&self, domain_id: &str, project_id: &str) -> Result<Vec<EnvironmentSummary>>;
    fn environment_resources(
        &self,
        domain_id: &str,
        environment_id: &str,
    ) -> Result<Vec<ProvisionedResource>>;
    /// Connection ids of the given type (e.g. `ATHENA`) in the project.
    fn list_connections(&self, domain_id: &str, project_id: &str, kind: &str) -> Result<Vec<String>>;
    fn update_connection_workgroup(
        &self,
        domain_id: &str,
        connection_id: &str,
        workgroup: &str,
    ) -> Result<()>;
    fn list_subscription_targets(&self, domain_id: &str, environment_id: &str) -> Result<Vec<String>>;
    fn list_subscription_grants(&self, domain_id: &str, target_id: &str) -> Result<Vec<SubscriptionGrant>>;
    fn delete_subscription_grant(&self, domain_id: &str, grant_id: &str) -> Result<()>;
    /// Overall status of a grant, e.g. `COMPLETED` or `REVOKE_PENDING`.
    fn subscription_grant_status(&self, domain_id: &str, grant_id: &str) -> Result<String>;
    fn update_subscription_target_principals(
        &self,
        domain_id: &str,
        environment_id: &str,
        target_id: &str,
        principals: &[String],
    ) -> Result<()>;
    /// Returns the new grant id.
    fn create_subscription_grant(
        &self,
        domain_id: &str,
        environment_id: &str,
        target_id: &str,
        listing_id: &str,
        listing_revision: &str,
    ) -> Result<String>;
    fn associate_environment_role(&self, domain_id: &str, environment_id: &str, role_arn: &str) -> Result<()>;
    fn disassociate_environment_role(
        &self,
        domain_id: &str,
        environment_id: &str,
        role_arn: &str,
    ) -> Result<()>;
}

// ============================================================================
// IAM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IamRole {
    pub name: String,
    pub arn: String,
    pub trust_policy: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedPolicy {
    pub arn: String,
    pub name: String,
    pub default_version_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleTag {
    pub key: String,
    pub value: String,
}

pub trait Iam {
    fn list_role_names(&self) -> Result<Vec<String>>;
    fn get_role(&self, role_name: &str) -> Result<IamRole>;
    fn update_assume_role_policy(&self, role_name: &str, document: &Value) -> Result<()>;
    fn list_attached_policy_arns(&self, role_name: &str) -> Result<Vec<String>>;
    fn get_policy(&self, policy_arn: &str) -> Result<ManagedPolicy>;
    fn get_policy_document(&self, policy_arn: &str, version_id: &str) -> Result<Value>;
    fn create_default_policy_version(&self, policy_arn: &str, document: &str) -> Result<()>;
    fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;
    fn list_inline_policy_names(&self, role_name: &str) -> Result<Vec<String>>;
    fn get_inline_policy(&self, role_name: &str, policy_name: &str) -> Result<Value>;
    fn put_inline_policy(&self, role_name: &str, policy_name: &str, document: &Value) -> Result<()>;
    fn list_role_tags(&self, role_name: &str) -> Result<Vec<RoleTag>>;
    fn tag_role(&self, role_name: &str, tags: &[RoleTag]) -> Result<()>;
}

// ============================================================================
// Lake Formation
// ============================================================================

/// Lake Formation resource, restricted to the kinds these migrations move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LfResource {
    Catalog,
    #[serde(rename_all = "PascalCase")]
    Database {
        catalog_id: Option<String>,
        name: String,
    },
    #[serde(rename_all = "PascalCase")]
    Table {
        catalog_id: Option<String>,
        database_name: String,
        name: Option<String>,
        table_wildcard: bool,
    },
    #[serde(rename_all = "PascalCase")]
    TableWithColumns {
        catalog_id: Option<String>,
        database_name: String,
        name: String,
        column_names: Vec<String>,
        /// `Some(excluded)` when the resource uses a column wildcard.
        column_wildcard: Option<Vec<String>>,
    },
    #[serde(rename_all = "PascalCase")]
    DataLocation {
        catalog_id: Option<String>,
        resource_arn: String,
    },
    /// A resource kind (LF-Tag, data cells filter, ...) not modelled here.
    Unsupported(String),
}

impl LfResource {
    pub fn database(name: &str) -> Self {
        LfResource::Database {
            catalog_id: None,
            name: name.to_string(),
        }
    }

    pub fn table(database_name: &str, name: &str) -> Self {
        LfResource::Table {
            catalog_id: None,
            database_name: database_name.to_string(),
            name: Some(name.to_string()),
            table_wildcard: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalPermissions {
    pub principal: String,
    pub resource: LfResource,
    pub permissions: Vec<String>,
    pub permissions_with_grant_option: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionFilter {
    pub principal: Option<String>,
    pub resource: Option<LfResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResource {
    pub resource_arn: String,
    pub role_arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResource {
    pub resource_arn: String,
    pub role_arn: Option<String>,
    pub use_service_linked_role: bool,
    pub hybrid_access_enabled: bool,
    pub with_privileged_access: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLakeAdmins {
    pub admins: Vec<String>,
    pub read_only_admins: Vec<String>,
}

pub trait LakeFormation {
    fn list_permissions(&self, filter: &PermissionFilter) -> Result<Vec<PrincipalPermissions>>;
    fn list_opt_ins(&self, principal: &str, resource: Option<&LfResource>) -> Result<Vec<LfResource>>;
    fn create_opt_in(&self, principal: &str, resource: &LfResource) -> Result<()>;
    fn grant_permissions(
        &self,
        principal: &str,
        resource: &LfResource,
        permissions: &[String],
        grantable: &[String],
    ) -> Result<()>;
    fn list_resources(&self, role_arn: Option<&str>) -> Result<Vec<RegisteredResource>>;
    fn register_resource(&self, request: &RegisterResource) -> Result<()>;
    fn update_resource(&self, resource_arn: &str, role_arn: &str) -> Result<()>;
    fn data_lake_admins(&self) -> Result<DataLakeAdmins>;
    /// Replace the read-only admin list, leaving every other setting as is.
    fn set_read_only_admins(&self, principals: &[String]) -> Result<()>;
}

// ============================================================================
// Glue / S3 Tables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlueTable {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedCatalog {
    pub name: String,
    pub identifier: String,
    pub connection_name: String,
}

pub trait Glue {
    fn get_table(&self, database: &str, table: &str) -> Result<GlueTable>;
    fn get_tables(&self, database: &str) -> Result<Vec<GlueTable>>;
    fn create_federated_catalog(&self, catalog: &FederatedCatalog) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3TableSummary {
    pub name: String,
    pub namespace: Vec<String>,
}

pub trait S3Tables {
    fn get_table(&self, bucket_arn: &str, namespace: &str, name: &str) -> Result<()>;
    fn list_tables(&self, bucket_arn: &str, namespace: Option<&str>) -> Result<Vec<S3TableSummary>>;
}

// ============================================================================
// SageMaker
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SageMakerDomain {
    pub id: String,
    pub name: String,
}

/// Who owns an app: a user profile or a shared space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AppOwner {
    UserProfile(String),
    Space(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SageMakerApp {
    pub name: String,
    pub app_type: String,
    pub owner: Option<AppOwner>,
}

pub trait SageMaker {
    fn list_domains(&self) -> Result<Vec<SageMakerDomain>>;
    fn list_apps(&self, domain_id: &str) -> Result<Vec<SageMakerApp>>;
    fn delete_app(&self, domain_id: &str, app: &SageMakerApp, owner: &AppOwner) -> Result<()>;
    fn app_status(&self, domain_id: &str, app: &SageMakerApp, owner: &AppOwner) -> Result<String>;
    fn update_domain_execution_role(&self, domain_id: &str, role_arn: &str) -> Result<()>;
}

// ============================================================================
// S3 / EMR
// ============================================================================

pub trait S3 {
    fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

pub trait EmrWorkspaces {
    /// S3 URI holding the workspace's notebooks (`<LocationUri>/<workspaceId>/`).
    fn workspace_storage_location(&self, workspace_id: &str) -> Result<String>;
}

// ============================================================================
// SDK shape helpers
// ============================================================================

/// SDK getters return `&str` for required members and `Option<&str>` for
/// optional ones (enums likewise); this flattens both into an owned value.
pub(crate) trait OwnedField {
    fn owned(self) -> Option<String>;
}

impl<T: AsRef<str> + ?Sized> OwnedField for &T {
    fn owned(self) -> Option<String> {
        Some(self.as_ref().to_string())
    }
}

impl<T: AsRef<str> + ?Sized> OwnedField for Option<&T> {
    fn owned(self) -> Option<String> {
        self.map(|v| v.as_ref().to_string())
    }
}
