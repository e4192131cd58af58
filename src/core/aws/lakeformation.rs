use aws_sdk_lakeformation::types::{
    CatalogResource, ColumnWildcard, ComparisonOperator, DataLakePrincipal, DataLocationResource,
    DatabaseResource, FieldNameString, FilterCondition, Permission, Resource, TableResource,
    TableWildcard, TableWithColumnsResource,
};

use super::session::{sdk_error, AwsSession};
use super::{
    DataLakeAdmins, LakeFormation, LfResource, OwnedField, PermissionFilter, PrincipalPermissions,
    RegisterResource, RegisteredResource,
};
use crate::{Error, Result};

pub struct SdkLakeFormation {
    session: AwsSession,
    client: aws_sdk_lakeformation::Client,
}

impl SdkLakeFormation {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_lakeformation::Client) -> Self {
        Self { session, client }
    }
}

fn principal(identifier: &str) -> DataLakePrincipal {
    DataLakePrincipal::builder()
        .data_lake_principal_identifier(identifier)
        .build()
}

fn build_error(kind: &str, err: impl std::fmt::Display) -> Error {
    Error::internal_unexpected(format!("build Lake Formation {}: {}", kind, err))
}

fn to_sdk_resource(resource: &LfResource) -> Result<Resource> {
    let builder = Resource::builder();
    let built = match resource {
        LfResource::Catalog => builder.catalog(CatalogResource::builder().build()),
        LfResource::Database { catalog_id, name } => builder.database(
            DatabaseResource::builder()
                .set_catalog_id(catalog_id.clone())
                .name(name)
                .build()
                .map_err(|e| build_error("database resource", e))?,
        ),
        LfResource::Table {
            catalog_id,
            database_name,
            name,
            table_wildcard,
        } => {
            let mut table = TableResource::builder()
                .set_catalog_id(catalog_id.clone())
                .database_name(database_name)
                .set_name(name.clone());
            if *table_wildcard {
                table = table.table_wildcard(TableWildcard::builder().build());
            }
            builder.table(table.build().map_err(|e| build_error("table resource", e))?)
        }
        LfResource::TableWithColumns {
            catalog_id,
            database_name,
            name,
            column_names,
            column_wildcard,
        } => {
            let mut table = TableWithColumnsResource::builder()
                .set_catalog_id(catalog_id.clone())
                .database_name(database_name)
                .name(name);
            if !column_names.is_empty() {
                table = table.set_column_names(Some(column_names.clone()));
            }
            if let Some(excluded) = column_wildcard {
                table = table.column_wildcard(
                    ColumnWildcard::builder()
                        .set_excluded_column_names(Some(excluded.clone()))
                        .build(),
                );
            }
            builder.table_with_columns(
                table
                    .build()
                    .map_err(|e| build_error("table-with-columns resource", e))?,
            )
        }
        LfResource::DataLocation {
            catalog_id,
            resource_arn,
        } => builder.data_location(
            DataLocationResource::builder()
                .set_catalog_id(catalog_id.clone())
                .resource_arn(resource_arn)
                .build()
                .map_err(|e| build_error("data location resource", e))?,
        ),
        LfResource::Unsupported(kind) => {
            return Err(Error::validation_invalid_argument(
                "resource",
                format!("Lake Formation resource kind '{}' is not supported", kind),
                None,
                None,
            ))
        }
    };
    Ok(built.build())
}

fn from_sdk_resource(resource: &Resource) -> LfResource {
    if resource.catalog().is_some() {
        return LfResource::Catalog;
    }
    if let Some(db) = resource.database() {
        return LfResource::Database {
            catalog_id: db.catalog_id().owned(),
            name: db.name().owned().unwrap_or_default(),
        };
    }
    if let Some(table) = resource.table() {
        return LfResource::Table {
            catalog_id: table.catalog_id().owned(),
            database_name: table.database_name().owned().unwrap_or_default(),
            name: table.name().owned(),
            table_wildcard: table.table_wildcard().is_some(),
        };
    }
    if let Some(table) = resource.table_with_columns() {
        return LfResource::TableWithColumns {
            catalog_id: table.catalog_id().owned(),
            database_name: table.database_name().owned().unwrap_or_default(),
            name: table.name().owned().unwrap_or_default(),
            column_names: table.column_names().to_vec(),
            column_wildcard: table
                .column_wildcard()
                .map(|w| w.excluded_column_names().to_vec()),
        };
    }
    if let Some(location) = resource.data_location() {
        return LfResource::DataLocation {
            catalog_id: location.catalog_id().owned(),
            resource_arn: location.resource_arn().owned().unwrap_or_default(),
        };
    }
    if resource.lf_tag().is_some() || resource.lf_tag_policy().is_some() {
        return LfResource::Unsupported("LFTag".to_string());
    }
    if resource.data_cells_filter().is_some() {
        return LfResource::Unsupported("DataCellsFilter".to_string());
    }
    LfResource::Unsupported("Unknown".to_string())
}

fn permission_names(permissions: &[Permission]) -> Vec<String> {
    permissions.iter().map(|p| p.as_str().to_string()).collect()
}

fn to_permissions(names: &[String]) -> Vec<Permission> {
    names.iter().map(|n| Permission::from(n.as_str())).collect()
}

impl LakeFormation for SdkLakeFormation {
    fn list_permissions(&self, filter: &PermissionFilter) -> Result<Vec<PrincipalPermissions>> {
        let resource = filter.resource.as_ref().map(to_sdk_resource).transpose()?;

        let mut entries = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_permissions()
                        .set_principal(filter.principal.as_deref().map(principal))
                        .set_resource(resource.clone())
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("lakeformation", "ListPermissions", e))?;

            for entry in output.principal_resource_permissions() {
                let Some(resource) = entry.resource() else {
                    continue;
                };
                entries.push(PrincipalPermissions {
                    principal: entry
                        .principal()
                        .and_then(|p| p.data_lake_principal_identifier())
                        .owned()
                        .unwrap_or_default(),
                    resource: from_sdk_resource(resource),
                    permissions: permission_names(entry.permissions()),
                    permissions_with_grant_option: permission_names(
                        entry.permissions_with_grant_option(),
                    ),
                });
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(entries)
    }

    fn list_opt_ins(&self, principal_arn: &str, resource: Option<&LfResource>) -> Result<Vec<LfResource>> {
        let resource = resource.map(to_sdk_resource).transpose()?;

        let mut resources = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_lake_formation_opt_ins()
                        .principal(principal(principal_arn))
                        .set_resource(resource.clone())
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("lakeformation", "ListLakeFormationOptIns", e))?;

            resources.extend(
                output
                    .lake_formation_opt_ins_info_list()
                    .iter()
                    .filter_map(|info| info.resource())
                    .map(from_sdk_resource),
            );

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(resources)
    }

    fn create_opt_in(&self, principal_arn: &str, resource: &LfResource) -> Result<()> {
        let resource = to_sdk_resource(resource)?;
        self.session
            .block_on(
                self.client
                    .create_lake_formation_opt_in()
                    .principal(principal(principal_arn))
                    .resource(resource)
                    .send(),
            )
            .map_err(|e| sdk_error("lakeformation", "CreateLakeFormationOptIn", e))?;
        Ok(())
    }

    fn grant_permissions(
        &self,
        principal_arn: &str,
        resource: &LfResource,
        permissions: &[String],
        grantable: &[String],
    ) -> Result<()> {
        let resource = to_sdk_resource(resource)?;
        self.session
            .block_on(
                self.client
                    .grant_permissions()
                    .principal(principal(principal_arn))
                    .resource(resource)
                    .set_permissions(Some(to_permissions(permissions)))
                    .set_permissions_with_grant_option(Some(to_permissions(grantable)))
                    .send(),
            )
            .map_err(|e| sdk_error("lakeformation", "GrantPermissions", e))?;
        Ok(())
    }

    fn list_resources(&self, role_arn: Option<&str>) -> Result<Vec<RegisteredResource>> {
        let filters = role_arn.map(|arn| {
            vec![FilterCondition::builder()
                .field(FieldNameString::RoleArn)
                .comparison_operator(ComparisonOperator::Eq)
                .string_value_list(arn)
                .build()]
        });

        let mut resources = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_resources()
                        .set_filter_condition_list(filters.clone())
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("lakeformation", "ListResources", e))?;

            for info in output.resource_info_list() {
                if let Some(resource_arn) = info.resource_arn().owned() {
                    resources.push(RegisteredResource {
                        resource_arn,
                        role_arn: info.role_arn().owned(),
                    });
                }
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(resources)
    }

    fn register_resource(&self, request: &RegisterResource) -> Result<()> {
        let mut call = self
            .client
            .register_resource()
            .resource_arn(&request.resource_arn)
            .set_role_arn(request.role_arn.clone());
        if request.use_service_linked_role {
            call = call.use_service_linked_role(true);
        }
        if request.hybrid_access_enabled {
            call = call.hybrid_access_enabled(true);
        }
        if request.with_privileged_access {
            call = call.with_privileged_access(true);
        }
        self.session
            .block_on(call.send())
            .map_err(|e| sdk_error("lakeformation", "RegisterResource", e))?;
        Ok(())
    }

    fn update_resource(&self, resource_arn: &str, role_arn: &str) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .update_resource()
                    .resource_arn(resource_arn)
                    .role_arn(role_arn)
                    .send(),
            )
            .map_err(|e| sdk_error("lakeformation", "UpdateResource", e))?;
        Ok(())
    }

    fn data_lake_admins(&self) -> Result<DataLakeAdmins> {
        let output = self
            .session
            .block_on(self.client.get_data_lake_settings().send())
            .map_err(|e| sdk_error("lakeformation", "GetDataLakeSettings", e))?;

        let Some(settings) = output.data_lake_settings() else {
            return Ok(DataLakeAdmins::default());
        };
        let identifiers = |list: &[DataLakePrincipal]| -> Vec<String> {
            list.iter()
                .filter_map(|p| p.data_lake_principal_identifier().owned())
                .collect()
        };

        Ok(DataLakeAdmins {
            admins: identifiers(settings.data_lake_admins()),
            read_only_admins: identifiers(settings.read_only_admins()),
        })
    }

    fn set_read_only_admins(&self, principals: &[String]) -> Result<()> {
        let output = self
            .session
            .block_on(self.client.get_data_lake_settings().send())
            .map_err(|e| sdk_error("lakeformation", "GetDataLakeSettings", e))?;

        let mut settings = output
            .data_lake_settings()
            .cloned()
            .unwrap_or_else(|| aws_sdk_lakeformation::types::DataLakeSettings::builder().build());
        settings.read_only_admins = Some(principals.iter().map(|p| principal(p)).collect());

        self.session
            .block_on(
                self.client
                    .put_data_lake_settings()
                    .data_lake_settings(settings)
                    .send(),
            )
            .map_err(|e| sdk_error("lakeformation", "PutDataLakeSettings", e))?;
        Ok(())
    }
}
