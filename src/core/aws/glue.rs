use aws_sdk_glue::types::{CatalogInput, FederatedCatalog as SdkFederatedCatalog, Table};

use super::session::{sdk_error, AwsSession};
use super::{FederatedCatalog, Glue, GlueTable, OwnedField};
use crate::{Error, Result};

pub struct SdkGlue {
    session: AwsSession,
    client: aws_sdk_glue::Client,
}

impl SdkGlue {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_glue::Client) -> Self {
        Self { session, client }
    }
}

fn to_glue_table(table: &Table) -> GlueTable {
    GlueTable {
        name: table.name().owned().unwrap_or_default(),
        location: table
            .storage_descriptor()
            .and_then(|sd| sd.location())
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    }
}

impl Glue for SdkGlue {
    fn get_table(&self, database: &str, table: &str) -> Result<GlueTable> {
        let output = self
            .session
            .block_on(
                self.client
                    .get_table()
                    .database_name(database)
                    .name(table)
                    .send(),
            )
            .map_err(|e| sdk_error("glue", "GetTable", e))?;

        output.table().map(to_glue_table).ok_or_else(|| {
            Error::aws_service(
                "glue",
                "GetTable",
                Some("EntityNotFoundException".to_string()),
                format!("table {}.{} not returned", database, table),
            )
        })
    }

    fn get_tables(&self, database: &str) -> Result<Vec<GlueTable>> {
        let mut tables = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .get_tables()
                        .database_name(database)
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("glue", "GetTables", e))?;

            tables.extend(output.table_list().iter().map(to_glue_table));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(tables)
    }

    fn create_federated_catalog(&self, catalog: &FederatedCatalog) -> Result<()> {
        let input = CatalogInput::builder()
            .federated_catalog(
                SdkFederatedCatalog::builder()
                    .identifier(&catalog.identifier)
                    .connection_name(&catalog.connection_name)
                    .build(),
            )
            .set_create_database_default_permissions(Some(Vec::new()))
            .set_create_table_default_permissions(Some(Vec::new()))
            .build();

        self.session
            .block_on(
                self.client
                    .create_catalog()
                    .name(&catalog.name)
                    .catalog_input(input)
                    .send(),
            )
            .map_err(|e| sdk_error("glue", "CreateCatalog", e))?;
        Ok(())
    }
}
