//! Athena saved queries to SQL notebooks in the project repository, and
//! bringing an existing workgroup into a project.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::aws::{Athena, CodeCommit, DataZone, NamedQuery, PutFile};
use crate::error::{Error, Result};
use crate::io;
use crate::repo::{self, CommitResult};

pub const PROJECT_TAG_KEY: &str = "AmazonDataZoneProject";
pub const ATHENA_CONNECTION_TYPE: &str = "ATHENA";

const BUILTIN_TEMPLATE: &str = r#"{
  "cells": [],
  "metadata": {
    "id": "arn:aws:sqlworkbench:<region>:<aws-account-id>:notebook/<uniqueid>",
    "kernelspec": {
      "display_name": "SQL",
      "language": "sql",
      "name": "sql"
    },
    "language_info": {
      "name": "sql"
    },
    "title": ""
  },
  "nbformat": 4,
  "nbformat_minor": 5
}"#;

/// `.sqlnb` notebook skeleton each saved query is rendered into.
#[derive(Debug, Clone)]
pub struct NotebookTemplate {
    document: Value,
}

impl NotebookTemplate {
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_TEMPLATE, "built-in notebook template")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_file(path, "read notebook template")?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Template from `path` when given, the built-in one otherwise.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    fn parse(content: &str, source: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)
            .map_err(|e| Error::validation_invalid_json(e, Some(source.to_string())))?;
        if !document.get("cells").is_some_and(Value::is_array)
            || !document.get("metadata").is_some_and(Value::is_object)
        {
            return Err(Error::validation_invalid_argument(
                "notebookTemplate",
                format!("{} must contain a 'cells' array and a 'metadata' object", source),
                None,
                None,
            ));
        }
        Ok(Self { document })
    }

    /// Notebook for one saved query, serialized as JSON.
    pub fn render(
        &self,
        query: &NamedQuery,
        region: &str,
        account_id: &str,
        unique_id: &str,
    ) -> Result<String> {
        let mut notebook = self.document.clone();
        let cell_id: String = unique_id.chars().take(8).collect();

        let cell = json!({
            "cell_type": "code",
            "execution_count": null,
            "id": cell_id,
            "metadata": {
                "isLimitOn": true,
                "displayMode": "maximized",
                "width": 12
            },
            "outputs": [],
            "source": query.query_string,
        });
        if let Some(cells) = notebook.get_mut("cells").and_then(Value::as_array_mut) {
            cells.push(cell);
        }

        if let Some(metadata) = notebook.get_mut("metadata").and_then(Value::as_object_mut) {
            metadata.insert("title".to_string(), Value::String(query.name.clone()));
            if let Some(id) = metadata.get("id").and_then(Value::as_str) {
                let id = id
                    .replace("<uniqueid>", unique_id)
                    .replace("<region>", region)
                    .replace("<aws-account-id>", account_id);
                metadata.insert("id".to_string(), Value::String(id));
            }
        }

        let mut rendered = serde_json::to_string_pretty(&notebook)
            .map_err(|e| Error::internal_json(e.to_string(), Some("serialize notebook".to_string())))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

pub fn notebook_path(workgroup: &str, query_name: &str) -> String {
    format!("athena_saved_queries/{}/{}.sqlnb", workgroup, query_name)
}

pub fn workgroup_arn(region: &str, account_id: &str, workgroup: &str) -> String {
    format!("arn:aws:athena:{}:{}:workgroup/{}", region, account_id, workgroup)
}

#[derive(Debug, Clone)]
pub struct QueryMigrationRequest<'a> {
    pub workgroup: &'a str,
    pub account_id: &'a str,
    pub region: &'a str,
    pub repository: &'a str,
    pub branch: &'a str,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigratedQuery {
    pub name: String,
    pub query_id: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMigration {
    pub workgroup: String,
    pub queries: Vec<MigratedQuery>,
    pub commit: CommitResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Render every saved query of the workgroup as a notebook and commit them.
pub fn migrate_queries(
    athena: &dyn Athena,
    codecommit: &dyn CodeCommit,
    template: &NotebookTemplate,
    request: &QueryMigrationRequest<'_>,
) -> Result<QueryMigration> {
    let query_ids = athena.list_named_query_ids(request.workgroup)?;
    log_status!(
        "athena",
        "Found {} saved queries in workgroup {}",
        query_ids.len(),
        request.workgroup
    );

    let mut files = Vec::with_capacity(query_ids.len());
    let mut queries = Vec::with_capacity(query_ids.len());
    for query_id in &query_ids {
        let query = athena.get_named_query(query_id)?;
        let unique_id = Uuid::new_v4().to_string();
        let notebook = template.render(&query, request.region, request.account_id, &unique_id)?;
        let path = notebook_path(request.workgroup, &query.name);

        files.push(PutFile {
            path: path.clone(),
            content: notebook.into_bytes(),
        });
        queries.push(MigratedQuery {
            name: query.name,
            query_id: query_id.clone(),
            path,
        });
    }

    let commit = repo::commit_files(
        codecommit,
        request.repository,
        request.branch,
        &files,
        request.batch_size,
    )?;

    let message = if queries.is_empty() {
        Some("No queries to migrate.".to_string())
    } else {
        None
    };

    Ok(QueryMigration {
        workgroup: request.workgroup.to_string(),
        queries,
        commit,
        message,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkgroupBinding {
    pub workgroup_arn: String,
    pub connection_id: String,
}

/// Tag the workgroup with the project and point the project's default Athena
/// connection at it.
pub fn bring_workgroup(
    athena: &dyn Athena,
    datazone: &dyn DataZone,
    workgroup: &str,
    domain_id: &str,
    project_id: &str,
    account_id: &str,
    region: &str,
) -> Result<WorkgroupBinding> {
    let arn = workgroup_arn(region, account_id, workgroup);
    athena.tag_resource(&arn, PROJECT_TAG_KEY, project_id)?;
    log_status!("athena", "Tagged {} with {}={}", arn, PROJECT_TAG_KEY, project_id);

    let connection_id = datazone
        .list_connections(domain_id, project_id, ATHENA_CONNECTION_TYPE)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::connection_not_found(ATHENA_CONNECTION_TYPE, project_id))?;

    datazone.update_connection_workgroup(domain_id, &connection_id, workgroup)?;
    log_status!("datazone", "Connection {} now uses workgroup {}", connection_id, workgroup);

    Ok(WorkgroupBinding {
        workgroup_arn: arn,
        connection_id,
    })
}
