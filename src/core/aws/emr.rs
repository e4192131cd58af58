use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::session::AwsSession;
use super::sigv4::{sign_request, RequestToSign};
use super::EmrWorkspaces;
use crate::{Error, Result};

const SERVICE: &str = "elasticmapreduce";
const TARGET: &str = "ElasticMapReduce.DescribeEditorPrivate";
const OPERATION: &str = "DescribeEditorPrivate";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeEditorResponse {
    editor: Editor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Editor {
    location_uri: String,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceFault {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// EMR Studio workspaces ("editors") through the private JSON endpoint.
pub struct SdkEmrWorkspaces {
    session: AwsSession,
    region: String,
    http: Client,
}

impl SdkEmrWorkspaces {
    pub(crate) fn new(session: AwsSession, region: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("smus-migrate/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))?;
        Ok(Self {
            session,
            region,
            http,
        })
    }

    fn host(&self) -> String {
        format!("{}.{}.amazonaws.com", SERVICE, self.region)
    }
}

fn location_from_response(body: &str, workspace_id: &str) -> Result<String> {
    let parsed: DescribeEditorResponse = serde_json::from_str(body).map_err(|e| {
        Error::internal_json(e.to_string(), Some("parse DescribeEditorPrivate response".to_string()))
    })?;
    Ok(format!("{}/{}/", parsed.editor.location_uri, workspace_id))
}

fn fault_from_response(status: u16, body: &str) -> Error {
    let fault: ServiceFault = serde_json::from_str(body).unwrap_or_default();
    // __type may be namespaced: "com.amazon...#ResourceNotFoundException"
    let code = fault
        .kind
        .map(|k| k.rsplit('#').next().unwrap_or(&k).to_string());
    let message = fault
        .message
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
    Error::aws_service("emr", OPERATION, code, message)
}

impl EmrWorkspaces for SdkEmrWorkspaces {
    fn workspace_storage_location(&self, workspace_id: &str) -> Result<String> {
        let credentials = self.session.signing_credentials()?;
        let host = self.host();
        let body = serde_json::json!({ "EditorId": workspace_id }).to_string();

        let headers = sign_request(
            &RequestToSign {
                method: "POST",
                service: SERVICE,
                host: &host,
                region: &self.region,
                canonical_uri: "/",
                target: TARGET,
                body: &body,
            },
            &credentials,
            Utc::now(),
        )?;

        log_status!(
            "emr",
            "Getting storage location for workspace {} in {}",
            workspace_id,
            self.region
        );

        let mut request = self.http.post(format!("https://{}/", host)).body(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                Error::aws_timeout(format!("{} timed out: {}", OPERATION, e), 1)
            } else {
                Error::aws_service("emr", OPERATION, None, e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::internal_io(e.to_string(), Some("read EMR response".to_string())))?;

        if !status.is_success() {
            return Err(fault_from_response(status.as_u16(), &text));
        }
        location_from_response(&text, workspace_id)
    }
}
