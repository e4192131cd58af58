//! SDK configuration and the blocking bridge onto the async AWS SDK.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};
use tokio::runtime::Runtime;

use super::athena::SdkAthena;
use super::codecommit::SdkCodeCommit;
use super::datazone::SdkDataZone;
use super::emr::SdkEmrWorkspaces;
use super::glue::SdkGlue;
use super::iam::SdkIam;
use super::lakeformation::SdkLakeFormation;
use super::s3::SdkS3;
use super::s3tables::SdkS3Tables;
use super::sagemaker::SdkSageMaker;
use super::sigv4::SigningCredentials;
use crate::{Error, Result};

/// Loaded AWS configuration plus the runtime used to drive SDK futures.
///
/// Commands are synchronous; every SDK call goes through [`AwsSession::block_on`].
#[derive(Clone)]
pub struct AwsSession {
    runtime: Arc<Runtime>,
    config: SdkConfig,
}

impl AwsSession {
    /// Resolve configuration from the default provider chain, with optional
    /// explicit region and named profile.
    pub fn connect(region: Option<&str>, profile: Option<&str>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::internal_unexpected(format!("Failed to start async runtime: {}", e)))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = runtime.block_on(loader.load());

        Ok(Self {
            runtime: Arc::new(runtime),
            config,
        })
    }

    pub fn region(&self) -> Option<String> {
        self.config.region().map(|r| r.to_string())
    }

    /// Region, failing with a hint when none could be resolved.
    pub fn require_region(&self) -> Result<String> {
        self.region().ok_or_else(|| {
            Error::validation_missing_argument(vec!["region".to_string()])
                .with_hint("Pass --region or set AWS_REGION / a profile region")
        })
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub(crate) fn signing_credentials(&self) -> Result<SigningCredentials> {
        let provider = self.config.credentials_provider().ok_or_else(|| {
            Error::aws_service("sts", "ResolveCredentials", None, "no credentials provider configured")
        })?;
        let credentials = self
            .block_on(provider.provide_credentials())
            .map_err(|e| Error::aws_service("sts", "ResolveCredentials", None, e.to_string()))?;

        Ok(SigningCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().map(str::to_string),
        })
    }

    pub fn athena(&self) -> SdkAthena {
        SdkAthena::new(self.clone(), aws_sdk_athena::Client::new(&self.config))
    }

    pub fn codecommit(&self) -> SdkCodeCommit {
        SdkCodeCommit::new(self.clone(), aws_sdk_codecommit::Client::new(&self.config))
    }

    pub fn datazone(&self) -> SdkDataZone {
        SdkDataZone::new(self.clone(), aws_sdk_datazone::Client::new(&self.config))
    }

    pub fn iam(&self) -> SdkIam {
        SdkIam::new(self.clone(), aws_sdk_iam::Client::new(&self.config))
    }

    pub fn lakeformation(&self) -> SdkLakeFormation {
        SdkLakeFormation::new(self.clone(), aws_sdk_lakeformation::Client::new(&self.config))
    }

    pub fn glue(&self) -> SdkGlue {
        SdkGlue::new(self.clone(), aws_sdk_glue::Client::new(&self.config))
    }

    pub fn s3tables(&self) -> SdkS3Tables {
        SdkS3Tables::new(self.clone(), aws_sdk_s3tables::Client::new(&self.config))
    }

    pub fn sagemaker(&self) -> SdkSageMaker {
        SdkSageMaker::new(self.clone(), aws_sdk_sagemaker::Client::new(&self.config))
    }

    pub fn s3(&self) -> SdkS3 {
        SdkS3::new(self.clone(), aws_sdk_s3::Client::new(&self.config))
    }

    pub fn emr_workspaces(&self, timeout: Duration) -> Result<SdkEmrWorkspaces> {
        let region = self.require_region()?;
        SdkEmrWorkspaces::new(self.clone(), region, timeout)
    }
}

/// Convert an SDK error into a crate error, keeping the provider error code.
pub(crate) fn sdk_error<E>(service: &str, operation: &str, err: E) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    Error::aws_service(service, operation, code, message)
}
