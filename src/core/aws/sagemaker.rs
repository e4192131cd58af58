use aws_sdk_sagemaker::types::{AppType, DefaultSpaceSettings, UserSettings};

use super::session::{sdk_error, AwsSession};
use super::{AppOwner, OwnedField, SageMaker, SageMakerApp, SageMakerDomain};
use crate::Result;

pub struct SdkSageMaker {
    session: AwsSession,
    client: aws_sdk_sagemaker::Client,
}

impl SdkSageMaker {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_sagemaker::Client) -> Self {
        Self { session, client }
    }
}

impl SageMaker for SdkSageMaker {
    fn list_domains(&self) -> Result<Vec<SageMakerDomain>> {
        let mut domains = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_domains()
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("sagemaker", "ListDomains", e))?;

            for domain in output.domains() {
                if let Some(id) = domain.domain_id().owned() {
                    domains.push(SageMakerDomain {
                        id,
                        name: domain.domain_name().owned().unwrap_or_default(),
                    });
                }
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(domains)
    }

    fn list_apps(&self, domain_id: &str) -> Result<Vec<SageMakerApp>> {
        let mut apps = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_apps()
                        .domain_id_equals(domain_id)
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("sagemaker", "ListApps", e))?;

            for app in output.apps() {
                let owner = match (app.user_profile_name(), app.space_name()) {
                    (Some(profile), _) => Some(AppOwner::UserProfile(profile.to_string())),
                    (None, Some(space)) => Some(AppOwner::Space(space.to_string())),
                    (None, None) => None,
                };
                apps.push(SageMakerApp {
                    name: app.app_name().owned().unwrap_or_default(),
                    app_type: app.app_type().owned().unwrap_or_default(),
                    owner,
                });
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(apps)
    }

    fn delete_app(&self, domain_id: &str, app: &SageMakerApp, owner: &AppOwner) -> Result<()> {
        let mut request = self
            .client
            .delete_app()
            .domain_id(domain_id)
            .app_type(AppType::from(app.app_type.as_str()))
            .app_name(&app.name);
        request = match owner {
            AppOwner::UserProfile(profile) => request.user_profile_name(profile),
            AppOwner::Space(space) => request.space_name(space),
        };

        self.session
            .block_on(request.send())
            .map_err(|e| sdk_error("sagemaker", "DeleteApp", e))?;
        Ok(())
    }

    fn app_status(&self, domain_id: &str, app: &SageMakerApp, owner: &AppOwner) -> Result<String> {
        let mut request = self
            .client
            .describe_app()
            .domain_id(domain_id)
            .app_type(AppType::from(app.app_type.as_str()))
            .app_name(&app.name);
        request = match owner {
            AppOwner::UserProfile(profile) => request.user_profile_name(profile),
            AppOwner::Space(space) => request.space_name(space),
        };

        let output = self
            .session
            .block_on(request.send())
            .map_err(|e| sdk_error("sagemaker", "DescribeApp", e))?;
        Ok(output.status().owned().unwrap_or_default())
    }

    fn update_domain_execution_role(&self, domain_id: &str, role_arn: &str) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .update_domain()
                    .domain_id(domain_id)
                    .default_user_settings(UserSettings::builder().execution_role(role_arn).build())
                    .default_space_settings(
                        DefaultSpaceSettings::builder().execution_role(role_arn).build(),
                    )
                    .send(),
            )
            .map_err(|e| sdk_error("sagemaker", "UpdateDomain", e))?;
        Ok(())
    }
}
