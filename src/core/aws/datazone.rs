use aws_sdk_datazone::types::{
    AthenaPropertiesPatch, ConnectionPropertiesPatch, ConnectionType, GrantedEntityInput,
    ListingRevisionInput,
};

use super::session::{sdk_error, AwsSession};
use super::{DataZone, EnvironmentSummary, OwnedField, ProvisionedResource, SubscriptionGrant};
use crate::{Error, Result};

pub struct SdkDataZone {
    session: AwsSession,
    client: aws_sdk_datazone::Client,
}

impl SdkDataZone {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_datazone::Client) -> Self {
        Self { session, client }
    }
}

impl DataZone for SdkDataZone {
    fn list_environments(&self, domain_id: &str, project_id: &str) -> Result<Vec<EnvironmentSummary>> {
        let mut environments = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_environments()
                        .domain_identifier(domain_id)
                        .project_identifier(project_id)
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("datazone", "ListEnvironments", e))?;

            for env in output.items() {
                if let Some(id) = env.id().owned() {
                    environments.push(EnvironmentSummary {
                        id,
                        name: env.name().owned().unwrap_or_default(),
                    });
                }
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(environments)
    }

    fn environment_resources(
        &self,
        domain_id: &str,
        environment_id: &str,
    ) -> Result<Vec<ProvisionedResource>> {
        let output = self
            .session
            .block_on(
                self.client
                    .get_environment()
                    .domain_identifier(domain_id)
                    .identifier(environment_id)
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "GetEnvironment", e))?;

        Ok(output
            .provisioned_resources()
            .iter()
            .filter_map(|r| {
                Some(ProvisionedResource {
                    name: r.name().owned()?,
                    value: r.value().owned()?,
                })
            })
            .collect())
    }

    fn list_connections(&self, domain_id: &str, project_id: &str, kind: &str) -> Result<Vec<String>> {
        let output = self
            .session
            .block_on(
                self.client
                    .list_connections()
                    .domain_identifier(domain_id)
                    .project_identifier(project_id)
                    .r#type(ConnectionType::from(kind))
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "ListConnections", e))?;

        Ok(output
            .items()
            .iter()
            .filter_map(|c| c.connection_id().owned())
            .collect())
    }

    fn update_connection_workgroup(
        &self,
        domain_id: &str,
        connection_id: &str,
        workgroup: &str,
    ) -> Result<()> {
        let props = ConnectionPropertiesPatch::AthenaProperties(
            AthenaPropertiesPatch::builder().workgroup_name(workgroup).build(),
        );
        self.session
            .block_on(
                self.client
                    .update_connection()
                    .domain_identifier(domain_id)
                    .identifier(connection_id)
                    .props(props)
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "UpdateConnection", e))?;
        Ok(())
    }

    fn list_subscription_targets(&self, domain_id: &str, environment_id: &str) -> Result<Vec<String>> {
        let mut targets = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_subscription_targets()
                        .domain_identifier(domain_id)
                        .environment_identifier(environment_id)
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("datazone", "ListSubscriptionTargets", e))?;

            targets.extend(output.items().iter().filter_map(|t| t.id().owned()));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(targets)
    }

    fn list_subscription_grants(&self, domain_id: &str, target_id: &str) -> Result<Vec<SubscriptionGrant>> {
        let mut grants = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_subscription_grants()
                        .domain_identifier(domain_id)
                        .subscription_target_id(target_id)
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("datazone", "ListSubscriptionGrants", e))?;

            for grant in output.items() {
                let Some(id) = grant.id().owned() else {
                    continue;
                };
                let listing = grant.granted_entity().and_then(|e| e.as_listing().ok());
                grants.push(SubscriptionGrant {
                    id,
                    listing_id: listing.and_then(|l| l.id().owned()),
                    listing_revision: listing.and_then(|l| l.revision().owned()),
                });
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(grants)
    }

    fn delete_subscription_grant(&self, domain_id: &str, grant_id: &str) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .delete_subscription_grant()
                    .domain_identifier(domain_id)
                    .identifier(grant_id)
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "DeleteSubscriptionGrant", e))?;
        Ok(())
    }

    fn subscription_grant_status(&self, domain_id: &str, grant_id: &str) -> Result<String> {
        let output = self
            .session
            .block_on(
                self.client
                    .get_subscription_grant()
                    .domain_identifier(domain_id)
                    .identifier(grant_id)
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "GetSubscriptionGrant", e))?;

        Ok(output.status().owned().unwrap_or_default())
    }

    fn update_subscription_target_principals(
        &self,
        domain_id: &str,
        environment_id: &str,
        target_id: &str,
        principals: &[String],
    ) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .update_subscription_target()
                    .domain_identifier(domain_id)
                    .environment_identifier(environment_id)
                    .identifier(target_id)
                    .set_authorized_principals(Some(principals.to_vec()))
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "UpdateSubscriptionTarget", e))?;
        Ok(())
    }

    fn create_subscription_grant(
        &self,
        domain_id: &str,
        environment_id: &str,
        target_id: &str,
        listing_id: &str,
        listing_revision: &str,
    ) -> Result<String> {
        let listing = ListingRevisionInput::builder()
            .identifier(listing_id)
            .revision(listing_revision)
            .build()
            .map_err(|e| Error::internal_unexpected(format!("build listing revision: {}", e)))?;

        let output = self
            .session
            .block_on(
                self.client
                    .create_subscription_grant()
                    .domain_identifier(domain_id)
                    .environment_identifier(environment_id)
                    .subscription_target_identifier(target_id)
                    .granted_entity(GrantedEntityInput::Listing(listing))
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "CreateSubscriptionGrant", e))?;

        Ok(output.id().owned().unwrap_or_default())
    }

    fn associate_environment_role(&self, domain_id: &str, environment_id: &str, role_arn: &str) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .associate_environment_role()
                    .domain_identifier(domain_id)
                    .environment_identifier(environment_id)
                    .environment_role_arn(role_arn)
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "AssociateEnvironmentRole", e))?;
        Ok(())
    }

    fn disassociate_environment_role(
        &self,
        domain_id: &str,
        environment_id: &str,
        role_arn: &str,
    ) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .disassociate_environment_role()
                    .domain_identifier(domain_id)
                    .environment_identifier(environment_id)
                    .environment_role_arn(role_arn)
                    .send(),
            )
            .map_err(|e| sdk_error("datazone", "DisassociateEnvironmentRole", e))?;
        Ok(())
    }
}
