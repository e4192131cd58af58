use aws_sdk_iam::types::Tag;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use super::session::{sdk_error, AwsSession};
use super::{Iam, IamRole, ManagedPolicy, OwnedField, RoleTag};
use crate::{Error, Result};

pub struct SdkIam {
    session: AwsSession,
    client: aws_sdk_iam::Client,
}

impl SdkIam {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_iam::Client) -> Self {
        Self { session, client }
    }
}

/// IAM returns policy documents URL-encoded.
pub(crate) fn decode_policy_document(raw: &str, context: &str) -> Result<Value> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|e| Error::internal_json(e.to_string(), Some(format!("decode {}", context))))?;
    serde_json::from_str(&decoded)
        .map_err(|e| Error::internal_json(e.to_string(), Some(format!("parse {}", context))))
}

fn to_json(document: &Value, context: &str) -> Result<String> {
    serde_json::to_string(document)
        .map_err(|e| Error::internal_json(e.to_string(), Some(format!("serialize {}", context))))
}

impl Iam for SdkIam {
    fn list_role_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(self.client.list_roles().set_marker(marker.take()).send())
                .map_err(|e| sdk_error("iam", "ListRoles", e))?;

            names.extend(output.roles().iter().filter_map(|r| r.role_name().owned()));

            match output.marker() {
                Some(m) => marker = Some(m.to_string()),
                None => break,
            }
        }
        Ok(names)
    }

    fn get_role(&self, role_name: &str) -> Result<IamRole> {
        let output = self
            .session
            .block_on(self.client.get_role().role_name(role_name).send())
            .map_err(|e| sdk_error("iam", "GetRole", e))?;

        let role = output
            .role()
            .ok_or_else(|| Error::role_not_found(role_name, None))?;

        let trust_policy = match role.assume_role_policy_document() {
            Some(doc) => decode_policy_document(doc, "assume role policy")?,
            None => serde_json::json!({ "Version": "2012-10-17", "Statement": [] }),
        };

        Ok(IamRole {
            name: role.role_name().owned().unwrap_or_else(|| role_name.to_string()),
            arn: role.arn().owned().unwrap_or_default(),
            trust_policy,
        })
    }

    fn update_assume_role_policy(&self, role_name: &str, document: &Value) -> Result<()> {
        let body = to_json(document, "trust policy")?;
        self.session
            .block_on(
                self.client
                    .update_assume_role_policy()
                    .role_name(role_name)
                    .policy_document(body)
                    .send(),
            )
            .map_err(|e| sdk_error("iam", "UpdateAssumeRolePolicy", e))?;
        Ok(())
    }

    fn list_attached_policy_arns(&self, role_name: &str) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_attached_role_policies()
                        .role_name(role_name)
                        .set_marker(marker.take())
                        .send(),
                )
                .map_err(|e| sdk_error("iam", "ListAttachedRolePolicies", e))?;

            arns.extend(output.attached_policies().iter().filter_map(|p| p.policy_arn().owned()));

            match output.marker() {
                Some(m) => marker = Some(m.to_string()),
                None => break,
            }
        }
        Ok(arns)
    }

    fn get_policy(&self, policy_arn: &str) -> Result<ManagedPolicy> {
        let output = self
            .session
            .block_on(self.client.get_policy().policy_arn(policy_arn).send())
            .map_err(|e| sdk_error("iam", "GetPolicy", e))?;

        let policy = output.policy().ok_or_else(|| {
            Error::aws_service("iam", "GetPolicy", None, format!("no policy returned for {}", policy_arn))
        })?;

        Ok(ManagedPolicy {
            arn: policy_arn.to_string(),
            name: policy.policy_name().owned().unwrap_or_default(),
            default_version_id: policy.default_version_id().owned().unwrap_or_default(),
        })
    }

    fn get_policy_document(&self, policy_arn: &str, version_id: &str) -> Result<Value> {
        let output = self
            .session
            .block_on(
                self.client
                    .get_policy_version()
                    .policy_arn(policy_arn)
                    .version_id(version_id)
                    .send(),
            )
            .map_err(|e| sdk_error("iam", "GetPolicyVersion", e))?;

        let raw = output
            .policy_version()
            .and_then(|v| v.document())
            .ok_or_else(|| {
                Error::aws_service(
                    "iam",
                    "GetPolicyVersion",
                    None,
                    format!("no document for {} version {}", policy_arn, version_id),
                )
            })?;

        decode_policy_document(raw, "managed policy document")
    }

    fn create_default_policy_version(&self, policy_arn: &str, document: &str) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .create_policy_version()
                    .policy_arn(policy_arn)
                    .policy_document(document)
                    .set_as_default(true)
                    .send(),
            )
            .map_err(|e| sdk_error("iam", "CreatePolicyVersion", e))?;
        Ok(())
    }

    fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .attach_role_policy()
                    .role_name(role_name)
                    .policy_arn(policy_arn)
                    .send(),
            )
            .map_err(|e| sdk_error("iam", "AttachRolePolicy", e))?;
        Ok(())
    }

    fn list_inline_policy_names(&self, role_name: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_role_policies()
                        .role_name(role_name)
                        .set_marker(marker.take())
                        .send(),
                )
                .map_err(|e| sdk_error("iam", "ListRolePolicies", e))?;

            names.extend(output.policy_names().iter().cloned());

            match output.marker() {
                Some(m) => marker = Some(m.to_string()),
                None => break,
            }
        }
        Ok(names)
    }

    fn get_inline_policy(&self, role_name: &str, policy_name: &str) -> Result<Value> {
        let output = self
            .session
            .block_on(
                self.client
                    .get_role_policy()
                    .role_name(role_name)
                    .policy_name(policy_name)
                    .send(),
            )
            .map_err(|e| sdk_error("iam", "GetRolePolicy", e))?;

        let raw = output.policy_document().owned().unwrap_or_default();
        decode_policy_document(&raw, "inline policy document")
    }

    fn put_inline_policy(&self, role_name: &str, policy_name: &str, document: &Value) -> Result<()> {
        let body = to_json(document, "inline policy")?;
        self.session
            .block_on(
                self.client
                    .put_role_policy()
                    .role_name(role_name)
                    .policy_name(policy_name)
                    .policy_document(body)
                    .send(),
            )
            .map_err(|e| sdk_error("iam", "PutRolePolicy", e))?;
        Ok(())
    }

    fn list_role_tags(&self, role_name: &str) -> Result<Vec<RoleTag>> {
        let mut tags = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_role_tags()
                        .role_name(role_name)
                        .set_marker(marker.take())
                        .send(),
                )
                .map_err(|e| sdk_error("iam", "ListRoleTags", e))?;

            for tag in output.tags() {
                tags.push(RoleTag {
                    key: tag.key().owned().unwrap_or_default(),
                    value: tag.value().owned().unwrap_or_default(),
                });
            }

            match output.marker() {
                Some(m) => marker = Some(m.to_string()),
                None => break,
            }
        }
        Ok(tags)
    }

    fn tag_role(&self, role_name: &str, tags: &[RoleTag]) -> Result<()> {
        let mut request = self.client.tag_role().role_name(role_name);
        for tag in tags {
            let sdk_tag = Tag::builder()
                .key(&tag.key)
                .value(&tag.value)
                .build()
                .map_err(|e| Error::internal_unexpected(format!("build IAM tag: {}", e)))?;
            request = request.tags(sdk_tag);
        }
        self.session
            .block_on(request.send())
            .map_err(|e| sdk_error("iam", "TagRole", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_url_encoded_trust_policy() {
        let raw = "%7B%22Version%22%3A%222012-10-17%22%2C%22Statement%22%3A%5B%5D%7D";
        let doc = decode_policy_document(raw, "trust policy").unwrap();
        assert_eq!(doc, json!({"Version": "2012-10-17", "Statement": []}));
    }

    #[test]
    fn plain_json_passes_through() {
        let doc = decode_policy_document(r#"{"Statement":[]}"#, "policy").unwrap();
        assert_eq!(doc, json!({"Statement": []}));
    }

    #[test]
    fn invalid_document_is_json_error() {
        let err = decode_policy_document("not json", "policy").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.json_error");
    }
}
