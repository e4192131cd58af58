use aws_sdk_athena::types::Tag;

use super::session::{sdk_error, AwsSession};
use super::{Athena, NamedQuery, OwnedField};
use crate::{Error, Result};

pub struct SdkAthena {
    session: AwsSession,
    client: aws_sdk_athena::Client,
}

impl SdkAthena {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_athena::Client) -> Self {
        Self { session, client }
    }
}

impl Athena for SdkAthena {
    fn list_named_query_ids(&self, workgroup: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_named_queries()
                        .work_group(workgroup)
                        .set_next_token(next_token.take())
                        .send(),
                )
                .map_err(|e| sdk_error("athena", "ListNamedQueries", e))?;

            ids.extend(output.named_query_ids().iter().cloned());
            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(ids)
    }

    fn get_named_query(&self, query_id: &str) -> Result<NamedQuery> {
        let output = self
            .session
            .block_on(self.client.get_named_query().named_query_id(query_id).send())
            .map_err(|e| sdk_error("athena", "GetNamedQuery", e))?;

        let query = output.named_query().ok_or_else(|| {
            Error::aws_service("athena", "GetNamedQuery", None, format!("no query returned for {}", query_id))
        })?;

        Ok(NamedQuery {
            id: query_id.to_string(),
            name: query.name().owned().unwrap_or_default(),
            query_string: query.query_string().owned().unwrap_or_default(),
        })
    }

    fn tag_resource(&self, resource_arn: &str, key: &str, value: &str) -> Result<()> {
        let tag = Tag::builder().key(key).value(value).build();
        self.session
            .block_on(
                self.client
                    .tag_resource()
                    .resource_arn(resource_arn)
                    .tags(tag)
                    .send(),
            )
            .map_err(|e| sdk_error("athena", "TagResource", e))?;
        Ok(())
    }
}
