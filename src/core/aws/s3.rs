use super::session::{sdk_error, AwsSession};
use super::{OwnedField, S3};
use crate::{Error, Result};

pub struct SdkS3 {
    session: AwsSession,
    client: aws_sdk_s3::Client,
}

impl SdkS3 {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_s3::Client) -> Self {
        Self { session, client }
    }
}

impl S3 for SdkS3 {
    fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_objects_v2()
                        .bucket(bucket)
                        .prefix(prefix)
                        .set_continuation_token(continuation.take())
                        .send(),
                )
                .map_err(|e| sdk_error("s3", "ListObjectsV2", e))?;

            keys.extend(output.contents().iter().filter_map(|o| o.key().owned()));

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string())
                }
                _ => break,
            }
        }
        Ok(keys)
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.session.block_on(async {
            let output = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| sdk_error("s3", "GetObject", e))?;

            let body = output.body.collect().await.map_err(|e| {
                Error::aws_service("s3", "GetObject", None, format!("read s3://{}/{}: {}", bucket, key, e))
            })?;
            Ok(body.into_bytes().to_vec())
        })
    }
}
