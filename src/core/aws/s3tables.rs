use super::session::{sdk_error, AwsSession};
use super::{OwnedField, S3TableSummary, S3Tables};
use crate::Result;

pub struct SdkS3Tables {
    session: AwsSession,
    client: aws_sdk_s3tables::Client,
}

impl SdkS3Tables {
    pub(crate) fn new(session: AwsSession, client: aws_sdk_s3tables::Client) -> Self {
        Self { session, client }
    }
}

impl S3Tables for SdkS3Tables {
    fn get_table(&self, bucket_arn: &str, namespace: &str, name: &str) -> Result<()> {
        self.session
            .block_on(
                self.client
                    .get_table()
                    .table_bucket_arn(bucket_arn)
                    .namespace(namespace)
                    .name(name)
                    .send(),
            )
            .map_err(|e| sdk_error("s3tables", "GetTable", e))?;
        Ok(())
    }

    fn list_tables(&self, bucket_arn: &str, namespace: Option<&str>) -> Result<Vec<S3TableSummary>> {
        let mut tables = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let output = self
                .session
                .block_on(
                    self.client
                        .list_tables()
                        .table_bucket_arn(bucket_arn)
                        .set_namespace(namespace.map(str::to_string))
                        .set_continuation_token(continuation.take())
                        .send(),
                )
                .map_err(|e| sdk_error("s3tables", "ListTables", e))?;

            for table in output.tables() {
                tables.push(S3TableSummary {
                    name: table.name().owned().unwrap_or_default(),
                    namespace: table.namespace().to_vec(),
                });
            }

            match output.continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }
        Ok(tables)
    }
}
