//! ARN and S3 path parsing.

use crate::error::{Error, Result};

/// Role name from an IAM role ARN (last `/` segment, so paths are dropped).
pub fn role_name_from_arn(role_arn: &str) -> &str {
    role_arn.rsplit('/').next().unwrap_or(role_arn)
}

/// `arn:aws:s3:::bucket/key/` -> `s3://bucket/key`
pub fn s3_arn_to_path(arn: &str) -> Option<String> {
    let (_, rest) = arn.trim_end_matches('/').split_once(":::")?;
    Some(format!("s3://{}", rest))
}

/// `s3://bucket/key` -> `arn:aws:s3:::bucket/key`
pub fn s3_path_to_arn(path: &str) -> String {
    format!("arn:aws:s3:::{}", path.trim_start_matches("s3://"))
}

/// Every ancestor of an S3 path, from the bucket down to the path itself.
///
/// `s3://bucket/a/b/` -> `["s3://bucket", "s3://bucket/a", "s3://bucket/a/b"]`
pub fn s3_subpaths(path: &str) -> Vec<String> {
    let trimmed = path.trim_end_matches('/');
    let Some(rest) = trimmed.strip_prefix("s3://") else {
        return vec![trimmed.to_string()];
    };

    let mut parts = rest.split('/');
    let Some(bucket) = parts.next() else {
        return Vec::new();
    };

    let mut current = format!("s3://{}", bucket);
    let mut paths = vec![current.clone()];
    for part in parts {
        current = format!("{}/{}", current, part);
        paths.push(current.clone());
    }
    paths
}

/// Split `s3://bucket/prefix` into bucket and prefix.
pub fn parse_s3_uri(uri: &str) -> Result<(String, String)> {
    let rest = uri.strip_prefix("s3://").ok_or_else(|| {
        Error::validation_invalid_argument(
            "s3_uri",
            format!("'{}' is not an s3:// URI", uri),
            None,
            None,
        )
    })?;
    match rest.split_once('/') {
        Some((bucket, prefix)) if !bucket.is_empty() => Ok((bucket.to_string(), prefix.to_string())),
        None if !rest.is_empty() => Ok((rest.to_string(), String::new())),
        _ => Err(Error::validation_invalid_argument(
            "s3_uri",
            format!("'{}' has no bucket", uri),
            None,
            None,
        )),
    }
}

/// Parsed `arn:aws:s3tables:<region>:<account>:bucket/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBucketArn {
    pub arn: String,
    pub partition: String,
    pub region: String,
    pub account_id: String,
    pub bucket_name: String,
}

impl TableBucketArn {
    pub fn parse(arn: &str) -> Result<Self> {
        let invalid = |problem: &str| {
            Error::validation_invalid_argument(
                "table_bucket_arn",
                format!("'{}' {}", arn, problem),
                None,
                Some(vec!["arn:aws:s3tables:<region>:<account-id>:bucket/<name>".to_string()]),
            )
        };

        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" {
            return Err(invalid("is not an ARN"));
        }
        if parts[2] != "s3tables" {
            return Err(invalid("is not an S3 Tables ARN"));
        }
        if parts[3].is_empty() || parts[4].is_empty() {
            return Err(invalid("is missing region or account id"));
        }
        let bucket_name = parts[5]
            .strip_prefix("bucket/")
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| invalid("does not name a table bucket"))?;

        Ok(Self {
            arn: arn.to_string(),
            partition: parts[1].to_string(),
            region: parts[3].to_string(),
            account_id: parts[4].to_string(),
            bucket_name: bucket_name.to_string(),
        })
    }

    /// Wildcard resource covering every table bucket in the account and region.
    pub fn all_buckets_arn(&self) -> String {
        format!(
            "arn:{}:s3tables:{}:{}:bucket/*",
            self.partition, self.region, self.account_id
        )
    }
}
