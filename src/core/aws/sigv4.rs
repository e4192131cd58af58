//! Minimal SigV4 signing for the private EMR JSON endpoint, which has no SDK
//! operation. Only the header set that endpoint expects is signed.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const SIGNED_HEADERS: &str = "content-type;host;x-amz-date;x-amz-target";

#[derive(Debug, Clone)]
pub struct SigningCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// A JSON-protocol request to sign.
#[derive(Debug, Clone)]
pub struct RequestToSign<'a> {
    pub method: &'a str,
    pub service: &'a str,
    pub host: &'a str,
    pub region: &'a str,
    pub canonical_uri: &'a str,
    pub target: &'a str,
    pub body: &'a str,
}

fn hmac(key: &[u8], message: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| Error::internal_unexpected(format!("HMAC key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date)?;
    let k_region = hmac(&k_date, region)?;
    let k_service = hmac(&k_region, service)?;
    hmac(&k_service, "aws4_request")
}

/// Produce the headers to send with `request`, signed at `timestamp`.
pub fn sign_request(
    request: &RequestToSign<'_>,
    credentials: &SigningCredentials,
    timestamp: DateTime<Utc>,
) -> Result<Vec<(&'static str, String)>> {
    let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = timestamp.format("%Y%m%d").to_string();

    let canonical_headers = format!(
        "content-type:{}\nhost:{}\nx-amz-date:{}\nx-amz-target:{}\n",
        CONTENT_TYPE, request.host, amz_date, request.target
    );
    let canonical_request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        request.method,
        request.canonical_uri,
        canonical_headers,
        SIGNED_HEADERS,
        sha256_hex(request.body)
    );

    let scope = format!(
        "{}/{}/{}/aws4_request",
        date_stamp, request.region, request.service
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(&canonical_request)
    );

    let key = signing_key(
        &credentials.secret_access_key,
        &date_stamp,
        request.region,
        request.service,
    )?;
    let signature = hex::encode(hmac(&key, &string_to_sign)?);

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, scope, SIGNED_HEADERS, signature
    );

    let mut headers = vec![
        ("Authorization", authorization),
        ("Content-Type", CONTENT_TYPE.to_string()),
        ("X-Amz-Date", amz_date),
        ("X-Amz-Target", request.target.to_string()),
    ];
    match &credentials.session_token {
        Some(token) => headers.push(("X-Amz-Security-Token", token.clone())),
        None => log_status!("emr", "No session token in credentials; signing without one"),
    }
    Ok(headers)
}
