//! ACS connection strings and HMAC-SHA256 request signing

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{AcsError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Parsed `endpoint=https://...;accesskey=...` connection string
#[derive(Clone)]
pub struct ConnectionString {
    pub endpoint: Url,
    access_key: Vec<u8>,
}

impl ConnectionString {
    /// Parse a connection string. Keys are case-insensitive.
    pub fn parse(value: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut access_key = None;

        for part in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, val)) = part.split_once('=') else {
                return Err(AcsError::InvalidConnectionString(
                    "malformed segment".to_string(),
                ));
            };

            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(val.trim()),
                "accesskey" => access_key = Some(val.trim()),
                _ => {}
            }
        }

        let endpoint = endpoint
            .ok_or_else(|| AcsError::InvalidConnectionString("missing endpoint".to_string()))?;
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AcsError::InvalidConnectionString(format!("bad endpoint: {}", e)))?;

        let access_key = access_key
            .ok_or_else(|| AcsError::InvalidConnectionString("missing accesskey".to_string()))?;
        let access_key = STANDARD
            .decode(access_key)
            .map_err(|e| AcsError::InvalidConnectionString(format!("bad accesskey: {}", e)))?;

        Ok(Self {
            endpoint,
            access_key,
        })
    }

    pub(crate) fn access_key(&self) -> &[u8] {
        &self.access_key
    }
}

impl FromStr for ConnectionString {
    type Err = AcsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Header values for one signed request
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    /// `x-ms-date`
    pub date: String,
    /// `x-ms-content-sha256`
    pub content_hash: String,
    /// `Authorization`
    pub authorization: String,
}

/// RFC 1123 date as ACS expects in `x-ms-date`
pub fn http_date(now: chrono::DateTime<chrono::Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Base64 SHA-256 of the request body
pub fn content_hash(body: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(body))
}

/// Sign a request with the ACS HMAC-SHA256 scheme.
///
/// String to sign: `METHOD\npath?query\ndate;host;content_hash`.
pub fn sign_request(
    access_key: &[u8],
    method: &str,
    url: &Url,
    body: &[u8],
    date: &str,
) -> Result<SignedHeaders> {
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => return Err(AcsError::Signing(format!("URL has no host: {}", url))),
    };

    let path_and_query = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    let hash = content_hash(body);
    let string_to_sign = format!("{}\n{}\n{};{};{}", method, path_and_query, date, host, hash);

    let mut mac = HmacSha256::new_from_slice(access_key)
        .map_err(|e| AcsError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(SignedHeaders {
        date: date.to_string(),
        content_hash: hash,
        authorization: format!(
            "HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature={}",
            signature
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KEY_B64: &str = "c2VjcmV0LWtleQ==";

    #[test]
    fn test_parse_connection_string() {
        let conn = ConnectionString::parse(&format!(
            "endpoint=https://acs-test.communication.azure.com/;accesskey={}",
            KEY_B64
        ))
        .unwrap();

        assert_eq!(conn.endpoint.host_str(), Some("acs-test.communication.azure.com"));
        assert_eq!(conn.access_key(), b"secret-key");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let conn: ConnectionString =
            format!("Endpoint=https://acs.example.com/; AccessKey={};", KEY_B64)
                .parse()
                .unwrap();

        assert_eq!(conn.endpoint.as_str(), "https://acs.example.com/");
    }

    #[test]
    fn test_parse_missing_parts() {
        assert!(matches!(
            ConnectionString::parse("accesskey=c2VjcmV0"),
            Err(AcsError::InvalidConnectionString(_))
        ));
        assert!(matches!(
            ConnectionString::parse("endpoint=https://acs.example.com/"),
            Err(AcsError::InvalidConnectionString(_))
        ));
        assert!(matches!(
            ConnectionString::parse("endpoint=https://acs.example.com/;accesskey=%%%"),
            Err(AcsError::InvalidConnectionString(_))
        ));
        assert!(ConnectionString::parse("garbage").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let conn = ConnectionString::parse(&format!(
            "endpoint=https://acs.example.com/;accesskey={}",
            KEY_B64
        ))
        .unwrap();

        let debug = format!("{:?}", conn);
        assert!(!debug.contains(KEY_B64));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_http_date() {
        let t = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(http_date(t), "Tue, 05 Mar 2024 07:08:09 GMT");
    }

    #[test]
    fn test_sign_request() {
        let url = Url::parse(
            "https://acs.example.com/messages/notifications:send?api-version=2024-02-01",
        )
        .unwrap();
        let body = br#"{"kind":"text"}"#;
        let date = "Tue, 05 Mar 2024 07:08:09 GMT";

        let signed = sign_request(b"secret-key", "POST", &url, body, date).unwrap();

        let expected_to_sign = format!(
            "POST\n/messages/notifications:send?api-version=2024-02-01\n{};acs.example.com;{}",
            date,
            content_hash(body)
        );
        let mut mac = HmacSha256::new_from_slice(b"secret-key").unwrap();
        mac.update(expected_to_sign.as_bytes());
        let expected_sig = STANDARD.encode(mac.finalize().into_bytes());

        assert_eq!(signed.date, date);
        assert_eq!(signed.content_hash, content_hash(body));
        assert_eq!(
            signed.authorization,
            format!(
                "HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature={}",
                expected_sig
            )
        );
    }

    #[test]
    fn test_sign_request_includes_port() {
        let url = Url::parse("http://127.0.0.1:8123/messages/notifications:send").unwrap();
        let a = sign_request(b"k", "POST", &url, b"", "d").unwrap();

        let other = Url::parse("http://127.0.0.1:9000/messages/notifications:send").unwrap();
        let b = sign_request(b"k", "POST", &other, b"", "d").unwrap();

        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn test_content_hash_of_empty_body() {
        assert_eq!(content_hash(b""), "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
    }
}
