//! AWS Signature Version 4 request signing.
//!
//! The service authenticates every call with a SigV4 signature scoped to the
//! request's region and the `tts` service. Signing is a pure function of the
//! credentials, the region, the request and the signing time.

use chrono::{DateTime, Utc};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use reqwest::blocking::Request;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, HOST};
use sha2::{Digest, Sha256};

use super::config::Region;
use super::credentials::Credentials;
use super::error::{ConfigError, IvonaError};

/// Service name in the credential scope.
pub const SERVICE_NAME: &str = "tts";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_CONTENT_SHA256: &str = "x-amz-content-sha256";

/// Attaches an authentication signature to an outgoing request.
pub trait RequestSigner: Send + Sync {
    fn sign(
        &self,
        request: &mut Request,
        credentials: &Credentials,
        region: Region,
    ) -> Result<(), IvonaError>;
}

/// SigV4 signer for the `tts` service.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aws4Signer;

impl RequestSigner for Aws4Signer {
    fn sign(
        &self,
        request: &mut Request,
        credentials: &Credentials,
        region: Region,
    ) -> Result<(), IvonaError> {
        self.sign_at(request, credentials, region, Utc::now())
    }
}

impl Aws4Signer {
    /// Sign `request` as if it were sent at `now`.
    ///
    /// Sets `host`, `x-amz-date`, `x-amz-content-sha256` and `authorization`.
    /// `content-type` is signed too when the request carries one.
    pub fn sign_at(
        &self,
        request: &mut Request,
        credentials: &Credentials,
        region: Region,
        now: DateTime<Utc>,
    ) -> Result<(), IvonaError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let payload = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
        let payload_hash = hex::encode(Sha256::digest(payload));

        let url = request.url();
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(ConfigError::InvalidEndpoint(url.to_string()).into()),
        };
        let path = canonical_uri(url.path());
        let query = canonical_query(url.query().unwrap_or(""));
        let method = request.method().as_str().to_string();

        let headers = request.headers_mut();
        headers.insert(HOST, header_value("host", &host)?);
        headers.insert(X_AMZ_DATE, header_value(X_AMZ_DATE, &amz_date)?);
        headers.insert(
            X_AMZ_CONTENT_SHA256,
            header_value(X_AMZ_CONTENT_SHA256, &payload_hash)?,
        );

        let signed: [HeaderName; 4] = [
            CONTENT_TYPE,
            HOST,
            HeaderName::from_static(X_AMZ_CONTENT_SHA256),
            HeaderName::from_static(X_AMZ_DATE),
        ];
        let mut canonical_headers: Vec<(String, String)> = signed
            .iter()
            .filter_map(|name| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| (name.as_str().to_string(), v.trim().to_string()))
            })
            .collect();
        canonical_headers.sort();

        let canonical = canonical_request(&method, &path, &query, &canonical_headers, &payload_hash);
        let scope = format!("{date}/{}/{SERVICE_NAME}/aws4_request", region.as_str());
        let to_sign = string_to_sign(&amz_date, &scope, &canonical);
        let key = derive_signing_key(credentials.secret_key(), &date, region.as_str(), SERVICE_NAME)?;
        let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes())?);

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
            credentials.access_key(),
            signed_header_names(&canonical_headers),
        );
        headers.insert(AUTHORIZATION, header_value("authorization", &authorization)?);
        Ok(())
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, IvonaError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeaderValue(name).into())
}

/// URI-encode the (already percent-encoded) path once more, segment by segment.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                char::from(b).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// Query parameters sorted by name, then value.
fn canonical_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    pairs.sort_unstable();
    pairs
        .into_iter()
        .map(|p| if p.contains('=') { p.to_string() } else { format!("{p}=") })
        .collect::<Vec<_>>()
        .join("&")
}

/// `headers` must be lowercase and sorted by name.
pub(crate) fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &[(String, String)],
    payload_hash: &str,
) -> String {
    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    format!(
        "{method}\n{path}\n{query}\n{canonical_headers}\n{}\n{payload_hash}",
        signed_header_names(headers)
    )
}

fn signed_header_names(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

pub(crate) fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    let hashed = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    format!("{ALGORITHM}\n{amz_date}\n{scope}\n{hashed}")
}

pub(crate) fn derive_signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, IvonaError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, IvonaError> {
    let mut mac = <Hmac<Sha256> as KeyInit>::new_from_slice(key)
        .map_err(|e| IvonaError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::blocking::Body;
    use reqwest::Method;

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
    const EMPTY_HASH: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn example_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    #[test]
    fn signing_key_matches_published_example() {
        let key = derive_signing_key(EXAMPLE_SECRET, "20150830", "us-east-1", "iam").unwrap();
        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn get_vanilla_signature_matches_published_vector() {
        let headers = vec![
            ("host".to_string(), "example.amazonaws.com".to_string()),
            ("x-amz-date".to_string(), "20150830T123600Z".to_string()),
        ];
        let canonical = canonical_request("GET", "/", "", &headers, EMPTY_HASH);
        let scope = "20150830/us-east-1/service/aws4_request";
        let to_sign = string_to_sign("20150830T123600Z", scope, &canonical);
        let key = derive_signing_key(EXAMPLE_SECRET, "20150830", "us-east-1", "service").unwrap();
        assert_eq!(
            hex::encode(hmac_sha256(&key, to_sign.as_bytes()).unwrap()),
            "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn canonical_uri_encodes_path_segments_again() {
        assert_eq!(canonical_uri(""), "/");
        assert_eq!(canonical_uri("/CreateSpeech"), "/CreateSpeech");
        assert_eq!(canonical_uri("/a%20b/ListVoices"), "/a%2520b/ListVoices");
        assert_eq!(canonical_uri("/v1:tts/x"), "/v1%3Atts/x");
    }

    #[test]
    fn canonical_query_sorts_parameters() {
        assert_eq!(canonical_query(""), "");
        assert_eq!(canonical_query("b=2&a=1&c"), "a=1&b=2&c=");
    }

    fn post_request(url: &str, body: &str) -> Request {
        let mut request = Request::new(Method::POST, url.parse().unwrap());
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(Body::from(body.to_string()));
        request
    }

    #[test]
    fn sign_at_sets_scoped_authorization() {
        let creds = Credentials::new("AKIDEXAMPLE", EXAMPLE_SECRET);
        let mut request = post_request("https://tts.eu-west-1.ivonacloud.com/CreateSpeech", "{}");
        Aws4Signer
            .sign_at(&mut request, &creds, Region::EuWest1, example_time())
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers["host"], "tts.eu-west-1.ivonacloud.com");
        assert_eq!(headers["x-amz-date"], "20150830T123600Z");
        assert_eq!(
            headers["x-amz-content-sha256"],
            hex::encode(Sha256::digest(b"{}")).as_str()
        );

        let auth = headers[AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/eu-west-1/tts/aws4_request, \
             SignedHeaders=content-type;host;x-amz-content-sha256;x-amz-date, Signature="
        ));
        let signature = auth.rsplit("Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(!auth.contains(EXAMPLE_SECRET));
    }

    #[test]
    fn signature_depends_on_region_and_body() {
        let creds = Credentials::new("AKIDEXAMPLE", EXAMPLE_SECRET);
        let sign = |region: Region, body: &str| {
            let mut request = post_request("https://tts.example.com/CreateSpeech", body);
            Aws4Signer
                .sign_at(&mut request, &creds, region, example_time())
                .unwrap();
            request.headers()[AUTHORIZATION].to_str().unwrap().to_string()
        };

        let base = sign(Region::EuWest1, "{}");
        assert_eq!(base, sign(Region::EuWest1, "{}"));
        assert_ne!(base, sign(Region::UsEast1, "{}"));
        assert_ne!(base, sign(Region::EuWest1, "{\"a\":1}"));
    }

    #[test]
    fn host_header_keeps_explicit_port() {
        let creds = Credentials::new("AKIDEXAMPLE", EXAMPLE_SECRET);
        let mut request = Request::new(Method::GET, "http://127.0.0.1:4567/ListVoices".parse().unwrap());
        Aws4Signer
            .sign_at(&mut request, &creds, Region::UsWest2, example_time())
            .unwrap();
        assert_eq!(request.headers()["host"], "127.0.0.1:4567");
        assert_eq!(request.headers()["x-amz-content-sha256"], EMPTY_HASH);
        let auth = request.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date,"));
    }
}
