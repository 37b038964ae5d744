use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use sha1::Sha1;

use crate::config::AliawanConfig;
use crate::provider::errors::ProviderError;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters pass through untouched; everything else is
/// escaped. The provider additionally requires `+` as `%20`, `*` as `%2A` and
/// `~` unescaped, which this set already yields.
const RPC_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Access key pair for signing RPC requests.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub access_key_secret: String,
}

impl Credentials {
    pub fn from_config(cfg: &AliawanConfig) -> Result<Self, ProviderError> {
        let access_key_id = cfg
            .provider
            .access_key_id
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ProviderError::CredentialsNotFound(
                    "Access key id not found. Set ALIBABA_CLOUD_ACCESS_KEY_ID or provider.access_key_id.".to_string(),
                )
            })?;
        let access_key_secret = cfg
            .provider
            .access_key_secret
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ProviderError::CredentialsNotFound(
                    "Access key secret not found. Set ALIBABA_CLOUD_ACCESS_KEY_SECRET or provider.access_key_secret.".to_string(),
                )
            })?;

        Ok(Credentials {
            access_key_id,
            access_key_secret,
        })
    }
}

/// Signed caller for the provider's RPC-style OpenAPI endpoints (ECS, ESS,
/// SLB). One client per service endpoint/API version.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    api_version: String,
    credentials: Credentials,
}

impl RpcClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        RpcClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_version: api_version.into(),
            credentials,
        }
    }

    /// Issue a signed GET for `action` and return the parsed JSON body.
    /// A body carrying a `Code` field is a provider-side error and is
    /// surfaced verbatim together with its `RequestId`.
    pub async fn request(
        &self,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ProviderError> {
        let mut all: BTreeMap<String, String> = BTreeMap::new();
        all.insert("Action".to_string(), action.to_string());
        all.insert("Format".to_string(), "JSON".to_string());
        all.insert("Version".to_string(), self.api_version.clone());
        all.insert(
            "AccessKeyId".to_string(),
            self.credentials.access_key_id.clone(),
        );
        all.insert("SignatureMethod".to_string(), "HMAC-SHA1".to_string());
        all.insert("SignatureVersion".to_string(), "1.0".to_string());
        all.insert(
            "Timestamp".to_string(),
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        );
        all.insert(
            "SignatureNonce".to_string(),
            uuid::Uuid::new_v4().to_string(),
        );
        for (key, value) in params {
            all.insert((*key).to_string(), value.clone());
        }

        let signature = sign(&all, &self.credentials.access_key_secret);

        let mut query: Vec<(&str, &str)> =
            all.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        query.push(("Signature", signature.as_str()));

        tracing::debug!(action, endpoint = %self.endpoint, "sending provider RPC request");

        let response = self.http.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "{action} returned a non-JSON body (HTTP {status}): {e}"
            ))
        })?;

        if let Some(code) = body.get("Code").and_then(Value::as_str) {
            return Err(ProviderError::Api {
                code: code.to_string(),
                message: body
                    .get("Message")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                request_id: body
                    .get("RequestId")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
            });
        }

        if !status.is_success() {
            return Err(ProviderError::InvalidResponse(format!(
                "{action} failed with HTTP {status} and no provider error code"
            )));
        }

        Ok(body)
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, RPC_ENCODE_SET).to_string()
}

/// Sorted `key=value` pairs, each side percent-encoded, joined with `&`.
fn canonicalized_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn string_to_sign(canonical: &str) -> String {
    format!("GET&{}&{}", encode("/"), encode(canonical))
}

fn sign(params: &BTreeMap<String, String>, access_key_secret: &str) -> String {
    let payload = string_to_sign(&canonicalized_query(params));
    let key = format!("{access_key_secret}&");
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}
