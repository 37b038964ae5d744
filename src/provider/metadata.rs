use async_trait::async_trait;

use crate::config::AliawanConfig;
use crate::provider::errors::ProviderError;

/// Resolution of "the" current compute instance, used when the operator does
/// not pass an instance id explicitly.
#[async_trait]
pub trait ComputeDirectory {
    async fn current_instance_id(&self) -> Result<String, ProviderError>;
}

/// Instance-metadata service client. Only reachable from inside an ECS
/// instance; the endpoint is configurable so tests can point it elsewhere.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    endpoint: String,
}

impl MetadataClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        MetadataClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(cfg: &AliawanConfig) -> Self {
        MetadataClient::new(&cfg.provider.metadata_endpoint)
    }
}

#[async_trait]
impl ComputeDirectory for MetadataClient {
    async fn current_instance_id(&self) -> Result<String, ProviderError> {
        let url = format!("{}/latest/meta-data/instance-id", self.endpoint);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        let instance_id = response.text().await?.trim().to_string();
        if instance_id.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "instance metadata returned an empty instance id".to_string(),
            ));
        }
        Ok(instance_id)
    }
}
