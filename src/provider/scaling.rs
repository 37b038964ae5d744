use async_trait::async_trait;
use serde_json::Value;

use crate::config::AliawanConfig;
use crate::provider::client::{Credentials, RpcClient};
use crate::provider::errors::ProviderError;

const ESS_API_VERSION: &str = "2014-08-28";
const PAGE_SIZE: u64 = 50;

/// A scaling configuration as the orchestrator sees it: the identifier needed
/// to modify it plus the image it currently references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingConfiguration {
    pub id: String,
    pub scaling_group_id: String,
    pub image_id: String,
}

/// Enumeration and rewrite of auto-scaling configurations.
#[async_trait]
pub trait ScalingConfigs {
    /// All configurations currently referencing `image_id`.
    async fn configs_referencing(
        &self,
        image_id: &str,
    ) -> Result<Vec<ScalingConfiguration>, ProviderError>;

    /// Point `config` at a different image.
    async fn set_image(
        &self,
        config: &ScalingConfiguration,
        image_id: &str,
    ) -> Result<(), ProviderError>;
}

/// ESS-backed implementation of [`ScalingConfigs`]. The API has no image
/// filter, so enumeration pages through every configuration in the region and
/// filters client-side.
#[derive(Debug, Clone)]
pub struct EssScalingClient {
    rpc: RpcClient,
    region_id: String,
}

impl EssScalingClient {
    pub fn new(rpc: RpcClient, region_id: impl Into<String>) -> Self {
        EssScalingClient {
            rpc,
            region_id: region_id.into(),
        }
    }

    pub fn from_config(cfg: &AliawanConfig) -> Result<Self, ProviderError> {
        let credentials = Credentials::from_config(cfg)?;
        Ok(EssScalingClient::new(
            RpcClient::new(&cfg.provider.ess_endpoint, ESS_API_VERSION, credentials),
            &cfg.provider.region_id,
        ))
    }

    async fn describe_page(&self, page: u64) -> Result<(Vec<ScalingConfiguration>, u64), ProviderError> {
        let body = self
            .rpc
            .request(
                "DescribeScalingConfigurations",
                &[
                    ("RegionId", self.region_id.clone()),
                    ("PageNumber", page.to_string()),
                    ("PageSize", PAGE_SIZE.to_string()),
                ],
            )
            .await?;

        let entries = body
            .pointer("/ScalingConfigurations/ScalingConfiguration")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(
                    "DescribeScalingConfigurations response is missing ScalingConfigurations"
                        .to_string(),
                )
            })?;

        let mut configs = Vec::with_capacity(entries.len());
        for entry in entries {
            configs.push(parse_configuration(entry)?);
        }

        let total = body
            .get("TotalCount")
            .and_then(Value::as_u64)
            .unwrap_or(configs.len() as u64);
        Ok((configs, total))
    }
}

fn parse_configuration(entry: &Value) -> Result<ScalingConfiguration, ProviderError> {
    let field = |key: &str| -> Result<String, ProviderError> {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(format!(
                    "DescribeScalingConfigurations entry is missing {key}"
                ))
            })
    };
    Ok(ScalingConfiguration {
        id: field("ScalingConfigurationId")?,
        scaling_group_id: field("ScalingGroupId")?,
        image_id: field("ImageId")?,
    })
}

#[async_trait]
impl ScalingConfigs for EssScalingClient {
    async fn configs_referencing(
        &self,
        image_id: &str,
    ) -> Result<Vec<ScalingConfiguration>, ProviderError> {
        let mut matching = Vec::new();
        let mut page = 1;
        let mut seen = 0u64;
        loop {
            let (configs, total) = self.describe_page(page).await?;
            if configs.is_empty() {
                break;
            }
            seen += configs.len() as u64;
            matching.extend(configs.into_iter().filter(|c| c.image_id == image_id));
            if seen >= total {
                break;
            }
            page += 1;
        }
        Ok(matching)
    }

    async fn set_image(
        &self,
        config: &ScalingConfiguration,
        image_id: &str,
    ) -> Result<(), ProviderError> {
        self.rpc
            .request(
                "ModifyScalingConfiguration",
                &[
                    ("ScalingConfigurationId", config.id.clone()),
                    ("ImageId", image_id.to_string()),
                ],
            )
            .await?;
        tracing::info!(
            scaling_configuration = %config.id,
            scaling_group = %config.scaling_group_id,
            image_id,
            "scaling configuration re-pointed"
        );
        Ok(())
    }
}
