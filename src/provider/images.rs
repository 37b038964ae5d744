use async_trait::async_trait;
use serde_json::Value;

use crate::config::AliawanConfig;
use crate::provider::client::{Credentials, RpcClient};
use crate::provider::errors::ProviderError;

const ECS_API_VERSION: &str = "2014-05-26";

/// Image lookup, rename and delete operations against the machine-image
/// directory. `find_image_id` returning `Ok(None)` means the name does not
/// resolve, which callers may tolerate; transport and API failures do not.
#[async_trait]
pub trait ImageDirectory {
    async fn find_image_id(&self, name: &str) -> Result<Option<String>, ProviderError>;
    async fn rename_image(&self, image_id: &str, name: &str) -> Result<(), ProviderError>;
    async fn delete_image(&self, image_id: &str) -> Result<(), ProviderError>;
}

/// ECS-backed implementation of [`ImageDirectory`].
#[derive(Debug, Clone)]
pub struct EcsImageClient {
    rpc: RpcClient,
    region_id: String,
}

impl EcsImageClient {
    pub fn new(rpc: RpcClient, region_id: impl Into<String>) -> Self {
        EcsImageClient {
            rpc,
            region_id: region_id.into(),
        }
    }

    pub fn from_config(cfg: &AliawanConfig) -> Result<Self, ProviderError> {
        let credentials = Credentials::from_config(cfg)?;
        Ok(EcsImageClient::new(
            RpcClient::new(&cfg.provider.ecs_endpoint, ECS_API_VERSION, credentials),
            &cfg.provider.region_id,
        ))
    }
}

#[async_trait]
impl ImageDirectory for EcsImageClient {
    async fn find_image_id(&self, name: &str) -> Result<Option<String>, ProviderError> {
        let body = self
            .rpc
            .request(
                "DescribeImages",
                &[
                    ("RegionId", self.region_id.clone()),
                    ("ImageName", name.to_string()),
                    ("PageSize", "50".to_string()),
                ],
            )
            .await?;

        let images = body
            .pointer("/Images/Image")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(
                    "DescribeImages response is missing Images.Image".to_string(),
                )
            })?;

        match images.first() {
            None => Ok(None),
            Some(image) => image
                .get("ImageId")
                .and_then(Value::as_str)
                .map(|id| Some(id.to_string()))
                .ok_or_else(|| {
                    ProviderError::InvalidResponse(
                        "DescribeImages entry is missing ImageId".to_string(),
                    )
                }),
        }
    }

    async fn rename_image(&self, image_id: &str, name: &str) -> Result<(), ProviderError> {
        self.rpc
            .request(
                "ModifyImageAttribute",
                &[
                    ("RegionId", self.region_id.clone()),
                    ("ImageId", image_id.to_string()),
                    ("ImageName", name.to_string()),
                ],
            )
            .await?;
        tracing::info!(image_id, name, "image renamed");
        Ok(())
    }

    async fn delete_image(&self, image_id: &str) -> Result<(), ProviderError> {
        self.rpc
            .request(
                "DeleteImage",
                &[
                    ("RegionId", self.region_id.clone()),
                    ("ImageId", image_id.to_string()),
                ],
            )
            .await?;
        tracing::info!(image_id, "image deleted");
        Ok(())
    }
}
