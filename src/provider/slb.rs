use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::AliawanConfig;
use crate::provider::client::{Credentials, RpcClient};
use crate::provider::errors::ProviderError;

const SLB_API_VERSION: &str = "2014-05-15";
const DEFAULT_BACKEND_WEIGHT: u64 = 100;

/// Backend registration against a load balancer's VServer groups. Duplicate
/// membership handling is the remote's concern; this interface issues exactly
/// one add call per invocation.
#[async_trait]
pub trait LoadBalancer {
    async fn add_backend(
        &self,
        group_name: &str,
        port: &str,
        instance_id: &str,
    ) -> Result<(), ProviderError>;
}

/// SLB-backed implementation of [`LoadBalancer`]. The API addresses VServer
/// groups by id, so the name is resolved through DescribeVServerGroups on the
/// configured load balancer first.
#[derive(Debug, Clone)]
pub struct SlbClient {
    rpc: RpcClient,
    region_id: String,
    load_balancer_id: String,
}

impl SlbClient {
    pub fn new(
        rpc: RpcClient,
        region_id: impl Into<String>,
        load_balancer_id: impl Into<String>,
    ) -> Self {
        SlbClient {
            rpc,
            region_id: region_id.into(),
            load_balancer_id: load_balancer_id.into(),
        }
    }

    pub fn from_config(cfg: &AliawanConfig) -> Result<Self, ProviderError> {
        let credentials = Credentials::from_config(cfg)?;
        let load_balancer_id = cfg
            .slb
            .load_balancer_id
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ProviderError::ConfigNotFound(
                    "slb.load_balancer_id is not set; it is required to resolve VServer groups by name.".to_string(),
                )
            })?;
        Ok(SlbClient::new(
            RpcClient::new(&cfg.provider.slb_endpoint, SLB_API_VERSION, credentials),
            &cfg.provider.region_id,
            load_balancer_id,
        ))
    }

    async fn find_group_id(&self, group_name: &str) -> Result<String, ProviderError> {
        let body = self
            .rpc
            .request(
                "DescribeVServerGroups",
                &[
                    ("RegionId", self.region_id.clone()),
                    ("LoadBalancerId", self.load_balancer_id.clone()),
                ],
            )
            .await?;

        let groups = body
            .pointer("/VServerGroups/VServerGroup")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(
                    "DescribeVServerGroups response is missing VServerGroups".to_string(),
                )
            })?;

        groups
            .iter()
            .find(|g| g.get("VServerGroupName").and_then(Value::as_str) == Some(group_name))
            .and_then(|g| g.get("VServerGroupId").and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| ProviderError::GroupNotFound {
                group: group_name.to_string(),
                load_balancer_id: self.load_balancer_id.clone(),
            })
    }
}

#[async_trait]
impl LoadBalancer for SlbClient {
    async fn add_backend(
        &self,
        group_name: &str,
        port: &str,
        instance_id: &str,
    ) -> Result<(), ProviderError> {
        let port: u64 = port.parse().map_err(|_| {
            ProviderError::InvalidParameter(format!("'{port}' is not a valid port number"))
        })?;

        let group_id = self.find_group_id(group_name).await?;
        let backends = json!([{
            "ServerId": instance_id,
            "Port": port,
            "Weight": DEFAULT_BACKEND_WEIGHT,
        }]);

        self.rpc
            .request(
                "AddVServerGroupBackendServers",
                &[
                    ("RegionId", self.region_id.clone()),
                    ("VServerGroupId", group_id.clone()),
                    ("BackendServers", backends.to_string()),
                ],
            )
            .await?;
        tracing::info!(
            group = group_name,
            group_id = %group_id,
            instance_id,
            port,
            "backend server added to VServer group"
        );
        Ok(())
    }
}
