pub mod client;
pub mod errors;
pub mod images;
pub mod metadata;
pub mod scaling;
pub mod slb;

pub use client::{Credentials, RpcClient};
pub use errors::ProviderError;
pub use images::{EcsImageClient, ImageDirectory};
pub use metadata::{ComputeDirectory, MetadataClient};
pub use scaling::{EssScalingClient, ScalingConfigs, ScalingConfiguration};
pub use slb::{LoadBalancer, SlbClient};
