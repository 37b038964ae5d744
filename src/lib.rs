// Aliawan Library - Alibaba Cloud operator workflow orchestration
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod provider;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, AliawanConfig};
pub use provider::{
    ComputeDirectory, Credentials, EcsImageClient, EssScalingClient, ImageDirectory, LoadBalancer,
    MetadataClient, ProviderError, RpcClient, ScalingConfigs, ScalingConfiguration, SlbClient,
};
pub use telemetry::{create_workflow_span, generate_request_id, init_telemetry};
pub use workflows::{
    BackendRegistration, ImageRotation, RegisterRequest, RegistrationError, RegistrationOutcome,
    RotationError, RotationOutcome, RotationPhase, RotationRequest, RotationStep,
};
