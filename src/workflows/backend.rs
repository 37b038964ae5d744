use thiserror::Error;

use crate::provider::{ComputeDirectory, LoadBalancer, ProviderError};

#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub group_name: String,
    /// Required; kept optional here so "not provided" is distinguishable from
    /// an empty value supplied by the operator.
    pub port: Option<String>,
    /// Resolved from instance metadata when not provided.
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub group_name: String,
    pub port: String,
    pub instance_id: String,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("missing required parameter: --{0}")]
    MissingParameter(&'static str),
    #[error("could not resolve the current instance id: {0}")]
    InstanceLookup(#[source] ProviderError),
    #[error("could not add backend {instance_id}:{port} to group '{group}': {source}")]
    AddBackend {
        group: String,
        instance_id: String,
        port: String,
        #[source]
        source: ProviderError,
    },
}

/// Registers one compute instance in a VServer group. Required parameters are
/// validated locally before any remote interaction; the add itself is a
/// single call with no retry and no local idempotency check (duplicate
/// membership is the remote's concern).
pub struct BackendRegistration<'a, L, C> {
    load_balancer: &'a L,
    compute: &'a C,
}

impl<'a, L, C> BackendRegistration<'a, L, C>
where
    L: LoadBalancer + Sync,
    C: ComputeDirectory + Sync,
{
    pub fn new(load_balancer: &'a L, compute: &'a C) -> Self {
        BackendRegistration {
            load_balancer,
            compute,
        }
    }

    pub async fn run(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        if request.group_name.is_empty() {
            return Err(RegistrationError::MissingParameter("vgroupname"));
        }
        let port = match request.port.as_deref() {
            Some(port) if !port.is_empty() => port.to_string(),
            _ => return Err(RegistrationError::MissingParameter("slbport")),
        };

        let instance_id = match request.instance_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                tracing::info!("no instance id provided; asking instance metadata");
                self.compute
                    .current_instance_id()
                    .await
                    .map_err(RegistrationError::InstanceLookup)?
            }
        };

        self.load_balancer
            .add_backend(&request.group_name, &port, &instance_id)
            .await
            .map_err(|source| RegistrationError::AddBackend {
                group: request.group_name.clone(),
                instance_id: instance_id.clone(),
                port: port.clone(),
                source,
            })?;

        Ok(RegistrationOutcome {
            group_name: request.group_name.clone(),
            port,
            instance_id,
        })
    }
}
