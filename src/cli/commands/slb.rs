use anyhow::Result;
use tracing::Instrument;

use crate::config::config;
use crate::provider::{MetadataClient, SlbClient};
use crate::telemetry::{create_workflow_span, generate_request_id};
use crate::workflows::{BackendRegistration, RegisterRequest};

pub struct AddBackendCommand {
    pub vgroup_name: Option<String>,
    pub instance_id: Option<String>,
    pub slb_port: Option<String>,
}

impl AddBackendCommand {
    pub fn new(
        vgroup_name: Option<String>,
        instance_id: Option<String>,
        slb_port: Option<String>,
    ) -> Self {
        Self {
            vgroup_name,
            instance_id,
            slb_port,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let Some(vgroup_name) = present(&self.vgroup_name) else {
            println!("Please provide VGroup Name with --vgroupname");
            return Err(anyhow::anyhow!("missing required parameter: --vgroupname"));
        };

        let cfg = config()?;

        let port = match present(&self.slb_port) {
            Some(port) => Some(port.clone()),
            None => {
                let fallback = cfg
                    .slb
                    .default_port
                    .clone()
                    .filter(|p| !p.is_empty());
                if let Some(port) = &fallback {
                    println!("Using default SLB port {port} from configuration, overwrite with --slbport");
                }
                fallback
            }
        };
        if port.is_none() {
            println!("Please provide SLB port with --slbport or set slb.default_port");
            return Err(anyhow::anyhow!("missing required parameter: --slbport"));
        }

        let load_balancer = SlbClient::from_config(cfg)?;
        let metadata = MetadataClient::from_config(cfg);

        let request = RegisterRequest {
            group_name: vgroup_name.clone(),
            port,
            instance_id: self.instance_id.clone().filter(|v| !v.is_empty()),
        };
        let workflow = BackendRegistration::new(&load_balancer, &metadata);
        let span = create_workflow_span("slb", &generate_request_id());

        match workflow.run(&request).instrument(span).await {
            Ok(outcome) => {
                println!(
                    "✅ Instance {} registered on port {} in VServer group '{}'",
                    outcome.instance_id, outcome.port, outcome.group_name
                );
                Ok(())
            }
            Err(e) => {
                println!("❌ Could not add backend server: {e}");
                Err(e.into())
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|v| !v.is_empty())
}
