use anyhow::Result;
use tracing::Instrument;

use crate::config::config;
use crate::provider::{EcsImageClient, EssScalingClient};
use crate::telemetry::{create_workflow_span, generate_request_id};
use crate::workflows::{ImageRotation, RotationRequest};

pub struct RotateImagesCommand {
    pub old_name: Option<String>,
    pub new_name: Option<String>,
    pub delete_old: bool,
}

impl RotateImagesCommand {
    pub fn new(old_name: Option<String>, new_name: Option<String>, delete_old: bool) -> Self {
        Self {
            old_name,
            new_name,
            delete_old,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        // Required-flag validation happens before any client is built so a
        // missing flag never turns into a credentials error.
        let Some(new_name) = present(&self.new_name) else {
            println!("Please provide new image name with --newname");
            return Err(anyhow::anyhow!("missing required parameter: --newname"));
        };
        let Some(old_name) = present(&self.old_name) else {
            println!("Please provide old image name with --oldname");
            return Err(anyhow::anyhow!("missing required parameter: --oldname"));
        };

        let cfg = config()?;
        let images = EcsImageClient::from_config(cfg)?;
        let scaling = EssScalingClient::from_config(cfg)?;

        println!(
            "🔁 Rotating image '{old_name}' to '{new_name}'{}",
            if self.delete_old {
                " (old image will be deleted)"
            } else {
                ""
            }
        );

        let request = RotationRequest {
            old_name: old_name.clone(),
            new_name: new_name.clone(),
            delete_old: self.delete_old,
        };
        let workflow = ImageRotation::new(&images, &scaling);
        let span = create_workflow_span("images", &generate_request_id());

        match workflow.run(&request).instrument(span).await {
            Ok(outcome) => {
                match &outcome.old_image_id {
                    Some(old_id) => {
                        println!(
                            "✅ Replaced image {old_name} ({old_id}) with {new_name} ({})",
                            outcome.new_image_id
                        );
                        println!(
                            "   🔧 {} scaling configuration(s) now use {}",
                            outcome.replaced_configurations, outcome.new_image_id
                        );
                        println!(
                            "   🏷️  Image {} now carries the name '{old_name}'",
                            outcome.new_image_id
                        );
                        if outcome.deleted_old {
                            println!("   🗑️  Old image {old_id} deleted");
                        } else {
                            println!("   📦 Old image {old_id} parked as '{old_name}tmp'");
                        }
                    }
                    None => {
                        println!(
                            "✅ No image named '{old_name}' existed; {new_name} ({}) now carries that name",
                            outcome.new_image_id
                        );
                        if self.delete_old {
                            println!("   📦 Nothing to delete");
                        }
                    }
                }
                Ok(())
            }
            Err(e) => {
                println!("❌ Image rotation failed: {e}");
                match e.phase_reached() {
                    Some(phase) => {
                        println!("   ⚠️  Last completed phase: {phase}");
                        println!("   ⚠️  Changes up to that phase are applied and are not rolled back");
                    }
                    None => println!("   ✅ No provider-side changes were applied"),
                }
                Err(e.into())
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|v| !v.is_empty())
}
