use std::fmt;

use thiserror::Error;

use crate::provider::{ImageDirectory, ProviderError, ScalingConfigs};

/// Progress marker for the rotation sequence. Each value means every step up
/// to and including it completed; on failure the last reached phase tells the
/// operator how far the provider-side state has already moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RotationPhase {
    /// Both names were resolved to image ids.
    Resolved,
    /// No scaling configuration references the old image any more.
    ReferencesReplaced,
    /// The old image no longer holds its logical name (or there was no old
    /// image to vacate).
    OldVacated,
    /// The new image now holds the old logical name.
    NewClaimed,
    /// The superseded image was deleted.
    Cleaned,
}

impl fmt::Display for RotationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RotationPhase::Resolved => "resolved",
            RotationPhase::ReferencesReplaced => "references-replaced",
            RotationPhase::OldVacated => "old-name-vacated",
            RotationPhase::NewClaimed => "old-name-claimed",
            RotationPhase::Cleaned => "cleaned",
        };
        write!(f, "{label}")
    }
}

/// The remote interaction that was in flight when a rotation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStep {
    ResolveNames,
    ReplaceReferences,
    VacateOldName,
    ClaimOldName,
    DeleteOldImage,
}

impl fmt::Display for RotationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RotationStep::ResolveNames => "resolving image names",
            RotationStep::ReplaceReferences => "replacing scaling configuration references",
            RotationStep::VacateOldName => "vacating the old image name",
            RotationStep::ClaimOldName => "claiming the old image name",
            RotationStep::DeleteOldImage => "deleting the old image",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Error)]
pub enum RotationError {
    /// The new name must resolve before anything is mutated; there is no
    /// meaningful rotation without a new image to rotate to.
    #[error("image '{0}' does not resolve to an image id")]
    NewImageNotFound(String),
    #[error("rotation halted while {step}: {source}")]
    StepFailed {
        step: RotationStep,
        /// Last phase that fully completed, if any. Everything up to here is
        /// already applied on the provider side and will not be rolled back.
        reached: Option<RotationPhase>,
        #[source]
        source: ProviderError,
    },
}

impl RotationError {
    pub fn phase_reached(&self) -> Option<RotationPhase> {
        match self {
            RotationError::NewImageNotFound(_) => None,
            RotationError::StepFailed { reached, .. } => *reached,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RotationRequest {
    pub old_name: String,
    pub new_name: String,
    pub delete_old: bool,
}

/// Final state of a successful rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOutcome {
    /// `None` when the old name never resolved; nothing was vacated or
    /// deleted in that case.
    pub old_image_id: Option<String>,
    pub new_image_id: String,
    pub replaced_configurations: usize,
    pub deleted_old: bool,
    pub phase: RotationPhase,
}

/// Drives the lookup → replace-references → rename-swap → optional-delete
/// sequence. Strictly sequential and fail-fast: no step starts until the
/// previous one completed, and the first remote failure aborts the run with
/// the progress reached so far. Already-applied changes are never compensated.
pub struct ImageRotation<'a, I, S> {
    images: &'a I,
    scaling: &'a S,
}

impl<'a, I, S> ImageRotation<'a, I, S>
where
    I: ImageDirectory + Sync,
    S: ScalingConfigs + Sync,
{
    pub fn new(images: &'a I, scaling: &'a S) -> Self {
        ImageRotation { images, scaling }
    }

    pub async fn run(&self, request: &RotationRequest) -> Result<RotationOutcome, RotationError> {
        // Step 1: resolve both names. A missing old image is tolerated (there
        // is simply nothing to vacate or delete); a missing new image is
        // fatal before any mutation.
        let old_image_id = self
            .images
            .find_image_id(&request.old_name)
            .await
            .map_err(halt(RotationStep::ResolveNames, None))?;
        let new_image_id = self
            .images
            .find_image_id(&request.new_name)
            .await
            .map_err(halt(RotationStep::ResolveNames, None))?
            .ok_or_else(|| RotationError::NewImageNotFound(request.new_name.clone()))?;

        match &old_image_id {
            Some(id) => tracing::info!(
                old_name = %request.old_name,
                old_image_id = %id,
                new_name = %request.new_name,
                new_image_id = %new_image_id,
                "rotating image"
            ),
            None => tracing::info!(
                old_name = %request.old_name,
                new_name = %request.new_name,
                new_image_id = %new_image_id,
                "old image name does not resolve; rotating with nothing to vacate"
            ),
        }
        let mut reached = RotationPhase::Resolved;

        // Step 2: point every scaling configuration that references the old
        // image at the new one. The first failed update aborts the sweep.
        let mut replaced_configurations = 0;
        if let Some(old_id) = &old_image_id {
            let configs = self
                .scaling
                .configs_referencing(old_id)
                .await
                .map_err(halt(RotationStep::ReplaceReferences, Some(reached)))?;
            for config in &configs {
                self.scaling
                    .set_image(config, &new_image_id)
                    .await
                    .map_err(halt(RotationStep::ReplaceReferences, Some(reached)))?;
                replaced_configurations += 1;
            }
            tracing::info!(replaced_configurations, "scaling configuration sweep complete");
        }
        reached = RotationPhase::ReferencesReplaced;

        // Step 3: vacate the logical name so the new image can take it over.
        if let Some(old_id) = &old_image_id {
            let parking_name = format!("{}tmp", request.old_name);
            self.images
                .rename_image(old_id, &parking_name)
                .await
                .map_err(halt(RotationStep::VacateOldName, Some(reached)))?;
        }
        reached = RotationPhase::OldVacated;

        // Step 4: the new image assumes the old logical identity. A failure
        // here after step 3 leaves no image holding the old name; the reached
        // phase in the error makes that window diagnosable.
        self.images
            .rename_image(&new_image_id, &request.old_name)
            .await
            .map_err(halt(RotationStep::ClaimOldName, Some(reached)))?;
        reached = RotationPhase::NewClaimed;

        // Step 5: optional cleanup of the superseded image.
        let mut deleted_old = false;
        if request.delete_old {
            if let Some(old_id) = &old_image_id {
                self.images
                    .delete_image(old_id)
                    .await
                    .map_err(halt(RotationStep::DeleteOldImage, Some(reached)))?;
                deleted_old = true;
                reached = RotationPhase::Cleaned;
            } else {
                tracing::info!("delete requested but the old image never resolved; skipping");
            }
        }

        Ok(RotationOutcome {
            old_image_id,
            new_image_id,
            replaced_configurations,
            deleted_old,
            phase: reached,
        })
    }
}

fn halt(
    step: RotationStep,
    reached: Option<RotationPhase>,
) -> impl FnOnce(ProviderError) -> RotationError {
    move |source| RotationError::StepFailed {
        step,
        reached,
        source,
    }
}
