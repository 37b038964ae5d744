pub mod backend;
pub mod rotation;

pub use backend::{BackendRegistration, RegisterRequest, RegistrationError, RegistrationOutcome};
pub use rotation::{
    ImageRotation, RotationError, RotationOutcome, RotationPhase, RotationRequest, RotationStep,
};
