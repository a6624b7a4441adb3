//! Webhook module for validating StaticPod admission requests.
//!
//! - `policies`: the rules a StaticPod must satisfy
//! - `validator`: CREATE / UPDATE / DELETE hooks around the policies
//! - `admission`: `AdmissionReview` in, `AdmissionReview` out

mod admission;
mod config;
mod error;
pub mod policies;
mod validator;

pub use admission::{admit, review};
pub use config::{VALIDATE_PREVIOUS_ON_UPDATE_ENV, ValidatorConfig};
pub use error::{AdmissionError, GroupKind, Result};
pub use policies::{ValidationContext, ValidationResult};
pub use validator::StaticPodValidator;

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
