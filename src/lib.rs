//! staticpod-webhook library crate
//!
//! Admission validation for the `StaticPod` custom resource
//! (`apps.openyurt.io/v1alpha1`). The crate decides whether a StaticPod may be
//! created or updated; serving the decision over HTTPS is up to the caller.

pub mod crd;
pub mod field;
pub mod pod_template;
pub mod webhooks;

pub use crd::{StaticPod, StaticPodSpec, StaticPodUpgradeStrategy, UpgradeStrategyType};
pub use field::{ErrorList, ErrorType, FieldError, FieldPath};
pub use webhooks::{AdmissionError, StaticPodValidator, ValidatorConfig, admit, review};
