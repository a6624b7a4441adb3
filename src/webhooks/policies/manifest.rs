//! Static pod manifest policy.
//!
//! Validates:
//! - `spec.StaticPodManifest` is set, since it names the file written on nodes

use super::ValidationContext;
use crate::field::{ErrorList, FieldError, FieldPath};

/// Validate the manifest name
pub fn validate(ctx: &ValidationContext<'_>, spec_path: &FieldPath) -> ErrorList {
    let mut errors = ErrorList::new();

    if ctx.resource.spec.static_pod_manifest.is_empty() {
        errors.push(FieldError::required(
            spec_path.child("StaticPodManifest"),
            "StaticPodManifest is required",
        ));
    }

    errors
}
