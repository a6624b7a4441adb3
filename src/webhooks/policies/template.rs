//! Pod template policy.
//!
//! Converts the embedded template and runs the structural pod rules against
//! the canonical form. A conversion failure is reported on its own, since
//! structural rules cannot run without a canonical template.

use tracing::debug;

use super::ValidationContext;
use crate::field::{ErrorList, FieldError, FieldPath};
use crate::pod_template::CanonicalPodTemplate;

/// Detail reported when the template cannot be converted
pub const INVALID_TEMPLATE_DETAIL: &str = "template field should be a valid pod template";

/// Convert the resource's template, mapping failure to a single violation
pub fn convert(
    ctx: &ValidationContext<'_>,
    path: &FieldPath,
) -> Result<CanonicalPodTemplate, FieldError> {
    ctx.converter
        .convert(&ctx.resource.spec.template)
        .map_err(|error| {
            debug!(%error, "Pod template conversion failed");
            FieldError::required(path.clone(), INVALID_TEMPLATE_DETAIL)
        })
}

/// Run structural rules on an already converted template
pub fn validate(
    ctx: &ValidationContext<'_>,
    template: &CanonicalPodTemplate,
    path: &FieldPath,
) -> ErrorList {
    ctx.template_validator
        .validate(template, path, &ctx.options)
}
