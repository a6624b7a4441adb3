//! Validation policies for StaticPod admission webhooks.
//!
//! Policies run in a fixed order:
//! - Template conversion: a template that cannot be converted aborts the run
//! - Template structure: delegated to the injected pod template validator
//! - Spec rules: manifest name and upgrade strategy
//!
//! Everything after conversion accumulates, so one response reports every
//! violation.

pub mod manifest;
pub mod template;
pub mod upgrade_strategy;

use crate::crd::StaticPod;
use crate::field::{ErrorList, FieldError, FieldPath};
use crate::pod_template::{PodTemplateValidator, PodValidationOptions, TemplateConverter};

/// Result of running every policy against one StaticPod
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    /// No policy reported a violation
    Valid,
    /// At least one violation, in the order they were found
    Invalid(ErrorList),
}

impl ValidationResult {
    /// Build a result from collected errors
    pub fn from_errors(errors: ErrorList) -> Self {
        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Violations, empty when valid
    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(errors) => errors.as_slice(),
        }
    }
}

/// Context for validation
pub struct ValidationContext<'a> {
    /// The resource being validated
    pub resource: &'a StaticPod,
    /// Converts the embedded template to canonical form
    pub converter: &'a dyn TemplateConverter,
    /// Structural rules for the canonical template
    pub template_validator: &'a dyn PodTemplateValidator,
    /// Options handed to the template validator
    pub options: PodValidationOptions,
}

/// Run all validation policies
pub fn validate_all(ctx: &ValidationContext<'_>) -> ValidationResult {
    let template_path = FieldPath::new("template");

    let canonical = match template::convert(ctx, &template_path) {
        Ok(canonical) => canonical,
        Err(error) => return ValidationResult::Invalid(vec![error]),
    };

    let mut errors = template::validate(ctx, &canonical, &template_path);

    let spec_path = FieldPath::new("spec");
    errors.extend(manifest::validate(ctx, &spec_path));
    errors.extend(upgrade_strategy::validate(ctx, &spec_path));

    ValidationResult::from_errors(errors)
}
