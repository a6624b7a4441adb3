//! Pod template conversion and structural validation.
//!
//! The StaticPod carries a `v1` pod template. Before structural rules can run
//! it is converted into a [`CanonicalPodTemplate`], which is the only shape
//! the [`PodTemplateValidator`] capability understands. Both steps are traits
//! so the webhook can run against the built-in rules or an injected rule set.

mod structural;

pub use structural::StructuralPodTemplateValidator;

use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use thiserror::Error;

use crate::field::{ErrorList, FieldPath};

/// A pod template with every optional section resolved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CanonicalPodTemplate {
    pub metadata: ObjectMeta,
    pub spec: PodSpec,
}

/// Errors produced while converting a pod template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The template could not be represented in canonical form.
    #[error("pod template could not be converted: {0}")]
    Malformed(String),
}

/// Converts a `v1` pod template into its canonical form.
pub trait TemplateConverter {
    fn convert(&self, template: &PodTemplateSpec) -> Result<CanonicalPodTemplate, ConversionError>;
}

/// Default converter for `core/v1` pod templates.
#[derive(Clone, Copy, Debug, Default)]
pub struct V1TemplateConverter;

impl TemplateConverter for V1TemplateConverter {
    fn convert(&self, template: &PodTemplateSpec) -> Result<CanonicalPodTemplate, ConversionError> {
        // An absent spec converts to the zero value; the structural rules
        // report what it lacks.
        let spec = template.spec.clone().unwrap_or_default();

        // Quantities are parsed on conversion, so a malformed one can never
        // reach the structural rules.
        let containers = spec
            .init_containers
            .iter()
            .flatten()
            .chain(spec.containers.iter());
        for container in containers {
            let Some(resources) = &container.resources else {
                continue;
            };
            let quantities = resources
                .limits
                .iter()
                .flatten()
                .chain(resources.requests.iter().flatten());
            for (resource, quantity) in quantities {
                if !is_valid_quantity(&quantity.0) {
                    return Err(ConversionError::Malformed(format!(
                        "container {:?}: quantity {:?} for {} is not a valid resource quantity",
                        container.name, quantity.0, resource
                    )));
                }
            }
        }

        Ok(CanonicalPodTemplate {
            metadata: template.metadata.clone().unwrap_or_default(),
            spec,
        })
    }
}

/// Check a resource quantity such as `100m`, `1.5Gi` or `12e6`.
fn is_valid_quantity(value: &str) -> bool {
    use std::sync::LazyLock;
    // Pattern: sign, number, then a binary, decimal or exponent suffix
    static QUANTITY_RE: LazyLock<Option<regex::Regex>> = LazyLock::new(|| {
        regex::Regex::new(
            r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)(Ki|Mi|Gi|Ti|Pi|Ei|[numkMGTPE]|[eE][+-]?[0-9]+)?$",
        )
        .ok()
    });
    QUANTITY_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Options that relax individual structural rules.
///
/// The default value enables none of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PodValidationOptions {
    /// Accept label values that would otherwise be rejected.
    pub allow_invalid_label_value_in_selector: bool,
}

/// Structural validation rules for pod templates.
pub trait PodTemplateValidator {
    /// Validate `template`, reporting violations under `path`.
    fn validate(
        &self,
        template: &CanonicalPodTemplate,
        path: &FieldPath,
        options: &PodValidationOptions,
    ) -> ErrorList;
}

impl<F> PodTemplateValidator for F
where
    F: Fn(&CanonicalPodTemplate, &FieldPath, &PodValidationOptions) -> ErrorList,
{
    fn validate(
        &self,
        template: &CanonicalPodTemplate,
        path: &FieldPath,
        options: &PodValidationOptions,
    ) -> ErrorList {
        self(template, path, options)
    }
}
