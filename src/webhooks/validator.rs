//! Lifecycle hooks for StaticPod admission.
//!
//! Checks that the admitted object really is a StaticPod, runs the
//! validation policies and turns their outcome into an [`AdmissionError`].

use kube::Resource;
use kube::ResourceExt;
use kube::core::DynamicObject;
use tracing::{debug, info};

use super::config::ValidatorConfig;
use super::error::{AdmissionError, GroupKind, Result};
use super::policies::{ValidationContext, ValidationResult, validate_all};
use crate::crd::{STATIC_POD_GROUP, STATIC_POD_KIND, StaticPod};
use crate::pod_template::{
    PodTemplateValidator, StructuralPodTemplateValidator, TemplateConverter, V1TemplateConverter,
};

/// Validates StaticPod objects on CREATE, UPDATE and DELETE.
///
/// Holds no per-request state, so one instance can serve concurrent requests.
#[derive(Clone, Debug)]
pub struct StaticPodValidator<C = V1TemplateConverter, V = StructuralPodTemplateValidator> {
    config: ValidatorConfig,
    converter: C,
    template_validator: V,
}

impl StaticPodValidator {
    /// Create a validator using the built-in converter and pod rules.
    pub fn new(config: ValidatorConfig) -> Self {
        Self::with_capabilities(config, V1TemplateConverter, StructuralPodTemplateValidator)
    }
}

impl Default for StaticPodValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl<C, V> StaticPodValidator<C, V>
where
    C: TemplateConverter,
    V: PodTemplateValidator,
{
    /// Create a validator with a custom converter and template validator.
    pub fn with_capabilities(config: ValidatorConfig, converter: C, template_validator: V) -> Self {
        Self {
            config,
            converter,
            template_validator,
        }
    }

    /// Configuration this validator was built with.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate an object being created.
    pub fn validate_create(&self, object: &DynamicObject) -> Result<()> {
        let static_pod = expect_static_pod(object)?;
        self.validate(&static_pod)
    }

    /// Validate an object being updated.
    ///
    /// The incoming object is checked first and its failure wins. When
    /// `validate_previous_on_update` is set the stored object must pass too.
    pub fn validate_update(&self, previous: &DynamicObject, candidate: &DynamicObject) -> Result<()> {
        let candidate = expect_static_pod(candidate)?;
        let previous = expect_static_pod(previous)?;

        self.validate(&candidate)?;

        if self.config.validate_previous_on_update {
            self.validate(&previous)?;
        }

        Ok(())
    }

    /// Deletion is never blocked.
    pub fn validate_delete(&self, _object: &DynamicObject) -> Result<()> {
        Ok(())
    }

    /// Run every policy against a decoded StaticPod.
    pub fn validate(&self, static_pod: &StaticPod) -> Result<()> {
        let ctx = ValidationContext {
            resource: static_pod,
            converter: &self.converter,
            template_validator: &self.template_validator,
            options: self.config.pod_validation,
        };

        match validate_all(&ctx) {
            ValidationResult::Valid => {
                info!(
                    name = %static_pod.name_any(),
                    namespace = ?static_pod.namespace(),
                    "Validated StaticPod"
                );
                Ok(())
            }
            ValidationResult::Invalid(errors) => {
                debug!(
                    name = %static_pod.name_any(),
                    namespace = ?static_pod.namespace(),
                    violations = errors.len(),
                    "StaticPod failed validation"
                );
                Err(AdmissionError::Invalid {
                    kind: GroupKind::new(STATIC_POD_GROUP, STATIC_POD_KIND),
                    name: static_pod.name_any(),
                    errors,
                })
            }
        }
    }
}

/// Decode an admitted object as a StaticPod, rejecting any other type.
fn expect_static_pod(object: &DynamicObject) -> Result<StaticPod> {
    let expected_api_version = StaticPod::api_version(&());
    let observed = match &object.types {
        Some(types) if types.kind == STATIC_POD_KIND && types.api_version == expected_api_version => {
            None
        }
        Some(types) => Some(format!("{} ({})", types.kind, types.api_version)),
        None => Some("object without apiVersion and kind".to_string()),
    };
    if let Some(observed) = observed {
        return Err(AdmissionError::BadRequest(format!(
            "expected a StaticPod but got a {}",
            observed
        )));
    }

    serde_json::to_value(object)
        .and_then(serde_json::from_value::<StaticPod>)
        .map_err(|e| {
            AdmissionError::BadRequest(format!(
                "expected a StaticPod but got an undecodable object: {}",
                e
            ))
        })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::field::{ErrorList, ErrorType, FieldPath};
    use crate::pod_template::{CanonicalPodTemplate, PodValidationOptions};
    use serde_json::{Value, json};

    fn static_pod_object(name: &str, manifest: &str, strategy: Value) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "apps.openyurt.io/v1alpha1",
            "kind": "StaticPod",
            "metadata": { "name": name, "namespace": "kube-system" },
            "spec": {
                "staticPodManifest": manifest,
                "upgradeStrategy": strategy,
                "template": {
                    "spec": {
                        "containers": [{ "name": "hub", "image": "openyurt/yurthub:v1.3.0" }]
                    }
                }
            }
        }))
        .unwrap()
    }

    fn valid_object(name: &str) -> DynamicObject {
        static_pod_object(name, "yurthub", json!({ "type": "OTA" }))
    }

    fn invalid_object(name: &str) -> DynamicObject {
        static_pod_object(name, "", json!({ "type": "OTA" }))
    }

    fn pod_object() -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": "nginx" },
            "spec": { "containers": [] }
        }))
        .unwrap()
    }

    fn invalid_name(err: &AdmissionError) -> &str {
        match err {
            AdmissionError::Invalid { name, .. } => name,
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_create_valid() {
        let validator = StaticPodValidator::default();
        assert_eq!(validator.validate_create(&valid_object("hub")), Ok(()));
    }

    #[test]
    fn test_create_invalid_names_resource() {
        let validator = StaticPodValidator::default();
        let err = validator.validate_create(&invalid_object("hub")).unwrap_err();
        assert_eq!(invalid_name(&err), "hub");
        assert_eq!(err.field_errors()[0].path.to_string(), "spec.StaticPodManifest");
    }

    #[test]
    fn test_create_wrong_kind() {
        let validator = StaticPodValidator::default();
        let err = validator.validate_create(&pod_object()).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::BadRequest("expected a StaticPod but got a Pod (v1)".to_string())
        );
    }

    #[test]
    fn test_create_wrong_version() {
        let mut object = valid_object("hub");
        object.types.as_mut().unwrap().api_version = "apps.openyurt.io/v1beta1".to_string();
        let err = StaticPodValidator::default()
            .validate_create(&object)
            .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_create_missing_type_metadata() {
        let mut object = valid_object("hub");
        object.types = None;
        let err = StaticPodValidator::default()
            .validate_create(&object)
            .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_create_undecodable_spec() {
        let object: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "apps.openyurt.io/v1alpha1",
            "kind": "StaticPod",
            "metadata": { "name": "hub" },
            "spec": { "staticPodManifest": 42 }
        }))
        .unwrap();
        let err = StaticPodValidator::default()
            .validate_create(&object)
            .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_update_candidate_failure_wins() {
        let validator = StaticPodValidator::default();
        let err = validator
            .validate_update(&invalid_object("previous"), &invalid_object("candidate"))
            .unwrap_err();
        assert_eq!(invalid_name(&err), "candidate");
    }

    #[test]
    fn test_update_previous_checked_by_default() {
        let validator = StaticPodValidator::default();
        let err = validator
            .validate_update(&invalid_object("previous"), &valid_object("candidate"))
            .unwrap_err();
        assert_eq!(invalid_name(&err), "previous");
    }

    #[test]
    fn test_update_previous_skipped_when_disabled() {
        let validator = StaticPodValidator::new(
            ValidatorConfig::default().with_validate_previous_on_update(false),
        );
        assert!(!validator.config().validate_previous_on_update);
        assert_eq!(
            validator.validate_update(&invalid_object("previous"), &valid_object("candidate")),
            Ok(())
        );
    }

    #[test]
    fn test_update_type_checks_both() {
        let validator = StaticPodValidator::default();
        assert!(
            validator
                .validate_update(&pod_object(), &valid_object("candidate"))
                .unwrap_err()
                .is_bad_request()
        );
        assert!(
            validator
                .validate_update(&valid_object("previous"), &pod_object())
                .unwrap_err()
                .is_bad_request()
        );
    }

    #[test]
    fn test_update_type_check_precedes_validation() {
        // The previous object has the wrong type, so the invalid candidate is never validated
        let validator = StaticPodValidator::default();
        let err = validator
            .validate_update(&pod_object(), &invalid_object("candidate"))
            .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_delete_always_allowed() {
        let validator = StaticPodValidator::default();
        assert_eq!(validator.validate_delete(&pod_object()), Ok(()));
        assert_eq!(validator.validate_delete(&invalid_object("hub")), Ok(()));
    }

    #[test]
    fn test_injected_template_validator() {
        let stub = |_: &CanonicalPodTemplate, path: &FieldPath, _: &PodValidationOptions| -> ErrorList {
            vec![crate::field::FieldError::required(path.child("spec"), "stubbed")]
        };
        let validator =
            StaticPodValidator::with_capabilities(ValidatorConfig::default(), V1TemplateConverter, stub);
        let err = validator.validate_create(&valid_object("hub")).unwrap_err();
        let errors = err.field_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorType::Required);
        assert_eq!(errors[0].path.to_string(), "template.spec");
    }
}
