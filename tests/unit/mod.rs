// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for staticpod-webhook.
//!
//! These tests run without a Kubernetes cluster and exercise the public API
//! of each component in isolation.

#[path = "../common/mod.rs"]
mod common;

mod crd_tests {
    use crate::common::fixtures::{StaticPodBuilder, to_dynamic};
    use kube::CustomResourceExt;
    use staticpod_webhook::crd::{StaticPod, UpgradeStrategyType};

    #[test]
    fn test_strategy_type_display() {
        assert_eq!(UpgradeStrategyType::Auto.to_string(), "Auto");
        assert_eq!(UpgradeStrategyType::Ota.to_string(), "OTA");
        assert_eq!(
            UpgradeStrategyType::AdvancedRollingUpdate.to_string(),
            "AdvancedRollingUpdate"
        );
    }

    #[test]
    fn test_dynamic_roundtrip_keeps_type_meta() {
        let object = to_dynamic(&StaticPodBuilder::new("hub").build());
        let types = object.types.expect("type meta should be serialized");
        assert_eq!(types.api_version, "apps.openyurt.io/v1alpha1");
        assert_eq!(types.kind, "StaticPod");
    }

    #[test]
    fn test_crd_print_columns() {
        let crd = StaticPod::crd();
        let version = &crd.spec.versions[0];
        let columns: Vec<&str> = version
            .additional_printer_columns
            .as_ref()
            .expect("print columns should be set")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            columns,
            vec!["TotalNumber", "ReadyNumber", "UpgradedNumber", "Age"]
        );
        assert!(version.subresources.is_some());
    }
}

mod field_tests {
    use staticpod_webhook::field::{FieldError, FieldPath, aggregate};

    #[test]
    fn test_nested_path() {
        let path = FieldPath::new("spec").child("upgradeStrategy").child("maxUnavailable");
        assert_eq!(path.to_string(), "spec.upgradeStrategy.maxUnavailable");
    }

    #[test]
    fn test_aggregate_single_has_no_brackets() {
        let err = FieldError::required(FieldPath::new("template"), "missing");
        assert_eq!(aggregate(&[err]), "template: Required value: missing");
    }
}

mod validator_tests {
    use crate::common::fixtures::{StaticPodBuilder, container, pod_object};
    use staticpod_webhook::field::ErrorType;
    use staticpod_webhook::webhooks::{AdmissionError, StaticPodValidator, ValidatorConfig};

    #[test]
    fn test_valid_ota() {
        let validator = StaticPodValidator::default();
        let resource = StaticPodBuilder::new("hub").build();
        assert_eq!(validator.validate(&resource), Ok(()));
    }

    #[test]
    fn test_valid_rolling_update_with_percentage() {
        let validator = StaticPodValidator::default();
        let resource = StaticPodBuilder::new("hub")
            .strategy("AdvancedRollingUpdate")
            .max_unavailable_percent(25)
            .build();
        assert_eq!(validator.validate(&resource), Ok(()));
    }

    #[test]
    fn test_template_and_spec_errors_reported_together() {
        let validator = StaticPodValidator::default();
        let resource = StaticPodBuilder::new("hub")
            .containers(vec![container("hub", "")])
            .strategy("Auto")
            .build();

        let err = validator.validate(&resource).unwrap_err();
        let summary: Vec<(String, ErrorType)> = err
            .field_errors()
            .iter()
            .map(|e| (e.path.to_string(), e.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("template.spec.containers[0].image".to_string(), ErrorType::Required),
                ("spec.upgradeStrategy".to_string(), ErrorType::Required),
            ]
        );
    }

    #[test]
    fn test_malformed_quantity_is_conversion_failure() {
        use k8s_openapi::api::core::v1::ResourceRequirements;
        use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
        use std::collections::BTreeMap;

        let mut hub = container("hub", "openyurt/yurthub:v1.3.0");
        hub.resources = Some(ResourceRequirements {
            requests: Some(BTreeMap::from([(
                "memory".to_string(),
                Quantity("lots".to_string()),
            )])),
            ..Default::default()
        });
        let resource = StaticPodBuilder::new("hub")
            .containers(vec![hub])
            .manifest("")
            .build();

        let err = StaticPodValidator::default().validate(&resource).unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].path.to_string(), "template");
    }

    #[test]
    fn test_invalid_error_carries_identity() {
        let resource = StaticPodBuilder::new("edge-hub").manifest("").build();
        match StaticPodValidator::default().validate(&resource) {
            Err(AdmissionError::Invalid { kind, name, .. }) => {
                assert_eq!(kind.to_string(), "StaticPod.apps.openyurt.io");
                assert_eq!(name, "edge-hub");
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_kind_is_bad_request() {
        let validator = StaticPodValidator::default();
        let err = validator.validate_create(&pod_object("nginx")).unwrap_err();
        assert!(err.is_bad_request());
        assert!(err.to_string().contains("Pod (v1)"));
    }

    #[test]
    fn test_config_empty_lookup() {
        let config = ValidatorConfig::from_lookup(|_| None);
        assert!(config.validate_previous_on_update);
    }
}

mod error_tests {
    use staticpod_webhook::webhooks::{AdmissionError, GroupKind};

    #[test]
    fn test_error_display() {
        let err = AdmissionError::BadRequest("expected a StaticPod but got a Pod (v1)".to_string());
        assert_eq!(err.to_string(), "expected a StaticPod but got a Pod (v1)");
    }

    #[test]
    fn test_error_classification() {
        let bad_request = AdmissionError::BadRequest("nope".to_string());
        assert!(bad_request.is_bad_request());
        assert_eq!(bad_request.code(), 400);

        let invalid = AdmissionError::Invalid {
            kind: GroupKind::new("apps.openyurt.io", "StaticPod"),
            name: "hub".to_string(),
            errors: Vec::new(),
        };
        assert!(invalid.is_invalid());
        assert_eq!(invalid.code(), 422);
    }
}
