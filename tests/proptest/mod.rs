// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for staticpod-webhook.
//!
//! Uses proptest to generate random StaticPods and verify the admission
//! invariants hold for all of them.

#[path = "../common/mod.rs"]
mod common;

use proptest::prelude::*;

use common::fixtures::StaticPodBuilder;
use staticpod_webhook::crd::UpgradeStrategyType;
use staticpod_webhook::field::{ErrorType, FieldError};
use staticpod_webhook::webhooks::StaticPodValidator;

/// Strategy for generating the supported strategy names.
fn known_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("Auto"),
        Just("OTA"),
        Just("AdvancedRollingUpdate"),
    ]
}

/// Strategy for generating strategy names that are not supported.
fn unknown_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{0,24}".prop_filter("must not be a supported type", |s| {
        s.parse::<UpgradeStrategyType>().is_err()
    })
}

/// Strategy for generating non-empty manifest names.
fn manifest() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,30}"
}

/// Strategy for an optional maxUnavailable, either absolute or a percentage.
fn max_unavailable() -> impl Strategy<Value = Option<Result<i32, u32>>> {
    prop_oneof![
        Just(None),
        (0..=100i32).prop_map(|n| Some(Ok(n))),
        (0..=100u32).prop_map(|p| Some(Err(p))),
    ]
}

/// Strategy for generating resource quantities that do not parse.
fn malformed_quantity() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("lots".to_string()),
        Just("1.2.3".to_string()),
        Just("10 Gi".to_string()),
        "[0-9]{1,4}(Kb|Gb|x|ii)",
    ]
}

fn builder(
    manifest: &str,
    strategy: &str,
    max_unavailable: Option<Result<i32, u32>>,
) -> StaticPodBuilder {
    let builder = StaticPodBuilder::new("hub").manifest(manifest).strategy(strategy);
    match max_unavailable {
        None => builder,
        Some(Ok(n)) => builder.max_unavailable(n),
        Some(Err(p)) => builder.max_unavailable_percent(p),
    }
}

fn field_errors(
    validator: &StaticPodValidator,
    builder: StaticPodBuilder,
) -> Vec<FieldError> {
    match validator.validate(&builder.build()) {
        Ok(()) => Vec::new(),
        Err(err) => err.field_errors().to_vec(),
    }
}

proptest! {
    /// Property: Validating the same StaticPod twice gives the same outcome.
    #[test]
    fn test_validation_is_deterministic(
        manifest in prop_oneof![Just(String::new()), manifest()],
        strategy in prop_oneof![known_strategy().prop_map(String::from), unknown_strategy()],
        max_unavailable in max_unavailable()
    ) {
        let validator = StaticPodValidator::default();
        let resource = builder(&manifest, &strategy, max_unavailable).build();
        prop_assert_eq!(validator.validate(&resource), validator.validate(&resource));
    }

    /// Property: An unknown strategy type is reported as unsupported, listing all types.
    #[test]
    fn test_unknown_strategy_not_supported(
        strategy in unknown_strategy(),
        max_unavailable in max_unavailable()
    ) {
        let validator = StaticPodValidator::default();
        let errors = field_errors(&validator, builder("yurthub", &strategy, max_unavailable));
        prop_assert_eq!(errors.len(), 1);
        prop_assert_eq!(errors[0].kind, ErrorType::NotSupported);
        prop_assert_eq!(errors[0].path.to_string(), "spec.upgradeStrategy");
        prop_assert_eq!(errors[0].bad_value.as_deref(), Some(strategy.as_str()));
        prop_assert_eq!(
            errors[0].supported.clone(),
            vec!["Auto".to_string(), "OTA".to_string(), "AdvancedRollingUpdate".to_string()]
        );
    }

    /// Property: OTA never needs maxUnavailable.
    #[test]
    fn test_ota_accepts_any_max_unavailable(
        manifest in manifest(),
        max_unavailable in max_unavailable()
    ) {
        let validator = StaticPodValidator::default();
        let resource = builder(&manifest, "OTA", max_unavailable).build();
        prop_assert_eq!(validator.validate(&resource), Ok(()));
    }

    /// Property: Auto and AdvancedRollingUpdate pass exactly when maxUnavailable is set.
    #[test]
    fn test_rolling_strategies_need_max_unavailable(
        strategy in prop_oneof![Just("Auto"), Just("AdvancedRollingUpdate")],
        manifest in manifest(),
        max_unavailable in max_unavailable()
    ) {
        let validator = StaticPodValidator::default();
        let is_set = max_unavailable.is_some();
        let errors = field_errors(&validator, builder(&manifest, strategy, max_unavailable));
        if is_set {
            prop_assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        } else {
            prop_assert_eq!(errors.len(), 1);
            prop_assert_eq!(errors[0].kind, ErrorType::Required);
            prop_assert_eq!(
                errors[0].detail.as_str(),
                "max-unavailable is required in AdvancedRollingUpdate mode"
            );
        }
    }

    /// Property: An empty manifest is always reported, and only an empty one.
    #[test]
    fn test_manifest_required(
        manifest in prop_oneof![Just(String::new()), manifest()],
        strategy in known_strategy(),
        max_unavailable in max_unavailable()
    ) {
        let validator = StaticPodValidator::default();
        let errors = field_errors(&validator, builder(&manifest, strategy, max_unavailable));
        let reported = errors.iter().any(|e| {
            e.kind == ErrorType::Required && e.path.to_string() == "spec.StaticPodManifest"
        });
        prop_assert_eq!(reported, manifest.is_empty());
    }

    /// Property: A template that cannot be converted yields exactly one error.
    #[test]
    fn test_conversion_failure_short_circuits(
        quantity in malformed_quantity(),
        manifest in prop_oneof![Just(String::new()), manifest()],
        strategy in prop_oneof![known_strategy().prop_map(String::from), unknown_strategy()],
        max_unavailable in max_unavailable()
    ) {
        let validator = StaticPodValidator::default();
        let errors = field_errors(
            &validator,
            builder(&manifest, &strategy, max_unavailable).memory_request(quantity),
        );
        prop_assert_eq!(errors.len(), 1);
        prop_assert_eq!(errors[0].path.to_string(), "template");
        prop_assert_eq!(
            errors[0].detail.as_str(),
            "template field should be a valid pod template"
        );
    }

    /// Property: A missing template never hides the spec-level errors.
    #[test]
    fn test_missing_template_keeps_spec_errors(
        manifest in prop_oneof![Just(String::new()), manifest()],
        strategy in prop_oneof![known_strategy().prop_map(String::from), unknown_strategy()],
        max_unavailable in max_unavailable()
    ) {
        let validator = StaticPodValidator::default();
        let with_template = field_errors(&validator, builder(&manifest, &strategy, max_unavailable));
        let without_template = field_errors(
            &validator,
            builder(&manifest, &strategy, max_unavailable).without_template_spec(),
        );
        prop_assert_eq!(without_template[0].path.to_string(), "template.spec.containers");
        prop_assert_eq!(&without_template[1..], with_template.as_slice());
    }

    /// Property: Any kind other than StaticPod is a bad request, not a validation failure.
    #[test]
    fn test_wrong_kind_is_bad_request(kind in "[A-Z][A-Za-z]{0,20}") {
        prop_assume!(kind != "StaticPod");
        let mut object = StaticPodBuilder::new("hub").manifest("").build_dynamic();
        object.types.as_mut().unwrap().kind = kind.clone();

        let validator = StaticPodValidator::default();
        let create = validator.validate_create(&object).unwrap_err();
        prop_assert!(create.is_bad_request());
        prop_assert!(create.to_string().contains(&kind));

        let valid = StaticPodBuilder::new("hub").build_dynamic();
        prop_assert!(validator.validate_update(&valid, &object).unwrap_err().is_bad_request());
        prop_assert!(validator.validate_update(&object, &valid).unwrap_err().is_bad_request());
    }
}
