//! Upgrade strategy policy.
//!
//! Validates:
//! - `spec.upgradeStrategy.type` is one of `Auto`, `OTA`, `AdvancedRollingUpdate`
//! - Variants that roll out automatically carry a `maxUnavailable` bound
//!
//! The value of `maxUnavailable` is not range checked.

use super::ValidationContext;
use crate::crd::UpgradeStrategyType;
use crate::field::{ErrorList, FieldError, FieldPath};

/// Per-variant requirements of an upgrade strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyRule {
    /// Whether `maxUnavailable` must be set
    pub requires_max_unavailable: bool,
    /// Detail reported when a required `maxUnavailable` is missing
    pub message: &'static str,
}

const MAX_UNAVAILABLE_REQUIRED: &str = "max-unavailable is required in AdvancedRollingUpdate mode";

/// Rule table for every strategy variant.
pub fn strategy_rule(strategy: UpgradeStrategyType) -> StrategyRule {
    match strategy {
        UpgradeStrategyType::Auto | UpgradeStrategyType::AdvancedRollingUpdate => StrategyRule {
            requires_max_unavailable: true,
            message: MAX_UNAVAILABLE_REQUIRED,
        },
        UpgradeStrategyType::Ota => StrategyRule {
            requires_max_unavailable: false,
            message: "",
        },
    }
}

/// Supported strategy type names, in reporting order
pub fn supported_types() -> [&'static str; 3] {
    UpgradeStrategyType::ALL.map(|variant| variant.as_str())
}

/// Validate the upgrade strategy
pub fn validate(ctx: &ValidationContext<'_>, spec_path: &FieldPath) -> ErrorList {
    let mut errors = ErrorList::new();
    let strategy = &ctx.resource.spec.upgrade_strategy;
    let path = spec_path.child("upgradeStrategy");

    let Some(strategy_type) = strategy.strategy_type() else {
        errors.push(FieldError::not_supported(
            path,
            strategy.r#type.as_str(),
            &supported_types(),
        ));
        return errors;
    };

    let rule = strategy_rule(strategy_type);
    if rule.requires_max_unavailable && strategy.max_unavailable.is_none() {
        errors.push(FieldError::required(path, rule.message));
    }

    errors
}
