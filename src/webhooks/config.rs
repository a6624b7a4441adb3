//! Validator configuration.
//!
//! Everything has a sensible default; deployments override individual knobs
//! through environment variables on the webhook pod.

use tracing::warn;

use crate::pod_template::PodValidationOptions;

/// Environment variable toggling validation of the previous object on UPDATE.
pub const VALIDATE_PREVIOUS_ON_UPDATE_ENV: &str = "STATICPOD_VALIDATE_PREVIOUS_ON_UPDATE";

/// Configuration for [`StaticPodValidator`](super::StaticPodValidator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Also validate the stored object on UPDATE, after the incoming one passes.
    ///
    /// A stored object that no longer passes blocks every update to it,
    /// including updates that would fix it.
    pub validate_previous_on_update: bool,

    /// Options handed to the pod template validator.
    pub pod_validation: PodValidationOptions,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            validate_previous_on_update: true,
            pod_validation: PodValidationOptions::default(),
        }
    }
}

impl ValidatorConfig {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(VALIDATE_PREVIOUS_ON_UPDATE_ENV) {
            match parse_bool(&raw) {
                Some(value) => config.validate_previous_on_update = value,
                None => warn!(
                    key = VALIDATE_PREVIOUS_ON_UPDATE_ENV,
                    value = %raw,
                    default = config.validate_previous_on_update,
                    "Ignoring unparseable boolean, using default"
                ),
            }
        }

        config
    }

    /// Set whether the previous object is validated on UPDATE.
    pub fn with_validate_previous_on_update(mut self, enabled: bool) -> Self {
        self.validate_previous_on_update = enabled;
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
