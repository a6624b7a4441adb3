//! StaticPod Custom Resource Definition.
//!
//! A StaticPod describes a pod manifest that lives in the kubelet's static pod
//! directory on every matching node, together with the strategy used to roll
//! out a new version of that manifest.

use std::fmt;
use std::str::FromStr;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the StaticPod resource.
pub const STATIC_POD_GROUP: &str = "apps.openyurt.io";
/// API version of the StaticPod resource.
pub const STATIC_POD_VERSION: &str = "v1alpha1";
/// Kind of the StaticPod resource.
pub const STATIC_POD_KIND: &str = "StaticPod";

/// StaticPod is a custom resource for managing static pods across nodes.
///
/// Example:
/// ```yaml
/// apiVersion: apps.openyurt.io/v1alpha1
/// kind: StaticPod
/// metadata:
///   name: yurt-hub
///   namespace: kube-system
/// spec:
///   staticPodManifest: yurthub
///   upgradeStrategy:
///     type: AdvancedRollingUpdate
///     maxUnavailable: 10%
///   template:
///     spec:
///       containers:
///         - name: yurt-hub
///           image: openyurt/yurthub:v1.3.0
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "apps.openyurt.io",
    version = "v1alpha1",
    kind = "StaticPod",
    plural = "staticpods",
    shortname = "sp",
    status = "StaticPodStatus",
    namespaced,
    printcolumn = r#"{"name":"TotalNumber", "type":"integer", "jsonPath":".status.totalNumber"}"#,
    printcolumn = r#"{"name":"ReadyNumber", "type":"integer", "jsonPath":".status.readyNumber"}"#,
    printcolumn = r#"{"name":"UpgradedNumber", "type":"integer", "jsonPath":".status.upgradedNumber"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct StaticPodSpec {
    /// Name of the manifest file (without extension) in the static pod directory.
    #[serde(default)]
    pub static_pod_manifest: String,

    /// Pod template written to the manifest.
    #[serde(default)]
    pub template: PodTemplateSpec,

    /// How nodes pick up a new version of the template.
    #[serde(default)]
    pub upgrade_strategy: StaticPodUpgradeStrategy,
}

/// Upgrade strategy for a StaticPod.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaticPodUpgradeStrategy {
    /// Strategy type: `Auto`, `OTA` or `AdvancedRollingUpdate`.
    ///
    /// Kept as a raw string so that unknown values reach validation instead of
    /// failing to decode. Use [`StaticPodUpgradeStrategy::strategy_type`].
    #[serde(default)]
    pub r#type: String,

    /// Maximum number (or percentage) of nodes upgrading at once.
    /// Required for `Auto` and `AdvancedRollingUpdate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,
}

impl StaticPodUpgradeStrategy {
    /// Parse the strategy type, `None` when it is not a known variant.
    pub fn strategy_type(&self) -> Option<UpgradeStrategyType> {
        self.r#type.parse().ok()
    }
}

/// Known upgrade strategy variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeStrategyType {
    /// Nodes are upgraded automatically, bounded by `maxUnavailable`.
    Auto,
    /// Over-the-air: each node upgrades when its owner asks for it.
    Ota,
    /// Rolling update with readiness gating, bounded by `maxUnavailable`.
    AdvancedRollingUpdate,
}

impl UpgradeStrategyType {
    /// Every variant, in the order they are reported as supported values.
    pub const ALL: [UpgradeStrategyType; 3] = [
        UpgradeStrategyType::Auto,
        UpgradeStrategyType::Ota,
        UpgradeStrategyType::AdvancedRollingUpdate,
    ];

    /// Wire name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeStrategyType::Auto => "Auto",
            UpgradeStrategyType::Ota => "OTA",
            UpgradeStrategyType::AdvancedRollingUpdate => "AdvancedRollingUpdate",
        }
    }
}

impl fmt::Display for UpgradeStrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known strategy type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown upgrade strategy type: {0:?}")]
pub struct UnknownStrategyType(pub String);

impl FromStr for UpgradeStrategyType {
    type Err = UnknownStrategyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| UnknownStrategyType(s.to_string()))
    }
}

/// Observed rollout state of a StaticPod.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaticPodStatus {
    /// Number of nodes running this static pod.
    #[serde(default)]
    pub total_number: i32,

    /// Number of nodes where the static pod is ready.
    #[serde(default)]
    pub ready_number: i32,

    /// Number of nodes already running the latest template.
    #[serde(default)]
    pub upgraded_number: i32,

    /// The generation most recently observed by the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}
