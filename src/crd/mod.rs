//! Custom Resource Definitions (CRDs) handled by the webhook.
//!
//! - `StaticPod`: a pod manifest written to nodes' static pod directory,
//!   rolled out according to an upgrade strategy

mod static_pod;

pub use static_pod::*;
