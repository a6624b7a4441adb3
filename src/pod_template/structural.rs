//! Built-in structural rules for pod templates.
//!
//! Covers the checks that catch most broken manifests before they reach a
//! node: container presence and naming, images, ports, restart and DNS
//! policies, grace periods, volumes and template labels.

use std::collections::{BTreeMap, HashSet};

use k8s_openapi::api::core::v1::{Container, PodSpec};

use super::{CanonicalPodTemplate, PodTemplateValidator, PodValidationOptions};
use crate::field::{ErrorList, FieldError, FieldPath};

const DNS1123_LABEL_MAX_LEN: usize = 63;
const LABEL_VALUE_MAX_LEN: usize = 63;
const QUALIFIED_NAME_MAX_LEN: usize = 63;
const DNS1123_SUBDOMAIN_MAX_LEN: usize = 253;

const SUPPORTED_RESTART_POLICIES: [&str; 3] = ["Always", "OnFailure", "Never"];
const SUPPORTED_DNS_POLICIES: [&str; 4] =
    ["ClusterFirstWithHostNet", "ClusterFirst", "Default", "None"];
const SUPPORTED_PORT_PROTOCOLS: [&str; 3] = ["TCP", "UDP", "SCTP"];

/// Default [`PodTemplateValidator`] used by the webhook.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralPodTemplateValidator;

impl PodTemplateValidator for StructuralPodTemplateValidator {
    fn validate(
        &self,
        template: &CanonicalPodTemplate,
        path: &FieldPath,
        options: &PodValidationOptions,
    ) -> ErrorList {
        let mut errors = ErrorList::new();

        if let Some(labels) = &template.metadata.labels {
            validate_labels(
                labels,
                &path.child("metadata").child("labels"),
                options,
                &mut errors,
            );
        }

        validate_pod_spec(&template.spec, &path.child("spec"), &mut errors);
        errors
    }
}

fn validate_pod_spec(spec: &PodSpec, path: &FieldPath, errors: &mut ErrorList) {
    let volume_names = validate_volumes(spec, &path.child("volumes"), errors);

    if spec.containers.is_empty() {
        errors.push(FieldError::required(path.child("containers"), ""));
    }

    let mut container_names = HashSet::new();
    let init_containers = spec.init_containers.as_deref().unwrap_or_default();
    for (i, container) in init_containers.iter().enumerate() {
        validate_container(
            container,
            &path.child("initContainers").index(i),
            &volume_names,
            &mut container_names,
            errors,
        );
    }
    for (i, container) in spec.containers.iter().enumerate() {
        validate_container(
            container,
            &path.child("containers").index(i),
            &volume_names,
            &mut container_names,
            errors,
        );
    }

    if let Some(policy) = &spec.restart_policy {
        if !SUPPORTED_RESTART_POLICIES.contains(&policy.as_str()) {
            errors.push(FieldError::not_supported(
                path.child("restartPolicy"),
                policy.as_str(),
                &SUPPORTED_RESTART_POLICIES,
            ));
        }
    }

    if let Some(policy) = &spec.dns_policy {
        if !SUPPORTED_DNS_POLICIES.contains(&policy.as_str()) {
            errors.push(FieldError::not_supported(
                path.child("dnsPolicy"),
                policy.as_str(),
                &SUPPORTED_DNS_POLICIES,
            ));
        }
    }

    if let Some(grace) = spec.termination_grace_period_seconds {
        if grace < 0 {
            errors.push(FieldError::invalid(
                path.child("terminationGracePeriodSeconds"),
                grace.to_string(),
                "must be greater than or equal to 0",
            ));
        }
    }

    if let Some(deadline) = spec.active_deadline_seconds {
        if deadline <= 0 {
            errors.push(FieldError::invalid(
                path.child("activeDeadlineSeconds"),
                deadline.to_string(),
                "must be greater than 0",
            ));
        }
    }
}

/// Validate volume names, returning the set of declared names.
fn validate_volumes<'a>(
    spec: &'a PodSpec,
    path: &FieldPath,
    errors: &mut ErrorList,
) -> HashSet<&'a str> {
    let mut names = HashSet::new();
    let volumes = spec.volumes.as_deref().unwrap_or_default();
    for (i, volume) in volumes.iter().enumerate() {
        let name_path = path.index(i).child("name");
        if volume.name.is_empty() {
            errors.push(FieldError::required(name_path, ""));
            continue;
        }
        if let Some(detail) = dns1123_label_error(&volume.name) {
            errors.push(FieldError::invalid(name_path.clone(), &volume.name, detail));
        }
        if !names.insert(volume.name.as_str()) {
            errors.push(FieldError::invalid(
                name_path,
                &volume.name,
                "duplicate volume name",
            ));
        }
    }
    names
}

fn validate_container<'a>(
    container: &'a Container,
    path: &FieldPath,
    volume_names: &HashSet<&str>,
    seen_names: &mut HashSet<&'a str>,
    errors: &mut ErrorList,
) {
    let name_path = path.child("name");
    if container.name.is_empty() {
        errors.push(FieldError::required(name_path, ""));
    } else {
        if let Some(detail) = dns1123_label_error(&container.name) {
            errors.push(FieldError::invalid(
                name_path.clone(),
                &container.name,
                detail,
            ));
        }
        if !seen_names.insert(container.name.as_str()) {
            errors.push(FieldError::invalid(
                name_path,
                &container.name,
                "duplicate container name",
            ));
        }
    }

    if container.image.as_deref().is_none_or(|image| image.trim().is_empty()) {
        errors.push(FieldError::required(path.child("image"), ""));
    }

    let ports = container.ports.as_deref().unwrap_or_default();
    for (i, port) in ports.iter().enumerate() {
        let port_path = path.child("ports").index(i);
        if !(1..=65535).contains(&port.container_port) {
            errors.push(FieldError::invalid(
                port_path.child("containerPort"),
                port.container_port.to_string(),
                "must be between 1 and 65535, inclusive",
            ));
        }
        if let Some(host_port) = port.host_port {
            if !(0..=65535).contains(&host_port) {
                errors.push(FieldError::invalid(
                    port_path.child("hostPort"),
                    host_port.to_string(),
                    "must be between 0 and 65535, inclusive",
                ));
            }
        }
        if let Some(protocol) = &port.protocol {
            if !SUPPORTED_PORT_PROTOCOLS.contains(&protocol.as_str()) {
                errors.push(FieldError::not_supported(
                    port_path.child("protocol"),
                    protocol.as_str(),
                    &SUPPORTED_PORT_PROTOCOLS,
                ));
            }
        }
    }

    let mounts = container.volume_mounts.as_deref().unwrap_or_default();
    for (i, mount) in mounts.iter().enumerate() {
        let mount_path = path.child("volumeMounts").index(i);
        if mount.name.is_empty() {
            errors.push(FieldError::required(mount_path.child("name"), ""));
        } else if !volume_names.contains(mount.name.as_str()) {
            errors.push(FieldError::invalid(
                mount_path.child("name"),
                &mount.name,
                "volume not found",
            ));
        }
        if mount.mount_path.is_empty() {
            errors.push(FieldError::required(mount_path.child("mountPath"), ""));
        }
    }
}

fn validate_labels(
    labels: &BTreeMap<String, String>,
    path: &FieldPath,
    options: &PodValidationOptions,
    errors: &mut ErrorList,
) {
    for (key, value) in labels {
        if let Some(detail) = qualified_name_error(key) {
            errors.push(FieldError::invalid(path.clone(), key, detail));
        }
        if options.allow_invalid_label_value_in_selector {
            continue;
        }
        if let Some(detail) = label_value_error(value) {
            errors.push(FieldError::invalid(path.key(key), value, detail));
        }
    }
}

fn is_dns1123_label(value: &str) -> bool {
    use std::sync::LazyLock;
    // Pattern: ^[a-z0-9]([-a-z0-9]*[a-z0-9])?$
    static LABEL_RE: LazyLock<Option<regex::Regex>> =
        LazyLock::new(|| regex::Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").ok());
    LABEL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

fn is_dns1123_subdomain(value: &str) -> bool {
    use std::sync::LazyLock;
    // Pattern: DNS-1123 labels joined by '.'
    static SUBDOMAIN_RE: LazyLock<Option<regex::Regex>> = LazyLock::new(|| {
        regex::Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").ok()
    });
    SUBDOMAIN_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Name part of a qualified name, also the shape of a non-empty label value.
fn is_name_segment(value: &str) -> bool {
    use std::sync::LazyLock;
    // Pattern: ^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$
    static SEGMENT_RE: LazyLock<Option<regex::Regex>> = LazyLock::new(|| {
        regex::Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$").ok()
    });
    SEGMENT_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Check a DNS-1123 label: lowercase alphanumerics and '-', alphanumeric at both ends.
fn dns1123_label_error(value: &str) -> Option<String> {
    if value.len() > DNS1123_LABEL_MAX_LEN {
        return Some(format!(
            "must be no more than {} characters",
            DNS1123_LABEL_MAX_LEN
        ));
    }
    if is_dns1123_label(value) {
        None
    } else {
        Some(
            "a lowercase RFC 1123 label must consist of lower case alphanumeric characters \
             or '-', and must start and end with an alphanumeric character"
                .to_string(),
        )
    }
}

/// Check a DNS-1123 subdomain: dot-separated labels.
fn dns1123_subdomain_error(value: &str) -> Option<String> {
    if value.len() > DNS1123_SUBDOMAIN_MAX_LEN {
        return Some(format!(
            "must be no more than {} characters",
            DNS1123_SUBDOMAIN_MAX_LEN
        ));
    }
    if is_dns1123_subdomain(value) {
        None
    } else {
        Some(
            "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric \
             characters, '-' or '.', and must start and end with an alphanumeric character"
                .to_string(),
        )
    }
}

/// Check a label key: optional DNS subdomain prefix, then a name segment.
fn qualified_name_error(value: &str) -> Option<String> {
    let name = match value.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty() {
                return Some("prefix part must be non-empty".to_string());
            }
            if let Some(detail) = dns1123_subdomain_error(prefix) {
                return Some(format!("prefix part {}", detail));
            }
            name
        }
        None => value,
    };

    if name.is_empty() {
        return Some("name part must be non-empty".to_string());
    }
    if name.len() > QUALIFIED_NAME_MAX_LEN {
        return Some(format!(
            "name part must be no more than {} characters",
            QUALIFIED_NAME_MAX_LEN
        ));
    }
    if is_name_segment(name) {
        None
    } else {
        Some(
            "name part must consist of alphanumeric characters, '-', '_' or '.', and must \
             start and end with an alphanumeric character"
                .to_string(),
        )
    }
}

fn label_value_error(value: &str) -> Option<String> {
    if value.len() > LABEL_VALUE_MAX_LEN {
        return Some(format!(
            "must be no more than {} characters",
            LABEL_VALUE_MAX_LEN
        ));
    }
    if value.is_empty() || is_name_segment(value) {
        None
    } else {
        Some(
            "a valid label must be an empty string or consist of alphanumeric characters, \
             '-', '_' or '.', and must start and end with an alphanumeric character"
                .to_string(),
        )
    }
}
