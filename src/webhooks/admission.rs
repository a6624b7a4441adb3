//! Admission request handling.
//!
//! Turns `AdmissionReview` payloads into validator calls and validator
//! outcomes back into `AdmissionResponse`s. Serving the review over HTTPS is
//! left to the embedding process.

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use tracing::{debug, error, info, warn};

use super::error::{AdmissionError, Result};
use super::validator::StaticPodValidator;
use crate::pod_template::{PodTemplateValidator, TemplateConverter};

/// Create a denial response with reason embedded in message.
/// kube-rs deny() only sets status.message, so we format as "[reason] message"
fn deny_with_reason(
    request: &AdmissionRequest<DynamicObject>,
    err: &AdmissionError,
) -> AdmissionResponse {
    let full_message = format!("[{}] {}", err.reason(), err);
    AdmissionResponse::from(request).deny(full_message)
}

/// Handle a full admission review.
///
/// A review without a request yields an `invalid` response, as there is no
/// uid to answer to.
pub fn review<C, V>(
    validator: &StaticPodValidator<C, V>,
    incoming: AdmissionReview<DynamicObject>,
) -> AdmissionReview<DynamicObject>
where
    C: TemplateConverter,
    V: PodTemplateValidator,
{
    let request: AdmissionRequest<DynamicObject> = match incoming.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e))
                .into_review();
        }
    };

    admit(validator, &request).into_review()
}

/// Handle a single admission request.
pub fn admit<C, V>(
    validator: &StaticPodValidator<C, V>,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse
where
    C: TemplateConverter,
    V: PodTemplateValidator,
{
    let uid = &request.uid;
    debug!(
        uid = %uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = %request.name,
        dry_run = request.dry_run,
        "Processing admission request"
    );

    match dispatch(validator, request) {
        Ok(()) => {
            info!(uid = %uid, operation = ?request.operation, "Admission request allowed");
            AdmissionResponse::from(request)
        }
        Err(err) => {
            warn!(
                uid = %uid,
                reason = err.reason(),
                message = %err,
                "Admission request denied"
            );
            deny_with_reason(request, &err)
        }
    }
}

fn dispatch<C, V>(
    validator: &StaticPodValidator<C, V>,
    request: &AdmissionRequest<DynamicObject>,
) -> Result<()>
where
    C: TemplateConverter,
    V: PodTemplateValidator,
{
    match request.operation {
        Operation::Create => {
            validator.validate_create(required_object(request.object.as_ref(), "object")?)
        }
        Operation::Update => validator.validate_update(
            required_object(request.old_object.as_ref(), "oldObject")?,
            required_object(request.object.as_ref(), "object")?,
        ),
        Operation::Delete => match &request.old_object {
            Some(object) => validator.validate_delete(object),
            None => Ok(()),
        },
        Operation::Connect => Ok(()),
    }
}

fn required_object<'a>(
    object: Option<&'a DynamicObject>,
    field: &str,
) -> Result<&'a DynamicObject> {
    object.ok_or_else(|| AdmissionError::BadRequest(format!("missing {} in request", field)))
}
