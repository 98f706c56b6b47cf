use crate::api::AppState;
use crate::api::schemas::contact::{
    AttachmentPayload, EmailCheckRequest, EmailCheckResponse, HealthResponse, SubmissionPayload,
    SubmissionResponse,
};
use crate::domain::submission::{AttachmentMeta, ContactType, SubmissionRequest};
use crate::error::{AppError, Result};
use crate::services::email_verifier;
use axum::{
    Json,
    extract::{ConnectInfo, FromRequest, Multipart, Request, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use std::net::SocketAddr;

/// Cap for JSON submissions; attachments ride along as metadata only, so
/// real bodies stay far below this.
const JSON_BODY_LIMIT: usize = 64 * 1024;

/// One submission body as it arrived on the wire. Both encodings normalize
/// into the same `SubmissionRequest` before any validation runs.
#[derive(Debug)]
pub(crate) enum RequestBody {
    Multipart(SubmissionPayload),
    Json(SubmissionPayload),
}

impl RequestBody {
    async fn parse(request: Request, state: &AppState) -> Result<Self> {
        let is_multipart = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(request, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?;
            Ok(Self::Multipart(read_multipart_fields(multipart).await?))
        } else {
            let bytes = axum::body::to_bytes(request.into_body(), JSON_BODY_LIMIT)
                .await
                .map_err(|e| AppError::BadRequest(format!("Unreadable request body: {e}")))?;
            let payload = serde_json::from_slice(&bytes)
                .map_err(|e| AppError::BadRequest(format!("Malformed JSON body: {e}")))?;
            Ok(Self::Json(payload))
        }
    }

    fn into_submission(self) -> SubmissionRequest {
        let (Self::Multipart(fields) | Self::Json(fields)) = self;

        SubmissionRequest {
            contact_type: ContactType::parse(&fields.contact_type),
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            phone: fields.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            message: fields.message.trim().to_string(),
            attachment: fields
                .attachment
                .map(|a| AttachmentMeta { name: a.name, size: a.size, mime_type: a.mime_type }),
        }
    }
}

async fn read_multipart_fields(mut multipart: Multipart) -> Result<SubmissionPayload> {
    let mut payload = SubmissionPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == "attachment" {
            let file_name = field.file_name().unwrap_or("attachment").to_string();
            let mime_type = field.content_type().unwrap_or("application/octet-stream").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Unreadable attachment: {e}")))?;
            payload.attachment =
                Some(AttachmentPayload { name: file_name, size: bytes.len() as u64, mime_type });
            continue;
        }

        let text =
            field.text().await.map_err(|e| AppError::BadRequest(format!("Unreadable field {name}: {e}")))?;
        match name.as_str() {
            "contactType" => payload.contact_type = text,
            "name" => payload.name = text,
            "email" => payload.email = text,
            "phone" => payload.phone = Some(text),
            "message" => payload.message = text,
            _ => {}
        }
    }

    Ok(payload)
}

/// Accepts one contact submission as JSON or multipart form data.
///
/// # Errors
/// 400 for validation failures, 429 when the client exceeded its submission
/// window, 500 when the internal notification cannot be dispatched.
pub async fn submit_contact(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
) -> Result<impl IntoResponse> {
    let client_ip = state.ip_resolver.identify_client_ip(request.headers(), peer.ip());
    let submission = RequestBody::parse(request, &state).await?.into_submission();

    let receipt = state.contact_service.submit(submission, client_ip).await?;

    Ok(Json(SubmissionResponse {
        success: true,
        message: "Your message has been sent successfully!".to_string(),
        reference_id: receipt.reference_id,
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "Contact API is running" })
}

/// Pre-validates an email address for inline form feedback.
///
/// # Errors
/// 429 when the client exceeded the pre-validation window.
pub async fn check_email(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<EmailCheckRequest>,
) -> Result<impl IntoResponse> {
    let client_ip = state.ip_resolver.identify_client_ip(&headers, peer.ip());
    if !state.email_check_limiter.check(&client_ip.to_string()) {
        return Err(AppError::RateLimited);
    }

    let verdict = email_verifier::verify(&payload.email);
    Ok(Json(EmailCheckResponse { valid: verdict.is_deliverable(), reason: verdict.into_reason() }))
}
