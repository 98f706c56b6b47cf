use serde::{Deserialize, Serialize};

/// Wire form of one submission; shared by the JSON body and the multipart
/// field set. Missing fields default to empty so the validator can name the
/// offending field instead of a generic parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionPayload {
    pub contact_type: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub attachment: Option<AttachmentPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayload {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    pub reference_id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct EmailCheckRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EmailCheckResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
