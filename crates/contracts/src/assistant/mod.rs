//! Wire contract of the assistant service.
//!
//! Only the fields the client actually reads are modelled. Unknown fields
//! in responses are ignored.

use serde::{Deserialize, Serialize};

/// Multipart upload of a patient document (field `file`)
pub const UPLOAD_PATH: &str = "/upload";
/// JSON question about the uploaded document
pub const CHAT_PATH: &str = "/chat";
/// Multipart image analysis (fields `file`, `prompt`)
pub const ANALYZE_IMAGE_PATH: &str = "/analyze-image";

/// Multipart field carrying the binary for both upload endpoints
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the analysis instruction
pub const PROMPT_FIELD: &str = "prompt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisReply {
    pub diagnosis: String,
}

/// Body the service sends with 4xx responses, e.g. `{"error": "No file uploaded"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
