//! Request and response bodies of the backend REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mesfactures_core::goals::NewGoal;
use mesfactures_core::invoices::ParsedInvoice;

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Common envelope returned by most endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorResponse {
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User as described by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: RemoteUser,
}

/// Account creation payload. Field names follow the backend's French schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenoms")]
    pub first_name: String,
    pub email: String,
    #[serde(rename = "motDePasse")]
    pub password: String,
    #[serde(rename = "statut")]
    pub status: String,
    #[serde(rename = "roleLibelle")]
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct VerifyTokenRequest<'a> {
    pub token: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTokenResponse {
    pub success: bool,
    #[serde(default)]
    pub user: Option<RemoteUser>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Invoices and goals
// ─────────────────────────────────────────────────────────────────────────────

/// OCR result submitted on behalf of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoiceUpload<'a> {
    pub utilisateur_id: i64,
    #[serde(flatten)]
    pub invoice: &'a ParsedInvoice,
}

/// Goal creation payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoalUpload<'a> {
    pub utilisateur_id: i64,
    #[serde(flatten)]
    pub goal: &'a NewGoal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn register_request_uses_backend_field_names() {
        let body = serde_json::to_value(RegisterRequest {
            last_name: "Rakoto".to_string(),
            first_name: "Marie".to_string(),
            email: "marie@example.com".to_string(),
            password: "secret".to_string(),
            status: "actif".to_string(),
            role: "user".to_string(),
        })
        .unwrap();
        assert_eq!(body["nom"], "Rakoto");
        assert_eq!(body["motDePasse"], "secret");
        assert_eq!(body["roleLibelle"], "user");
    }

    #[test]
    fn invoice_upload_flattens_the_parsed_invoice() {
        let invoice = ParsedInvoice {
            supplier: "JIRAMA".to_string(),
            invoice_type: "electricite".to_string(),
            amount: 45000.0,
            issue_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            due_date: None,
            status: None,
        };
        let body = serde_json::to_value(InvoiceUpload {
            utilisateur_id: 7,
            invoice: &invoice,
        })
        .unwrap();
        assert_eq!(body["utilisateurId"], 7);
        assert_eq!(body["supplier"], "JIRAMA");
        assert_eq!(body["issueDate"], "2025-02-01");
    }

    #[test]
    fn error_body_prefers_message() {
        let body: ApiErrorResponse =
            serde_json::from_str(r#"{"error":"bad","message":"Token expiré"}"#).unwrap();
        assert_eq!(body.text(), Some("Token expiré"));
    }
}
