use crate::{Activity, AppSettings, AuthUser, Interest, Lead, LogEntry, TaskItem, User};
use serde::{Deserialize, Serialize};

/// The uniform result envelope used by every client-facing operation.
///
/// Upstream reports logical failure inside the body (`success: false`),
/// not through the HTTP status, so callers branch on this envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Success plus payload, or the reported error (with a fallback text).
    pub fn into_result(self, fallback: &str) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.unwrap_or_else(|| fallback.to_string())),
        }
    }
}

/// The bulk payload returned by a sync query.
///
/// Every slice tolerates absence in the JSON; a partial snapshot
/// deserializes to empty collections instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncData {
    #[serde(default)]
    pub leads: Vec<Lead>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub interests: Vec<Interest>,
    #[serde(default)]
    pub settings: AppSettings,
}

/// Payload of a successful `login` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    pub user: AuthUser,
    pub token: String,
}

// =========================================================
// Command definitions
// =========================================================
// The closed set of commands the gateway will forward upstream.
// Anything outside this union is rejected at the boundary instead
// of being passed through blindly.

/// Login credentials (`uid` is the upstream's user identifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub uid: String,
    pub password: String,
}

/// Partial profile update; absent fields are left untouched upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// A lead as submitted for creation: everything but the server-assigned
/// `id` and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub location: String,
    pub interest: String,
    pub source: String,
    pub status: String,
    pub assigned_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Field-wise lead update; only the present fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The tagged union of every command the upstream service understands.
///
/// Serialized with an `action` discriminator, matching the upstream
/// contract `{action, ...payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    Login {
        #[serde(flatten)]
        credentials: Credentials,
    },
    ValidateToken {
        token: String,
    },
    UpdateProfile {
        #[serde(flatten)]
        profile: ProfileUpdate,
    },
    CreateLead {
        #[serde(flatten)]
        lead: LeadDraft,
    },
    UpdateLead {
        id: String,
        #[serde(flatten)]
        updates: LeadPatch,
    },
    DeleteLead {
        id: String,
    },
}

impl Command {
    /// The `action` discriminator as it appears on the wire.
    pub fn action(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::ValidateToken { .. } => "validateToken",
            Command::UpdateProfile { .. } => "updateProfile",
            Command::CreateLead { .. } => "createLead",
            Command::UpdateLead { .. } => "updateLead",
            Command::DeleteLead { .. } => "deleteLead",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_round_trips_with_action_tag() {
        let cmd = Command::DeleteLead { id: "L-9".into() };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["action"], "deleteLead");
        assert_eq!(json["id"], "L-9");
    }

    #[test]
    fn login_payload_is_flattened() {
        let cmd: Command =
            serde_json::from_str(r#"{"action":"login","uid":"ravi","password":"pw"}"#).unwrap();
        match cmd {
            Command::Login { credentials } => {
                assert_eq!(credentials.uid, "ravi");
                assert_eq!(credentials.password, "pw");
            }
            other => panic!("parsed wrong variant: {other:?}"),
        }
    }

    #[test]
    fn update_lead_carries_id_and_partial_fields() {
        let cmd: Command = serde_json::from_str(
            r#"{"action":"updateLead","id":"L-1","status":"Contacted"}"#,
        )
        .unwrap();
        match cmd {
            Command::UpdateLead { id, updates } => {
                assert_eq!(id, "L-1");
                assert_eq!(updates.status.as_deref(), Some("Contacted"));
                assert!(updates.name.is_none());
            }
            other => panic!("parsed wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        let parsed: Result<Command, _> =
            serde_json::from_str(r#"{"action":"dropAllTables"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn envelope_tolerates_missing_optionals() {
        let resp: ApiResponse<LoginData> =
            serde_json::from_str(r#"{"success":false,"error":"Invalid credentials"}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(
            resp.into_result("Login failed").unwrap_err(),
            "Invalid credentials"
        );
    }

    #[test]
    fn envelope_without_error_text_uses_fallback() {
        let resp: ApiResponse<LoginData> = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(resp.into_result("Login failed").unwrap_err(), "Login failed");
    }

    #[test]
    fn partial_snapshot_fills_empty_slices() {
        let sync: SyncData =
            serde_json::from_str(r#"{"leads":[],"settings":{"appTitle":"LeadFlow"}}"#).unwrap();
        assert!(sync.activities.is_empty());
        assert!(sync.users.is_empty());
        assert_eq!(sync.settings.app_title, "LeadFlow");
    }
}
