use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a screen presents when it signs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credentials {
    Anonymous,
    /// A pre-provisioned token, e.g. the moderator's admin token.
    Token(String),
}

impl Credentials {
    /// Token credentials if `token` is present and non-empty, anonymous otherwise.
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => Credentials::Token(t),
            _ => Credentials::Anonymous,
        }
    }
}

/// Role a session acts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May submit pending messages and watch the room.
    Guest,
    /// May additionally change status and delete messages.
    Moderator,
}

impl Role {
    pub fn can_moderate(self) -> bool {
        self == Role::Moderator
    }
}

/// A resolved identity. Store operations are only possible once one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub role: Role,
    /// Bearer token presented on every request made with this session.
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Mint a fresh session with a random bearer token.
    pub fn issue(role: Role, issued_at: DateTime<Utc>) -> Self {
        let token = hex::encode(rand::random::<[u8; 32]>());
        Session {
            id: token[..12].to_string(),
            role,
            token,
            issued_at,
        }
    }
}
