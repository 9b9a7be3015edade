#![warn(clippy::unwrap_in_result)]
#![warn(clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public URL prefix under which stored files are served.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Username and password pair.
///
/// Used both as the sign-up/login request body and as the persisted
/// credential record. Missing fields deserialize as empty strings so that
/// validation can report them instead of the JSON extractor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Metadata describing one stored file.
///
/// The record and the blob stored under `filename` live and die together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Generated unique name, also the key of the blob
    pub filename: String,
    /// Public path the file is reachable at
    pub path: String,
    /// Upload time in UTC
    pub uploaded_at: DateTime<Utc>,
    /// Name of the user that uploaded the file
    pub uploaded_by: String,
}

impl UploadRecord {
    #[must_use]
    pub fn new(filename: String, uploaded_by: String, uploaded_at: DateTime<Utc>) -> Self {
        let path = format!("{UPLOADS_PREFIX}/{filename}");
        Self {
            filename,
            path,
            uploaded_at,
            uploaded_by,
        }
    }
}

/// Generic reply carrying an outcome flag and a human readable message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reply {
    pub success: bool,
    pub message: String,
}

impl Reply {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Reply to a successful upload: the stored record plus the success flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Uploaded {
    pub success: bool,
    #[serde(flatten)]
    pub record: UploadRecord,
}

/// Whether the presented session resolves to a user, and which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub logged_in: bool,
    pub user: Option<String>,
}

impl Status {
    #[must_use]
    pub fn new(user: Option<String>) -> Self {
        Self {
            logged_in: user.is_some(),
            user,
        }
    }
}
