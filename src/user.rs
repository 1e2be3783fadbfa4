use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::task::null_as_default;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    #[serde(alias = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Server-relative path of the profile photo.
    #[serde(default, deserialize_with = "null_as_default")]
    pub fotoperfil: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Profile update sent as a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub photo: Option<PathBuf>,
}

/// `data` payload of a successful login or signup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthPayload {
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_without_photo_decodes() {
        let user: User = serde_json::from_str(
            r#"{"_id":"u1","name":"Ana","email":null,"fotoperfil":null}"#,
        )
        .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "");
        assert_eq!(user.fotoperfil, "");
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let user: User = serde_json::from_str("{}").unwrap();
        assert_eq!(user.id, "");
        assert_eq!(user.fotoperfil, "");
    }
}
