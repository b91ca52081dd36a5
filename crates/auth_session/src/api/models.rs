use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AuthError, Result};

/// Status the backend returns once an update has been accepted.
pub const UPDATE_ACCEPTED: u16 = 202;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Any additional profile fields the backend accepts.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Profile changes sent as `multipart/form-data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl UserChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    pub fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = file.mime {
                part = part.mime_str(&mime)?;
            }
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

/// Status code and decoded body of a backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub code: u16,
    pub body: Value,
}

impl ApiResponse {
    /// JSON bodies are parsed; anything else is kept as a plain string.
    pub fn from_text(code: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.trim().to_string()))
        };
        ApiResponse { code, body }
    }

    /// Token carried in the `encrypted` field of the body.
    pub fn encrypted_token(&self) -> Result<String> {
        self.body
            .get("encrypted")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(AuthError::MissingToken)
    }

    /// Token that makes up the entire body.
    pub fn bare_token(&self) -> Result<String> {
        self.body
            .as_str()
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registration_flattens_extra_fields() {
        let mut extra = Map::new();
        extra.insert("city".to_string(), json!("Lima"));
        let registration = Registration {
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
            name: None,
            extra,
        };

        let value = serde_json::to_value(&registration).unwrap();
        assert_eq!(
            value,
            json!({"email": "ana@example.com", "password": "secret", "city": "Lima"})
        );
    }

    #[test]
    fn response_token_extraction() {
        let wrapped = ApiResponse::from_text(201, r#"{"encrypted":"a.b.c"}"#);
        assert_eq!(wrapped.encrypted_token().unwrap(), "a.b.c");
        assert!(matches!(wrapped.bare_token(), Err(AuthError::MissingToken)));

        let quoted = ApiResponse::from_text(200, r#""a.b.c""#);
        assert_eq!(quoted.bare_token().unwrap(), "a.b.c");

        let plain = ApiResponse::from_text(200, "a.b.c\n");
        assert_eq!(plain.bare_token().unwrap(), "a.b.c");

        let empty = ApiResponse::from_text(200, "");
        assert_eq!(empty.body, Value::Null);
        assert!(matches!(empty.encrypted_token(), Err(AuthError::MissingToken)));
    }

    #[test]
    fn user_changes_builder() {
        let changes = UserChanges::new()
            .field("name", "Ana")
            .file(FilePart {
                field: "image".to_string(),
                file_name: "avatar.png".to_string(),
                mime: Some("image/png".to_string()),
                bytes: vec![1, 2, 3],
            });

        assert!(!changes.is_empty());
        assert_eq!(changes.fields(), &[("name".to_string(), "Ana".to_string())]);
        assert_eq!(changes.files().len(), 1);
        assert!(changes.into_form().is_ok());
        assert!(UserChanges::new().is_empty());
    }
}
