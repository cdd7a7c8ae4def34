use serde::{Deserialize, Serialize};

/// Body of both login and registration. Fields are optional so a missing
/// field becomes a validation error instead of a JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Lenient parse: anything that is not a JSON object with string fields
    /// reads as an empty request.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Both fields, or `None` when either is absent or empty.
    pub fn into_parts(self) -> Option<(String, String)> {
        match (self.username, self.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_body() {
        let req = CredentialsRequest::from_body(br#"{"username":"alice","password":"hunter2x"}"#);
        assert_eq!(
            req.into_parts(),
            Some(("alice".to_string(), "hunter2x".to_string()))
        );
    }

    #[test]
    fn missing_empty_or_garbage_yields_none() {
        let bodies: [&[u8]; 5] = [
            br#"{"username":"alice"}"#,
            br#"{"username":"","password":"x"}"#,
            br#"{"username":1,"password":"x"}"#,
            b"not json",
            b"",
        ];
        for body in bodies {
            assert!(CredentialsRequest::from_body(body).into_parts().is_none());
        }
    }

    #[test]
    fn register_response_uses_camel_case_id() {
        let json = serde_json::to_value(RegisterResponse {
            message: "User created successfully",
            user_id: 7,
        })
        .unwrap();
        assert_eq!(json["userId"], 7);
    }
}
