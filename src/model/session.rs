use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minimal user descriptor kept in the durable store. v2 logins only return an id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserData,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ProfileResponse {
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Both login response shapes, `{token, user}` and `{access_token, user_id}`
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum LoginResponse {
    Profile {
        token: String,
        user: ProfileResponse,
    },
    Access {
        access_token: String,
        user_id: Value,
    },
}

/// Ids arrive either as numbers or strings depending on the backend version
fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        match response {
            LoginResponse::Profile { token, user } => Session {
                token,
                user: UserData {
                    id: id_to_string(&user.id),
                    name: user.name,
                    email: user.email,
                },
            },
            LoginResponse::Access {
                access_token,
                user_id,
            } => Session {
                token: access_token,
                user: UserData {
                    id: id_to_string(&user_id),
                    name: None,
                    email: None,
                },
            },
        }
    }
}
