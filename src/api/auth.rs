use serde_json::{json, Value};

use crate::error::AppResult;

use super::client::ApiClient;

impl ApiClient {
    /// POST jwt/auth. The response shape is not fixed; callers run it through
    /// the session adapters.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Value> {
        let body = json!({"email": email, "password": password});
        self.post_json("jwt/auth", None, &body).await
    }

    /// POST jwt/register with a role-shaped payload.
    pub async fn register_account(&self, payload: &Value) -> AppResult<Value> {
        self.post_json("jwt/register", None, payload).await
    }

    /// PUT jwt/profile, common fields only.
    pub async fn update_profile(&self, token: &str, fields: &Value) -> AppResult<Value> {
        self.put_json("jwt/profile", token, fields).await
    }
}
