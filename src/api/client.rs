use reqwest::{Method, Response, StatusCode, Url};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::{error_message_from_body, AppError, AppResult};
use crate::session::adapters;

/// Thin wrapper over the remote TOHPITOH REST API. Carries the base URL and
/// one reqwest client; every call is bearer-authenticated when a token is
/// supplied and logged with a correlation id.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(mut base: Url) -> Self {
        // join() resolves against the last path segment; anchor the base with
        // a trailing slash so `jwt/auth` lands under /api/v1/
        if !base.path().ends_with('/') {
            let p = format!("{}/", base.path());
            base.set_path(&p);
        }
        Self { base, http: reqwest::Client::new() }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path)
            .map_err(|e| AppError::internal("bad_endpoint", format!("{}: {}", path, e)))
    }

    pub(crate) async fn request_json(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> AppResult<Value> {
        let url = self.endpoint(path)?;
        let rid = Uuid::new_v4();
        debug!(target: "tohpitoh::api", %rid, %method, path, "request");
        let mut rb = self.http.request(method, url);
        if let Some(t) = token {
            rb = rb.bearer_auth(t);
        }
        if let Some(b) = body {
            rb = rb.json(b);
        }
        let resp = rb.send().await?;
        debug!(target: "tohpitoh::api", %rid, status = resp.status().as_u16(), "response");
        Self::read_json(resp).await
    }

    async fn read_json(resp: Response) -> AppResult<Value> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<Value>()
                .await
                .map_err(|e| AppError::decode("bad_body", e.to_string()));
        }
        let raw = resp.text().await.unwrap_or_default();
        Err(AppError::http(status.as_u16(), error_message_from_body(&raw, status.as_u16())))
    }

    pub async fn get_json(&self, path: &str, token: &str) -> AppResult<Value> {
        self.request_json(Method::GET, path, Some(token), None).await
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: &Value) -> AppResult<Value> {
        self.request_json(Method::POST, path, token, Some(body)).await
    }

    pub async fn put_json(&self, path: &str, token: &str, body: &Value) -> AppResult<Value> {
        self.request_json(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete_json(&self, path: &str, token: &str) -> AppResult<Value> {
        self.request_json(Method::DELETE, path, Some(token), None).await
    }

    /// Status-only authenticated GET used by the role probes. The body is
    /// never read; only the status code carries signal.
    pub(crate) async fn probe_status(&self, path: &str, token: &str) -> AppResult<StatusCode> {
        let url = self.endpoint(path)?;
        let resp = self.http.get(url).bearer_auth(token).send().await?;
        Ok(resp.status())
    }

    /// Role-scoped list endpoints answer 403/404 for actors outside the role;
    /// that is an expected empty result, not an error, and so is any other
    /// failure on these paths.
    pub(crate) async fn get_list_or_empty(&self, path: &str, token: &str) -> Vec<Value> {
        match self.get_json(path, token).await {
            Ok(v) => adapters::unwrap_list(&v),
            Err(e) => {
                debug!(target: "tohpitoh::api", path, err = %e, "list endpoint fell back to empty");
                Vec::new()
            }
        }
    }
}
