use std::fmt::{Display, Formatter};

use serde_json::Value;

use crate::error::AppResult;

use super::client::ApiClient;

/// Professional account kinds an administrator validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfessionalKind {
    Doctor,
    Laboratory,
}

impl ProfessionalKind {
    fn path_segment(&self) -> &'static str {
        match self {
            ProfessionalKind::Doctor => "doctors",
            ProfessionalKind::Laboratory => "laboratories",
        }
    }
}

impl Display for ProfessionalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationAction {
    Approve,
    Reject,
}

impl ValidationAction {
    fn path_segment(&self) -> &'static str {
        match self {
            ValidationAction::Approve => "approve",
            ValidationAction::Reject => "reject",
        }
    }
}

impl ApiClient {
    /// GET admin/statistics: dashboard numbers; doubles as the admin role probe.
    pub async fn admin_statistics(&self, token: &str) -> AppResult<Value> {
        self.get_json("admin/statistics", token).await
    }

    /// GET admin/all-users.
    pub async fn all_users(&self, token: &str) -> AppResult<Value> {
        self.get_json("admin/all-users", token).await
    }

    /// GET admin/pending-validations.
    pub async fn pending_validations(&self, token: &str) -> AppResult<Value> {
        self.get_json("admin/pending-validations", token).await
    }

    /// PUT admin/{doctors|laboratories}/{id}/{approve|reject}.
    pub async fn validate_professional(
        &self,
        token: &str,
        kind: ProfessionalKind,
        id: i64,
        action: ValidationAction,
    ) -> AppResult<Value> {
        let path = format!("admin/{}/{}/{}", kind.path_segment(), id, action.path_segment());
        // bodyless PUT; the path carries the whole decision
        self.request_json(reqwest::Method::PUT, &path, Some(token), None).await
    }
}
