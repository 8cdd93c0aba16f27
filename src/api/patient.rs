use serde_json::Value;

use crate::error::AppResult;
use crate::session::Role;

use super::client::ApiClient;

impl ApiClient {
    /// GET patients/medical-records. Non-patient roles short-circuit to an
    /// empty list without touching the network; a 403 from the backend is the
    /// expected "not a patient" answer and also yields an empty list.
    pub async fn medical_records(&self, token: &str, role: Role) -> Vec<Value> {
        if !role.is_patient_alias() {
            return Vec::new();
        }
        self.get_list_or_empty("patients/medical-records", token).await
    }

    /// PUT patients/profile/me.
    pub async fn update_patient_info(&self, token: &str, fields: &Value) -> AppResult<Value> {
        self.put_json("patients/profile/me", token, fields).await
    }

    /// GET patients/granted-accesses.
    pub async fn granted_accesses(&self, token: &str) -> Vec<Value> {
        self.get_list_or_empty("patients/granted-accesses", token).await
    }

    /// POST patients/grant.
    pub async fn grant_access(&self, token: &str, payload: &Value) -> AppResult<Value> {
        self.post_json("patients/grant", Some(token), payload).await
    }

    /// DELETE patients/revoke/{id}.
    pub async fn revoke_access(&self, token: &str, permission_id: i64) -> AppResult<Value> {
        self.delete_json(&format!("patients/revoke/{}", permission_id), token).await
    }

    /// GET doctors: the directory patients pick a practitioner from.
    pub async fn doctor_directory(&self, token: &str) -> Vec<Value> {
        self.get_list_or_empty("doctors", token).await
    }
}
