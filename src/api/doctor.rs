use serde_json::Value;

use crate::error::AppResult;

use super::client::ApiClient;

impl ApiClient {
    /// GET doctors: for an authenticated doctor, the assigned patient list.
    pub async fn my_patients(&self, token: &str) -> Vec<Value> {
        self.get_list_or_empty("doctors", token).await
    }

    /// POST doctors/patients/{id}/medical-records.
    pub async fn create_medical_record(&self, token: &str, patient_id: i64, record: &Value) -> AppResult<Value> {
        self.post_json(&format!("doctors/patients/{}/medical-records", patient_id), Some(token), record).await
    }

    /// POST doctors/prescriptions.
    pub async fn create_prescription(&self, token: &str, prescription: &Value) -> AppResult<Value> {
        self.post_json("doctors/prescriptions", Some(token), prescription).await
    }

    /// POST doctors/lab-tests.
    pub async fn order_lab_test(&self, token: &str, order: &Value) -> AppResult<Value> {
        self.post_json("doctors/lab-tests", Some(token), order).await
    }
}
