use serde_json::{json, Value};

use crate::error::AppResult;

use super::client::ApiClient;

impl ApiClient {
    /// GET laboratories/tests: the pending work queue.
    pub async fn pending_tests(&self, token: &str) -> Vec<Value> {
        self.get_list_or_empty("laboratories/tests", token).await
    }

    /// PUT laboratories/update-exam-status, moving a test to in_progress.
    pub async fn start_test(&self, token: &str, test_id: i64) -> AppResult<Value> {
        let body = json!({"testId": test_id, "status": "in_progress"});
        self.put_json("laboratories/update-exam-status", token, &body).await
    }

    /// PUT laboratories/tests/{id}/results.
    pub async fn complete_test(&self, token: &str, test_id: i64, results: &Value) -> AppResult<Value> {
        self.put_json(&format!("laboratories/tests/{}/results", test_id), token, results).await
    }
}
