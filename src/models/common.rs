//! Common types shared across table API models.

use serde::{Deserialize, Serialize};

/// Envelope the table API wraps every successful payload in.
///
/// Reads return `{"result": [...]}`; creates return `{"result": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableResponse<T> {
    /// The records (or single record) returned by the call.
    pub result: T,
}

impl<T> TableResponse<T> {
    /// Unwraps the envelope.
    pub fn into_result(self) -> T {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_response_list() {
        let body = json!({"result": [{"number": "INC0001"}, {"number": "INC0002"}]});
        let response: TableResponse<Vec<serde_json::Value>> =
            serde_json::from_value(body).unwrap();
        assert_eq!(response.result.len(), 2);
        assert_eq!(response.result[1]["number"], "INC0002");
    }

    #[test]
    fn test_table_response_missing_result() {
        let body = json!({"error": {"message": "No Record found"}});
        let parsed = serde_json::from_value::<TableResponse<serde_json::Value>>(body);
        assert!(parsed.is_err());
    }
}
