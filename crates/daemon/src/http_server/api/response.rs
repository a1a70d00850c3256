use serde::Serialize;

/// Envelope for every key-value response.
///
/// On success `error` is omitted; on failure `data` is omitted.
#[derive(Debug, Clone, Serialize)]
pub struct KvResponse<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KvResponse<()> {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> KvResponse<T> {
    pub fn with_data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Response of the output capture route.
#[derive(Debug, Clone, Serialize)]
pub struct OutputFilterResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl OutputFilterResponse {
    pub fn with_key(key: String) -> Self {
        Self {
            success: true,
            error: None,
            key: Some(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelopes_omit_absent_fields() {
        assert_eq!(
            serde_json::to_value(KvResponse::ok()).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(KvResponse::with_data("bar")).unwrap(),
            json!({"success": true, "data": "bar"})
        );
        assert_eq!(
            serde_json::to_value(KvResponse::failure("key is required")).unwrap(),
            json!({"success": false, "error": "key is required"})
        );
        assert_eq!(
            serde_json::to_value(OutputFilterResponse::with_key("k".into())).unwrap(),
            json!({"success": true, "key": "k"})
        );
    }

    #[test]
    fn test_empty_list_is_kept() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            serde_json::to_value(KvResponse::with_data(empty)).unwrap(),
            json!({"success": true, "data": []})
        );
    }
}
