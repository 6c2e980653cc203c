use serde_json::{json, Value};

/// Status, content type and raw body of one upstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u32,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// `{"raw": text}` wrapper used for non-JSON replies.
    pub fn raw(&self) -> Value {
        json!({ "raw": self.text() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u32, ct: Option<&str>, body: &str) -> UpstreamResponse {
        UpstreamResponse {
            status,
            content_type: ct.map(str::to_string),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_detection_is_case_insensitive() {
        assert!(reply(200, Some("Application/JSON;charset=UTF-8"), "{}").is_json());
        assert!(!reply(200, Some("text/plain"), "ok").is_json());
        assert!(!reply(200, None, "{}").is_json());
    }

    #[test]
    fn success_range() {
        assert!(reply(200, None, "").is_success());
        assert!(reply(204, None, "").is_success());
        assert!(!reply(404, None, "").is_success());
    }

    #[test]
    fn raw_wraps_text() {
        assert_eq!(reply(200, None, "12").raw(), json!({"raw": "12"}));
    }
}
