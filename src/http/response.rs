use crate::http::types::Status;
use serde_json::Value;
use std::time::Duration;

pub struct Response {
    pub status: Status,
    pub body: String,
    pub duration: Duration,
}

impl Response {
    pub fn new(status: u16, body: String, duration: Duration) -> Self {
        Self {
            status: Status::new(status),
            body,
            duration,
        }
    }

    /// 解析 JSON body；body 为空或不是合法 JSON 时返回 None
    pub fn json(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }

    /// 与 `json` 相同，但解析失败时返回空对象
    pub fn json_or_empty(&self) -> Value {
        self.json()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    pub fn text(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> Response {
        Response::new(status, body.to_string(), Duration::from_millis(5))
    }

    #[test]
    fn test_json_body() {
        let resp = response(200, r#"[{"id": "l1"}]"#);
        assert_eq!(resp.json(), Some(json!([{"id": "l1"}])));
        assert_eq!(resp.status.code(), 200);
    }

    #[test]
    fn test_invalid_json_is_empty_object() {
        let resp = response(500, "Internal Server Error");
        assert_eq!(resp.json(), None);
        assert_eq!(resp.json_or_empty(), json!({}));
        assert_eq!(resp.text(), "Internal Server Error");
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let resp = response(204, "");
        assert_eq!(resp.json_or_empty(), json!({}));
    }
}
