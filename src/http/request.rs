use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap as Headers, HeaderName, HeaderValue};
use serde::Serialize;

use crate::http::types::Method;
use crate::{ProbeError, Result};

pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub query_params: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            query_params: Vec::new(),
        }
    }

    fn insert_header(&mut self, key: &str, value: &str) -> Result<()> {
        let name: HeaderName = key
            .parse()
            .map_err(|_| ProbeError::InvalidHeader(format!("invalid header name '{}'", key)))?;
        let value: HeaderValue = value
            .parse()
            .map_err(|_| ProbeError::InvalidHeader(format!("invalid value for header '{}'", key)))?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        self.insert_header(key, value)?;
        Ok(self)
    }

    /// 空字符串值表示删除该请求头（用于"不发送 token"的场景）
    pub fn with_header_override(mut self, key: &str, value: &str) -> Result<Self> {
        if value.is_empty() {
            let name: HeaderName = key
                .parse()
                .map_err(|_| ProbeError::InvalidHeader(format!("invalid header name '{}'", key)))?;
            self.headers.remove(name);
            Ok(self)
        } else {
            self.with_header(key, value)
        }
    }

    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_string(data)?;
        self.body = Some(json);
        Ok(self.with_json_content_type())
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        match self.query_params.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.query_params.push((key.to_string(), value.to_string())),
        }
        self
    }

    pub fn with_auth_bearer(mut self, token: &str) -> Result<Self> {
        let value: HeaderValue = format!("Bearer {}", token)
            .parse()
            .map_err(|_| ProbeError::InvalidHeader("bearer token is not a valid header value".to_string()))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// 带查询参数的完整 URL，用于日志与报告
    pub fn display_url(&self) -> String {
        if self.query_params.is_empty() {
            return self.url.clone();
        }
        match url::Url::parse_with_params(&self.url, &self.query_params) {
            Ok(url) => url.to_string(),
            Err(_) => self.url.clone(),
        }
    }
}
