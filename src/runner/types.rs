use crate::http::Method;
use crate::session::AuthMode;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// 单个探测用例：名称、方法、端点、期望状态码及可选的 body / 查询参数 / 请求头覆盖
#[derive(Debug, Clone)]
pub struct ProbeCase {
    pub name: String,
    pub method: Method,
    /// 相对于 API 前缀的端点，例如 `lessons/42/quizzes`
    pub endpoint: String,
    pub expected_status: u16,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    /// 在 token 之后应用，可覆盖 `Authorization`；空值表示删除该头
    pub headers: Vec<(String, String)>,
    pub auth: AuthMode,
}

impl ProbeCase {
    pub fn new(
        name: impl Into<String>,
        method: Method,
        endpoint: impl Into<String>,
        expected_status: u16,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            endpoint: endpoint.into(),
            expected_status,
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
            auth: AuthMode::Session,
        }
    }

    pub fn get(name: impl Into<String>, endpoint: impl Into<String>, expected_status: u16) -> Self {
        Self::new(name, Method::Get, endpoint, expected_status)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }
}

/// 失败原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// 收到响应但状态码不符
    StatusMismatch { expected: u16, actual: u16 },
    /// 请求未能完成（连接失败、超时、请求构造失败）
    Transport { message: String },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::StatusMismatch { expected, actual } => {
                write!(f, "Expected {}, got {}", expected, actual)
            }
            Failure::Transport { message } => write!(f, "Error: {}", message),
        }
    }
}

/// 单次探测的结果，返回给调用方
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub success: bool,
    pub status: Option<u16>,
    /// 解析后的 JSON body；失败、body 为空或不是 JSON 时为空对象
    pub body: Value,
    pub duration: Duration,
    pub failure: Option<Failure>,
}

impl ProbeOutcome {
    /// body 为 JSON 数组时返回其元素，否则为空
    pub fn list(&self) -> Vec<Value> {
        match &self.body {
            Value::Array(items) => items.clone(),
            _ => Vec::new(),
        }
    }
}

/// 单次探测的完整记录（用于表格与 JSON 报告）
#[derive(Debug, Clone, Serialize)]
pub struct ProbeRecord {
    /// 序号（从 1 开始）
    pub number: usize,
    pub name: String,
    pub method: String,
    pub url: String,
    pub expected_status: u16,
    pub actual_status: Option<u16>,
    pub success: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

/// 通过/尝试计数，只增不减
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    attempted: usize,
    passed: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, success: bool) {
        self.attempted += 1;
        if success {
            self.passed += 1;
        }
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.passed
    }

    /// 通过率（百分比）；未执行任何探测时为 0
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.passed as f64 / self.attempted as f64 * 100.0
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.attempted
    }
}
