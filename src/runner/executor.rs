use crate::Result;
use crate::config::ProbeConfig;
use crate::http::{BaseUrl, Client, Request, Response};
use crate::runner::reporter::TestReporter;
use crate::runner::types::{Failure, ProbeCase, ProbeOutcome, ProbeRecord, Tally};
use crate::session::Session;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::debug;

/// 探测执行器：发送请求、比对状态码、计数并输出进度
pub struct ProbeExecutor {
    client: Client,
    base_url: BaseUrl,
    api_prefix: String,
    reporter: TestReporter,
    tally: Tally,
    records: Vec<ProbeRecord>,
}

impl ProbeExecutor {
    pub fn new(config: &ProbeConfig, reporter: TestReporter) -> Result<Self> {
        Ok(Self {
            client: Client::new(config.timeout)?,
            base_url: config.base_url.clone(),
            api_prefix: config.api_prefix.clone(),
            reporter,
            tally: Tally::new(),
            records: Vec::new(),
        })
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn records(&self) -> &[ProbeRecord] {
        &self.records
    }

    pub fn reporter(&self) -> &TestReporter {
        &self.reporter
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        self.base_url.join(&self.api_prefix, endpoint)
    }

    /// 执行单个探测
    ///
    /// 永远不会返回错误：网络失败、超时和请求构造失败都记为一次失败的探测。
    pub async fn run(&mut self, session: &Session, case: ProbeCase) -> ProbeOutcome {
        let url = self.url_for(&case.endpoint);
        let request = match Self::build_request(session, &case, &url) {
            Ok(request) => request,
            Err(e) => {
                self.reporter.print_start(&case.name, &url);
                return self.finish(&case, url, Err(e.to_string()), Duration::ZERO);
            }
        };
        let display_url = request.display_url();

        self.reporter.print_start(&case.name, &display_url);

        let start = Instant::now();
        let result = self
            .client
            .execute(request)
            .await
            .map_err(|e| e.to_string());
        let elapsed = start.elapsed();

        self.finish(&case, display_url, result, elapsed)
    }

    fn build_request(session: &Session, case: &ProbeCase, url: &str) -> Result<Request> {
        let mut request = Request::new(case.method, url).with_json_content_type();

        if let Some(token) = session.bearer_for(case.auth) {
            request = request.with_auth_bearer(token)?;
        }

        for (key, value) in &case.headers {
            request = request.with_header_override(key, value)?;
        }

        for (key, value) in &case.query {
            request = request.with_query(key, value);
        }

        if let Some(body) = &case.body {
            request = request.with_json(body)?;
        }

        Ok(request)
    }

    fn finish(
        &mut self,
        case: &ProbeCase,
        url: String,
        result: std::result::Result<Response, String>,
        elapsed: Duration,
    ) -> ProbeOutcome {
        let outcome = match result {
            Ok(response) => {
                let actual = response.status.code();
                let success = actual == case.expected_status;
                if success {
                    debug!(probe = %case.name, status = actual, "probe passed");
                    self.reporter.print_passed(&response);
                    ProbeOutcome {
                        success,
                        status: Some(actual),
                        body: response.json_or_empty(),
                        duration: response.duration,
                        failure: None,
                    }
                } else {
                    debug!(
                        probe = %case.name,
                        expected = case.expected_status,
                        actual,
                        "probe failed"
                    );
                    let failure = Failure::StatusMismatch {
                        expected: case.expected_status,
                        actual,
                    };
                    self.reporter.print_mismatch(&failure, &response);
                    ProbeOutcome {
                        success,
                        status: Some(actual),
                        body: Value::Object(Map::new()),
                        duration: response.duration,
                        failure: Some(failure),
                    }
                }
            }
            Err(message) => {
                debug!(probe = %case.name, error = %message, "probe request failed");
                let failure = Failure::Transport { message };
                self.reporter.print_transport_error(&failure);
                ProbeOutcome {
                    success: false,
                    status: None,
                    body: Value::Object(Map::new()),
                    duration: elapsed,
                    failure: Some(failure),
                }
            }
        };

        self.tally.record(outcome.success);
        self.records.push(ProbeRecord {
            number: self.records.len() + 1,
            name: case.name.clone(),
            method: case.method.to_string(),
            url,
            expected_status: case.expected_status,
            actual_status: outcome.status,
            success: outcome.success,
            duration_ms: outcome.duration.as_millis() as u64,
            failure: outcome.failure.clone(),
        });

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AccessCodes, AuthMode, Role, UserProfile};
    use serde_json::json;

    fn executor(base: &str) -> ProbeExecutor {
        let config = ProbeConfig {
            base_url: BaseUrl::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
            ..ProbeConfig::default()
        };
        ProbeExecutor::new(&config, TestReporter::new(false)).unwrap()
    }

    #[test]
    fn test_url_for() {
        let executor = executor("http://localhost:8001");
        assert_eq!(executor.url_for("health"), "http://localhost:8001/api/health");
        assert_eq!(executor.url_for(""), "http://localhost:8001/api/");
    }

    #[test]
    fn test_build_request_attaches_session_token() {
        let mut session = Session::new(AccessCodes::default());
        session.store(Role::User, "user-token", UserProfile::default());

        let case = ProbeCase::get("Get Current User", "auth/me", 200);
        let request = ProbeExecutor::build_request(&session, &case, "http://x/api/auth/me").unwrap();
        assert_eq!(request.headers.get("authorization").unwrap(), "Bearer user-token");
        assert_eq!(request.headers.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn test_build_request_anonymous_and_override() {
        let mut session = Session::new(AccessCodes::default());
        session.store(Role::User, "user-token", UserProfile::default());

        let case = ProbeCase::get("No token", "auth/me", 401).with_auth(AuthMode::Anonymous);
        let request = ProbeExecutor::build_request(&session, &case, "http://x/api/auth/me").unwrap();
        assert!(request.headers.get("authorization").is_none());

        let case = ProbeCase::get("Other token", "auth/me", 401)
            .with_header("Authorization", "Bearer forged");
        let request = ProbeExecutor::build_request(&session, &case, "http://x/api/auth/me").unwrap();
        assert_eq!(request.headers.get("authorization").unwrap(), "Bearer forged");
    }

    #[test]
    fn test_build_request_with_body() {
        let session = Session::default();
        let case = ProbeCase::new("Login", crate::http::Method::Post, "auth/login", 200)
            .with_body(json!({"code": "abc"}));
        let request = ProbeExecutor::build_request(&session, &case, "http://x/api/auth/login").unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"code":"abc"}"#));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_failed_probe() {
        // 端口 9 (discard) 在测试环境中通常无人监听
        let mut executor = executor("http://127.0.0.1:9");
        let session = Session::default();

        let outcome = executor
            .run(&session, ProbeCase::get("Health Check", "health", 200))
            .await;

        assert!(!outcome.success);
        assert!(matches!(outcome.failure, Some(Failure::Transport { .. })));
        assert_eq!(outcome.body, json!({}));
        assert_eq!(executor.tally().attempted(), 1);
        assert_eq!(executor.tally().passed(), 0);
        assert_eq!(executor.records()[0].actual_status, None);
    }

    #[tokio::test]
    async fn test_invalid_header_is_failed_probe() {
        let mut executor = executor("http://127.0.0.1:9");
        let session = Session::default();

        let case = ProbeCase::get("Bad header", "health", 200).with_header("bad header", "x");
        let outcome = executor.run(&session, case).await;

        assert!(!outcome.success);
        assert_eq!(executor.tally().attempted(), 1);
    }
}
