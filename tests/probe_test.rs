use golearn_probe::config::ProbeConfig;
use golearn_probe::http::{BaseUrl, Method};
use golearn_probe::probes;
use golearn_probe::runner::{Failure, ProbeCase, ProbeExecutor, TestReporter};
use golearn_probe::session::{AccessCodes, Role, Session, UserProfile};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor_for(server: &MockServer, timeout: Duration) -> ProbeExecutor {
    let config = ProbeConfig {
        base_url: BaseUrl::parse(&server.uri()).unwrap(),
        timeout,
        ..ProbeConfig::default()
    };
    ProbeExecutor::new(&config, TestReporter::new(true)).unwrap()
}

/// 登录成功后 token 被存储，并用于之后所有默认认证的探测
#[tokio::test]
async fn test_login_stores_token_and_threads_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"code": "U-CODE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-u",
            "user": {"id": 17, "full_name": "Student", "role": "user"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/classes"))
        .and(header("Authorization", "Bearer tok-u"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let mut session = Session::new(AccessCodes {
        user: "U-CODE".to_string(),
        admin: "A-CODE".to_string(),
    });

    assert!(probes::login(&mut exec, &mut session, Role::User).await);
    assert_eq!(session.token(Role::User), Some("tok-u"));
    assert_eq!(
        session.profile(Role::User).and_then(|p| p.id.as_deref()),
        Some("17")
    );

    probes::classes(&mut exec, &session).await;
    probes::classes(&mut exec, &session).await;

    assert_eq!(exec.tally().attempted(), 3);
    assert_eq!(exec.tally().passed(), 3);
}

/// 200 但没有 access_token：探测通过，但登录失败
#[tokio::test]
async fn test_login_without_token_is_not_a_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {}})))
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let mut session = Session::default();

    assert!(!probes::login(&mut exec, &mut session, Role::Admin).await);
    assert!(!session.is_logged_in(Role::Admin));
    assert_eq!(exec.tally().passed(), 1);
}

/// 未授权探测不发送 token，且不修改会话
#[tokio::test]
async fn test_unauthorized_probe_sends_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})))
        .with_priority(10)
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let mut session = Session::default();
    session.store(Role::User, "tok-u", UserProfile::default());

    assert!(probes::unauthorized_access(&mut exec, &session).await);
    assert_eq!(session.active_token(), Some("tok-u"));
}

/// 管理端点：user token 返回 403，admin token 返回 200
#[tokio::test]
async fn test_role_probes_pick_their_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("Authorization", "Bearer tok-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("Authorization", "Bearer tok-u"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let mut session = Session::default();
    session.store(Role::User, "tok-u", UserProfile::default());
    session.store(Role::Admin, "tok-a", UserProfile::default());

    assert!(probes::admin_endpoint_with_user_token(&mut exec, &session).await);
    assert!(probes::admin_endpoint_with_admin_token(&mut exec, &session).await);
    // 会话中的默认 token 仍是 user token
    assert_eq!(session.active_token(), Some("tok-u"));
}

/// 难度过滤通过查询参数发送
#[tokio::test]
async fn test_lessons_by_difficulty_uses_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lessons"))
        .and(query_param("difficulty", "intermediate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "l-2"}])))
        .expect(1)
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let lessons = probes::lessons_by_difficulty(&mut exec, &Session::default(), "intermediate").await;

    assert_eq!(lessons.len(), 1);
    assert_eq!(exec.records()[0].name, "Get Intermediate Lessons");
    assert!(exec.records()[0].url.ends_with("/api/lessons?difficulty=intermediate"));
}

/// 非数组响应被视为空列表
#[tokio::test]
async fn test_non_list_body_is_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lessons"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1, 2]})))
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let lessons = probes::lessons(&mut exec, &Session::default()).await;

    assert!(lessons.is_empty());
    assert!(exec.tally().all_passed());
}

/// 状态码不符：失败，返回空对象
#[tokio::test]
async fn test_status_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/lessons/9"))
        .respond_with(ResponseTemplate::new(405).set_body_string("Method Not Allowed"))
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let case = ProbeCase::new("Delete Lesson 9", Method::Delete, "lessons/9", 204);
    let outcome = exec.run(&Session::default(), case).await;

    assert!(!outcome.success);
    assert_eq!(outcome.status, Some(405));
    assert_eq!(outcome.body, json!({}));
    assert_eq!(
        outcome.failure,
        Some(Failure::StatusMismatch {
            expected: 204,
            actual: 405
        })
    );
}

/// 超时记为失败的探测，不会中断后续探测
#[tokio::test]
async fn test_timeout_is_a_failed_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_millis(300));
    let session = Session::default();

    assert!(!probes::health_check(&mut exec, &session).await);
    assert!(probes::root_endpoint(&mut exec, &session).await);

    assert_eq!(exec.tally().attempted(), 2);
    assert_eq!(exec.tally().passed(), 1);
    assert!(matches!(
        exec.records()[0].failure,
        Some(Failure::Transport { .. })
    ));
}

/// 尝试次数等于调用次数，且通过数不超过尝试数
#[tokio::test]
async fn test_tally_matches_invocations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let session = Session::default();
    for i in 0..6 {
        let expected = if i % 2 == 0 { 200 } else { 500 };
        exec.run(&session, ProbeCase::get("Health", "health", expected))
            .await;
    }

    let tally = exec.tally();
    assert_eq!(tally.attempted(), 6);
    assert_eq!(tally.passed(), 3);
    assert!(tally.passed() <= tally.attempted());
    assert_eq!(exec.records().len(), 6);
    assert_eq!(exec.records()[5].number, 6);
}

/// 用户信息字段类型不符时，token 仍然有效
#[tokio::test]
async fn test_login_keeps_token_when_profile_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"code": "U-CODE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "user": {"id": "u1", "full_name": "A", "role": {"name": "user"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"code": "A-CODE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-a",
            "user": "admin"
        })))
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let mut session = Session::new(AccessCodes {
        user: "U-CODE".to_string(),
        admin: "A-CODE".to_string(),
    });

    assert!(probes::login(&mut exec, &mut session, Role::User).await);
    assert_eq!(session.token(Role::User), Some("tok"));
    let profile = session.profile(Role::User).unwrap();
    assert_eq!(profile.id.as_deref(), Some("u1"));
    assert_eq!(profile.display_name(), "A");
    assert_eq!(profile.role_name(), "Unknown");

    assert!(probes::login(&mut exec, &mut session, Role::Admin).await);
    assert_eq!(session.token(Role::Admin), Some("tok-a"));
    assert_eq!(session.profile(Role::Admin), Some(&UserProfile::default()));
}

/// 非标准状态码也是一次收到响应的状态不符，而不是传输错误
#[tokio::test]
async fn test_nonstandard_status_is_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(700).set_body_string("odd"))
        .mount(&server)
        .await;

    let mut exec = executor_for(&server, Duration::from_secs(5));
    let outcome = exec
        .run(&Session::default(), ProbeCase::get("Health Check", "health", 200))
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.status, Some(700));
    assert_eq!(
        outcome.failure,
        Some(Failure::StatusMismatch {
            expected: 200,
            actual: 700
        })
    );
    assert_eq!(exec.records()[0].actual_status, Some(700));
}
