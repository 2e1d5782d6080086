use crate::http::Method;
use crate::runner::{ProbeCase, ProbeExecutor};
use crate::session::{AuthMode, INVALID_CODE, LoginResponse, Role, Session};
use serde_json::{Value, json};

pub const DIFFICULTIES: [&str; 3] = ["beginner", "intermediate", "advanced"];

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn health_check(exec: &mut ProbeExecutor, session: &Session) -> bool {
    exec.run(session, ProbeCase::get("Health Check", "health", 200))
        .await
        .success
}

pub async fn root_endpoint(exec: &mut ProbeExecutor, session: &Session) -> bool {
    exec.run(session, ProbeCase::get("Root Endpoint", "", 200))
        .await
        .success
}

/// 使用角色的访问码登录，成功后将 token 存入会话
///
/// 返回 200 但没有可用的 `access_token` 时，探测计为通过，登录计为失败。
pub async fn login(exec: &mut ProbeExecutor, session: &mut Session, role: Role) -> bool {
    let code = session.codes().for_role(role).to_string();
    let case = ProbeCase::new(
        format!("Login with {} code", role),
        Method::Post,
        "auth/login",
        200,
    )
    .with_body(json!({ "code": code }));

    let outcome = exec.run(session, case).await;
    if !outcome.success {
        return false;
    }

    let login = LoginResponse::from_value(&outcome.body);
    let Some(token) = login.token() else {
        exec.reporter()
            .print_note("Response carried no access_token");
        return false;
    };

    let profile = login.user.clone().unwrap_or_default();
    exec.reporter().print_note(&format!(
        "Logged in as: {} ({})",
        profile.display_name(),
        profile.role_name()
    ));
    session.store(role, token, profile);
    true
}

pub async fn invalid_code_login(exec: &mut ProbeExecutor, session: &Session) -> bool {
    let case = ProbeCase::new("Login with invalid code", Method::Post, "auth/login", 401)
        .with_body(json!({ "code": INVALID_CODE }))
        .with_auth(AuthMode::Anonymous);
    exec.run(session, case).await.success
}

pub async fn missing_code_login(exec: &mut ProbeExecutor, session: &Session) -> bool {
    let case = ProbeCase::new("Login without code", Method::Post, "auth/login", 400)
        .with_body(json!({}))
        .with_auth(AuthMode::Anonymous);
    exec.run(session, case).await.success
}

pub async fn current_user(exec: &mut ProbeExecutor, session: &Session) -> bool {
    exec.run(session, ProbeCase::get("Get Current User", "auth/me", 200))
        .await
        .success
}

async fn list(exec: &mut ProbeExecutor, session: &Session, case: ProbeCase, noun: &str) -> Vec<Value> {
    let outcome = exec.run(session, case).await;
    if !outcome.success {
        return Vec::new();
    }
    let items = outcome.list();
    exec.reporter()
        .print_note(&format!("Found {} {}", items.len(), noun));
    items
}

pub async fn lessons(exec: &mut ProbeExecutor, session: &Session) -> Vec<Value> {
    list(exec, session, ProbeCase::get("Get All Lessons", "lessons", 200), "lessons").await
}

pub async fn lessons_by_difficulty(
    exec: &mut ProbeExecutor,
    session: &Session,
    difficulty: &str,
) -> Vec<Value> {
    let case = ProbeCase::get(format!("Get {} Lessons", title_case(difficulty)), "lessons", 200)
        .with_query("difficulty", difficulty);
    list(exec, session, case, &format!("{} lessons", difficulty)).await
}

pub async fn lesson(exec: &mut ProbeExecutor, session: &Session, lesson_id: &str) -> Option<Value> {
    let case = ProbeCase::get(format!("Get Lesson {}", lesson_id), format!("lessons/{}", lesson_id), 200);
    let outcome = exec.run(session, case).await;
    outcome.success.then_some(outcome.body)
}

pub async fn start_lesson(exec: &mut ProbeExecutor, session: &Session, lesson_id: &str) -> bool {
    let case = ProbeCase::new(
        format!("Start Lesson {}", lesson_id),
        Method::Post,
        format!("lessons/{}/progress", lesson_id),
        200,
    );
    exec.run(session, case).await.success
}

pub async fn complete_lesson(exec: &mut ProbeExecutor, session: &Session, lesson_id: &str) -> bool {
    let case = ProbeCase::new(
        format!("Complete Lesson {}", lesson_id),
        Method::Put,
        format!("lessons/{}/complete", lesson_id),
        200,
    );
    exec.run(session, case).await.success
}

pub async fn lesson_quizzes(exec: &mut ProbeExecutor, session: &Session, lesson_id: &str) -> Vec<Value> {
    let case = ProbeCase::get(
        format!("Get Quizzes for Lesson {}", lesson_id),
        format!("lessons/{}/quizzes", lesson_id),
        200,
    );
    list(exec, session, case, "quizzes").await
}

pub async fn classes(exec: &mut ProbeExecutor, session: &Session) -> Vec<Value> {
    list(exec, session, ProbeCase::get("Get Classes", "classes", 200), "classes").await
}

pub async fn user_achievements(exec: &mut ProbeExecutor, session: &Session, user_id: &str) -> Vec<Value> {
    let case = ProbeCase::get(
        "Get User Achievements",
        format!("users/{}/achievements", user_id),
        200,
    );
    list(exec, session, case, "achievements").await
}

/// 不带任何凭据调用 `auth/me`，会话保持不变
pub async fn unauthorized_access(exec: &mut ProbeExecutor, session: &Session) -> bool {
    let case = ProbeCase::get("Unauthorized Access Test", "auth/me", 401).with_auth(AuthMode::Anonymous);
    exec.run(session, case).await.success
}

pub async fn admin_endpoint_with_user_token(exec: &mut ProbeExecutor, session: &Session) -> bool {
    let case = ProbeCase::get("Admin Endpoint with User Token", "users", 403)
        .with_auth(AuthMode::Role(Role::User));
    exec.run(session, case).await.success
}

pub async fn admin_endpoint_with_admin_token(exec: &mut ProbeExecutor, session: &Session) -> bool {
    let case = ProbeCase::get("Admin Endpoint with Admin Token", "users", 200)
        .with_auth(AuthMode::Role(Role::Admin));
    exec.run(session, case).await.success
}
