use crate::Result;
use crate::config::ProbeConfig;
use crate::http::Method;
use crate::probes::{self, DIFFICULTIES};
use crate::report::RunReport;
use crate::runner::{ProbeExecutor, TestReporter};
use crate::session::{Role, Session, lenient_id};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

/// 一次运行的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteStatus {
    /// 所有前置条件满足的阶段都已执行
    Completed,
    /// 健康检查或根端点失败
    Unreachable,
    /// user 与 admin 登录均失败
    NoLogin,
}

/// 固定顺序的分阶段探测；前置条件不满足的阶段跳过且不计数
pub struct Suite {
    executor: ProbeExecutor,
    session: Session,
}

impl Suite {
    pub fn new(config: &ProbeConfig, reporter: TestReporter) -> Result<Self> {
        Ok(Self {
            executor: ProbeExecutor::new(config, reporter)?,
            session: Session::new(config.codes.clone()),
        })
    }

    pub async fn run(mut self) -> RunReport {
        let started_at = Utc::now();
        let status = self.run_stages().await;
        let finished_at = Utc::now();

        info!(
            ?status,
            attempted = self.executor.tally().attempted(),
            passed = self.executor.tally().passed(),
            "suite finished"
        );

        if status == SuiteStatus::Completed {
            self.executor.reporter().print_summary(&self.executor.tally());
        }

        RunReport::new(
            self.executor.base_url().to_string(),
            status,
            self.executor.tally(),
            self.executor.records().to_vec(),
            started_at,
            finished_at,
        )
    }

    async fn run_stages(&mut self) -> SuiteStatus {
        let exec = &mut self.executor;
        let session = &mut self.session;

        exec.reporter().print_stage("BASIC ENDPOINT TESTS");
        if !probes::health_check(exec, session).await {
            exec.reporter()
                .print_abort("Health check failed - API may be down");
            return SuiteStatus::Unreachable;
        }
        if !probes::root_endpoint(exec, session).await {
            exec.reporter().print_abort("Root endpoint failed");
            return SuiteStatus::Unreachable;
        }

        exec.reporter().print_stage("SECURITY TESTS");
        probes::unauthorized_access(exec, session).await;

        exec.reporter()
            .print_stage("CODE-BASED AUTHENTICATION TESTS");
        probes::invalid_code_login(exec, session).await;
        probes::missing_code_login(exec, session).await;
        let user_ok = probes::login(exec, session, Role::User).await;
        let admin_ok = probes::login(exec, session, Role::Admin).await;

        if !user_ok && !admin_ok {
            exec.reporter().print_abort(
                "No successful logins - cannot continue with protected endpoint tests",
            );
            return SuiteStatus::NoLogin;
        }

        exec.reporter()
            .print_stage("ROLE-BASED ACCESS CONTROL TESTS");
        if user_ok {
            probes::current_user(exec, session).await;
            probes::admin_endpoint_with_user_token(exec, session).await;
        } else {
            exec.reporter()
                .print_note("Skipping user-token checks: user login failed");
        }
        if admin_ok {
            probes::admin_endpoint_with_admin_token(exec, session).await;
        } else {
            exec.reporter()
                .print_note("Skipping admin-token check: admin login failed");
        }

        if user_ok {
            exec.reporter().print_stage("USER FUNCTIONALITY TESTS");
            Self::lesson_chain(exec, session).await;

            probes::classes(exec, session).await;

            let user_id = session
                .profile(Role::User)
                .and_then(|profile| profile.id.clone());
            match user_id {
                Some(id) => {
                    probes::user_achievements(exec, session, &id).await;
                }
                None => exec
                    .reporter()
                    .print_note("Skipping achievements: user id unknown"),
            }
        }

        SuiteStatus::Completed
    }

    /// lessons -> first lesson -> start -> complete -> quizzes
    async fn lesson_chain(exec: &mut ProbeExecutor, session: &Session) {
        let lessons = probes::lessons(exec, session).await;
        let Some(first) = lessons.first() else {
            exec.reporter()
                .print_note("Skipping lesson chain: no lessons returned");
            return;
        };

        for difficulty in DIFFICULTIES {
            probes::lessons_by_difficulty(exec, session, difficulty).await;
        }

        let Some(lesson_id) = lenient_id(first) else {
            exec.reporter()
                .print_note("Skipping lesson chain: first lesson has no id");
            return;
        };

        if probes::lesson(exec, session, &lesson_id).await.is_none() {
            return;
        }

        probes::start_lesson(exec, session, &lesson_id).await;
        probes::complete_lesson(exec, session, &lesson_id).await;
        probes::lesson_quizzes(exec, session, &lesson_id).await;
    }
}

/// `golearn-probe list` 打印的探测目录条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedProbe {
    pub stage: &'static str,
    pub name: &'static str,
    pub method: Method,
    pub endpoint: &'static str,
    pub expected_status: u16,
}

const fn planned(
    stage: &'static str,
    name: &'static str,
    method: Method,
    endpoint: &'static str,
    expected_status: u16,
) -> PlannedProbe {
    PlannedProbe {
        stage,
        name,
        method,
        endpoint,
        expected_status,
    }
}

pub const CATALOGUE: &[PlannedProbe] = &[
    planned("basic", "Health Check", Method::Get, "health", 200),
    planned("basic", "Root Endpoint", Method::Get, "", 200),
    planned("security", "Unauthorized Access Test", Method::Get, "auth/me", 401),
    planned("auth", "Login with invalid code", Method::Post, "auth/login", 401),
    planned("auth", "Login without code", Method::Post, "auth/login", 400),
    planned("auth", "Login with user code", Method::Post, "auth/login", 200),
    planned("auth", "Login with admin code", Method::Post, "auth/login", 200),
    planned("rbac", "Get Current User", Method::Get, "auth/me", 200),
    planned("rbac", "Admin Endpoint with User Token", Method::Get, "users", 403),
    planned("rbac", "Admin Endpoint with Admin Token", Method::Get, "users", 200),
    planned("user", "Get All Lessons", Method::Get, "lessons", 200),
    planned("user", "Get <Difficulty> Lessons", Method::Get, "lessons?difficulty={d}", 200),
    planned("user", "Get Lesson {id}", Method::Get, "lessons/{id}", 200),
    planned("user", "Start Lesson {id}", Method::Post, "lessons/{id}/progress", 200),
    planned("user", "Complete Lesson {id}", Method::Put, "lessons/{id}/complete", 200),
    planned("user", "Get Quizzes for Lesson {id}", Method::Get, "lessons/{id}/quizzes", 200),
    planned("user", "Get Classes", Method::Get, "classes", 200),
    planned("user", "Get User Achievements", Method::Get, "users/{id}/achievements", 200),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_starts_with_basic_checks() {
        assert_eq!(CATALOGUE[0].endpoint, "health");
        assert_eq!(CATALOGUE[1].endpoint, "");
        assert!(CATALOGUE.iter().all(|p| (200..600).contains(&p.expected_status)));
    }
}
