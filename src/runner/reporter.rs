use crate::http::Response;
use crate::runner::types::{Failure, Tally};
use colored::Colorize;

/// 控制台报告输出
pub struct TestReporter {
    verbose: bool,
}

impl TestReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// 打印阶段标题
    pub fn print_stage(&self, title: &str) {
        println!("\n{}", title.bold());
        println!("{}", "-".repeat(30));
    }

    /// 打印提示信息（跳过的阶段、登录信息等）
    pub fn print_note(&self, message: &str) {
        println!("   {}", message);
    }

    /// 打印中止原因
    pub fn print_abort(&self, message: &str) {
        println!("{} {}", "✗".red().bold(), message.red());
    }

    /// 打印探测开始
    pub fn print_start(&self, name: &str, url: &str) {
        println!("\n{} Testing {}...", "›".cyan(), name.bold());
        println!("   URL: {}", url.dimmed());
    }

    pub fn print_passed(&self, response: &Response) {
        println!(
            "{} Passed - Status: {} ({}ms)",
            "✓".green(),
            response.status.code(),
            response.duration.as_millis()
        );

        if self.verbose && !response.body.is_empty() {
            for line in format_body(&response.body).lines() {
                println!("   {}", line);
            }
        }
    }

    pub fn print_mismatch(&self, failure: &Failure, response: &Response) {
        match response.status.reason_phrase() {
            Some(reason) => println!("{} Failed - {} ({})", "✗".red(), failure, reason),
            None => println!("{} Failed - {}", "✗".red(), failure),
        }

        // 优先显示 JSON 错误体，否则显示原始文本
        match response.json() {
            Some(value) => println!("   {}: {}", "Error".red().bold(), value),
            None => println!("   Response text: {}", response.text()),
        }
    }

    pub fn print_transport_error(&self, failure: &Failure) {
        println!("{} Failed - {}", "✗".red(), failure);
    }

    /// 打印测试摘要
    pub fn print_summary(&self, tally: &Tally) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "TEST RESULTS SUMMARY".bold());
        println!("{}", "━".repeat(50));
        println!("  Total tests run: {}", tally.attempted());
        println!("  Tests passed: {}", tally.passed().to_string().green());
        println!("  Tests failed: {}", tally.failed().to_string().red());
        println!("  Success rate: {:.1}%", tally.success_rate());

        if tally.all_passed() {
            println!("{}", "All tests passed!".green().bold());
        } else {
            println!(
                "{}",
                "Some tests failed - check the output above for details".yellow()
            );
        }
    }
}

impl Default for TestReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

/// 尝试将 body 格式化为漂亮的 JSON，失败则原样返回
fn format_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}
