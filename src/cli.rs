use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use golearn_probe::config::{ConfigLoader, EnvironmentConfig, ProbeConfig, process_env};
use golearn_probe::runner::TestReporter;
use golearn_probe::suite::{CATALOGUE, Suite};
use tracing::{info, warn};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub opts: RunOptions,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// 运行完整的探测序列（默认）
    Run,
    /// 列出所有探测
    List,
}

#[derive(Args, Debug, Default)]
pub struct RunOptions {
    /// 被测服务根地址，例如 http://localhost:8001 或 :8001
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API 前缀
    #[arg(long, global = true)]
    pub api_prefix: Option<String>,

    /// 单次请求超时（秒）
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// user 角色的访问码
    #[arg(long, global = true)]
    pub user_code: Option<String>,

    /// admin 角色的访问码
    #[arg(long, global = true)]
    pub admin_code: Option<String>,

    /// 配置文件路径（默认自动查找 golearn-probe.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 配置文件中的环境名
    #[arg(long = "env", global = true)]
    pub env_name: Option<String>,

    /// 通过的探测也打印响应体
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 禁用彩色输出
    #[arg(long, global = true)]
    pub no_color: bool,

    /// 结束后打印逐条结果表格
    #[arg(long, global = true)]
    pub table: bool,

    /// 将运行报告写入 JSON 文件
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,
}

impl RunOptions {
    fn overrides(&self) -> EnvironmentConfig {
        EnvironmentConfig {
            base_url: self.base_url.clone(),
            api_prefix: self.api_prefix.clone(),
            timeout_secs: self.timeout,
            user_code: self.user_code.clone(),
            admin_code: self.admin_code.clone(),
        }
    }

    pub fn resolve_config(&self) -> Result<ProbeConfig> {
        let path = self.config.clone().or_else(ConfigLoader::find);
        let file = match &path {
            Some(path) => {
                info!(path = %path.display(), "loading config file");
                Some(ConfigLoader::load_from_path(path)?)
            }
            None => None,
        };

        let config = ConfigLoader::build(
            file.as_ref(),
            self.env_name.as_deref(),
            &self.overrides(),
            process_env,
        )?;
        Ok(config)
    }
}

fn print_catalogue() {
    println!(
        "{:<10} {:<34} {:<7} {:<28} {}",
        "STAGE".bold(),
        "PROBE".bold(),
        "METHOD".bold(),
        "ENDPOINT".bold(),
        "EXPECT".bold()
    );
    for probe in CATALOGUE {
        let endpoint = if probe.endpoint.is_empty() {
            "(root)"
        } else {
            probe.endpoint
        };
        println!(
            "{:<10} {:<34} {:<7} {:<28} {}",
            probe.stage,
            probe.name,
            probe.method.as_str().cyan(),
            endpoint,
            probe.expected_status
        );
    }
}

/// 执行命令并返回进程退出码
pub async fn run(cli: Cli) -> Result<i32> {
    if cli.command == Some(Commands::List) {
        print_catalogue();
        return Ok(0);
    }

    let opts = cli.opts;
    let config = opts.resolve_config()?;

    println!("{}", "Starting GO Learning Platform API Tests".bold());
    println!("Target: {}/{}", config.base_url, config.api_prefix);
    println!("{}", "=".repeat(50));

    let suite = Suite::new(&config, TestReporter::new(opts.verbose))
        .context("failed to initialise HTTP client")?;
    let report = suite.run().await;

    if opts.table {
        println!("\n{}", report.table());
    }

    if let Some(path) = &opts.report {
        match report.write_json(path) {
            Ok(()) => println!("Report written to {}", path.display()),
            Err(e) => warn!("Failed to write report to {}: {}", path.display(), e),
        }
    }

    Ok(report.exit_code())
}
