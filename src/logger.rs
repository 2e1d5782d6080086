use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别。
/// 默认级别: warn（控制台报告本身已经足够详细），`verbose` 时为 info。
///
/// 示例:
/// - RUST_LOG=debug golearn-probe
/// - RUST_LOG=golearn_probe=trace golearn-probe run
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 已有全局 subscriber 时（例如测试中重复调用）静默忽略
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!("Logger initialized");
}
