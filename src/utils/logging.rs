use tracing::info;
/// 日志工具模块
///
/// 初始化 tracing 输出，并提供若干格式化辅助函数
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 默认级别 info，可通过 RUST_LOG 环境变量覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // 重复调用时保持已有的订阅器（测试里会发生）
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(total_accounts: usize, task: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多账号自动任务 ({})", task);
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📊 成功解析到 {} 个账号", total_accounts);
    info!("{}", "=".repeat(60));
}

/// 记录单个账号的进度分隔线
pub fn log_account_start(index: usize, total: usize, email: &str) {
    info!("\n{}", "=".repeat(60));
    info!(">>> [进度] 正在处理第 {}/{} 个账号: {}", index, total, email);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(completed: usize, failed: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部账号处理完毕");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 完成: {}/{}", completed, total);
    info!("❌ 异常: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 5), "abcde...");
    }
}
