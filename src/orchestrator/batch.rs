//! 多账号编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：解析账号配置，零账号视为致命配置错误
//! 2. **顺序处理**：严格逐个账号执行，绝不并发，避免被目标站判定为并发滥用
//! 3. **账号隔离**：每个账号跑在独立任务里，连 panic 都被关在账号边界内
//! 4. **节流**：账号之间插入固定冷却，最后一个账号之后不再等待
//! 5. **统计**：只做日志叙述用的计数，不产生机器可读的报表
//!
//! 进程退出码只反映“没有配置任何账号”这一种致命情况，
//! 单个账号的成败不影响退出码。

use anyhow::Result;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{Config, TaskKind};
use crate::credentials::{self, Account};
use crate::error::{AppError, ConfigError};
use crate::orchestrator::account_runner::{self, AccountResult};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let parsed = credentials::parse_accounts(&self.config.accounts);
        if parsed.skipped > 0 {
            warn!(">>> [系统] 有 {} 个账号项格式错误被跳过", parsed.skipped);
        }

        // 零账号是配置错误：一次浏览器会话都不开，直接带错误码退出
        if parsed.accounts.is_empty() {
            error!(">>> [错误] 未检测到有效账号！");
            error!(">>> [提示] 请设置 CONSOLE_ACCOUNTS，格式: email1:pass1,email2:pass2");
            return Err(AppError::Config(ConfigError::NoAccounts).into());
        }

        let task_name = match self.config.task {
            TaskKind::Claim => "每日签到",
            TaskKind::Renew => "服务器续费",
        };
        logging::log_startup(parsed.accounts.len(), task_name);

        let stats = self.process_accounts(&parsed.accounts).await;

        logging::print_final_stats(stats.completed, stats.failed, stats.total);
        Ok(())
    }

    /// 逐个处理账号
    async fn process_accounts(&self, accounts: &[Account]) -> BatchStats {
        let total = accounts.len();
        let mut stats = BatchStats {
            total,
            ..Default::default()
        };

        for (index, account) in accounts.iter().enumerate() {
            logging::log_account_start(index + 1, total, &account.email);

            // 账号跑在独立任务里，panic 也只影响这一个账号
            let config = self.config.clone();
            let account_clone = account.clone();
            let handle =
                tokio::spawn(async move { account_runner::run_account(&config, &account_clone).await });

            stats.record(handle.await, &account.email);

            // 账号之间冷却一下，最后一个账号之后不再等
            if index + 1 < total {
                info!(
                    ">>> [冷却] 等待 {} 秒后切换下一个账号...",
                    self.config.cooldown_secs
                );
                sleep(std::time::Duration::from_secs(self.config.cooldown_secs)).await;
            }
        }

        stats
    }
}

/// 批次统计，只进日志
#[derive(Debug, Default)]
struct BatchStats {
    total: usize,
    completed: usize,
    failed: usize,
}

impl BatchStats {
    /// 把一个账号任务的最终结果计入统计
    ///
    /// Join 失败（账号任务 panic）也按该账号失败记，绝不向上传播
    fn record(&mut self, joined: Result<AccountResult, tokio::task::JoinError>, email: &str) {
        match joined {
            Ok(AccountResult::Completed) => self.completed += 1,
            Ok(AccountResult::Failed) => self.failed += 1,
            Err(e) => {
                error!(">>> [崩溃] 账号 {} 任务执行失败: {}", email, e);
                self.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stats_record_isolates_failing_accounts() {
        let mut stats = BatchStats {
            total: 3,
            ..Default::default()
        };

        // 登录失败的账号只计入失败，不影响后面的账号
        stats.record(Ok(AccountResult::Failed), "a@x.com");

        // panic 掉的账号任务同样被关在边界内，按失败记
        let handle = tokio::spawn(async {
            panic!("账号任务崩溃");
        });
        stats.record(handle.await.map(|_| AccountResult::Completed), "b@x.com");

        // 后面的正常账号照常被统计
        stats.record(Ok(AccountResult::Completed), "c@x.com");

        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.total, 3);
    }
}
