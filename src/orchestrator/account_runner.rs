//! 单账号处理器 - 编排层
//!
//! 为一个账号组合“会话 → 登录 → 任务流程”，并保证错误被关在账号边界内：
//! 无论成功、失败还是中途出错，会话都会被关闭，错误不会外传。

use tracing::{error, info, warn};

use crate::browser::Session;
use crate::config::{Config, TaskKind};
use crate::credentials::Account;
use crate::utils::logging::truncate_text;
use crate::workflow::{ClaimFlow, LoginFlow, RenewalFlow};

/// 单个账号的处理结论，只用于批次统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountResult {
    /// 流程走完（含“已签到”“没有资源”这类合法终态）
    Completed,
    /// 登录失败或处理中出错
    Failed,
}

/// 处理单个账号
///
/// 这里是错误传播的边界：任何阶段的错误都在此记录并吞掉，
/// 返回值只用来给批次做统计。
pub async fn run_account(config: &Config, account: &Account) -> AccountResult {
    // 每个账号一个全新的浏览器实例，保证环境隔离
    let session = match Session::open(config).await {
        Ok(session) => session,
        Err(e) => {
            error!(">>> [崩溃] 账号 {} 启动浏览器失败: {}", account.email, e);
            return AccountResult::Failed;
        }
    };

    let result = process(config, &session, account).await;

    let outcome = match result {
        Ok(()) => AccountResult::Completed,
        Err(e) => {
            error!(">>> [失败] 账号 {} 处理过程中发生异常: {}", account.email, e);
            if config.dump_page_on_error {
                dump_page(&session).await;
            }
            AccountResult::Failed
        }
    };

    // 无论成功失败，处理完一个账号后必须关闭浏览器
    info!(">>> [结束] 关闭账号 {} 的浏览器实例", account.email);
    session.close().await;

    outcome
}

/// 账号的实际处理流程：登录，然后按配置跑对应任务
async fn process(config: &Config, session: &Session, account: &Account) -> anyhow::Result<()> {
    LoginFlow::new(config).run(session, account).await?;

    match config.task {
        TaskKind::Claim => {
            ClaimFlow::new(config).run(session).await?;
        }
        TaskKind::Renew => {
            RenewalFlow::new(config).run(session).await?;
        }
    }

    Ok(())
}

/// 打印页面源码帮助排错
async fn dump_page(session: &Session) {
    match session.page_source().await {
        Ok(html) => warn!(">>> [排错] 页面源码:\n{}", truncate_text(&html, 4000)),
        Err(e) => warn!(">>> [排错] 读取页面源码失败: {}", e),
    }
}
