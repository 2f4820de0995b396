//! 服务器续费流程 - 流程层
//!
//! 前置条件：会话已登录并落在服务器列表页上。
//!
//! 流程：枚举服务器卡片 → 逐个进入详情页 → 记录变更标记字段 →
//! 点击续费按钮（必要时接受确认弹窗）→ 轮询标记字段变化来核对结果。
//! 单个服务器出错只影响它自己，循环继续处理后面的服务器。

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::browser::{Locator, Session};
use crate::config::Config;
use crate::discovery;

/// 服务器详情页链接
const SERVER_LINK_LOCATOR: &str = "a[href*='server?id=']";

/// 续费流程的汇总结果，只用于日志叙述
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenewalOutcome {
    /// 发现的服务器数
    pub total: usize,
    /// 核对到变化的续费数
    pub renewed: usize,
    /// 没有续费按钮（已续费或不可续费）
    pub skipped: usize,
    /// 点了但没核对到变化
    pub unconfirmed: usize,
    /// 单个服务器处理出错
    pub failed: usize,
}

/// 去重并保留首次出现顺序的链接收集
pub fn collect_unique_links(hrefs: impl IntoIterator<Item = Option<String>>) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for href in hrefs.into_iter().flatten() {
        if !href.is_empty() && !links.contains(&href) {
            links.push(href);
        }
    }
    links
}

/// 续费流程
pub struct RenewalFlow {
    element_timeout: std::time::Duration,
    dialog_timeout: std::time::Duration,
    settle: std::time::Duration,
    renew_strategies: Vec<Locator>,
    marker_locators: Vec<Locator>,
}

impl RenewalFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            element_timeout: config.element_timeout(),
            dialog_timeout: std::time::Duration::from_secs(config.dialog_timeout_secs),
            settle: std::time::Duration::from_secs(config.settle_secs),
            renew_strategies: vec![
                // 主策略：带续费动作属性的按钮
                Locator::css("a.action-button[onclick*='handleServerRenewal']"),
                // 备用：结构性 class 定位
                Locator::css("a.action-button, button.renew-button"),
            ],
            marker_locators: vec![
                // 变更标记字段：到期/续费时间，点击成功后文本应当变化
                Locator::xpath(
                    "//*[contains(@class, 'expiry') or contains(@class, 'renew-date')]",
                ),
                // 标记字段不在时退而求其次，用剩余时长字段
                Locator::xpath(
                    "//*[contains(@class, 'time-left') or contains(text(), 'remaining')]",
                ),
            ],
        }
    }

    pub async fn run(&self, session: &Session) -> Result<RenewalOutcome> {
        let mut outcome = RenewalOutcome::default();

        // --- 1. 枚举服务器卡片 ---
        let link_locator = Locator::css(SERVER_LINK_LOCATOR);
        if session
            .wait_for_visible(&link_locator, self.element_timeout)
            .await
            .is_none()
        {
            info!(">>> [检测] 没有发现任何服务器，无需续费");
            return Ok(outcome);
        }

        // 先把链接全部存下来，避免后续导航让元素句柄失效
        let mut hrefs = Vec::new();
        for element in session.find_all(&link_locator).await {
            hrefs.push(session.attribute(&element, "href").await);
        }
        let links = collect_unique_links(hrefs);
        outcome.total = links.len();
        info!(">>> [检测] 发现 {} 个服务器", links.len());

        // --- 2. 逐个续费 ---
        for link in &links {
            info!("--- 正在处理服务器: {} ---", link);
            match self.renew_one(session, link).await {
                Ok(ResourceResult::Renewed) => outcome.renewed += 1,
                Ok(ResourceResult::NoControl) => outcome.skipped += 1,
                Ok(ResourceResult::Unconfirmed) => outcome.unconfirmed += 1,
                Err(e) => {
                    // 单个服务器的异常不中断循环
                    error!(">>> [出错] 单个服务器处理出错: {}", e);
                    outcome.failed += 1;
                }
            }
        }

        info!(
            ">>> [汇总] 共 {} 台: 续费 {} / 跳过 {} / 未核对 {} / 出错 {}",
            outcome.total, outcome.renewed, outcome.skipped, outcome.unconfirmed, outcome.failed
        );
        Ok(outcome)
    }

    /// 处理单个服务器
    async fn renew_one(&self, session: &Session, link: &str) -> Result<ResourceResult> {
        session.navigate(link).await?;

        // 点击前先记下变更标记字段，之后靠它核对续费是否生效。
        // 字段不在就降级成“操作已执行，结果未核对”，不中断这台服务器。
        let marker = self.read_marker(session).await;
        if marker.is_none() {
            warn!(">>> [警告] 未找到变更标记字段，本台服务器将无法核对结果");
        }

        let Some(found) = discovery::find_action(session, &self.renew_strategies).await? else {
            info!(">>> [跳过] 未找到续费按钮 (可能已续费或无需续费)");
            return Ok(ResourceResult::NoControl);
        };

        session.scroll_into_view(&found.element).await?;

        // 原生 confirm() 会挂起 onclick，点击命令要等弹窗被处理后才返回，
        // 所以接受弹窗必须和点击并发跑，不能排在点击后面
        let (click_result, accepted) = click_with_dialog(
            session.force_click(&found.element),
            session.accept_dialog_if_present(self.dialog_timeout),
            self.element_timeout,
        )
        .await;
        if accepted {
            info!(">>> [弹窗] 已接受确认弹窗");
        }
        match click_result {
            Some(result) => {
                result?;
                info!(">>> [操作] 点击了续费按钮");
            }
            None => {
                warn!(">>> [警告] 点击续费按钮未在时限内返回，兜底清理可能残留的弹窗");
                session.accept_dialog_if_present(self.dialog_timeout).await;
                return Ok(ResourceResult::Unconfirmed);
            }
        }

        // --- 核对 ---
        let Some((locator, before)) = marker else {
            tokio::time::sleep(self.settle).await;
            info!(">>> [结果] 续费指令已发送 (无法核对)");
            return Ok(ResourceResult::Unconfirmed);
        };

        match session
            .wait_for_text_change(&locator, &before, self.element_timeout)
            .await
        {
            Some(after) => {
                info!(">>> [成功] 续费已生效: [{}] -> [{}]", before, after);
                Ok(ResourceResult::Renewed)
            }
            None => {
                warn!(">>> [警告] 点击后标记字段未变化，可能无需续费或尚未生效");
                Ok(ResourceResult::Unconfirmed)
            }
        }
    }

    /// 读取变更标记字段的当前文本，返回命中的定位器和文本快照
    async fn read_marker(&self, session: &Session) -> Option<(Locator, String)> {
        let (index, element) = session
            .wait_for_any_visible(&self.marker_locators, self.element_timeout)
            .await?;
        let text = session.text_of(&element).await;
        Some((self.marker_locators[index].clone(), text))
    }
}

/// 单个服务器的处理结果
enum ResourceResult {
    Renewed,
    NoControl,
    Unconfirmed,
}

/// 并发执行点击和弹窗接受，并给点击加一层时限兜底
///
/// 弹窗打开期间点击不会返回，两个 future 必须同时被驱动。
/// 返回 (点击结果, 是否接受了弹窗)，点击超时记 `None`。
async fn click_with_dialog<C, D>(
    click: C,
    accept: D,
    click_bound: Duration,
) -> (Option<Result<()>>, bool)
where
    C: Future<Output = Result<()>>,
    D: Future<Output = bool>,
{
    let (click_result, accepted) = tokio::join!(tokio::time::timeout(click_bound, click), accept);
    (click_result.ok(), accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_unique_links_dedup_keeps_first_seen_order() {
        let links = collect_unique_links(vec![
            Some("https://d/server?id=1".to_string()),
            Some("https://d/server?id=2".to_string()),
            Some("https://d/server?id=1".to_string()),
            None,
            Some("https://d/server?id=3".to_string()),
        ]);
        assert_eq!(
            links,
            vec![
                "https://d/server?id=1",
                "https://d/server?id=2",
                "https://d/server?id=3"
            ]
        );
    }

    #[test]
    fn test_collect_unique_links_skips_empty() {
        let links = collect_unique_links(vec![Some(String::new()), None]);
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_click_blocked_by_dialog_completes_once_accepted() {
        // 模拟 confirm() 弹窗：点击要等弹窗被接受后才能返回
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let click = async move {
            rx.await.ok();
            Ok(())
        };
        let accept = async move {
            let _ = tx.send(());
            true
        };

        let (click_result, accepted) =
            click_with_dialog(click, accept, Duration::from_secs(1)).await;
        assert!(accepted);
        assert!(matches!(click_result, Some(Ok(()))));
    }

    #[tokio::test]
    async fn test_hung_click_is_bounded_by_timeout() {
        let click = async {
            std::future::pending::<()>().await;
            Ok(())
        };
        let accept = async { false };

        let (click_result, accepted) =
            click_with_dialog(click, accept, Duration::from_millis(20)).await;
        assert!(click_result.is_none());
        assert!(!accepted);
    }
}
