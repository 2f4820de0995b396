//! 每日签到流程 - 流程层
//!
//! 前置条件：会话已登录并落在签到页上。
//!
//! 流程：记录初始积分 → 发现签到按钮 → 判定是否已签到 →
//! 未签到则点击，刷新后用积分差值核对结果。

use anyhow::Result;
use tracing::{info, warn};

use crate::browser::{Locator, Session};
use crate::config::Config;
use crate::discovery::{self, ActionCandidate};
use crate::utils::parse_credits;

/// 按钮文本里的“已签到”标记
///
/// 注意这是对第三方站点文案的脆弱耦合："Claim" 本身是 "Claimed" 的子串，
/// 判定顺序依赖按钮文本在签到后变成过去式。改站点文案会破坏这个判定，
/// 不要在未确认目标站文案前擅自收紧。
const CLAIMED_MARKER: &str = "Claimed";

/// 积分显示元素
const BALANCE_LOCATOR: &str = "//*[contains(text(), 'credits')]";

/// 签到流程的终态，每个账号恰好得到一个
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// 页面上没有签到按钮（页面状态本身就是合法结果，不算失败）
    NoControl,
    /// 今天已经签到过，幂等空操作
    AlreadyClaimed { balance: f64 },
    /// 签到成功，积分增加
    Claimed { gained: f64, total: f64 },
    /// 点击了但积分没变（入账可能有服务端延迟，不算错误）
    NoChange { total: f64 },
    /// 积分反而减少，异常但不崩溃
    Anomaly { diff: f64, total: f64 },
    /// 点击后读不到积分，无法核对
    Unverified,
}

/// 签到按钮是否已处于“已签到”状态
///
/// 文本含已签到标记或带 disabled 属性，任意一个信号单独成立即可，
/// 判定发生在任何点击之前。
pub fn already_claimed(candidate: &ActionCandidate) -> bool {
    candidate.text.contains(CLAIMED_MARKER) || candidate.disabled
}

/// 点击之后的结果裁决
///
/// 初始积分一开始就没读到时差值没有意义，整笔余额会被误报成本次收益，
/// 这种情况一律降级为无法核对。
pub fn post_click_outcome(
    balance_tracked: bool,
    initial: f64,
    final_balance: Option<f64>,
) -> ClaimOutcome {
    if !balance_tracked {
        return ClaimOutcome::Unverified;
    }
    match final_balance {
        Some(fin) => verdict(initial, fin),
        None => ClaimOutcome::Unverified,
    }
}

/// 积分差值裁决
pub fn verdict(initial: f64, fin: f64) -> ClaimOutcome {
    let diff = fin - initial;
    if diff > 0.0 {
        ClaimOutcome::Claimed {
            gained: diff,
            total: fin,
        }
    } else if diff == 0.0 {
        ClaimOutcome::NoChange { total: fin }
    } else {
        ClaimOutcome::Anomaly { diff, total: fin }
    }
}

/// 签到流程
pub struct ClaimFlow {
    element_timeout: std::time::Duration,
    settle: std::time::Duration,
    strategies: Vec<Locator>,
}

impl ClaimFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            element_timeout: config.element_timeout(),
            settle: std::time::Duration::from_secs(config.settle_secs),
            strategies: vec![
                Locator::xpath("//button[contains(., 'Claim')]"),
                Locator::xpath("//button[contains(., 'Reward')]"),
                Locator::css("button.w-full"),
            ],
        }
    }

    pub async fn run(&self, session: &Session) -> Result<ClaimOutcome> {
        // --- 1. 记录初始积分 ---
        let balance_locator = Locator::xpath(BALANCE_LOCATOR);
        let mut balance_tracked = true;
        let initial_balance = match session
            .wait_for_visible(&balance_locator, self.element_timeout)
            .await
        {
            Some(element) => parse_credits(&session.text_of(&element).await),
            None => {
                warn!(">>> [警告] 未找到积分显示，按 0 记初始积分，结果核对将不可用");
                balance_tracked = false;
                0.0
            }
        };
        if balance_tracked {
            info!(">>> [记录] 初始积分: {}", initial_balance);
        }

        // --- 2. 寻找签到按钮 ---
        info!(">>> [搜索] 正在寻找签到按钮...");
        let Some(found) = discovery::find_action(session, &self.strategies).await? else {
            info!(">>> [结果] 页面上没找到任何签到按钮");
            return Ok(ClaimOutcome::NoControl);
        };

        info!(
            ">>> [状态] 找到按钮，文字内容: [{}]，是否禁用: {}",
            found.candidate.text, found.candidate.disabled
        );

        // --- 3. 判定是否已签到（点击之前） ---
        if already_claimed(&found.candidate) {
            info!(">>> [结果] ⚪ 今天已经签到过了，无需操作");
            info!(">>> [统计] 当前总积分: {:.1}", initial_balance);
            return Ok(ClaimOutcome::AlreadyClaimed {
                balance: initial_balance,
            });
        }

        // --- 4. 点击并核对 ---
        info!(">>> [动作] 发现未签到，正在点击...");
        session.force_click(&found.element).await?;

        // 固定缓冲，等签到请求发出去
        tokio::time::sleep(self.settle).await;

        let final_balance = if balance_tracked {
            info!(">>> [核对] 刷新页面获取最新积分...");
            session.reload().await?;
            match session
                .wait_for_visible(&balance_locator, self.element_timeout)
                .await
            {
                Some(element) => Some(parse_credits(&session.text_of(&element).await)),
                None => None,
            }
        } else {
            // 初始积分就没读到，刷新也核对不出差值
            None
        };

        let outcome = post_click_outcome(balance_tracked, initial_balance, final_balance);
        match &outcome {
            ClaimOutcome::Claimed { gained, total } => {
                info!(">>> [成功] 🎉 签到成功！获得积分: +{:.1}", gained);
                info!(">>> [总计] 当前积分: {:.1}", total);
            }
            ClaimOutcome::NoChange { total } => {
                warn!(">>> [结果] ⚠️ 按钮已点击但积分未变动");
                info!(">>> [总计] 当前积分: {:.1}", total);
            }
            ClaimOutcome::Anomaly { diff, .. } => {
                warn!(">>> [疑惑] 积分发生异常变动: {:.1}", diff);
            }
            ClaimOutcome::Unverified => {
                warn!(">>> [警告] 无法读取或核对最新积分，无法验证是否到账");
            }
            _ => {}
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, disabled: bool) -> ActionCandidate {
        ActionCandidate {
            text: text.to_string(),
            disabled,
            visible: true,
        }
    }

    #[test]
    fn test_already_claimed_by_text() {
        assert!(already_claimed(&candidate("Claimed today", false)));
    }

    #[test]
    fn test_already_claimed_by_disabled_attribute() {
        // 没有文案标记但被禁用，同样视为已签到
        assert!(already_claimed(&candidate("Claim", true)));
    }

    #[test]
    fn test_not_claimed_when_active_label_and_enabled() {
        assert!(!already_claimed(&candidate("Claim Reward", false)));
    }

    #[test]
    fn test_claim_decision_is_idempotent() {
        // 对同一个已签到状态连续判两次，结果一致且都不会走到点击分支
        let observed = candidate("Claimed today", true);
        assert!(already_claimed(&observed));
        assert!(already_claimed(&observed));
    }

    #[test]
    fn test_verdict_gain() {
        assert_eq!(
            verdict(10.0, 15.5),
            ClaimOutcome::Claimed {
                gained: 5.5,
                total: 15.5
            }
        );
    }

    #[test]
    fn test_verdict_no_change_is_not_an_error() {
        assert_eq!(verdict(10.0, 10.0), ClaimOutcome::NoChange { total: 10.0 });
    }

    #[test]
    fn test_post_click_unverified_when_balance_untracked() {
        // 初始积分读不到时，绝不能把整笔余额当成本次收益上报
        assert_eq!(
            post_click_outcome(false, 0.0, Some(622.9)),
            ClaimOutcome::Unverified
        );
    }

    #[test]
    fn test_post_click_unverified_when_final_balance_unreadable() {
        assert_eq!(post_click_outcome(true, 10.0, None), ClaimOutcome::Unverified);
    }

    #[test]
    fn test_post_click_delegates_to_verdict_when_tracked() {
        assert_eq!(
            post_click_outcome(true, 10.0, Some(15.5)),
            ClaimOutcome::Claimed {
                gained: 5.5,
                total: 15.5
            }
        );
    }

    #[test]
    fn test_verdict_decrease_is_anomaly() {
        assert_eq!(
            verdict(10.0, 8.0),
            ClaimOutcome::Anomaly {
                diff: -2.0,
                total: 8.0
            }
        );
    }
}
