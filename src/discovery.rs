//! 操作控件发现 - 业务能力层
//!
//! 按优先级逐个尝试一组定位策略，在每个策略的匹配集里取第一个可见元素。
//! 一个策略没有可见命中就落到下一个策略，全部落空返回 None —— 这不是错误，
//! 而是“页面上没有可操作的控件”，由调用方按各自的业务语义解释。

use anyhow::Result;
use chromiumoxide::Element;
use tracing::{debug, info};

use crate::browser::{Locator, Session};

/// 一次发现观察到的 UI 控件状态，只在单个流程步骤内存在
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCandidate {
    /// 控件显示文本
    pub text: String,
    /// 是否带 disabled 属性
    pub disabled: bool,
    /// 是否可见
    pub visible: bool,
}

/// 发现结果：元素句柄 + 当时观察到的状态
pub struct FoundAction {
    pub element: Element,
    pub candidate: ActionCandidate,
}

/// 同一策略匹配集内的选择规则：第一个可见的候选
pub fn first_visible(candidates: &[ActionCandidate]) -> Option<usize> {
    candidates.iter().position(|c| c.visible)
}

/// 按策略链查找可操作控件
pub async fn find_action(
    session: &Session,
    strategies: &[Locator],
) -> Result<Option<FoundAction>> {
    for (priority, locator) in strategies.iter().enumerate() {
        let mut observed = Vec::new();
        for element in session.find_all(locator).await {
            let candidate = ActionCandidate {
                text: session.text_of(&element).await,
                disabled: session.is_disabled(&element).await,
                visible: session.is_visible(&element).await,
            };
            observed.push((element, candidate));
        }

        let candidates: Vec<ActionCandidate> =
            observed.iter().map(|(_, c)| c.clone()).collect();
        if let Some(index) = first_visible(&candidates) {
            if priority > 0 {
                info!("✓ 备用策略命中: {}", locator);
            }
            if let Some((element, candidate)) = observed.into_iter().nth(index) {
                return Ok(Some(FoundAction { element, candidate }));
            }
        }

        debug!("策略未命中可见元素，继续尝试下一个: {}", locator);
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, visible: bool) -> ActionCandidate {
        ActionCandidate {
            text: text.to_string(),
            disabled: false,
            visible,
        }
    }

    #[test]
    fn test_first_visible_picks_first_visible() {
        let group = vec![
            candidate("hidden", false),
            candidate("shown", true),
            candidate("also shown", true),
        ];
        assert_eq!(first_visible(&group), Some(1));
    }

    #[test]
    fn test_first_visible_none_when_all_hidden() {
        let group = vec![candidate("a", false), candidate("b", false)];
        assert_eq!(first_visible(&group), None);
    }

    #[test]
    fn test_fallback_ordering() {
        // 主策略全部不可见、备用策略恰好有一个可见时，必须选中备用策略的元素
        let primary = vec![candidate("Claim", false)];
        let fallback = vec![candidate("Reward", true)];
        let groups = [primary, fallback];

        let pick = groups
            .iter()
            .enumerate()
            .find_map(|(gi, g)| first_visible(g).map(|i| (gi, i)));

        assert_eq!(pick, Some((1, 0)));
    }

    #[test]
    fn test_primary_wins_when_both_match() {
        let primary = vec![candidate("Claim", true)];
        let fallback = vec![candidate("Reward", true)];
        let groups = [primary, fallback];

        let pick = groups
            .iter()
            .enumerate()
            .find_map(|(gi, g)| first_visible(g).map(|i| (gi, i)));

        assert_eq!(pick, Some((0, 0)));
    }
}
