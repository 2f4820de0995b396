//! 元素定位策略
//!
//! 统一封装 CSS 和 XPath 两种定位方式，供“候选策略链”按优先级逐个尝试。

use std::fmt;

/// 单个定位策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS 选择器
    Css(String),
    /// XPath 表达式
    Xpath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Locator::Xpath(query.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css[{}]", s),
            Locator::Xpath(s) => write!(f, "xpath[{}]", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_display() {
        assert_eq!(
            Locator::css("button.w-full").to_string(),
            "css[button.w-full]"
        );
        assert_eq!(
            Locator::xpath("//button[contains(., 'Claim')]").to_string(),
            "xpath[//button[contains(., 'Claim')]]"
        );
    }
}
