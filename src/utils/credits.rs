//! 积分文本解析
//!
//! 从带单位和千位分隔符的显示文本里提取数值，例如 '622.9 credits' -> 622.9

/// 提取文本中的积分数值
///
/// 解析失败时返回 0.0（“读不到余额按 0 算”），这样后续的差值判断
/// 只会得出“没有可观测的变化”，而不会让整个账号的流程崩掉。
pub fn parse_credits(text: &str) -> f64 {
    let clean = text
        .to_lowercase()
        .replace("credits", "")
        .replace(',', "");
    clean.trim().parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credits_with_unit() {
        assert_eq!(parse_credits("622.9 credits"), 622.9);
    }

    #[test]
    fn test_parse_credits_thousands_separator() {
        assert_eq!(parse_credits("1,234.5 Credits"), 1234.5);
    }

    #[test]
    fn test_parse_credits_plain_number() {
        assert_eq!(parse_credits("100"), 100.0);
    }

    #[test]
    fn test_parse_credits_garbage_is_zero() {
        // 乱码文本绝不能让流程中断
        assert_eq!(parse_credits("garbage"), 0.0);
        assert_eq!(parse_credits(""), 0.0);
        assert_eq!(parse_credits("-- credits"), 0.0);
    }
}
