//! 账号配置解析
//!
//! 把 `账号1:密码1,账号2:密码2` 格式的配置字符串解析成有序账号列表。
//! 密码里允许出现冒号，所以每一项只按第一个冒号切分。

use tracing::warn;

/// 单个账号凭据，解析后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    pub password: String,
}

/// 解析结果：按出现顺序排列的账号 + 被跳过的条目数
#[derive(Debug, Default)]
pub struct ParsedAccounts {
    pub accounts: Vec<Account>,
    pub skipped: usize,
}

/// 解析账号配置字符串
///
/// - 按逗号切分，每项去除首尾空白，空项静默跳过
/// - 缺少冒号的项记一次跳过并告警，继续处理后面的项
/// - 只按第一个冒号切分：冒号前是账号，其余全部是密码
/// - 账号或密码去空白后为空的项同样跳过
///
/// 解析本身从不失败；没有有效账号时返回空列表，是否视为致命由调用方决定。
pub fn parse_accounts(raw: &str) -> ParsedAccounts {
    let mut result = ParsedAccounts::default();

    for item in raw.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        let Some(colon) = item.find(':') else {
            warn!(">>> [跳过] 无法解析的账号项 (缺少冒号): {}", item);
            result.skipped += 1;
            continue;
        };

        let email = item[..colon].trim();
        let password = item[colon + 1..].trim();

        if email.is_empty() || password.is_empty() {
            warn!(">>> [跳过] 格式错误的账号项: {}", item);
            result.skipped += 1;
            continue;
        }

        result.accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let parsed = parse_accounts("a@x.com:p1,b@x.com:p2,c@x.com:p3");
        let emails: Vec<&str> = parsed.accounts.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.com", "b@x.com", "c@x.com"]);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_password_may_contain_colon() {
        let parsed = parse_accounts("a@x.com:pa:ss,b@x.com:q");
        assert_eq!(
            parsed.accounts,
            vec![
                Account {
                    email: "a@x.com".to_string(),
                    password: "pa:ss".to_string()
                },
                Account {
                    email: "b@x.com".to_string(),
                    password: "q".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_batch() {
        let parsed = parse_accounts("");
        assert!(parsed.accounts.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_malformed_items_are_counted() {
        let parsed = parse_accounts("novalidentries");
        assert!(parsed.accounts.is_empty());
        assert_eq!(parsed.skipped, 1);

        let parsed = parse_accounts("nocolon1,nocolon2,a@x.com:ok");
        assert_eq!(parsed.accounts.len(), 1);
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_blank_fields_are_skipped() {
        // 账号为空或密码为空都不入队
        let parsed = parse_accounts(":pass,a@x.com:,b@x.com:ok");
        assert_eq!(parsed.accounts.len(), 1);
        assert_eq!(parsed.accounts[0].email, "b@x.com");
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let parsed = parse_accounts(" a@x.com : p1 , , b@x.com:p2 ");
        assert_eq!(parsed.accounts.len(), 2);
        assert_eq!(parsed.accounts[0].email, "a@x.com");
        assert_eq!(parsed.accounts[0].password, "p1");
    }
}
