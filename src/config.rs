/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 账号配置字符串，格式: 账号1:密码1,账号2:密码2
    pub accounts: String,
    /// 任务类型（签到 / 续费）
    pub task: TaskKind,
    /// 登录页 URL
    pub login_url: String,
    /// 登录后的目标页 URL（签到页或服务器列表页）
    pub target_url: String,
    /// 是否无头模式
    pub headless: bool,
    /// 浏览器窗口宽度
    pub window_width: u32,
    /// 浏览器窗口高度
    pub window_height: u32,
    /// 伪装的 User-Agent
    pub user_agent: String,
    /// 账号之间的冷却秒数
    pub cooldown_secs: u64,
    /// 登录跳转等待上限（秒）
    pub login_timeout_secs: u64,
    /// 元素等待上限（秒）
    pub element_timeout_secs: u64,
    /// 弹窗等待上限（秒）
    pub dialog_timeout_secs: u64,
    /// 点击后的固定缓冲时间（秒）
    pub settle_secs: u64,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 账号出错时是否打印页面源码（排错用）
    pub dump_page_on_error: bool,
}

/// 任务类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// 每日签到领积分
    Claim,
    /// 服务器续费
    Renew,
}

impl TaskKind {
    /// 从字符串解析任务类型，无法识别时返回 None
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "claim" => Some(TaskKind::Claim),
            "renew" => Some(TaskKind::Renew),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accounts: String::new(),
            task: TaskKind::Claim,
            login_url: "https://console.altr.cc/login".to_string(),
            target_url: "https://console.altr.cc/rewards".to_string(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            cooldown_secs: 5,
            login_timeout_secs: 20,
            element_timeout_secs: 20,
            dialog_timeout_secs: 3,
            settle_secs: 5,
            poll_interval_ms: 250,
            dump_page_on_error: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            accounts: std::env::var("CONSOLE_ACCOUNTS").unwrap_or(default.accounts),
            task: std::env::var("TASK_KIND").ok().and_then(|v| TaskKind::parse(&v)).unwrap_or(default.task),
            login_url: std::env::var("LOGIN_URL").unwrap_or(default.login_url),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            window_width: std::env::var("WINDOW_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(default.window_width),
            window_height: std::env::var("WINDOW_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.window_height),
            user_agent: std::env::var("USER_AGENT").unwrap_or(default.user_agent),
            cooldown_secs: std::env::var("COOLDOWN_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.cooldown_secs),
            login_timeout_secs: std::env::var("LOGIN_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.login_timeout_secs),
            element_timeout_secs: std::env::var("ELEMENT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.element_timeout_secs),
            dialog_timeout_secs: std::env::var("DIALOG_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dialog_timeout_secs),
            settle_secs: std::env::var("SETTLE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_secs),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            dump_page_on_error: std::env::var("DUMP_PAGE_ON_ERROR").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dump_page_on_error),
        }
    }

    /// 元素等待上限
    pub fn element_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.element_timeout_secs)
    }

    /// 登录跳转等待上限
    pub fn login_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.login_timeout_secs)
    }

    /// 轮询间隔
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_parse() {
        assert_eq!(TaskKind::parse("claim"), Some(TaskKind::Claim));
        assert_eq!(TaskKind::parse("Renew"), Some(TaskKind::Renew));
        assert_eq!(TaskKind::parse("  CLAIM  "), Some(TaskKind::Claim));
        assert_eq!(TaskKind::parse("unknown"), None);
    }

    #[test]
    fn test_default_task_is_claim() {
        let config = Config::default();
        assert_eq!(config.task, TaskKind::Claim);
        assert!(config.accounts.is_empty());
    }
}
