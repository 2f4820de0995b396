//! 登录状态机 - 流程层
//!
//! 把会话从匿名态推进到已登录态：
//!
//! ```text
//! Anonymous → CredentialsEntered → Submitted → { Authenticated | Failed }
//! ```
//!
//! 对页面布局差异做了容错：账号输入框走候选策略链，密码框不在时先提交
//! 账号再等密码框（两步登录），提交按钮有主备两种定位方式。
//! Failed 对单个账号是终态，后续流程不会再执行。

use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use crate::browser::{Locator, Session};
use crate::config::Config;
use crate::credentials::Account;
use crate::error::{AppError, LoginError};

/// 已知的登录后落地页特征
const POST_LOGIN_PATTERN: &str = "overview|dashboard|home";

/// 登录流程
pub struct LoginFlow {
    login_url: String,
    target_url: String,
    login_timeout: std::time::Duration,
    element_timeout: std::time::Duration,
    destination: Regex,
    identifier_locators: Vec<Locator>,
    password_locator: Locator,
    submit_locators: Vec<Locator>,
}

impl LoginFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            login_url: config.login_url.clone(),
            target_url: config.target_url.clone(),
            login_timeout: config.login_timeout(),
            element_timeout: config.element_timeout(),
            // 模式是编译期常量，构造失败属于程序缺陷
            destination: Regex::new(POST_LOGIN_PATTERN).expect("登录落地页模式不合法"),
            identifier_locators: vec![
                Locator::css("input[type='email']"),
                Locator::css(
                    "input[name='email'], input[name='username'], \
                     input[name='user'], input[name='identifier']",
                ),
                Locator::xpath(
                    "//input[not(@type='password')][not(@type='hidden')][not(@type='checkbox')]",
                ),
            ],
            password_locator: Locator::css("input[type='password'], input[name='password']"),
            submit_locators: vec![
                Locator::css("button[type='submit']"),
                Locator::xpath(
                    "//button[contains(., 'Login') or contains(., 'Sign in') \
                     or contains(., 'Log in')]",
                ),
            ],
        }
    }

    /// 当前地址是否已经落在登录后页面上
    pub fn is_post_login_url(&self, url: &str) -> bool {
        self.destination.is_match(url)
    }

    /// 执行完整登录流程，Err 表示该账号登录失败
    pub async fn run(&self, session: &Session, account: &Account) -> Result<()> {
        info!(">>> [登录] 打开页面: {}", self.login_url);
        session.navigate(&self.login_url).await?;

        // --- Anonymous → CredentialsEntered ---
        info!(">>> [登录] 定位输入框...");
        let Some((strategy, identifier_input)) = session
            .wait_for_any_visible(&self.identifier_locators, self.element_timeout)
            .await
        else {
            return Err(AppError::Login(LoginError::IdentifierFieldNotFound).into());
        };
        if strategy > 0 {
            info!(">>> [登录] 账号输入框由备用策略命中 (#{})", strategy + 1);
        }

        info!(">>> [登录] 输入账号...");
        session
            .clear_and_type(&identifier_input, &account.email)
            .await?;

        let password_input = self.locate_password_input(session).await?;

        info!(">>> [登录] 输入密码...");
        session
            .clear_and_type(&password_input, &account.password)
            .await?;

        // --- CredentialsEntered → Submitted ---
        let Some((_, submit)) = session
            .wait_for_any_visible(&self.submit_locators, self.element_timeout)
            .await
        else {
            return Err(AppError::Login(LoginError::SubmitControlNotFound).into());
        };
        info!(">>> [登录] 提交中...");
        session.force_click(&submit).await?;

        // --- Submitted → Authenticated | Failed ---
        self.await_destination(session).await?;

        // 已登录但还停在中转页时，显式跳到目标页
        self.ensure_on_target(session).await?;

        Ok(())
    }

    /// 定位密码输入框
    ///
    /// 先按单步布局直接找；找不到再走两步流程：提交账号那一步，
    /// 等密码框出现。两种路径都试过才算失败。
    async fn locate_password_input(
        &self,
        session: &Session,
    ) -> Result<chromiumoxide::Element> {
        if let Some(input) = session.first_visible(&self.password_locator).await {
            return Ok(input);
        }

        info!(">>> [登录] 密码框未出现，尝试两步登录流程...");
        let Some((_, next)) = session
            .wait_for_any_visible(&self.submit_locators, self.element_timeout)
            .await
        else {
            return Err(AppError::Login(LoginError::PasswordFieldNotFound).into());
        };
        session.force_click(&next).await?;

        match session
            .wait_for_visible(&self.password_locator, self.element_timeout)
            .await
        {
            Some(input) => {
                info!(">>> [登录] 两步流程的密码框已出现");
                Ok(input)
            }
            None => Err(AppError::Login(LoginError::PasswordFieldNotFound).into()),
        }
    }

    /// 等待跳转到登录后页面
    ///
    /// 时限到了之后再读一次地址做最后核对：轮询和真实跳转之间存在竞态，
    /// 超时瞬间恰好完成跳转的情况按成功处理。
    async fn await_destination(&self, session: &Session) -> Result<()> {
        if session
            .wait_for_url(&self.destination, self.login_timeout)
            .await
        {
            info!(">>> [登录] 登录成功！");
            return Ok(());
        }

        let url = session.current_url().await;
        if self.is_post_login_url(&url) {
            info!(">>> [登录] 登录成功（超时后最后核对命中）");
            return Ok(());
        }

        let title = session.title().await;
        warn!(">>> [错误] 登录超时或失败，当前标题: {}", title);
        Err(AppError::Login(LoginError::DestinationNotReached { url, title }).into())
    }

    /// 确保会话落在目标页上
    async fn ensure_on_target(&self, session: &Session) -> Result<()> {
        let current = session.current_url().await;
        if current.starts_with(self.target_url.as_str()) {
            return Ok(());
        }

        info!(">>> [导航] 前往目标页面: {}", self.target_url);
        session.navigate(&self.target_url).await?;
        // 等文档主体出现，页面才算加载完
        session
            .wait_for_visible(&Locator::css("body"), self.element_timeout)
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> LoginFlow {
        LoginFlow::new(&Config::default())
    }

    #[test]
    fn test_post_login_url_matches_known_destinations() {
        let flow = flow();
        assert!(flow.is_post_login_url("https://dash.zampto.net/overview"));
        assert!(flow.is_post_login_url("https://console.altr.cc/dashboard"));
        assert!(flow.is_post_login_url("https://example.com/home?tab=1"));
    }

    #[test]
    fn test_login_url_is_not_post_login() {
        let flow = flow();
        assert!(!flow.is_post_login_url("https://console.altr.cc/login"));
        assert!(!flow.is_post_login_url("https://dash.zampto.net/"));
    }
}
