//! 浏览器会话 - 基础设施层
//!
//! 每个账号独占一个 Session，持有 Browser 和唯一的 Page，
//! 只暴露导航、查找、读取、点击、条件等待这些能力，不认识任何业务概念。
//! 所有等待都是“轮询直到条件满足或超时”，不存在无限阻塞。

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::page::HandleJavaScriptDialogParams;
use chromiumoxide::{Browser, Element, Page};
use regex::Regex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::browser::headless::launch_stealth_browser;
use crate::browser::locator::Locator;
use crate::config::Config;
use crate::error::AppError;

/// 元素可见性判断脚本：有尺寸且没被 display/visibility 藏起来
const VISIBILITY_FN: &str = r#"
    function() {
        const rect = this.getBoundingClientRect();
        const style = window.getComputedStyle(this);
        return rect.width > 0 && rect.height > 0
            && style.display !== 'none'
            && style.visibility !== 'hidden';
    }
"#;

/// 单个账号的浏览器会话
pub struct Session {
    browser: Browser,
    page: Page,
    poll: Duration,
}

impl Session {
    /// 启动一个全新的隔离会话
    pub async fn open(config: &Config) -> Result<Self> {
        let (browser, page) = launch_stealth_browser(config).await?;
        Ok(Self {
            browser,
            page,
            poll: config.poll_interval(),
        })
    }

    /// 导航到指定 URL
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        Ok(())
    }

    /// 刷新当前页面
    pub async fn reload(&self) -> Result<()> {
        self.page.reload().await.map_err(AppError::from)?;
        Ok(())
    }

    /// 当前页面地址（读不到时返回空串）
    pub async fn current_url(&self) -> String {
        self.page.url().await.ok().flatten().unwrap_or_default()
    }

    /// 当前页面标题（读不到时返回空串）
    pub async fn title(&self) -> String {
        self.page
            .get_title()
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// 页面源码，排错时打印用
    pub async fn page_source(&self) -> Result<String> {
        let html = self.page.content().await.map_err(AppError::from)?;
        Ok(html)
    }

    /// 按定位策略查找所有匹配元素，未命中返回空列表而不是错误
    pub async fn find_all(&self, locator: &Locator) -> Vec<Element> {
        let found = match locator {
            Locator::Css(selector) => self.page.find_elements(selector.as_str()).await,
            Locator::Xpath(query) => self.page.find_xpaths(query.as_str()).await,
        };
        found.unwrap_or_default()
    }

    /// 该策略下第一个可见的元素
    pub async fn first_visible(&self, locator: &Locator) -> Option<Element> {
        for element in self.find_all(locator).await {
            if self.is_visible(&element).await {
                return Some(element);
            }
        }
        None
    }

    /// 元素是否可见
    pub async fn is_visible(&self, element: &Element) -> bool {
        match element.call_js_fn(VISIBILITY_FN, false).await {
            Ok(ret) => ret
                .result
                .value
                .and_then(|v| serde_json::from_value::<bool>(v).ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// 元素是否带 disabled 属性
    pub async fn is_disabled(&self, element: &Element) -> bool {
        element
            .attribute("disabled")
            .await
            .ok()
            .flatten()
            .is_some()
    }

    /// 元素的显示文本（读不到时返回空串）
    pub async fn text_of(&self, element: &Element) -> String {
        element
            .inner_text()
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// 读取元素属性
    pub async fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.attribute(name).await.ok().flatten()
    }

    /// 清空输入框里可能预填的内容后输入文本
    pub async fn clear_and_type(&self, element: &Element, text: &str) -> Result<()> {
        element
            .call_js_fn(
                r#"function() {
                    this.value = '';
                    this.dispatchEvent(new Event('input', { bubbles: true }));
                }"#,
                false,
            )
            .await
            .map_err(AppError::from)?;
        element.click().await.map_err(AppError::from)?;
        element.type_str(text).await.map_err(AppError::from)?;
        Ok(())
    }

    /// JS 强制点击，绕过元素被遮挡时模拟指针点不到的问题
    pub async fn force_click(&self, element: &Element) -> Result<()> {
        element
            .call_js_fn("function() { this.click(); }", false)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    /// 滚动到元素可见区域
    pub async fn scroll_into_view(&self, element: &Element) -> Result<()> {
        element.scroll_into_view().await.map_err(AppError::from)?;
        Ok(())
    }

    /// 在时限内等待某个策略出现可见元素
    pub async fn wait_for_visible(&self, locator: &Locator, timeout: Duration) -> Option<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.first_visible(locator).await {
                return Some(element);
            }
            if Instant::now() >= deadline {
                debug!("等待元素超时: {}", locator);
                return None;
            }
            sleep(self.poll).await;
        }
    }

    /// 在时限内依次尝试一组策略，返回第一个命中可见元素的 (策略序号, 元素)
    ///
    /// 每一轮轮询都按优先级把整条策略链过一遍，先命中的策略赢。
    pub async fn wait_for_any_visible(
        &self,
        locators: &[Locator],
        timeout: Duration,
    ) -> Option<(usize, Element)> {
        let deadline = Instant::now() + timeout;
        loop {
            for (index, locator) in locators.iter().enumerate() {
                if let Some(element) = self.first_visible(locator).await {
                    return Some((index, element));
                }
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(self.poll).await;
        }
    }

    /// 在时限内等待页面地址匹配给定模式
    pub async fn wait_for_url(&self, pattern: &Regex, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if pattern.is_match(&self.current_url().await) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.poll).await;
        }
    }

    /// 在时限内等待指定元素的文本发生变化，返回变化后的文本
    pub async fn wait_for_text_change(
        &self,
        locator: &Locator,
        before: &str,
        timeout: Duration,
    ) -> Option<String> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.first_visible(locator).await {
                let text = self.text_of(&element).await;
                if text != before {
                    return Some(text);
                }
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(self.poll).await;
        }
    }

    /// 如果在时限内出现原生确认弹窗就接受它，没有弹窗不算错误
    pub async fn accept_dialog_if_present(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let params = HandleJavaScriptDialogParams::builder().accept(true).build();
            if let Ok(params) = params {
                // 没有打开的弹窗时该命令会报错，这里把报错当“还没出现”
                if self.page.execute(params).await.is_ok() {
                    debug!("✓ 已接受确认弹窗");
                    return true;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.poll).await;
        }
    }

    /// 关闭会话，释放浏览器进程
    ///
    /// 每个账号处理完毕后必须调用，不管成功还是失败。
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器退出失败: {}", e);
        }
    }
}
