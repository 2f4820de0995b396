use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::AppError;

/// 注入到每个新文档的防检测脚本，抹掉 webdriver 指纹
const STEALTH_SCRIPT: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    window.navigator.chrome = { runtime: {} };
"#;

/// 启动一个带防检测配置的无头浏览器，返回浏览器和一个空白页面
///
/// 每个账号启动一个全新的浏览器实例，保证环境隔离。
pub async fn launch_stealth_browser(config: &Config) -> Result<(Browser, Page)> {
    debug!("🚀 正在启动浏览器 (headless: {})", config.headless);

    let mut builder = BrowserConfig::builder();
    if config.headless {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }

    let browser_config = builder
        .arg("--disable-gpu") // 服务器环境没有 GPU
        .arg("--no-sandbox") // Linux 环境下运行 Chrome 必须项
        .arg("--disable-dev-shm-usage") // 防止共享内存不足
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ))
        .arg(format!("--user-agent={}", config.user_agent))
        .build()
        .map_err(|message| {
            error!("配置浏览器失败: {}", message);
            AppError::Browser(crate::error::BrowserError::ConfigurationFailed { message })
        })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::browser_launch_failed(e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        AppError::from(e)
    })?;

    // 防检测脚本必须在任何页面加载前注册
    let stealth = AddScriptToEvaluateOnNewDocumentParams::builder()
        .source(STEALTH_SCRIPT)
        .build()
        .map_err(|message| {
            AppError::Browser(crate::error::BrowserError::ConfigurationFailed { message })
        })?;
    if let Err(e) = page.execute(stealth).await {
        // 指纹伪装失败不算致命，继续跑
        warn!("⚠️ 注入防检测脚本失败: {}", e);
    }

    debug!("✅ 浏览器就绪");
    Ok((browser, page))
}
