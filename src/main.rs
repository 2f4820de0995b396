use anyhow::Result;
use console_checkin::utils::logging;
use console_checkin::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 运行应用
    App::new(config).run().await
}
