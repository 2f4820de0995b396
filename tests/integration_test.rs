use console_checkin::browser::Session;
use console_checkin::credentials;
use console_checkin::utils::logging;
use console_checkin::workflow::{ClaimFlow, LoginFlow};
use console_checkin::{App, Config};

#[tokio::test]
#[ignore] // 默认忽略，需要本机有 Chrome，手动运行：cargo test -- --ignored
async fn test_browser_session_lifecycle() {
    logging::init();

    let config = Config::from_env();

    let session = Session::open(&config).await.expect("启动浏览器失败");
    session
        .navigate("about:blank")
        .await
        .expect("导航失败");
    assert!(session.current_url().await.contains("about:blank"));

    session.close().await;
}

#[tokio::test]
#[ignore]
async fn test_login_single_account() {
    logging::init();

    // 需要通过 CONSOLE_ACCOUNTS 提供一个真实账号
    let config = Config::from_env();
    let parsed = credentials::parse_accounts(&config.accounts);
    let account = parsed.accounts.first().expect("未配置测试账号");

    let session = Session::open(&config).await.expect("启动浏览器失败");
    let result = LoginFlow::new(&config).run(&session, account).await;
    session.close().await;

    assert!(result.is_ok(), "登录应该成功: {:?}", result.err());
}

#[tokio::test]
#[ignore]
async fn test_claim_flow_end_to_end() {
    logging::init();

    let config = Config::from_env();
    let parsed = credentials::parse_accounts(&config.accounts);
    let account = parsed.accounts.first().expect("未配置测试账号");

    let session = Session::open(&config).await.expect("启动浏览器失败");

    LoginFlow::new(&config)
        .run(&session, account)
        .await
        .expect("登录失败");

    // 不管今天签没签过，流程本身都应该走到一个合法终态
    let outcome = ClaimFlow::new(&config).run(&session).await;
    session.close().await;

    assert!(outcome.is_ok(), "签到流程异常: {:?}", outcome.err());
    println!("签到结果: {:?}", outcome.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_batch_continues_past_failing_account() {
    logging::init();

    // 两个必然登录失败的账号：批次应把它们都尝试完并正常返回
    let mut config = Config::from_env();
    config.accounts = "bad1@example.com:wrongpass,bad2@example.com:wrongpass".to_string();
    config.cooldown_secs = 1;

    let result = App::new(config).run().await;
    assert!(result.is_ok(), "单个账号失败不应让批次报错: {:?}", result.err());
}
