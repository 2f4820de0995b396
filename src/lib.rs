//! # Console Checkin
//!
//! 多账号网页控制台自动维护工具：自动登录第三方控制台，
//! 完成每日签到领积分或服务器续费，并核对操作前后的页面状态变化。
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Browser）
//! - `browser/` - 持有稀缺资源（Browser + Page），只暴露能力
//! - `Session` - 每个账号独占一个，导航 / 查找 / 点击 / 条件等待
//!
//! ### ② 业务能力层
//! - `credentials` - 账号配置字符串解析
//! - `discovery` - 按策略链发现可操作控件
//! - `utils::credits` - 从显示文本提取积分数值
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/login` - 登录状态机（含两步登录与候选定位链）
//! - `workflow/claim` - 签到流程（判定 → 点击 → 积分差值核对）
//! - `workflow/renewal` - 续费流程（逐卡片 → 点击 → 标记字段核对）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch` - 多账号顺序编排，冷却与统计
//! - `orchestrator/account_runner` - 单账号会话生命周期与错误边界

pub mod browser;
pub mod config;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{Locator, Session};
pub use config::{Config, TaskKind};
pub use credentials::{parse_accounts, Account};
pub use error::{AppError, AppResult};
pub use orchestrator::App;
pub use workflow::{ClaimFlow, ClaimOutcome, LoginFlow, RenewalFlow};
