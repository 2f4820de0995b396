//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch::App (处理 Vec<Account>，顺序 + 冷却)
//!     ↓
//! account_runner (处理单个 Account，会话生命周期 + 错误边界)
//!     ↓
//! workflow (login / claim / renewal)
//!     ↓
//! discovery + utils (能力层)
//!     ↓
//! browser::Session (基础设施)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch 管批次和节流，account_runner 管单个账号
//! 2. **资源隔离**：会话只存在于 account_runner 内，跨账号绝不共享
//! 3. **错误禁闭**：任何错误都不会越过账号边界传播

pub mod account_runner;
pub mod batch;

pub use account_runner::run_account;
pub use batch::App;
