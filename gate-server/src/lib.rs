//! Gate Server - 活动售票节点
//!
//! # 架构概述
//!
//! 核心是四个部件：
//!
//! - **订单校验** (`checkout`): 下单前对照实时库存重算订单
//! - **库存计算** (`inventory`): 余量推导（预留池感知）与优惠码分配
//! - **结算状态机** (`settlement`): 幂等地把网关结果落到参会人记录组
//! - **回收器** (`reaper`): 超龄 draft 持有转 timeout，容量回池
//!
//! # 模块结构
//!
//! ```text
//! gate-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── db/            # 嵌入式 SurrealDB 与仓储层
//! ├── inventory/     # 余量与优惠码计算
//! ├── checkout/      # 订单校验与下单流程
//! ├── settlement/    # 支付结算状态机
//! ├── gateway/       # 支付渠道适配器
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod checkout;
pub mod core;
pub mod db;
pub mod gateway;
pub mod inventory;
pub mod reaper;
pub mod settlement;
pub mod utils;

// Re-export 公共类型
pub use checkout::{CheckoutOutcome, CheckoutService};
pub use core::{Config, Server, ServerState};
pub use gateway::{GatewayRegistry, PaymentGateway};
pub use inventory::InventoryService;
pub use reaper::HoldReaper;
pub use settlement::SettlementService;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 日志)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______      __
  / ____/___ _/ /____
 / / __/ __ `/ __/ _ \
/ /_/ / /_/ / /_/  __/
\____/\__,_/\__/\___/
    "#
    );
}
