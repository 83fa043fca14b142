//! Server state

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::checkout::CheckoutService;
use crate::core::error::Result;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::Config;
use crate::db;
use crate::db::repository::AttendeeRepository;
use crate::gateway::GatewayRegistry;
use crate::inventory::InventoryService;
use crate::reaper::HoldReaper;
use crate::settlement::{LogDispatcher, NotificationDispatcher, SalesCounters, SettlementService};

/// 票种可用量版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。每个票种一个版本号，
/// 任何改变容量占用的状态变化（结算、回收、预留释放）都会递增，
/// 展示层据此判断缓存的余量是否过期。
#[derive(Debug, Default)]
pub struct AvailabilityVersions {
    versions: DashMap<i64, u64>,
}

impl AvailabilityVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 递增票种版本号并返回新值
    pub fn bump(&self, ticket_type_id: i64) -> u64 {
        let mut entry = self.versions.entry(ticket_type_id).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取当前版本号，未知票种返回 0
    pub fn get(&self, ticket_type_id: i64) -> u64 {
        self.versions.get(&ticket_type_id).map(|v| *v).unwrap_or(0)
    }
}

/// 服务器状态 - 持有所有服务的共享引用
///
/// # 服务组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | gateways | 支付渠道注册表（启动时校验） |
/// | notifier | 结算通知分发 |
/// | counters | 销售统计（展示用聚合） |
/// | availability | 票种可用量版本 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub gateways: Arc<GatewayRegistry>,
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub counters: Arc<SalesCounters>,
    pub availability: Arc<AvailabilityVersions>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 打开数据库并构建支付渠道注册表；渠道配置错误在这里直接失败，
    /// 绝不留到请求时。
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let db = db::open(&config.work_dir).await?;
        let gateways = Arc::new(GatewayRegistry::from_config(config)?);

        Ok(Self {
            config: config.clone(),
            db,
            gateways,
            notifier: Arc::new(LogDispatcher),
            counters: Arc::new(SalesCounters::new()),
            availability: Arc::new(AvailabilityVersions::new()),
        })
    }

    /// 组装 InventoryService
    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.db.clone())
    }

    /// 组装 SettlementService
    pub fn settlement(&self) -> SettlementService {
        SettlementService::new(
            self.db.clone(),
            self.notifier.clone(),
            self.counters.clone(),
            self.availability.clone(),
        )
    }

    /// 组装 CheckoutService
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(
            self.db.clone(),
            self.gateways.clone(),
            self.settlement(),
            &self.config,
        )
    }

    /// 注册后台任务：统计预热 + 回收器
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        // Warmup: rebuild display counters from settled records
        let counters = self.counters.clone();
        let attendees = AttendeeRepository::new(self.db.clone());
        tasks.spawn("counters_rebuild", TaskKind::Warmup, async move {
            if let Err(e) = counters.rebuild(&attendees).await {
                tracing::error!(error = %e, "Failed to rebuild sales counters");
            }
        });

        // Periodic: abandoned-hold reaper
        let reaper = HoldReaper::new(
            self.db.clone(),
            self.availability.clone(),
            Duration::from_secs(self.config.reaper_interval_secs),
            self.config.hold_max_age_minutes,
            self.config.reaper_batch_limit,
            tasks.shutdown_token(),
        );
        tasks.spawn("hold_reaper", TaskKind::Periodic, reaper.run());
    }
}
