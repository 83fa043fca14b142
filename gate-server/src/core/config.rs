/// 服务器配置 - 售票节点的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/gate | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | PUBLIC_BASE_URL | http://localhost:3000 | 对外回调地址 |
/// | CURRENCY | EUR | 结算货币 |
/// | PAYMENT_PROVIDERS | dummy,hosted | 启用的支付渠道 |
/// | HOSTED_CHECKOUT_URL | https://pay.example.com | 托管支付页地址 |
/// | HOLD_MAX_AGE_MINUTES | 1440 | draft 持有上限（分钟） |
/// | REAPER_INTERVAL_SECS | 600 | 回收扫描间隔（秒） |
/// | REAPER_BATCH_LIMIT | 500 | 单次回收批量上限 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/gate HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 对外可达的基础 URL（回调 return_url 用）
    pub public_base_url: String,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 结算配置 ===
    /// 结算货币 (ISO 4217)
    pub currency: String,
    /// 启用的支付渠道 id 列表
    pub payment_providers: Vec<String>,
    /// 托管支付页基础地址
    pub hosted_checkout_url: String,

    // === 回收配置 ===
    /// draft 持有上限（分钟），超龄转 timeout
    pub hold_max_age_minutes: u64,
    /// 回收扫描间隔（秒）
    pub reaper_interval_secs: u64,
    /// 单次回收批量上限
    pub reaper_batch_limit: i64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/gate".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "EUR".into()),
            payment_providers: std::env::var("PAYMENT_PROVIDERS")
                .unwrap_or_else(|_| "dummy,hosted".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            hosted_checkout_url: std::env::var("HOSTED_CHECKOUT_URL")
                .unwrap_or_else(|_| "https://pay.example.com".into()),

            hold_max_age_minutes: std::env::var("HOLD_MAX_AGE_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1440),
            reaper_interval_secs: std::env::var("REAPER_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(600),
            reaper_batch_limit: std::env::var("REAPER_BATCH_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(500),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
