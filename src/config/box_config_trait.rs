// ==========================================
// 拣货批次系统 - 装箱配置读取 Trait
// ==========================================
// 职责: 定义装箱传播所需的配置读取接口（不包含实现）
// 红线: 不缓存，每次调用都读取最新值
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// BoxConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait BoxConfigReader: Send + Sync {
    /// 获取默认每箱订单数（批次无唯一规则时使用）
    ///
    /// # 默认值
    /// - 6
    async fn get_default_orders_per_box(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取需要按箱拆分的暂存库位名称
    ///
    /// # 默认值
    /// - "Packing Zone"
    async fn get_staging_location_name(&self) -> Result<String, Box<dyn Error>>;
}
