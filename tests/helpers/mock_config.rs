// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use picking_batch::config::BoxConfigReader;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock 配置结构
///
/// 值可在测试中修改，读取次数可断言
#[derive(Debug)]
pub struct MockConfig {
    orders_per_box: Mutex<i64>,
    staging_location_name: Mutex<String>,
    reads: AtomicUsize,
}

impl MockConfig {
    /// 创建默认配置（6 单/箱，Packing Zone）
    pub fn default() -> Self {
        Self::with_values(6, "Packing Zone")
    }

    pub fn with_values(orders_per_box: i64, staging_location_name: &str) -> Self {
        Self {
            orders_per_box: Mutex::new(orders_per_box),
            staging_location_name: Mutex::new(staging_location_name.to_string()),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn set_orders_per_box(&self, value: i64) {
        *self.orders_per_box.lock().unwrap() = value;
    }

    pub fn set_staging_location_name(&self, value: &str) {
        *self.staging_location_name.lock().unwrap() = value.to_string();
    }

    /// 累计读取次数
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BoxConfigReader for MockConfig {
    async fn get_default_orders_per_box(&self) -> Result<i64, Box<dyn Error>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(*self.orders_per_box.lock().unwrap())
    }

    async fn get_staging_location_name(&self) -> Result<String, Box<dyn Error>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.staging_location_name.lock().unwrap().clone())
    }
}
