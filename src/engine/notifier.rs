// ==========================================
// 拣货批次系统 - 用户提示接口
// ==========================================

/// 向操作人展示中止原因
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// 以 error 级别写入日志的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::error!(target: "picking_batch::notify", "{}", message);
    }
}
