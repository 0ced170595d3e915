// ==========================================
// 拣货批次系统 - 调用上下文
// ==========================================
// 红线: 传播标志只在单次调用内有效，不使用全局可变状态
// ==========================================

/// 单次调用的上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    /// 操作人（写入 action_log）
    pub actor: String,
    /// 操作人所属公司，新建批次归属于该公司
    pub company_id: i64,
    /// 装箱传播进行中；置位时写入不再触发传播
    pub box_propagation: bool,
}

impl OperationContext {
    pub fn new(actor: impl Into<String>, company_id: i64) -> Self {
        Self {
            actor: actor.into(),
            company_id,
            box_propagation: false,
        }
    }

    /// 返回置位传播标志的副本，用于嵌套写入
    pub fn propagating(&self) -> Self {
        Self {
            box_propagation: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_propagating_copies_and_sets_flag() {
        let ctx = OperationContext::new("alice", 3);
        let nested = ctx.propagating();

        assert!(!ctx.box_propagation);
        assert!(nested.box_propagation);
        assert_eq!(nested.actor, "alice");
        assert_eq!(nested.company_id, 3);
    }
}
