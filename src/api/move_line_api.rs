// ==========================================
// 拣货批次系统 - 作业明细行 API
// ==========================================
// 职责: 明细行写入入口；箱位被占用时通知操作人
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::config::BoxConfigReader;
use crate::domain::picking::MoveLineValues;
use crate::engine::{BoxPropagationEngine, EngineError, Notifier, OperationContext};

pub struct MoveLineApi<C>
where
    C: BoxConfigReader,
{
    engine: Arc<BoxPropagationEngine<C>>,
    notifier: Arc<dyn Notifier>,
}

impl<C> MoveLineApi<C>
where
    C: BoxConfigReader,
{
    pub fn new(engine: Arc<BoxPropagationEngine<C>>, notifier: Arc<dyn Notifier>) -> Self {
        Self { engine, notifier }
    }

    /// 写入明细行
    ///
    /// # 返回
    /// - Err(UserError("Box is not empty")): 箱位被占用，已通知操作人，未做任何修改
    pub async fn write(
        &self,
        ctx: &OperationContext,
        line_ids: &[i64],
        values: &MoveLineValues,
    ) -> ApiResult<usize> {
        match self.engine.write(ctx, line_ids, values).await {
            Ok(n) => Ok(n),
            Err(e @ EngineError::BoxOccupied) => {
                self.notifier.error(&e.to_string());
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
