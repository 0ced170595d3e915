// ==========================================
// 拣货批次系统 - 装箱库位传播引擎
// ==========================================
// 职责: 暂存区明细行放入箱位时，校验箱位独占，并将同箱订单的明细行一并移入
// 输入: 调用上下文 + 明细行 id + 写入值
// 红线: 校验失败时不产生任何写入；校验、传播、原始写入在同一事务内
// ==========================================
// 流程:
//   Start → (单行且修改库位?) → 暂存区判定 → 独占校验
//         → {Rejected | 同箱行收集 → 批量传播 → 留痕 → 原始写入}
// ==========================================

use crate::config::BoxConfigReader;
use crate::domain::action_log::{ActionLog, ActionType, BoxPropagationPayload};
use crate::domain::picking::MoveLineValues;
use crate::engine::box_core::BoxCore;
use crate::engine::context::OperationContext;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::{
    ActionLogRepository, MoveLineRepository, RepositoryError,
};
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 单次调用读取的配置
#[derive(Debug, Clone)]
struct BoxSettings {
    default_orders_per_box: i64,
    staging_location_name: String,
}

// ==========================================
// BoxPropagationEngine - 装箱库位传播引擎
// ==========================================
pub struct BoxPropagationEngine<C>
where
    C: BoxConfigReader,
{
    config: Arc<C>,
    move_lines: Arc<MoveLineRepository>,
}

impl<C> BoxPropagationEngine<C>
where
    C: BoxConfigReader,
{
    pub fn new(config: Arc<C>, move_lines: Arc<MoveLineRepository>) -> Self {
        Self { config, move_lines }
    }

    /// 写入明细行（带装箱传播）
    ///
    /// # 参数
    /// - `ctx`: 调用上下文
    /// - `line_ids`: 目标明细行
    /// - `values`: 写入值
    ///
    /// # 返回
    /// - Ok(n): 原始写入影响的行数
    /// - Err(BoxOccupied): 目标箱位已被活动批次占用，未做任何修改
    #[instrument(skip(self, ctx, values), fields(actor = %ctx.actor, propagating = ctx.box_propagation))]
    pub async fn write(
        &self,
        ctx: &OperationContext,
        line_ids: &[i64],
        values: &MoveLineValues,
    ) -> EngineResult<usize> {
        if !Self::wants_propagation(ctx, line_ids, values) {
            return Ok(self.move_lines.write(line_ids, values)?);
        }

        // 配置在事务外读取，每次调用都取最新值
        let settings = self.load_settings().await?;

        self.move_lines
            .with_transaction(|conn| Self::write_tx(ctx, conn, line_ids, values, &settings))
    }

    async fn load_settings(&self) -> EngineResult<BoxSettings> {
        let default_orders_per_box = self
            .config
            .get_default_orders_per_box()
            .await
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let staging_location_name = self
            .config
            .get_staging_location_name()
            .await
            .map_err(|e| EngineError::Config(e.to_string()))?;

        Ok(BoxSettings {
            default_orders_per_box,
            staging_location_name,
        })
    }

    /// 单行写入且修改目标库位，且不在传播中
    fn wants_propagation(ctx: &OperationContext, line_ids: &[i64], values: &MoveLineValues) -> bool {
        !ctx.box_propagation && line_ids.len() == 1 && values.location_dest_id.is_some()
    }

    fn write_tx(
        ctx: &OperationContext,
        conn: &Connection,
        line_ids: &[i64],
        values: &MoveLineValues,
        settings: &BoxSettings,
    ) -> EngineResult<usize> {
        let (line_id, new_location_id) = match (line_ids, values.location_dest_id) {
            ([line_id], Some(location_id)) if !ctx.box_propagation => (*line_id, location_id),
            _ => return Ok(MoveLineRepository::write_tx(conn, line_ids, values)?),
        };

        let line_ctx = MoveLineRepository::load_context_tx(conn, line_id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "stock_move_line".to_string(),
                id: line_id.to_string(),
            }
        })?;

        let orders_per_box = BoxCore::resolve_orders_per_box(
            line_ctx.rule_orders_per_box,
            settings.default_orders_per_box,
        );

        if !BoxCore::is_staging(&line_ctx.current_location_name, &settings.staging_location_name) {
            debug!(line_id, location = %line_ctx.current_location_name, "明细行不在暂存库位，直接写入");
            return Ok(MoveLineRepository::write_tx(conn, line_ids, values)?);
        }

        // 独占校验
        if MoveLineRepository::exists_open_batch_line_at_location_tx(conn, new_location_id, line_id)? {
            return Err(EngineError::BoxOccupied);
        }

        if let (Some(batch), Some(origin)) = (&line_ctx.batch, line_ctx.line.origin.as_deref()) {
            let staged = MoveLineRepository::find_batch_lines_at_location_name_tx(
                conn,
                batch.id,
                &settings.staging_location_name,
                None,
            )?;
            let origins = BoxCore::select_origins(origin, &staged, orders_per_box);

            let sibling_ids: Vec<i64> = MoveLineRepository::find_batch_lines_at_location_name_tx(
                conn,
                batch.id,
                &settings.staging_location_name,
                Some(&origins),
            )?
            .into_iter()
            .map(|l| l.id)
            .filter(|id| *id != line_id)
            .collect();

            // 嵌套写入携带传播标志，不再进入传播分支
            Self::write_tx(
                &ctx.propagating(),
                conn,
                &sibling_ids,
                &MoveLineValues::location_dest(new_location_id),
                settings,
            )?;

            let mut moved_ids = sibling_ids;
            moved_ids.push(line_id);
            moved_ids.sort_unstable();

            let payload = BoxPropagationPayload {
                batch_id: batch.id,
                batch_name: batch.name.clone(),
                location_dest_id: new_location_id,
                origins: origins.clone(),
                line_ids: moved_ids,
            };
            let log = ActionLog::new(ActionType::BoxPropagation, Some(batch.id), &ctx.actor)
                .with_payload(&payload)
                .with_detail(format!("orders={}", origins.join(",")));
            ActionLogRepository::insert_tx(conn, &log)?;

            info!(
                batch_id = batch.id,
                batch_name = %batch.name,
                location_dest_id = new_location_id,
                origins = ?origins,
                "装箱库位传播"
            );
        }

        Ok(MoveLineRepository::write_tx(conn, line_ids, values)?)
    }
}
