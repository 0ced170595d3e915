// ==========================================
// 拣货批次系统 - 批次规则执行引擎
// ==========================================
// 职责: 按规则筛选可批次化拣货单，按 (箱数 × 每箱订单数) 切分为批次
// 输入: BatchRule 列表 + 调用上下文
// 输出: 新建的草稿批次
// 红线: 每个批次的成员分配是原子的；余数拣货单保持未分配
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::batch::{BatchRule, PickingBatch, PICKING_MODEL};
use crate::engine::batch_core::BatchCore;
use crate::engine::context::OperationContext;
use crate::engine::error::{EngineError, EngineResult};
use crate::filter::FilterDomain;
use crate::repository::{
    ActionLogRepository, BatchRepository, FilterRepository, PickingRepository,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

// ==========================================
// PreparedRule - 已校验的规则
// ==========================================
struct PreparedRule<'a> {
    rule: &'a BatchRule,
    domain: FilterDomain,
    group_size: usize,
}

// ==========================================
// BatchCreationEngine - 批次规则执行引擎
// ==========================================
pub struct BatchCreationEngine {
    pickings: Arc<PickingRepository>,
    batches: Arc<BatchRepository>,
    filters: Arc<FilterRepository>,
}

impl BatchCreationEngine {
    pub fn new(
        pickings: Arc<PickingRepository>,
        batches: Arc<BatchRepository>,
        filters: Arc<FilterRepository>,
    ) -> Self {
        Self {
            pickings,
            batches,
            filters,
        }
    }

    /// 按规则顺序创建批次
    ///
    /// # 流程
    /// 1. 校验全部规则并编译过滤器（任一失败则不创建任何批次）
    /// 2. 逐条规则查询可批次化拣货单（id 升序）
    /// 3. 取前 usable_count 个，按 group_size 切分，每组创建一个批次
    ///
    /// # 返回
    /// - 所有规则新建批次的汇总
    #[instrument(skip(self, ctx, rules), fields(actor = %ctx.actor, rule_count = rules.len()))]
    pub fn create_batches(
        &self,
        ctx: &OperationContext,
        rules: &[BatchRule],
    ) -> EngineResult<Vec<PickingBatch>> {
        let prepared = rules
            .iter()
            .map(|rule| self.prepare_rule(rule))
            .collect::<EngineResult<Vec<_>>>()
            .map_err(|e| {
                error!(error = %e, "批次规则校验失败，本次不创建批次");
                e
            })?;

        let mut created = Vec::new();
        for p in &prepared {
            created.extend(self.apply_rule(ctx, p)?);
        }

        info!(batch_count = created.len(), "批次规则执行完成");
        Ok(created)
    }

    /// 校验单条规则: 组大小、过滤器存在性、过滤器模型、domain 语法
    fn prepare_rule<'a>(&self, rule: &'a BatchRule) -> EngineResult<PreparedRule<'a>> {
        let group_size = rule.group_size().ok_or_else(|| {
            EngineError::Configuration(format!(
                "规则 {} 的箱数/每箱订单数无效: nbr_box={}, nbr_order={}",
                rule.id, rule.boxes_per_batch, rule.orders_per_box
            ))
        })?;

        let filter = self.filters.find_by_id(rule.filter_id)?.ok_or_else(|| {
            EngineError::Configuration(format!(
                "规则 {} 引用的过滤器 {} 不存在",
                rule.id, rule.filter_id
            ))
        })?;

        if filter.model != PICKING_MODEL {
            return Err(EngineError::Configuration(format!(
                "规则 {} 的过滤器 {} 作用于 {}，应为 {}",
                rule.id, filter.id, filter.model, PICKING_MODEL
            )));
        }

        let domain = FilterDomain::parse(&filter.domain).map_err(|e| {
            EngineError::Configuration(format!(
                "规则 {} 的过滤器 {} 无法解析: {}",
                rule.id, filter.id, e
            ))
        })?;

        Ok(PreparedRule {
            rule,
            domain,
            group_size,
        })
    }

    fn apply_rule(
        &self,
        ctx: &OperationContext,
        prepared: &PreparedRule<'_>,
    ) -> EngineResult<Vec<PickingBatch>> {
        let rule = prepared.rule;
        let eligible = self
            .pickings
            .search_eligible(rule.picking_type_id, &prepared.domain)?;
        let ids: Vec<i64> = eligible.iter().map(|p| p.id).collect();

        let usable = BatchCore::usable_count(ids.len(), prepared.group_size);
        debug!(
            rule_id = rule.id,
            eligible = ids.len(),
            group_size = prepared.group_size,
            usable,
            "规则可批次化数量"
        );

        let mut created = Vec::new();
        for chunk in BatchCore::chunks(&ids, prepared.group_size) {
            // 操作日志与成员分配同事务提交
            let batch = self.batches.create_with_pickings(
                ctx.company_id,
                Some(rule.id),
                chunk,
                |conn, batch| {
                    let log =
                        ActionLog::new(ActionType::BatchCreation, Some(batch.id), &ctx.actor)
                            .with_detail(format!(
                                "rule={} batch={} pickings={}",
                                rule.id,
                                batch.name,
                                chunk.len()
                            ));
                    ActionLogRepository::insert_tx(conn, &log).map(|_| ())
                },
            )?;

            info!(
                rule_id = rule.id,
                batch_id = batch.id,
                batch_name = %batch.name,
                pickings = chunk.len(),
                "已创建拣货批次"
            );
            created.push(batch);
        }

        Ok(created)
    }
}
