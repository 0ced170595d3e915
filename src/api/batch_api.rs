// ==========================================
// 拣货批次系统 - 批次规则 API
// ==========================================
// 职责: 执行选定规则/全部规则，返回批次视图描述
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::batch::BatchRule;
use crate::engine::{BatchCreationEngine, OperationContext};
use crate::repository::BatchRuleRepository;

/// 批次视图描述（宿主据此打开新建批次列表）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCreationView {
    pub name: String,
    pub model: String,
    pub view_mode: String,
    pub batch_ids: Vec<i64>,
}

impl BatchCreationView {
    fn for_batches(batch_ids: Vec<i64>) -> Self {
        Self {
            name: "Picking Batch".to_string(),
            model: "stock.picking.batch".to_string(),
            view_mode: "tree,form".to_string(),
            batch_ids,
        }
    }
}

// ==========================================
// BatchApi - 批次规则 API
// ==========================================
pub struct BatchApi {
    rule_repo: Arc<BatchRuleRepository>,
    engine: Arc<BatchCreationEngine>,
}

impl BatchApi {
    pub fn new(rule_repo: Arc<BatchRuleRepository>, engine: Arc<BatchCreationEngine>) -> Self {
        Self { rule_repo, engine }
    }

    /// 执行指定规则
    ///
    /// # 参数
    /// - `rule_ids`: 规则 id（按 sequence, id 排序后执行）
    ///
    /// # 返回
    /// - Err(NotFound): 有规则不存在
    /// - Err(ConfigurationError): 规则配置错误，未创建任何批次
    pub fn action_batch_creation(
        &self,
        ctx: &OperationContext,
        rule_ids: &[i64],
    ) -> ApiResult<BatchCreationView> {
        let rules = self.rule_repo.find_by_ids(rule_ids)?;
        if let Some(missing) = rule_ids
            .iter()
            .find(|id| !rules.iter().any(|r| r.id == **id))
        {
            return Err(ApiError::NotFound(format!(
                "stock_picking_batch_rule(id={})不存在",
                missing
            )));
        }

        self.run(ctx, &rules)
    }

    /// 执行全部规则
    pub fn run_all_rules(&self, ctx: &OperationContext) -> ApiResult<BatchCreationView> {
        let rules = self.rule_repo.find_all()?;
        self.run(ctx, &rules)
    }

    /// 查询作业类型下的规则
    pub fn rules_for_picking_type(&self, picking_type_id: i64) -> ApiResult<Vec<BatchRule>> {
        Ok(self.rule_repo.find_by_picking_type(picking_type_id)?)
    }

    fn run(&self, ctx: &OperationContext, rules: &[BatchRule]) -> ApiResult<BatchCreationView> {
        let batches = self.engine.create_batches(ctx, rules)?;
        Ok(BatchCreationView::for_batches(
            batches.into_iter().map(|b| b.id).collect(),
        ))
    }
}
