// ==========================================
// 拣货批次系统 - 装箱传播纯函数库
// ==========================================
// 职责: 每箱订单数解析、暂存库位判定、同箱来源单号挑选
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::picking::MoveLine;

pub struct BoxCore;

impl BoxCore {
    /// 解析每箱订单数
    ///
    /// # 规则
    /// - 批次有来源规则且规则值为正 → 规则值
    /// - 否则 → 配置默认值
    pub fn resolve_orders_per_box(rule_orders_per_box: Option<i64>, default: i64) -> i64 {
        match rule_orders_per_box {
            Some(n) if n > 0 => n,
            _ => default,
        }
    }

    /// 库位名是否为暂存库位（精确匹配）
    pub fn is_staging(location_name: &str, staging_name: &str) -> bool {
        location_name == staging_name
    }

    /// 挑选与当前行同箱的来源单号
    ///
    /// # 规则
    /// - 结果首位为当前行来源单号
    /// - 其余来源按 lines 中首次出现顺序去重，最多 orders_per_box - 1 个
    /// - 无来源单号的行忽略
    ///
    /// # 参数
    /// - `lines`: 批次中位于暂存库位的明细行（按 id 升序）
    pub fn select_origins(current: &str, lines: &[MoveLine], orders_per_box: i64) -> Vec<String> {
        let others_allowed = usize::try_from(orders_per_box.saturating_sub(1)).unwrap_or(0);

        let mut selected = vec![current.to_string()];
        for origin in lines.iter().filter_map(|l| l.origin.as_deref()) {
            if selected.len() > others_allowed {
                break;
            }
            if !selected.iter().any(|s| s == origin) {
                selected.push(origin.to_string());
            }
        }
        selected
    }
}
