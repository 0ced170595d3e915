// ==========================================
// 拣货批次系统 - 批次切分纯函数库
// ==========================================
// 职责: 计算可用数量、按组大小切分
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

pub struct BatchCore;

impl BatchCore {
    /// 计算可批次化数量
    ///
    /// # 规则
    /// - usable = floor(eligible / group_size) × group_size
    /// - group_size 为 0 时返回 0
    ///
    /// # 示例
    /// ```
    /// use picking_batch::engine::BatchCore;
    ///
    /// assert_eq!(BatchCore::usable_count(120, 54), 108);
    /// assert_eq!(BatchCore::usable_count(37, 54), 0);
    /// ```
    pub fn usable_count(eligible: usize, group_size: usize) -> usize {
        if group_size == 0 {
            return 0;
        }
        (eligible / group_size) * group_size
    }

    /// 按组大小切分为连续、不重叠的完整分组，余数丢弃
    ///
    /// 保持输入顺序
    pub fn chunks<T>(items: &[T], group_size: usize) -> Vec<&[T]> {
        if group_size == 0 {
            return Vec::new();
        }
        items.chunks_exact(group_size).collect()
    }
}
