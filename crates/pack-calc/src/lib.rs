//! # Pack Calculation Engine
//!
//! 成品裝箱、包裹調整與銷售訂單分配計算

pub mod allocator;
pub mod order_status;
pub mod reconciler;
pub mod reporter;
pub mod splitter;

#[cfg(test)]
mod test_support;

// Re-export 主要類型
pub use allocator::PackageAllocator;
pub use order_status::OrderInspector;
pub use reconciler::{PackageReconciler, RefreshPlan};
pub use reporter::{AllocationReporter, ForecastedContent, SaleOrderAttribution, SiblingScope};
pub use splitter::PackagingSplitter;

use pack_core::ProductionOrderId;

/// 包裹調整批次結果
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// 各工單調整結果
    pub outcomes: Vec<OrderRefreshOutcome>,

    /// 已排程的提醒數量
    pub notices_scheduled: usize,
}

impl RefreshReport {
    /// 創建空的調整結果
    pub fn empty() -> Self {
        Self::default()
    }

    /// 查詢單張工單的結果
    pub fn outcome(&self, order_id: ProductionOrderId) -> Option<&OrderRefreshOutcome> {
        self.outcomes.iter().find(|o| o.order_id == order_id)
    }

    /// 本批次是否沒有任何異動
    pub fn is_noop(&self) -> bool {
        self.outcomes.iter().all(OrderRefreshOutcome::is_noop)
    }
}

/// 單張工單的包裹調整結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRefreshOutcome {
    pub order_id: ProductionOrderId,
    /// 已刪除的包裹名稱
    pub removed: Vec<String>,
    /// 已更新數量的包裹名稱
    pub updated: Vec<String>,
    /// 新增的包裹名稱
    pub added: Vec<String>,
}

impl OrderRefreshOutcome {
    pub fn new(order_id: ProductionOrderId) -> Self {
        Self {
            order_id,
            removed: Vec::new(),
            updated: Vec::new(),
            added: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.updated.is_empty() && self.added.is_empty()
    }
}
