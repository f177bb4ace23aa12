//! 工單包裹狀態查詢

use pack_core::{
    FinishedMove, FinishedMoveLine, MoveId, MoveLineOrder, MoveLineQuery, MoveState, Package,
    PackageFilter, PackageId, PackagingStore, ProductionOrder, ProductionOrderId,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// 工單包裹狀態查詢
pub struct OrderInspector;

impl OrderInspector {
    /// 工單所有完工移動ID
    pub fn finished_move_ids<S: PackagingStore>(
        store: &S,
        order_id: ProductionOrderId,
    ) -> pack_core::Result<Vec<MoveId>> {
        Ok(store
            .finished_moves(order_id)?
            .iter()
            .map(|m| m.id)
            .collect())
    }

    /// 成品的完工移動（排除已取消）
    pub fn product_moves<S: PackagingStore>(
        store: &S,
        order: &ProductionOrder,
    ) -> pack_core::Result<Vec<FinishedMove>> {
        Ok(store
            .finished_moves(order.id)?
            .into_iter()
            .filter(|m| m.product_id == order.product_id && m.state != MoveState::Cancel)
            .collect())
    }

    /// 成品完工移動的完成數量（各明細完成數量加總）
    pub fn product_quantity_done<S: PackagingStore>(
        store: &S,
        order: &ProductionOrder,
    ) -> pack_core::Result<Decimal> {
        let move_ids: Vec<MoveId> = Self::product_moves(store, order)?
            .iter()
            .map(|m| m.id)
            .collect();
        if move_ids.is_empty() {
            return Ok(Decimal::ZERO);
        }
        Ok(store
            .search_move_lines(&MoveLineQuery::new().moves(move_ids))?
            .iter()
            .filter(|line| line.state != MoveState::Cancel)
            .map(|line| line.qty_done)
            .sum())
    }

    /// 已裝箱的完工明細
    pub fn packed_move_lines<S: PackagingStore>(
        store: &S,
        order_id: ProductionOrderId,
        order: MoveLineOrder,
        limit: Option<usize>,
    ) -> pack_core::Result<Vec<FinishedMoveLine>> {
        let mut query = MoveLineQuery::new()
            .moves(Self::finished_move_ids(store, order_id)?)
            .package(PackageFilter::Packed)
            .order(order);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        store.search_move_lines(&query)
    }

    /// 工單是否已有包裹
    pub fn has_packages<S: PackagingStore>(
        store: &S,
        order_id: ProductionOrderId,
    ) -> pack_core::Result<bool> {
        let query = MoveLineQuery::new()
            .moves(Self::finished_move_ids(store, order_id)?)
            .package(PackageFilter::Packed);
        Ok(store.count_move_lines(&query)? > 0)
    }

    /// 工單相關包裹（依包裹ID遞增，不重複）
    pub fn related_packages<S: PackagingStore>(
        store: &S,
        order_id: ProductionOrderId,
    ) -> pack_core::Result<Vec<Package>> {
        let mut package_ids: Vec<PackageId> =
            Self::packed_move_lines(store, order_id, MoveLineOrder::PackageAsc, None)?
                .iter()
                .filter_map(|line| line.result_package)
                .collect();
        package_ids.dedup();
        package_ids.into_iter().map(|id| store.package(id)).collect()
    }

    /// 生產數量與已完成數量不一致時，包裹需要調整
    pub fn packages_to_refresh<S: PackagingStore>(
        store: &S,
        order_id: ProductionOrderId,
    ) -> pack_core::Result<bool> {
        if !Self::has_packages(store, order_id)? {
            return Ok(false);
        }
        let order = store.production_order(order_id)?;
        let precision = order.precision()?;
        let done = Self::product_quantity_done(store, &order)?;
        Ok(precision.compare(order.qty_producing, done) != Ordering::Equal)
    }

    /// 篩選需要調整包裹的工單
    pub fn orders_to_refresh<S: PackagingStore>(
        store: &S,
        order_ids: &[ProductionOrderId],
    ) -> pack_core::Result<Vec<ProductionOrderId>> {
        let mut selected = Vec::new();
        for &order_id in order_ids {
            if Self::packages_to_refresh(store, order_id)? {
                selected.push(order_id);
            }
        }
        Ok(selected)
    }

    /// 工單完成前的清理：沒有包裹的工單刪除其完工明細
    ///
    /// 返回刪除的明細數量。
    pub fn prepare_mark_done<S: PackagingStore>(
        store: &mut S,
        order_ids: &[ProductionOrderId],
    ) -> pack_core::Result<usize> {
        let mut removed = 0;
        for &order_id in order_ids {
            if Self::has_packages(store, order_id)? {
                continue;
            }
            let move_ids = Self::finished_move_ids(store, order_id)?;
            let line_ids: Vec<_> = store
                .search_move_lines(&MoveLineQuery::new().moves(move_ids))?
                .iter()
                .map(|line| line.id)
                .collect();
            tracing::debug!("工單 {} 無包裹，刪除完工明細 {} 筆", order_id, line_ids.len());
            removed += line_ids.len();
            store.unlink_move_lines(&line_ids)?;
        }
        Ok(removed)
    }
}
