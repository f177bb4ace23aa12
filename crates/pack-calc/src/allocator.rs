//! 手動裝箱（put-in-pack）

use pack_core::{
    FinishedMoveLine, MoveLineQuery, MoveLineValues, MoveState, NewMoveLine, Package, PackError,
    PackagingSettings, PackagingStore, ProductionOrder, ProductionOrderId, StockReservation,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::order_status::OrderInspector;
use crate::splitter::PackagingSplitter;

/// 包裹分配器
pub struct PackageAllocator;

impl PackageAllocator {
    /// 裝箱前置檢查
    pub fn check_put_in_pack<S: PackagingStore>(
        store: &S,
        order: &ProductionOrder,
    ) -> pack_core::Result<()> {
        if order.state.forbids_packing() {
            return Err(PackError::state(format!(
                "工單 {} 在 {:?} 狀態下不能裝箱",
                order.name, order.state
            )));
        }
        if OrderInspector::has_packages(store, order.id)? {
            return Err(PackError::precondition(format!(
                "工單 {} 已經產生包裹",
                order.name
            )));
        }
        let packaging = order.packaging.as_ref().ok_or_else(|| {
            PackError::precondition(format!("工單 {} 未指定包裝", order.name))
        })?;
        packaging.capacity()?;
        let precision = order.precision()?;
        if precision.compare(order.qty_producing, Decimal::ZERO) != Ordering::Greater {
            return Err(PackError::precondition(format!(
                "工單 {} 未指定生產數量",
                order.name
            )));
        }
        Ok(())
    }

    /// 依工單目前生產數量裝箱
    pub fn put_in_pack<S>(
        store: &mut S,
        order_id: ProductionOrderId,
        settings: &PackagingSettings,
    ) -> pack_core::Result<Vec<Package>>
    where
        S: PackagingStore + StockReservation,
    {
        let order = store.production_order(order_id)?;
        Self::check_put_in_pack(store, &order)?;
        let precision = order.precision()?;

        tracing::info!(
            "工單 {} 裝箱：生產數量 {}，每箱 {}",
            order.name,
            order.qty_producing,
            order.qty_by_packaging()
        );

        let done = OrderInspector::product_quantity_done(store, &order)?;
        if precision.compare(order.qty_producing, done) != Ordering::Equal {
            tracing::debug!(
                "同步完工數量：{} → {}",
                done,
                order.qty_producing
            );
            Self::update_move_finished(store, &order)?;
        }

        // 完工移動可能因取消等原因回到待預留，每次都重新預留
        let move_ids = OrderInspector::finished_move_ids(store, order.id)?;
        store.reassign_reservations(&move_ids)?;

        let candidates = Self::select_candidates(store, &order, move_ids)?;
        if candidates.is_empty() {
            return Err(PackError::nothing_to_pack(format!(
                "請先為工單 {} 的成品填寫完成數量",
                order.name
            )));
        }
        tracing::debug!("候選明細 {} 筆", candidates.len());

        PackagingSplitter::put_in_pack(store, &order, &candidates, settings, false)
    }

    /// 將生產數量寫回成品完工移動
    ///
    /// 第一筆明細承載全部生產數量，其餘未裝箱明細歸零；
    /// 移動尚無明細時新建一筆。
    fn update_move_finished<S: PackagingStore>(
        store: &mut S,
        order: &ProductionOrder,
    ) -> pack_core::Result<()> {
        let moves = OrderInspector::product_moves(store, order)?;
        let target = moves.first().ok_or_else(|| {
            PackError::precondition(format!("工單 {} 沒有成品完工移動", order.name))
        })?;

        let lines: Vec<FinishedMoveLine> = store
            .search_move_lines(&MoveLineQuery::new().moves(moves.iter().map(|m| m.id).collect()))?
            .into_iter()
            .filter(|line| line.state != MoveState::Cancel)
            .collect();

        match lines.split_first() {
            Some((first, rest)) => {
                store.write_move_line(
                    first.id,
                    &MoveLineValues::new().with_qty_done(order.qty_producing),
                )?;
                for line in rest {
                    store.write_move_line(
                        line.id,
                        &MoveLineValues::new().with_qty_done(Decimal::ZERO),
                    )?;
                }
            }
            None => {
                store.create_move_line(
                    NewMoveLine::new(target.id, Some(order.id), order.product_id, order.qty_producing)
                        .with_qty_done(order.qty_producing)
                        .with_state(MoveState::Confirmed),
                )?;
            }
        }
        Ok(())
    }

    /// 選擇候選明細
    ///
    /// 優先選擇有完成數量且未裝箱的明細；若沒有，
    /// 改選有預留數量但尚未開始的明細。重新預留可能釋放明細，結果可能為空。
    fn select_candidates<S: PackagingStore>(
        store: &S,
        order: &ProductionOrder,
        move_ids: Vec<pack_core::MoveId>,
    ) -> pack_core::Result<Vec<FinishedMoveLine>> {
        let precision = order.precision()?;
        let finished_lines = store.search_move_lines(&MoveLineQuery::new().moves(move_ids))?;

        let done_lines: Vec<FinishedMoveLine> = finished_lines
            .iter()
            .filter(|line| precision.is_positive(line.qty_done) && !line.is_packed())
            .cloned()
            .collect();
        if !done_lines.is_empty() {
            return Ok(done_lines);
        }

        Ok(finished_lines
            .into_iter()
            .filter(|line| precision.is_positive(line.planned_qty) && precision.is_zero(line.qty_done))
            .collect())
    }
}
