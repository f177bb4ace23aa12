//! 記憶體內的持久化實作
//!
//! 供測試與示範使用。

use std::collections::BTreeMap;

use crate::move_line::{FinishedMoveLine, MoveLineId, MoveLineValues, NewMoveLine};
use crate::notice::Notice;
use crate::package::{Package, PackageId, PackageLevel, PackageTypeId};
use crate::production::{
    FinishedMove, MoveId, MoveState, Product, ProductId, ProductionOrder, ProductionOrderId,
};
use crate::store::{MoveLineQuery, NoticeScheduler, PackagingStore, StockReservation};
use crate::{PackError, Result};

/// 記憶體持久化
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    orders: BTreeMap<ProductionOrderId, ProductionOrder>,
    products: BTreeMap<ProductId, Product>,
    moves: BTreeMap<MoveId, FinishedMove>,
    lines: BTreeMap<MoveLineId, FinishedMoveLine>,
    packages: BTreeMap<PackageId, Package>,
    package_levels: Vec<PackageLevel>,
    next_line_id: u64,
    next_package_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn add_production_order(&mut self, order: ProductionOrder) {
        self.orders.insert(order.id, order);
    }

    pub fn add_finished_move(&mut self, finished_move: FinishedMove) {
        self.moves.insert(finished_move.id, finished_move);
    }

    /// 直接加入移動明細（模擬移動處理產生的明細）
    pub fn add_move_line(&mut self, line: NewMoveLine) -> FinishedMoveLine {
        let id = self.allocate_line_id();
        let line = line.into_line(id);
        self.lines.insert(id, line.clone());
        line
    }

    /// 修改工單的生產數量（模擬使用者編輯）
    pub fn set_qty_producing(
        &mut self,
        id: ProductionOrderId,
        qty: rust_decimal::Decimal,
    ) -> Result<()> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| PackError::not_found(format!("製造工單 {}", id)))?;
        order.qty_producing = qty;
        Ok(())
    }

    /// 工單的所有明細（依ID遞增）
    pub fn lines_of(&self, production: ProductionOrderId) -> Vec<FinishedMoveLine> {
        MoveLineQuery::new()
            .production(production)
            .select(self.lines.values())
    }

    pub fn packages(&self) -> Vec<Package> {
        self.packages.values().cloned().collect()
    }

    pub fn package_levels(&self) -> &[PackageLevel] {
        &self.package_levels
    }

    fn allocate_line_id(&mut self) -> MoveLineId {
        self.next_line_id += 1;
        MoveLineId(self.next_line_id)
    }

    fn line_mut(&mut self, id: MoveLineId) -> Result<&mut FinishedMoveLine> {
        self.lines
            .get_mut(&id)
            .ok_or_else(|| PackError::not_found(format!("移動明細 {}", id)))
    }
}

impl PackagingStore for InMemoryStore {
    fn production_order(&self, id: ProductionOrderId) -> Result<ProductionOrder> {
        self.orders
            .get(&id)
            .cloned()
            .ok_or_else(|| PackError::not_found(format!("製造工單 {}", id)))
    }

    fn product(&self, id: ProductId) -> Result<Product> {
        self.products
            .get(&id)
            .cloned()
            .ok_or_else(|| PackError::not_found(format!("產品 {}", id.0)))
    }

    fn finished_move(&self, id: MoveId) -> Result<FinishedMove> {
        self.moves
            .get(&id)
            .cloned()
            .ok_or_else(|| PackError::not_found(format!("完工移動 {}", id.0)))
    }

    fn finished_moves(&self, production: ProductionOrderId) -> Result<Vec<FinishedMove>> {
        Ok(self
            .moves
            .values()
            .filter(|m| m.production_id == production)
            .cloned()
            .collect())
    }

    fn move_line(&self, id: MoveLineId) -> Result<FinishedMoveLine> {
        self.lines
            .get(&id)
            .cloned()
            .ok_or_else(|| PackError::not_found(format!("移動明細 {}", id)))
    }

    fn search_move_lines(&self, query: &MoveLineQuery) -> Result<Vec<FinishedMoveLine>> {
        Ok(query.select(self.lines.values()))
    }

    fn create_move_line(&mut self, line: NewMoveLine) -> Result<FinishedMoveLine> {
        if !self.moves.contains_key(&line.move_id) {
            return Err(PackError::not_found(format!("完工移動 {}", line.move_id.0)));
        }
        Ok(self.add_move_line(line))
    }

    fn copy_move_line(
        &mut self,
        source: &FinishedMoveLine,
        overrides: &MoveLineValues,
    ) -> Result<FinishedMoveLine> {
        let mut copy = source.clone();
        copy.apply(overrides);
        copy.id = self.allocate_line_id();
        self.lines.insert(copy.id, copy.clone());
        Ok(copy)
    }

    fn write_move_line(
        &mut self,
        id: MoveLineId,
        values: &MoveLineValues,
    ) -> Result<FinishedMoveLine> {
        let line = self.line_mut(id)?;
        line.apply(values);
        Ok(line.clone())
    }

    fn unlink_move_lines(&mut self, ids: &[MoveLineId]) -> Result<()> {
        for id in ids {
            self.lines.remove(id);
        }
        Ok(())
    }

    fn package(&self, id: PackageId) -> Result<Package> {
        self.packages
            .get(&id)
            .cloned()
            .ok_or_else(|| PackError::not_found(format!("包裹 {}", id)))
    }

    fn create_package(&mut self, package_type: Option<PackageTypeId>) -> Result<Package> {
        self.next_package_id += 1;
        let id = PackageId(self.next_package_id);
        let package = Package {
            id,
            name: format!("PACK{:07}", id.0),
            package_type,
        };
        self.packages.insert(id, package.clone());
        Ok(package)
    }

    fn unlink_packages(&mut self, ids: &[PackageId]) -> Result<()> {
        for id in ids {
            self.packages.remove(id);
        }
        // 仍指向已刪除包裹的明細改為未裝箱
        for line in self.lines.values_mut() {
            if line.result_package.is_some_and(|p| ids.contains(&p)) {
                line.result_package = None;
            }
        }
        self.package_levels.retain(|level| !ids.contains(&level.package_id));
        Ok(())
    }

    fn create_package_level(&mut self, level: PackageLevel) -> Result<()> {
        self.package_levels.push(level);
        Ok(())
    }
}

impl StockReservation for InMemoryStore {
    fn reassign_reservations(&mut self, moves: &[MoveId]) -> Result<()> {
        for finished_move in self.moves.values_mut() {
            if moves.contains(&finished_move.id) && finished_move.state == MoveState::Confirmed {
                finished_move.state = MoveState::Assigned;
            }
        }
        for line in self.lines.values_mut() {
            if moves.contains(&line.move_id) && line.state == MoveState::Confirmed {
                line.state = MoveState::Assigned;
            }
        }
        Ok(())
    }
}

/// 記憶體提醒看板
#[derive(Debug, Default, Clone)]
pub struct InMemoryNoticeBoard {
    notices: Vec<Notice>,
    batches: usize,
}

impl InMemoryNoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// 批量建立的呼叫次數
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl NoticeScheduler for InMemoryNoticeBoard {
    fn schedule_notices(&mut self, notices: Vec<Notice>) -> Result<()> {
        self.batches += 1;
        self.notices.extend(notices);
        Ok(())
    }
}
