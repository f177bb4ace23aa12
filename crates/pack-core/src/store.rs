//! 外部協作介面（持久化、庫存預留、提醒排程）

use std::cmp::Ordering;

use crate::move_line::{FinishedMoveLine, MoveLineId, MoveLineValues, NewMoveLine};
use crate::notice::Notice;
use crate::package::{Package, PackageId, PackageLevel, PackageTypeId};
use crate::production::{
    FinishedMove, MoveId, MoveState, Product, ProductId, ProductionOrder, ProductionOrderId,
};
use crate::Result;

/// 包裹條件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageFilter {
    /// 不限
    #[default]
    Any,
    /// 已裝箱
    Packed,
    /// 未裝箱
    Unpacked,
    /// 指定包裹
    Is(PackageId),
    /// 已裝箱且不是指定包裹
    OtherThan(PackageId),
    /// 已裝箱且包裹ID較小
    Before(PackageId),
    /// 已裝箱且包裹ID較大
    After(PackageId),
}

impl PackageFilter {
    pub fn matches(&self, package: Option<PackageId>) -> bool {
        match (self, package) {
            (Self::Any, _) => true,
            (Self::Packed, p) => p.is_some(),
            (Self::Unpacked, p) => p.is_none(),
            (Self::Is(id), Some(p)) => p == *id,
            (Self::OtherThan(id), Some(p)) => p != *id,
            (Self::Before(id), Some(p)) => p < *id,
            (Self::After(id), Some(p)) => p > *id,
            (_, None) => false,
        }
    }
}

/// 移動明細排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveLineOrder {
    /// 明細ID遞增
    #[default]
    IdAsc,
    /// 包裹ID遞增（最舊的包裹在前，未裝箱在後）
    PackageAsc,
    /// 包裹ID遞減（最新的包裹在前，未裝箱在前）
    PackageDesc,
}

impl MoveLineOrder {
    fn compare(&self, a: &FinishedMoveLine, b: &FinishedMoveLine) -> Ordering {
        let by_package = match self {
            Self::IdAsc => Ordering::Equal,
            Self::PackageAsc => match (a.result_package, b.result_package) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::PackageDesc => match (a.result_package, b.result_package) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            },
        };
        by_package.then(a.id.cmp(&b.id))
    }
}

/// 移動明細查詢條件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveLineQuery {
    pub production: Option<ProductionOrderId>,
    /// 僅限有所屬工單的明細
    pub require_production: bool,
    pub moves: Option<Vec<MoveId>>,
    pub package: PackageFilter,
    pub state: Option<MoveState>,
    pub order: MoveLineOrder,
    pub limit: Option<usize>,
}

impl MoveLineQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn production(mut self, production: ProductionOrderId) -> Self {
        self.production = Some(production);
        self
    }

    pub fn any_production(mut self) -> Self {
        self.require_production = true;
        self
    }

    pub fn moves(mut self, moves: Vec<MoveId>) -> Self {
        self.moves = Some(moves);
        self
    }

    pub fn package(mut self, package: PackageFilter) -> Self {
        self.package = package;
        self
    }

    pub fn state(mut self, state: MoveState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn order(mut self, order: MoveLineOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 單筆明細是否符合條件
    pub fn matches(&self, line: &FinishedMoveLine) -> bool {
        if let Some(production) = self.production {
            if line.production_id != Some(production) {
                return false;
            }
        }
        if self.require_production && line.production_id.is_none() {
            return false;
        }
        if let Some(moves) = &self.moves {
            if !moves.contains(&line.move_id) {
                return false;
            }
        }
        if let Some(state) = self.state {
            if line.state != state {
                return false;
            }
        }
        self.package.matches(line.result_package)
    }

    /// 過濾、排序並截取
    pub fn select<'a, I>(&self, lines: I) -> Vec<FinishedMoveLine>
    where
        I: IntoIterator<Item = &'a FinishedMoveLine>,
    {
        let mut selected: Vec<FinishedMoveLine> = lines
            .into_iter()
            .filter(|line| self.matches(line))
            .cloned()
            .collect();
        selected.sort_by(|a, b| self.order.compare(a, b));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// 持久化層
///
/// 所有記錄的建立、查詢、寫入與刪除都經由此介面；
/// 交易邊界與隔離由實作方負責。
pub trait PackagingStore {
    fn production_order(&self, id: ProductionOrderId) -> Result<ProductionOrder>;

    fn product(&self, id: ProductId) -> Result<Product>;

    fn finished_move(&self, id: MoveId) -> Result<FinishedMove>;

    /// 工單的完工移動
    fn finished_moves(&self, production: ProductionOrderId) -> Result<Vec<FinishedMove>>;

    fn move_line(&self, id: MoveLineId) -> Result<FinishedMoveLine>;

    fn search_move_lines(&self, query: &MoveLineQuery) -> Result<Vec<FinishedMoveLine>>;

    fn count_move_lines(&self, query: &MoveLineQuery) -> Result<usize> {
        Ok(self.search_move_lines(query)?.len())
    }

    fn create_move_line(&mut self, line: NewMoveLine) -> Result<FinishedMoveLine>;

    /// 複製明細：以 `source` 的快照為基礎套用 `overrides`，分配新ID
    fn copy_move_line(
        &mut self,
        source: &FinishedMoveLine,
        overrides: &MoveLineValues,
    ) -> Result<FinishedMoveLine>;

    fn write_move_line(&mut self, id: MoveLineId, values: &MoveLineValues)
        -> Result<FinishedMoveLine>;

    fn unlink_move_lines(&mut self, ids: &[MoveLineId]) -> Result<()>;

    fn package(&self, id: PackageId) -> Result<Package>;

    /// 建立包裹，名稱由序號產生器指定
    fn create_package(&mut self, package_type: Option<PackageTypeId>) -> Result<Package>;

    fn unlink_packages(&mut self, ids: &[PackageId]) -> Result<()>;

    fn create_package_level(&mut self, level: PackageLevel) -> Result<()>;
}

/// 庫存預留
pub trait StockReservation {
    /// 數量變更後重新預留完工移動
    fn reassign_reservations(&mut self, moves: &[MoveId]) -> Result<()>;
}

/// 活動提醒排程
pub trait NoticeScheduler {
    /// 一次批量建立本輪所有提醒
    fn schedule_notices(&mut self, notices: Vec<Notice>) -> Result<()>;
}
