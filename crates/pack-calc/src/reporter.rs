//! 包裹內容預測與銷售訂單歸屬
//!
//! 同一工單的包裹依包裹ID排序，銷售訂單分配明細依宣告順序消耗：
//! 前面包裹的總數量決定本包裹落在哪一張銷售訂單的需求區間。

use pack_core::{
    FinishedMoveLine, MoveLineOrder, MoveLineQuery, MoveState, PackageFilter, PackageId,
    PackagingStore, Precision, ProductId, ProductionOrderId, SaleOrderAllocationLine,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

/// 同工單包裹範圍
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingScope {
    /// 除自己以外的全部包裹
    All,
    /// 包裹ID較小者
    Before,
    /// 包裹ID較大者
    After,
}

impl SiblingScope {
    fn filter(&self, package_id: PackageId) -> PackageFilter {
        match self {
            Self::All => PackageFilter::OtherThan(package_id),
            Self::Before => PackageFilter::Before(package_id),
            Self::After => PackageFilter::After(package_id),
        }
    }
}

/// 包裹歸屬的銷售訂單
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleOrderAttribution {
    pub sale_order: String,
    /// 此包裹中屬於該訂單的數量
    pub quantity: Decimal,
}

/// 包裹內容預測
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastedContent {
    pub package_name: String,
    pub lot: Option<String>,
    pub partner: Option<String>,
    pub product_id: ProductId,
    pub product: String,
    pub prepress_proof: Option<String>,
    pub quantity: Decimal,
    pub sale_order: Option<SaleOrderAttribution>,
}

/// 包裹分配報表
pub struct AllocationReporter;

impl AllocationReporter {
    /// 包裹目前連結的已預留完工明細
    pub fn current_linked_move_line<S: PackagingStore>(
        store: &S,
        package_id: PackageId,
    ) -> pack_core::Result<Option<FinishedMoveLine>> {
        let query = MoveLineQuery::new()
            .any_production()
            .package(PackageFilter::Is(package_id))
            .state(MoveState::Assigned)
            .limit(1);
        Ok(store.search_move_lines(&query)?.into_iter().next())
    }

    /// 同工單的其他包裹（依包裹ID遞增，不重複）
    pub fn sibling_packages<S: PackagingStore>(
        store: &S,
        package_id: PackageId,
        scope: SiblingScope,
    ) -> pack_core::Result<Vec<PackageId>> {
        let production = match Self::current_linked_move_line(store, package_id)?
            .and_then(|line| line.production_id)
        {
            Some(production) => production,
            None => return Ok(Vec::new()),
        };

        let query = MoveLineQuery::new()
            .production(production)
            .package(scope.filter(package_id))
            .state(MoveState::Assigned);
        let mut siblings: Vec<PackageId> = store
            .search_move_lines(&query)?
            .iter()
            .filter_map(|line| line.result_package)
            .collect();
        siblings.sort();
        siblings.dedup();
        Ok(siblings)
    }

    /// 包裹在工單中的序號（從 1 開始）
    pub fn sequence_in_production<S: PackagingStore>(
        store: &S,
        package_id: PackageId,
    ) -> pack_core::Result<usize> {
        Ok(Self::sibling_packages(store, package_id, SiblingScope::Before)?.len() + 1)
    }

    /// 包裹歸屬的銷售訂單與數量
    pub fn linked_sale_order<S: PackagingStore>(
        store: &S,
        package_id: PackageId,
    ) -> pack_core::Result<Option<SaleOrderAttribution>> {
        let line = match Self::current_linked_move_line(store, package_id)? {
            Some(line) => line,
            None => return Ok(None),
        };
        let order = match line.production_id {
            Some(production) => store.production_order(production)?,
            None => return Ok(None),
        };
        let allocations = match order.linked_sale_orders() {
            Some(allocations) => allocations,
            None => return Ok(None),
        };

        let before_capacity = Self::capacity_before(store, order.id, package_id)?;

        Ok(Self::attribute(
            allocations,
            before_capacity,
            line.planned_qty,
            order.precision()?,
        ))
    }

    /// 包裹ID較小的同工單包裹總量
    ///
    /// 每個包裹取其ID最小的已預留明細，與 `current_linked_move_line` 一致。
    pub fn capacity_before<S: PackagingStore>(
        store: &S,
        production: ProductionOrderId,
        package_id: PackageId,
    ) -> pack_core::Result<Decimal> {
        let query = MoveLineQuery::new()
            .production(production)
            .package(PackageFilter::Before(package_id))
            .state(MoveState::Assigned)
            .order(MoveLineOrder::PackageAsc);

        let mut capacity = Decimal::ZERO;
        let mut last_package = None;
        for line in store.search_move_lines(&query)? {
            if line.result_package != last_package {
                capacity += line.planned_qty;
                last_package = line.result_package;
            }
        }
        Ok(capacity)
    }

    /// 依前面包裹總量與分配順序計算歸屬
    ///
    /// 累計分配量首次超過 `before_capacity` 的分配明細即為歸屬訂單。
    /// 訂單需求在本包裹內結束時，數量為累計分配量對 `before_capacity` 取餘
    /// （第一個包裹沒有前量，直接取累計分配量）。
    pub fn attribute(
        allocations: &[SaleOrderAllocationLine],
        before_capacity: Decimal,
        package_qty: Decimal,
        precision: Precision,
    ) -> Option<SaleOrderAttribution> {
        let mut allocated = Decimal::ZERO;
        for allocation in allocations {
            allocated += allocation.qty_producing_allocated;
            if precision.compare(allocated, before_capacity) != Ordering::Greater {
                continue;
            }
            let quantity =
                if precision.compare(before_capacity + package_qty, allocated) == Ordering::Greater {
                    if precision.is_zero(before_capacity) {
                        allocated
                    } else {
                        allocated % before_capacity
                    }
                } else {
                    package_qty
                };
            return Some(SaleOrderAttribution {
                sale_order: allocation.sale_order.clone(),
                quantity,
            });
        }
        None
    }

    /// 包裹內容預測
    pub fn forecasted_content<S: PackagingStore>(
        store: &S,
        package_id: PackageId,
    ) -> pack_core::Result<Option<ForecastedContent>> {
        let line = match Self::current_linked_move_line(store, package_id)? {
            Some(line) => line,
            None => return Ok(None),
        };
        let package = store.package(package_id)?;
        let product = store.product(line.product_id)?;
        let order = match line.production_id {
            Some(production) => Some(store.production_order(production)?),
            None => None,
        };

        Ok(Some(ForecastedContent {
            package_name: package.name,
            lot: order.as_ref().and_then(|o| o.lot_producing.clone()),
            partner: product.partner,
            product_id: product.id,
            product: product.name,
            prepress_proof: order.as_ref().and_then(|o| o.prepress_proof.clone()),
            quantity: line.planned_qty,
            sale_order: Self::linked_sale_order(store, package_id)?,
        }))
    }
}
