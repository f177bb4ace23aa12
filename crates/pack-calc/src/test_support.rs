//! 單元測試共用資料

use pack_core::{
    FinishedMove, FinishedMoveLine, InMemoryStore, MoveId, MoveLineOrder, MoveLineQuery,
    MoveState, NewMoveLine, PackageFilter, PackageTypeId, Packaging, PackagingStore, Product,
    ProductId, ProductionOrder, ProductionOrderId, ProductionState,
};
use rust_decimal::Decimal;

pub(crate) const ORDER: ProductionOrderId = ProductionOrderId(1);
pub(crate) const MOVE: MoveId = MoveId(1);
pub(crate) const PRODUCT: ProductId = ProductId(1);

pub(crate) fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub(crate) fn packaging(capacity: i64) -> Packaging {
    Packaging::new("Carton".to_string(), dec(capacity)).with_package_type(PackageTypeId(1))
}

pub(crate) fn order(qty_producing: i64, capacity: i64) -> ProductionOrder {
    ProductionOrder::new(ORDER, "MO/00001".to_string(), PRODUCT, dec(qty_producing))
        .with_packaging(packaging(capacity))
        .with_state(ProductionState::Progress)
}

/// 單一工單、單一完工移動的資料
pub(crate) fn store_with_order(order: ProductionOrder) -> InMemoryStore {
    let mut store = InMemoryStore::new();
    store.add_product(Product::new(PRODUCT, "Paper Bag".to_string()).with_partner("ACME".to_string()));
    let mut finished_move = FinishedMove::new(MOVE, order.id, order.product_id);
    if let Some(packaging) = &order.packaging {
        finished_move = finished_move.with_packaging(packaging.clone());
    }
    store.add_finished_move(finished_move);
    store.add_production_order(order);
    store
}

pub(crate) fn add_line(store: &mut InMemoryStore, planned: i64, done: i64) -> FinishedMoveLine {
    store.add_move_line(
        NewMoveLine::new(MOVE, Some(ORDER), PRODUCT, dec(planned))
            .with_qty_done(dec(done))
            .with_state(MoveState::Assigned),
    )
}

/// 已裝箱明細的完成數量（依包裹建立順序）
pub(crate) fn packed_quantities(store: &InMemoryStore) -> Vec<Decimal> {
    store
        .search_move_lines(
            &MoveLineQuery::new()
                .production(ORDER)
                .package(PackageFilter::Packed)
                .order(MoveLineOrder::PackageAsc),
        )
        .unwrap()
        .iter()
        .map(|line| line.qty_done)
        .collect()
}
