//! 成品裝箱與包裹調整示例

use mrp_pack::{
    AllocationReporter, FinishedMove, InMemoryNoticeBoard, InMemoryStore, MoveId, MoveState,
    NewMoveLine, OrderInspector, PackageAllocator, PackageReconciler, Packaging,
    PackagingSettings, Product, ProductId, ProductionOrder, ProductionOrderId, ProductionState,
    SaleOrderAllocationLine,
};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("=== 成品裝箱示例 ===\n");

    let settings = PackagingSettings::new().with_notice_user("planner".to_string());
    let order_id = ProductionOrderId(1);
    let product_id = ProductId(1);
    let carton = Packaging::new("Carton 10".to_string(), Decimal::from(10));

    let mut store = InMemoryStore::new();
    store.add_product(Product::new(product_id, "Paper Bag".to_string()).with_partner("ACME".to_string()));
    store.add_production_order(
        ProductionOrder::new(order_id, "MO/00001".to_string(), product_id, Decimal::from(25))
            .with_packaging(carton.clone())
            .with_state(ProductionState::Progress)
            .with_lot_producing("LOT-0001".to_string())
            .with_sale_order_lines(vec![
                SaleOrderAllocationLine::new(1, "SO-001".to_string(), Decimal::from(15)),
                SaleOrderAllocationLine::new(2, "SO-002".to_string(), Decimal::from(10)),
            ]),
    );
    store.add_finished_move(FinishedMove::new(MoveId(1), order_id, product_id).with_packaging(carton));
    store.add_move_line(
        NewMoveLine::new(MoveId(1), Some(order_id), product_id, Decimal::from(25))
            .with_state(MoveState::Assigned),
    );

    // 1. 裝箱
    let packages = PackageAllocator::put_in_pack(&mut store, order_id, &settings)?;
    println!("建立包裹 {} 個:", packages.len());
    for package in &packages {
        if let Some(content) = AllocationReporter::forecasted_content(&store, package.id)? {
            let sale_order = content
                .sale_order
                .map(|so| format!("{}（{}）", so.sale_order, so.quantity))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  - {} 序號 {} 數量 {} 銷售訂單 {}",
                content.package_name,
                AllocationReporter::sequence_in_production(&store, package.id)?,
                content.quantity,
                sale_order
            );
        }
    }

    // 2. 生產數量改為 18 後調整包裹
    store.set_qty_producing(order_id, Decimal::from(18))?;
    let mut board = InMemoryNoticeBoard::new();
    let report = PackageReconciler::refresh_packages(&mut store, &mut board, &[order_id], &settings)?;

    println!("\n調整後包裹:");
    for package in OrderInspector::related_packages(&store, order_id)? {
        println!("  - {}", package.name);
    }
    println!("\n提醒 {} 則:", report.notices_scheduled);
    for notice in board.notices() {
        println!("  - {}: {}", notice.summary, notice.note);
    }

    Ok(())
}
