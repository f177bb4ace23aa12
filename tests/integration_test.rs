//! 集成測試

use mrp_pack::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

const ORDER: ProductionOrderId = ProductionOrderId(1);
const PRODUCT: ProductId = ProductId(1);

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

fn carton(capacity: i64) -> Packaging {
    Packaging::new("Carton".to_string(), dec(capacity)).with_package_type(PackageTypeId(1))
}

/// 建立工單、成品完工移動與一筆已完成的明細
fn seed_order(
    store: &mut InMemoryStore,
    id: ProductionOrderId,
    move_id: MoveId,
    qty: i64,
    capacity: i64,
) {
    store.add_production_order(
        ProductionOrder::new(id, format!("MO/{:05}", id.0), PRODUCT, dec(qty))
            .with_packaging(carton(capacity))
            .with_state(ProductionState::Progress),
    );
    store.add_finished_move(FinishedMove::new(move_id, id, PRODUCT).with_packaging(carton(capacity)));
    store.add_move_line(
        NewMoveLine::new(move_id, Some(id), PRODUCT, dec(qty))
            .with_qty_done(dec(qty))
            .with_state(MoveState::Assigned),
    );
}

fn new_store() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    store.add_product(Product::new(PRODUCT, "Paper Bag".to_string()).with_partner("ACME".to_string()));
    store
}

fn packed_store(qty: i64, capacity: i64) -> InMemoryStore {
    let mut store = new_store();
    seed_order(&mut store, ORDER, MoveId(1), qty, capacity);
    PackageAllocator::put_in_pack(&mut store, ORDER, &PackagingSettings::default()).unwrap();
    store
}

fn packed_quantities(store: &InMemoryStore, order_id: ProductionOrderId) -> Vec<Decimal> {
    store
        .search_move_lines(
            &MoveLineQuery::new()
                .production(order_id)
                .package(PackageFilter::Packed)
                .order(MoveLineOrder::PackageAsc),
        )
        .unwrap()
        .iter()
        .map(|line| line.qty_done)
        .collect()
}

fn refresh(store: &mut InMemoryStore, board: &mut InMemoryNoticeBoard) -> RefreshReport {
    PackageReconciler::refresh_packages(store, board, &[ORDER], &PackagingSettings::default())
        .unwrap()
}

#[test]
fn test_pack_refresh_and_forecast_flow() {
    // 場景：每箱 10，生產 25，之後改為 18
    let mut store = packed_store(25, 10);
    assert_eq!(packed_quantities(&store, ORDER), vec![dec(10), dec(10), dec(5)]);
    assert!(!OrderInspector::packages_to_refresh(&store, ORDER).unwrap());

    store.set_qty_producing(ORDER, dec(18)).unwrap();
    assert_eq!(OrderInspector::orders_to_refresh(&store, &[ORDER]).unwrap(), vec![ORDER]);

    let mut board = InMemoryNoticeBoard::new();
    let report = refresh(&mut store, &mut board);

    assert_eq!(packed_quantities(&store, ORDER), vec![dec(10), dec(8)]);
    assert_eq!(report.notices_scheduled, 2);
    assert!(!OrderInspector::packages_to_refresh(&store, ORDER).unwrap());

    let packages = OrderInspector::related_packages(&store, ORDER).unwrap();
    assert_eq!(packages.len(), 2);
    let last = AllocationReporter::forecasted_content(&store, packages[1].id)
        .unwrap()
        .unwrap();
    assert_eq!(last.quantity, dec(8));
    assert_eq!(last.partner.as_deref(), Some("ACME"));
    assert_eq!(AllocationReporter::sequence_in_production(&store, packages[1].id).unwrap(), 2);
}

#[test]
fn test_batch_refresh_schedules_notices_once() {
    let mut store = new_store();
    let second = ProductionOrderId(2);
    seed_order(&mut store, ORDER, MoveId(1), 25, 10);
    seed_order(&mut store, second, MoveId(2), 17, 10);
    let settings = PackagingSettings::from_json_str(
        r#"{"notice_activity_type": 7, "notice_user": "planner"}"#,
    )
    .unwrap();
    PackageAllocator::put_in_pack(&mut store, ORDER, &settings).unwrap();
    PackageAllocator::put_in_pack(&mut store, second, &settings).unwrap();

    store.set_qty_producing(ORDER, dec(20)).unwrap();
    store.set_qty_producing(second, dec(30)).unwrap();
    let mut board = InMemoryNoticeBoard::new();

    let report =
        PackageReconciler::refresh_packages(&mut store, &mut board, &[ORDER, second], &settings)
            .unwrap();

    assert_eq!(packed_quantities(&store, ORDER), vec![dec(10), dec(10)]);
    assert_eq!(packed_quantities(&store, second), vec![dec(10), dec(10), dec(10)]);
    assert_eq!(board.batches(), 1);

    let kinds: Vec<(ProductionOrderId, NoticeKind)> =
        board.notices().iter().map(|n| (n.order_id, n.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (ORDER, NoticeKind::Destruct),
            (second, NoticeKind::Update),
            (second, NoticeKind::Added),
        ]
    );
    assert!(board
        .notices()
        .iter()
        .all(|n| n.activity_type == 7 && n.user.as_deref() == Some("planner")));
    assert_eq!(report.outcome(second).unwrap().added.len(), 1);
}

#[test]
fn test_sale_order_attribution_scenario() {
    let mut store = new_store();
    store.add_production_order(
        ProductionOrder::new(ORDER, "MO/00001".to_string(), PRODUCT, dec(25))
            .with_packaging(carton(10))
            .with_state(ProductionState::Progress)
            .with_sale_order_lines(vec![
                SaleOrderAllocationLine::new(1, "SO-A".to_string(), dec(15)),
                SaleOrderAllocationLine::new(2, "SO-B".to_string(), dec(10)),
            ]),
    );
    store.add_finished_move(FinishedMove::new(MoveId(1), ORDER, PRODUCT).with_packaging(carton(10)));
    store.add_move_line(NewMoveLine::new(MoveId(1), Some(ORDER), PRODUCT, dec(25)).with_qty_done(dec(25)));

    PackageAllocator::put_in_pack(&mut store, ORDER, &PackagingSettings::default()).unwrap();

    let owners: Vec<(String, Decimal)> = OrderInspector::related_packages(&store, ORDER)
        .unwrap()
        .iter()
        .map(|p| {
            let attribution = AllocationReporter::linked_sale_order(&store, p.id)
                .unwrap()
                .unwrap();
            (attribution.sale_order, attribution.quantity)
        })
        .collect();
    assert_eq!(
        owners,
        vec![
            ("SO-A".to_string(), dec(10)),
            ("SO-A".to_string(), dec(5)),
            ("SO-B".to_string(), dec(5)),
        ]
    );
}

#[test]
fn test_mark_done_cleanup_only_touches_unpacked_orders() {
    let mut store = packed_store(12, 5);
    let unpacked = ProductionOrderId(2);
    seed_order(&mut store, unpacked, MoveId(2), 8, 5);

    let removed = OrderInspector::prepare_mark_done(&mut store, &[ORDER, unpacked]).unwrap();

    assert_eq!(removed, 1);
    assert!(store.lines_of(unpacked).is_empty());
    assert_eq!(packed_quantities(&store, ORDER), vec![dec(5), dec(5), dec(2)]);
}

#[test]
fn test_put_in_pack_with_zero_capacity_fails() {
    let mut store = new_store();
    seed_order(&mut store, ORDER, MoveId(1), 10, 0);

    let result = PackageAllocator::put_in_pack(&mut store, ORDER, &PackagingSettings::default());

    assert!(matches!(result, Err(PackError::Division(_))));
    assert!(!OrderInspector::has_packages(&store, ORDER).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// 數量 = k × 容量 + r 時，產生 k 個整箱與（r > 0 時）一個零頭箱
    #[test]
    fn split_yields_full_packages_and_remainder(qty in 1i64..500, capacity in 1i64..50) {
        let store = packed_store(qty, capacity);
        let quantities = packed_quantities(&store, ORDER);

        let full = (qty / capacity) as usize;
        let remainder = qty % capacity;
        let mut expected = vec![dec(capacity); full];
        if remainder > 0 {
            expected.push(dec(remainder));
        }
        prop_assert_eq!(&quantities, &expected);
        prop_assert_eq!(quantities.iter().sum::<Decimal>(), dec(qty));
    }

    /// 增加後再減少相同數量，包裹恢復原狀
    #[test]
    fn increase_then_decrease_restores_packages(
        qty in 1i64..200,
        capacity in 1i64..30,
        delta in 1i64..100,
    ) {
        let mut store = packed_store(qty, capacity);
        let original = packed_quantities(&store, ORDER);
        let mut board = InMemoryNoticeBoard::new();

        store.set_qty_producing(ORDER, dec(qty + delta)).unwrap();
        refresh(&mut store, &mut board);
        prop_assert_eq!(packed_quantities(&store, ORDER).iter().sum::<Decimal>(), dec(qty + delta));

        store.set_qty_producing(ORDER, dec(qty)).unwrap();
        refresh(&mut store, &mut board);
        prop_assert_eq!(packed_quantities(&store, ORDER), original);
    }

    /// 連續執行兩次調整，第二次沒有任何異動
    #[test]
    fn refresh_is_idempotent(qty in 1i64..200, capacity in 1i64..30, target in 1i64..300) {
        let mut store = packed_store(qty, capacity);
        let mut board = InMemoryNoticeBoard::new();
        store.set_qty_producing(ORDER, dec(target)).unwrap();

        refresh(&mut store, &mut board);
        let after_first = packed_quantities(&store, ORDER);
        let second = refresh(&mut store, &mut board);

        prop_assert!(second.is_noop());
        prop_assert_eq!(packed_quantities(&store, ORDER), after_first);
        prop_assert_eq!(packed_quantities(&store, ORDER).iter().sum::<Decimal>(), dec(target));
    }

    /// 包裹序號依建立順序嚴格遞增
    #[test]
    fn sequence_in_production_is_monotonic(qty in 1i64..200, capacity in 1i64..30) {
        let store = packed_store(qty, capacity);
        let packages = OrderInspector::related_packages(&store, ORDER).unwrap();

        let sequences: Vec<usize> = packages
            .iter()
            .map(|p| AllocationReporter::sequence_in_production(&store, p.id).unwrap())
            .collect();
        let expected: Vec<usize> = (1..=packages.len()).collect();
        prop_assert_eq!(sequences, expected);
    }
}
