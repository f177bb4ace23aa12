//! 生產數量變動後的包裹調整
//!
//! 工單的生產數量與已裝箱的完成數量不一致時：
//! - 數量減少：由最新的包裹開始刪除，最後一個跨越差額的包裹縮減數量
//! - 數量增加：先補滿最後一個未滿的包裹，再依包裝容量新增包裹
//!
//! 批次內所有工單先完成規劃，再統一寫入，任何一張工單規劃失敗都不會留下部分異動。

use pack_core::{
    FinishedMoveLine, MoveLineOrder, MoveLineValues, Notice, NoticeKind, NoticeScheduler,
    PackError, PackageId, Packaging, PackagingSettings, PackagingStore, Precision,
    ProductionOrderId, StockReservation,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::order_status::OrderInspector;
use crate::splitter::PackagingSplitter;
use crate::{OrderRefreshOutcome, RefreshReport};

/// 單張工單的調整計畫
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshPlan {
    pub order_id: ProductionOrderId,

    /// 整筆刪除的明細（連同其包裹）
    pub remove: Vec<FinishedMoveLine>,

    /// 調整數量的明細與新數量
    pub update: Vec<(FinishedMoveLine, Decimal)>,

    /// 新增包裹的數量
    pub add: Vec<Decimal>,

    /// 新增明細的複製來源
    pub template: Option<FinishedMoveLine>,

    /// 新增包裹使用的包裝
    pub packaging: Option<Packaging>,
}

impl RefreshPlan {
    /// 創建空計畫
    pub fn new(order_id: ProductionOrderId) -> Self {
        Self {
            order_id,
            remove: Vec::new(),
            update: Vec::new(),
            add: Vec::new(),
            template: None,
            packaging: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.update.is_empty() && self.add.is_empty()
    }

    /// 計畫異動後的總數量變化
    pub fn quantity_delta(&self) -> Decimal {
        let removed: Decimal = self.remove.iter().map(|line| line.qty_done).sum();
        let updated: Decimal = self
            .update
            .iter()
            .map(|(line, qty)| *qty - line.qty_done)
            .sum();
        let added: Decimal = self.add.iter().sum();
        updated + added - removed
    }
}

/// 包裹調整器
pub struct PackageReconciler;

impl PackageReconciler {
    /// 規劃數量減少時的刪除與縮減
    ///
    /// `lines` 需依包裹ID遞減排序。
    pub fn plan_decrease(
        order_id: ProductionOrderId,
        lines: &[FinishedMoveLine],
        excess: Decimal,
        precision: Precision,
    ) -> RefreshPlan {
        let mut plan = RefreshPlan::new(order_id);
        let mut removed = Decimal::ZERO;

        for line in lines {
            removed += line.qty_done;
            match precision.compare(removed, excess) {
                Ordering::Equal => {
                    plan.remove.push(line.clone());
                    break;
                }
                Ordering::Less => plan.remove.push(line.clone()),
                Ordering::Greater => {
                    plan.update.push((line.clone(), removed - excess));
                    break;
                }
            }
        }
        plan
    }

    /// 規劃數量增加時的補滿與新增
    ///
    /// `last_line` 為包裹ID最大的已裝箱明細。
    pub fn plan_increase(
        order_id: ProductionOrderId,
        last_line: &FinishedMoveLine,
        deficit: Decimal,
        packaging: &Packaging,
        precision: Precision,
    ) -> pack_core::Result<RefreshPlan> {
        let capacity = packaging.capacity()?;
        let mut plan = RefreshPlan::new(order_id);
        let mut remaining = deficit;

        if precision.compare(last_line.qty_done, capacity) == Ordering::Less {
            let top_up = (capacity - last_line.qty_done).min(remaining);
            plan.update.push((last_line.clone(), last_line.qty_done + top_up));
            remaining -= top_up;
        }

        while precision.is_positive(remaining) {
            plan.add.push(remaining.min(capacity));
            remaining = (remaining - capacity).max(Decimal::ZERO);
        }

        if !plan.add.is_empty() {
            plan.template = Some(last_line.clone());
            plan.packaging = Some(packaging.clone());
        }
        Ok(plan)
    }

    /// 規劃單張工單的調整（不寫入）
    pub fn plan_refresh<S: PackagingStore>(
        store: &S,
        order_id: ProductionOrderId,
    ) -> pack_core::Result<RefreshPlan> {
        if !OrderInspector::has_packages(store, order_id)? {
            return Ok(RefreshPlan::new(order_id));
        }
        let order = store.production_order(order_id)?;
        let precision = order.precision()?;
        let done = OrderInspector::product_quantity_done(store, &order)?;

        match precision.compare(order.qty_producing, done) {
            Ordering::Equal => Ok(RefreshPlan::new(order_id)),
            Ordering::Less => {
                let lines = OrderInspector::packed_move_lines(
                    store,
                    order_id,
                    MoveLineOrder::PackageDesc,
                    None,
                )?;
                Ok(Self::plan_decrease(
                    order_id,
                    &lines,
                    done - order.qty_producing,
                    precision,
                ))
            }
            Ordering::Greater => {
                let packaging = order.packaging.as_ref().ok_or_else(|| {
                    PackError::precondition(format!("工單 {} 未指定包裝，無法新增包裹", order.name))
                })?;
                let lines = OrderInspector::packed_move_lines(
                    store,
                    order_id,
                    MoveLineOrder::PackageDesc,
                    Some(1),
                )?;
                let last_line = lines.first().ok_or_else(|| {
                    PackError::precondition(format!("工單 {} 沒有已裝箱明細", order.name))
                })?;
                Self::plan_increase(
                    order_id,
                    last_line,
                    order.qty_producing - done,
                    packaging,
                    precision,
                )
            }
        }
    }

    /// 依生產數量調整一批工單的包裹
    ///
    /// 完成後重新預留完工移動，並以單次呼叫排程所有提醒。
    pub fn refresh_packages<S, N>(
        store: &mut S,
        notifier: &mut N,
        order_ids: &[ProductionOrderId],
        settings: &PackagingSettings,
    ) -> pack_core::Result<RefreshReport>
    where
        S: PackagingStore + StockReservation,
        N: NoticeScheduler,
    {
        // 同一工單只規劃一次，保持首次出現的順序
        let mut unique_ids: Vec<ProductionOrderId> = Vec::with_capacity(order_ids.len());
        for &order_id in order_ids {
            if !unique_ids.contains(&order_id) {
                unique_ids.push(order_id);
            }
        }
        let order_ids = unique_ids.as_slice();

        let plans = order_ids
            .iter()
            .map(|&order_id| Self::plan_refresh(store, order_id))
            .collect::<pack_core::Result<Vec<_>>>()?;

        let mut outcomes = Vec::with_capacity(plans.len());
        for plan in &plans {
            outcomes.push(Self::describe_and_add(store, plan)?);
        }

        let line_ids: Vec<_> = plans
            .iter()
            .flat_map(|plan| plan.remove.iter().map(|line| line.id))
            .collect();
        let mut package_ids: Vec<PackageId> = plans
            .iter()
            .flat_map(|plan| plan.remove.iter().filter_map(|line| line.result_package))
            .collect();
        package_ids.sort();
        package_ids.dedup();
        store.unlink_move_lines(&line_ids)?;
        store.unlink_packages(&package_ids)?;

        for (line, qty) in plans.iter().flat_map(|plan| plan.update.iter()) {
            store.write_move_line(line.id, &MoveLineValues::new().with_quantities(*qty))?;
        }

        let mut move_ids = Vec::new();
        for &order_id in order_ids {
            move_ids.extend(OrderInspector::finished_move_ids(store, order_id)?);
        }
        store.reassign_reservations(&move_ids)?;

        let notices = Self::build_notices(&outcomes, settings);
        let notices_scheduled = notices.len();
        if !notices.is_empty() {
            notifier.schedule_notices(notices)?;
        }

        tracing::info!(
            "包裹調整完成：工單 {} 張，刪除明細 {} 筆，提醒 {} 則",
            order_ids.len(),
            line_ids.len(),
            notices_scheduled
        );

        Ok(RefreshReport {
            outcomes,
            notices_scheduled,
        })
    }

    /// 記錄包裹名稱並建立新增的包裹
    fn describe_and_add<S: PackagingStore>(
        store: &mut S,
        plan: &RefreshPlan,
    ) -> pack_core::Result<OrderRefreshOutcome> {
        let mut outcome = OrderRefreshOutcome::new(plan.order_id);
        if plan.is_empty() {
            return Ok(outcome);
        }

        if let (Some(template), Some(packaging)) = (&plan.template, &plan.packaging) {
            for qty in &plan.add {
                let line = store.copy_move_line(
                    template,
                    &MoveLineValues::new()
                        .with_quantities(*qty)
                        .with_move(template.move_id)
                        .with_result_package(None),
                )?;
                let package = PackagingSplitter::pack_move_line(store, &line, packaging)?;
                outcome.added.push(package.name);
            }
        }

        outcome.removed = Self::package_names(store, plan.remove.iter())?;
        outcome.updated = Self::package_names(store, plan.update.iter().map(|(line, _)| line))?;

        tracing::debug!(
            "工單 {} 調整：刪除 {:?}，更新 {:?}，新增 {:?}",
            plan.order_id,
            outcome.removed,
            outcome.updated,
            outcome.added
        );
        Ok(outcome)
    }

    fn package_names<'a, S, I>(store: &S, lines: I) -> pack_core::Result<Vec<String>>
    where
        S: PackagingStore,
        I: Iterator<Item = &'a FinishedMoveLine>,
    {
        let mut names: Vec<String> = Vec::new();
        for package_id in lines.filter_map(|line| line.result_package) {
            let name = store.package(package_id)?.name;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// 依工單與類別產生提醒：刪除、更新、新增
    fn build_notices(outcomes: &[OrderRefreshOutcome], settings: &PackagingSettings) -> Vec<Notice> {
        let mut notices = Vec::new();
        for outcome in outcomes {
            for (kind, names) in [
                (NoticeKind::Destruct, &outcome.removed),
                (NoticeKind::Update, &outcome.updated),
                (NoticeKind::Added, &outcome.added),
            ] {
                if !names.is_empty() {
                    notices.push(Notice::new(outcome.order_id, kind, names, settings));
                }
            }
        }
        notices
    }
}
