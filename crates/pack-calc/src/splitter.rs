//! 依包裝拆分明細並裝箱

use pack_core::{
    FinishedMoveLine, MoveLineValues, Package, PackageLevel, PackError, Packaging,
    PackagingSettings, PackagingStore, PickingTypeCode, Precision, ProductionOrder,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// 包裝拆分器
pub struct PackagingSplitter;

impl PackagingSplitter {
    /// 依包裝裝箱
    ///
    /// 候選明細依其移動的包裝分組，每組先把部分完成的明細拆成
    /// 「已完成」與「剩餘待做」兩筆，再把已完成的數量切成整箱與零頭，
    /// 每一單位各建一個包裹。返回依建立順序排列的包裹。
    pub fn put_in_pack<S: PackagingStore>(
        store: &mut S,
        order: &ProductionOrder,
        move_lines: &[FinishedMoveLine],
        settings: &PackagingSettings,
        create_package_level: bool,
    ) -> pack_core::Result<Vec<Package>> {
        tracing::info!(
            "開始依包裝裝箱：工單 {}，候選明細 {} 筆",
            order.name,
            move_lines.len()
        );

        let groups = Self::group_by_packaging(store, move_lines)?;
        // 任何寫入前先確認容量
        for (packaging, _) in &groups {
            packaging.capacity()?;
        }

        let global_precision = settings.uom_precision();
        let precision = order.precision()?;

        // Step 1: 部分完成的明細先拆出已完成的部分
        let mut units_by_packaging = Vec::with_capacity(groups.len());
        for (packaging, lines) in groups {
            let mut units = Vec::with_capacity(lines.len());
            for line in lines {
                units.push(Self::prepare_unit(
                    store,
                    order,
                    line,
                    global_precision,
                    precision,
                )?);
            }
            units_by_packaging.push((packaging, units));
        }

        // Step 2: 每個單位切成整箱與零頭
        let mut packages = Vec::new();
        for (packaging, units) in &units_by_packaging {
            tracing::debug!("包裝 {}：待裝箱單位 {} 筆", packaging.name, units.len());
            for unit in units {
                packages.extend(Self::split_unit(
                    store,
                    unit,
                    packaging,
                    precision,
                    create_package_level,
                )?);
            }
        }

        tracing::info!("工單 {} 裝箱完成，建立包裹 {} 個", order.name, packages.len());
        Ok(packages)
    }

    /// 建立包裹並指定給明細
    pub fn pack_move_line<S: PackagingStore>(
        store: &mut S,
        line: &FinishedMoveLine,
        packaging: &Packaging,
    ) -> pack_core::Result<Package> {
        let package = store.create_package(packaging.package_type)?;
        store.write_move_line(
            line.id,
            &MoveLineValues::new().with_result_package(Some(package.id)),
        )?;
        tracing::debug!(
            "明細 {} 裝入包裹 {}（數量 {}）",
            line.id,
            package.name,
            line.qty_done
        );
        Ok(package)
    }

    /// 依移動包裝分組，保持首次出現的順序
    fn group_by_packaging<S: PackagingStore>(
        store: &S,
        move_lines: &[FinishedMoveLine],
    ) -> pack_core::Result<Vec<(Packaging, Vec<FinishedMoveLine>)>> {
        let mut groups: Vec<(Packaging, Vec<FinishedMoveLine>)> = Vec::new();
        for line in move_lines {
            let packaging = store
                .finished_move(line.move_id)?
                .packaging
                .ok_or_else(|| {
                    PackError::missing_packaging(format!(
                        "明細 {} 所屬移動未指定包裝",
                        line.id
                    ))
                })?;
            match groups.iter_mut().find(|(p, _)| *p == packaging) {
                Some((_, lines)) => lines.push(line.clone()),
                None => groups.push((packaging, vec![line.clone()])),
            }
        }
        Ok(groups)
    }

    /// 準備可裝箱單位
    ///
    /// 完成數量為零視為全數完成；完成數量小於預留數量時，
    /// 複製出已完成的部分作為新單位，原明細保留剩餘待做數量。
    fn prepare_unit<S: PackagingStore>(
        store: &mut S,
        order: &ProductionOrder,
        mut line: FinishedMoveLine,
        global_precision: Precision,
        precision: Precision,
    ) -> pack_core::Result<FinishedMoveLine> {
        if global_precision.is_zero(line.qty_done) {
            line = store.write_move_line(
                line.id,
                &MoveLineValues::new().with_qty_done(line.planned_qty),
            )?;
        }

        if precision.compare(line.qty_done, line.planned_qty) != Ordering::Less {
            return Ok(line);
        }

        let leftover = precision.round_half_up(line.planned_qty - line.qty_done);
        let done_to_keep = line.qty_done;

        // 先以原明細快照複製，再改寫原明細
        let done_part = store.copy_move_line(
            &line,
            &MoveLineValues::new()
                .with_planned_qty(Decimal::ZERO)
                .with_qty_done(done_to_keep),
        )?;

        let mut values = MoveLineValues::new()
            .with_planned_qty(leftover)
            .with_qty_done(Decimal::ZERO);
        if order.picking_type == PickingTypeCode::Incoming {
            values = values.clear_lot();
        }
        store.write_move_line(line.id, &values)?;

        tracing::debug!(
            "明細 {} 拆分：已完成 {} 移至明細 {}，剩餘待做 {}",
            line.id,
            done_to_keep,
            done_part.id,
            leftover
        );

        store.write_move_line(
            done_part.id,
            &MoveLineValues::new().with_planned_qty(done_to_keep),
        )
    }

    /// 單位切成整箱與零頭
    fn split_unit<S: PackagingStore>(
        store: &mut S,
        unit: &FinishedMoveLine,
        packaging: &Packaging,
        precision: Precision,
        create_package_level: bool,
    ) -> pack_core::Result<Vec<Package>> {
        let capacity = packaging.capacity()?;
        let (full_packages, remainder) = Self::package_counts(unit.qty_done, capacity)?;
        let reserved = |qty: Decimal| if unit.is_assigned() { qty } else { Decimal::ZERO };

        let mut packages = Vec::new();

        // 不足一箱：原明細直接裝箱
        if full_packages == 0 {
            packages.push(Self::pack_unit(store, unit, packaging, create_package_level)?);
            return Ok(packages);
        }

        let full_values = MoveLineValues::new()
            .with_planned_qty(reserved(capacity))
            .with_qty_done(capacity);

        for _ in 1..full_packages {
            let copy = store.copy_move_line(
                unit,
                &full_values.clone().with_result_package(None),
            )?;
            packages.push(Self::pack_unit(store, &copy, packaging, create_package_level)?);
        }

        // 原明細保留一整箱
        let kept = store.write_move_line(unit.id, &full_values)?;
        packages.push(Self::pack_unit(store, &kept, packaging, create_package_level)?);

        if precision.is_zero(remainder) {
            if !remainder.is_zero() {
                tracing::debug!(
                    "明細 {} 零頭 {} 小於數量精度，不另建包裹",
                    unit.id,
                    remainder
                );
            }
        } else {
            let copy = store.copy_move_line(
                &kept,
                &MoveLineValues::new()
                    .with_planned_qty(reserved(remainder))
                    .with_qty_done(remainder)
                    .with_result_package(None),
            )?;
            packages.push(Self::pack_unit(store, &copy, packaging, create_package_level)?);
        }

        Ok(packages)
    }

    /// 整箱數與零頭
    pub fn package_counts(quantity: Decimal, capacity: Decimal) -> pack_core::Result<(u64, Decimal)> {
        if capacity <= Decimal::ZERO {
            return Err(PackError::division(format!("每箱數量為 {}", capacity)));
        }
        let overflow =
            || PackError::division(format!("數量 {} 無法以每箱 {} 切分", quantity, capacity));
        let full = quantity.checked_div(capacity).ok_or_else(overflow)?.floor();
        let full_packages = full.to_u64().ok_or_else(overflow)?;
        Ok((full_packages, quantity - full * capacity))
    }

    fn pack_unit<S: PackagingStore>(
        store: &mut S,
        line: &FinishedMoveLine,
        packaging: &Packaging,
        create_package_level: bool,
    ) -> pack_core::Result<Package> {
        let package = Self::pack_move_line(store, line, packaging)?;
        if create_package_level {
            store.create_package_level(PackageLevel {
                package_id: package.id,
                move_line_id: line.id,
            })?;
        }
        Ok(package)
    }
}
