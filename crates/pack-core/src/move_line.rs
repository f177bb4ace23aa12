//! 完工移動明細模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::package::PackageId;
use crate::production::{MoveId, MoveState, ProductId, ProductionOrderId};

/// 移動明細ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveLineId(pub u64);

impl fmt::Display for MoveLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 完工移動明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedMoveLine {
    pub id: MoveLineId,

    /// 所屬移動
    pub move_id: MoveId,

    /// 所屬工單（經由移動取得）
    pub production_id: Option<ProductionOrderId>,

    pub product_id: ProductId,

    /// 完成數量
    pub qty_done: Decimal,

    /// 預留（計劃）數量
    pub planned_qty: Decimal,

    /// 目的包裹
    pub result_package: Option<PackageId>,

    pub lot_id: Option<String>,
    pub lot_name: Option<String>,

    pub state: MoveState,
}

impl FinishedMoveLine {
    /// 是否已裝箱
    pub fn is_packed(&self) -> bool {
        self.result_package.is_some()
    }

    pub fn is_assigned(&self) -> bool {
        self.state == MoveState::Assigned
    }

    /// 套用欄位變更
    pub fn apply(&mut self, values: &MoveLineValues) {
        if let Some(planned_qty) = values.planned_qty {
            self.planned_qty = planned_qty;
        }
        if let Some(qty_done) = values.qty_done {
            self.qty_done = qty_done;
        }
        if let Some(package) = values.result_package {
            self.result_package = package;
        }
        if let Some(lot_id) = &values.lot_id {
            self.lot_id = lot_id.clone();
        }
        if let Some(lot_name) = &values.lot_name {
            self.lot_name = lot_name.clone();
        }
        if let Some(move_id) = values.move_id {
            self.move_id = move_id;
        }
        if let Some(state) = values.state {
            self.state = state;
        }
    }
}

/// 新建移動明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMoveLine {
    pub move_id: MoveId,
    pub production_id: Option<ProductionOrderId>,
    pub product_id: ProductId,
    pub qty_done: Decimal,
    pub planned_qty: Decimal,
    pub lot_id: Option<String>,
    pub lot_name: Option<String>,
    pub state: MoveState,
}

impl NewMoveLine {
    pub fn new(
        move_id: MoveId,
        production_id: Option<ProductionOrderId>,
        product_id: ProductId,
        planned_qty: Decimal,
    ) -> Self {
        Self {
            move_id,
            production_id,
            product_id,
            qty_done: Decimal::ZERO,
            planned_qty,
            lot_id: None,
            lot_name: None,
            state: MoveState::Assigned,
        }
    }

    /// 建構器模式：設置完成數量
    pub fn with_qty_done(mut self, qty_done: Decimal) -> Self {
        self.qty_done = qty_done;
        self
    }

    /// 建構器模式：設置批號
    pub fn with_lot(mut self, lot_id: Option<String>, lot_name: Option<String>) -> Self {
        self.lot_id = lot_id;
        self.lot_name = lot_name;
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_state(mut self, state: MoveState) -> Self {
        self.state = state;
        self
    }

    /// 以指定ID實體化
    pub fn into_line(self, id: MoveLineId) -> FinishedMoveLine {
        FinishedMoveLine {
            id,
            move_id: self.move_id,
            production_id: self.production_id,
            product_id: self.product_id,
            qty_done: self.qty_done,
            planned_qty: self.planned_qty,
            result_package: None,
            lot_id: self.lot_id,
            lot_name: self.lot_name,
            state: self.state,
        }
    }
}

/// 移動明細欄位變更（None 表示不變更）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveLineValues {
    pub planned_qty: Option<Decimal>,
    pub qty_done: Option<Decimal>,
    pub result_package: Option<Option<PackageId>>,
    pub lot_id: Option<Option<String>>,
    pub lot_name: Option<Option<String>>,
    pub move_id: Option<MoveId>,
    pub state: Option<MoveState>,
}

impl MoveLineValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_planned_qty(mut self, qty: Decimal) -> Self {
        self.planned_qty = Some(qty);
        self
    }

    pub fn with_qty_done(mut self, qty: Decimal) -> Self {
        self.qty_done = Some(qty);
        self
    }

    /// 同時設置完成數量與預留數量
    pub fn with_quantities(self, qty: Decimal) -> Self {
        self.with_qty_done(qty).with_planned_qty(qty)
    }

    pub fn with_result_package(mut self, package: Option<PackageId>) -> Self {
        self.result_package = Some(package);
        self
    }

    /// 清除批號
    pub fn clear_lot(mut self) -> Self {
        self.lot_id = Some(None);
        self.lot_name = Some(None);
        self
    }

    pub fn with_move(mut self, move_id: MoveId) -> Self {
        self.move_id = Some(move_id);
        self
    }

    pub fn with_state(mut self, state: MoveState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
