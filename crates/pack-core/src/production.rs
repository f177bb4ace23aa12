//! 製造工單模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::package::Packaging;
use crate::quantity::Precision;
use crate::Result;

/// 製造工單ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductionOrderId(pub u64);

impl fmt::Display for ProductionOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MO#{}", self.0)
    }
}

/// 庫存移動ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub u64);

/// 產品ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

/// 製造工單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionState {
    /// 草稿
    Draft,
    /// 已確認
    Confirmed,
    /// 生產中
    Progress,
    /// 待關閉
    ToClose,
    /// 完成
    Done,
    /// 取消
    Cancel,
}

impl ProductionState {
    /// 草稿、完成或取消狀態不允許裝箱
    pub fn forbids_packing(&self) -> bool {
        matches!(self, Self::Draft | Self::Done | Self::Cancel)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Done | Self::Cancel)
    }
}

/// 庫存移動/移動明細狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveState {
    /// 等待預留
    Confirmed,
    /// 已預留
    Assigned,
    /// 完成
    Done,
    /// 取消
    Cancel,
}

/// 作業類型代碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickingTypeCode {
    /// 收貨
    Incoming,
    /// 出貨
    Outgoing,
    /// 內部調撥
    Internal,
    /// 製造作業
    MrpOperation,
}

/// 產品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// 客戶（專屬產品）
    pub partner: Option<String>,
    /// 計量單位捨入單位
    pub uom_rounding: Decimal,
}

impl Product {
    pub fn new(id: ProductId, name: String) -> Self {
        Self {
            id,
            name,
            partner: None,
            uom_rounding: Decimal::new(1, 2),
        }
    }

    /// 建構器模式：設置客戶
    pub fn with_partner(mut self, partner: String) -> Self {
        self.partner = Some(partner);
        self
    }

    /// 建構器模式：設置捨入單位
    pub fn with_uom_rounding(mut self, rounding: Decimal) -> Self {
        self.uom_rounding = rounding;
        self
    }
}

/// 銷售訂單分配明細（銷售訂單對工單產出的需求）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleOrderAllocationLine {
    pub id: u64,
    /// 銷售訂單號
    pub sale_order: String,
    /// 分配的生產數量
    pub qty_producing_allocated: Decimal,
}

impl SaleOrderAllocationLine {
    pub fn new(id: u64, sale_order: String, qty_producing_allocated: Decimal) -> Self {
        Self {
            id,
            sale_order,
            qty_producing_allocated,
        }
    }
}

/// 完工移動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedMove {
    pub id: MoveId,
    pub production_id: ProductionOrderId,
    pub product_id: ProductId,
    /// 移動指定的包裝
    pub packaging: Option<Packaging>,
    pub state: MoveState,
}

impl FinishedMove {
    pub fn new(id: MoveId, production_id: ProductionOrderId, product_id: ProductId) -> Self {
        Self {
            id,
            production_id,
            product_id,
            packaging: None,
            state: MoveState::Confirmed,
        }
    }

    /// 建構器模式：設置包裝
    pub fn with_packaging(mut self, packaging: Packaging) -> Self {
        self.packaging = Some(packaging);
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_state(mut self, state: MoveState) -> Self {
        self.state = state;
        self
    }
}

/// 製造工單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: ProductionOrderId,

    /// 工單號
    pub name: String,

    /// 成品
    pub product_id: ProductId,

    /// 成品計量單位捨入單位
    pub uom_rounding: Decimal,

    pub state: ProductionState,

    /// 本次生產數量
    pub qty_producing: Decimal,

    /// 自動分配使用的包裝（每張工單至多一種）
    pub packaging: Option<Packaging>,

    /// 作業類型
    pub picking_type: PickingTypeCode,

    /// 生產批號
    pub lot_producing: Option<String>,

    /// 印前打樣參考
    pub prepress_proof: Option<String>,

    /// 銷售訂單分配明細（未啟用銷售連結時為 None）
    pub sale_order_lines: Option<Vec<SaleOrderAllocationLine>>,
}

impl ProductionOrder {
    /// 創建新的製造工單（已確認狀態）
    pub fn new(
        id: ProductionOrderId,
        name: String,
        product_id: ProductId,
        qty_producing: Decimal,
    ) -> Self {
        Self {
            id,
            name,
            product_id,
            uom_rounding: Decimal::new(1, 2),
            state: ProductionState::Confirmed,
            qty_producing,
            packaging: None,
            picking_type: PickingTypeCode::MrpOperation,
            lot_producing: None,
            prepress_proof: None,
            sale_order_lines: None,
        }
    }

    /// 建構器模式：設置包裝
    pub fn with_packaging(mut self, packaging: Packaging) -> Self {
        self.packaging = Some(packaging);
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_state(mut self, state: ProductionState) -> Self {
        self.state = state;
        self
    }

    /// 建構器模式：設置捨入單位
    pub fn with_uom_rounding(mut self, rounding: Decimal) -> Self {
        self.uom_rounding = rounding;
        self
    }

    /// 建構器模式：設置作業類型
    pub fn with_picking_type(mut self, picking_type: PickingTypeCode) -> Self {
        self.picking_type = picking_type;
        self
    }

    /// 建構器模式：設置生產批號
    pub fn with_lot_producing(mut self, lot: String) -> Self {
        self.lot_producing = Some(lot);
        self
    }

    /// 建構器模式：設置印前打樣
    pub fn with_prepress_proof(mut self, proof: String) -> Self {
        self.prepress_proof = Some(proof);
        self
    }

    /// 建構器模式：設置銷售訂單分配
    pub fn with_sale_order_lines(mut self, lines: Vec<SaleOrderAllocationLine>) -> Self {
        self.sale_order_lines = Some(lines);
        self
    }

    /// 每箱數量（未設包裝時為零）
    pub fn qty_by_packaging(&self) -> Decimal {
        self.packaging
            .as_ref()
            .map(|p| p.qty)
            .unwrap_or(Decimal::ZERO)
    }

    /// 成品數量精度
    pub fn precision(&self) -> Result<Precision> {
        Precision::new(self.uom_rounding)
    }

    /// 已連結的銷售訂單分配（空列表視同未連結）
    pub fn linked_sale_orders(&self) -> Option<&[SaleOrderAllocationLine]> {
        self.sale_order_lines
            .as_deref()
            .filter(|lines| !lines.is_empty())
    }
}
