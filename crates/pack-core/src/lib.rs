//! # Pack Core
//!
//! 包裝分配核心資料模型、數量比較與外部協作介面

pub mod config;
pub mod memory;
pub mod move_line;
pub mod notice;
pub mod package;
pub mod production;
pub mod quantity;
pub mod store;

// Re-export 主要類型
pub use config::PackagingSettings;
pub use memory::{InMemoryNoticeBoard, InMemoryStore};
pub use move_line::{FinishedMoveLine, MoveLineId, MoveLineValues, NewMoveLine};
pub use notice::{Notice, NoticeKind};
pub use package::{Package, PackageId, PackageLevel, PackageTypeId, Packaging};
pub use production::{
    FinishedMove, MoveId, MoveState, PickingTypeCode, Product, ProductId, ProductionOrder,
    ProductionOrderId, ProductionState, SaleOrderAllocationLine,
};
pub use quantity::Precision;
pub use store::{
    MoveLineOrder, MoveLineQuery, NoticeScheduler, PackageFilter, PackagingStore,
    StockReservation,
};

/// 包裝分配錯誤類型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// 工單狀態不允許此操作
    #[error("工單狀態不允許此操作: {0}")]
    State(String),

    /// 前置條件不成立（缺少包裝、生產數量未指定、已有包裹）
    #[error("前置條件不成立: {0}")]
    Precondition(String),

    /// 候選明細所屬移動未指定包裝
    #[error("未偵測到包裝: {0}")]
    MissingPackaging(String),

    /// 過濾後沒有可裝箱的明細
    #[error("沒有可裝箱的完工數量: {0}")]
    NothingToPack(String),

    /// 包裝容量為零或負數
    #[error("包裝容量無效: {0}")]
    Division(String),

    /// 精度設定無效
    #[error("無效的數量精度: {0}")]
    InvalidPrecision(String),

    /// 設定錯誤
    #[error("設定錯誤: {0}")]
    Config(String),

    /// 找不到記錄
    #[error("找不到記錄: {0}")]
    NotFound(String),
}

impl PackError {
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn missing_packaging(msg: impl Into<String>) -> Self {
        Self::MissingPackaging(msg.into())
    }

    pub fn nothing_to_pack(msg: impl Into<String>) -> Self {
        Self::NothingToPack(msg.into())
    }

    pub fn division(msg: impl Into<String>) -> Self {
        Self::Division(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
