//! 包裹與包裝模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::move_line::MoveLineId;
use crate::{PackError, Result};

/// 包裹ID（依建立順序遞增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(pub u64);

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 包裹類型ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageTypeId(pub u64);

/// 包裝（每箱容量規格）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Packaging {
    /// 包裝名稱
    pub name: String,

    /// 每箱數量
    pub qty: Decimal,

    /// 包裹類型
    pub package_type: Option<PackageTypeId>,
}

impl Packaging {
    pub fn new(name: String, qty: Decimal) -> Self {
        Self {
            name,
            qty,
            package_type: None,
        }
    }

    /// 建構器模式：設置包裹類型
    pub fn with_package_type(mut self, package_type: PackageTypeId) -> Self {
        self.package_type = Some(package_type);
        self
    }

    /// 有效容量（必須大於零）
    pub fn capacity(&self) -> Result<Decimal> {
        if self.qty <= Decimal::ZERO {
            return Err(PackError::division(format!(
                "包裝 {} 的每箱數量為 {}",
                self.name, self.qty
            )));
        }
        Ok(self.qty)
    }
}

/// 包裹
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    /// 包裹名稱（由序號產生器指定）
    pub name: String,
    pub package_type: Option<PackageTypeId>,
}

/// 包裹層級（手動裝箱流程的分組記錄）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLevel {
    pub package_id: PackageId,
    pub move_line_id: MoveLineId,
}
