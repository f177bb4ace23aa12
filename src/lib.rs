//! # MRP Pack
//!
//! 製造工單成品裝箱：依包裝容量拆分完工明細、生產數量變動後調整包裹、
//! 以及包裹對銷售訂單的歸屬查詢。

pub use pack_calc::*;
pub use pack_core::*;
