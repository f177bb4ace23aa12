//! 包裝分配設定

use serde::{Deserialize, Serialize};

use crate::quantity::Precision;
use crate::{PackError, Result};

/// 數量小數位數上限（保留足夠整數位數給實際數量）
pub const MAX_UOM_PRECISION_DIGITS: u32 = 12;

/// 包裝分配全域設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagingSettings {
    /// 「產品計量單位」小數位數（拆分時判斷完成數量是否為零）
    pub uom_precision_digits: u32,

    /// 提醒活動類型ID
    pub notice_activity_type: u32,

    /// 提醒負責人
    pub notice_user: Option<String>,
}

impl Default for PackagingSettings {
    fn default() -> Self {
        Self {
            uom_precision_digits: 2,
            notice_activity_type: 4,
            notice_user: None,
        }
    }
}

impl PackagingSettings {
    /// 創建預設設定
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入設定，缺少的欄位使用預設值
    ///
    /// # 範例
    /// ```
    /// # use pack_core::PackagingSettings;
    /// let settings = PackagingSettings::from_json_str(r#"{"uom_precision_digits": 3}"#).unwrap();
    /// assert_eq!(settings.uom_precision_digits, 3);
    /// assert_eq!(settings.notice_activity_type, 4);
    /// ```
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(raw)
            .map_err(|e| PackError::Config(format!("設定解析失敗: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// 建構器模式：設置小數位數
    pub fn with_uom_precision_digits(mut self, digits: u32) -> Self {
        self.uom_precision_digits = digits;
        self
    }

    /// 建構器模式：設置提醒活動類型
    pub fn with_notice_activity_type(mut self, activity_type: u32) -> Self {
        self.notice_activity_type = activity_type;
        self
    }

    /// 建構器模式：設置提醒負責人
    pub fn with_notice_user(mut self, user: String) -> Self {
        self.notice_user = Some(user);
        self
    }

    /// 檢查設定
    pub fn validate(&self) -> Result<()> {
        if self.uom_precision_digits > MAX_UOM_PRECISION_DIGITS {
            return Err(PackError::Config(format!(
                "小數位數超出範圍: {}",
                self.uom_precision_digits
            )));
        }
        Ok(())
    }

    /// 全域數量精度
    pub fn uom_precision(&self) -> Precision {
        Precision::from_digits(self.uom_precision_digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_default_settings() {
        let settings = PackagingSettings::new();

        assert_eq!(settings.uom_precision_digits, 2);
        assert_eq!(settings.notice_activity_type, 4);
        assert!(settings.notice_user.is_none());
        assert_eq!(settings.uom_precision().rounding(), Decimal::new(1, 2));
    }

    #[test]
    fn test_settings_builder() {
        let settings = PackagingSettings::new()
            .with_uom_precision_digits(3)
            .with_notice_activity_type(7)
            .with_notice_user("planner".to_string());

        assert_eq!(settings.uom_precision().rounding(), Decimal::new(1, 3));
        assert_eq!(settings.notice_activity_type, 7);
        assert_eq!(settings.notice_user, Some("planner".to_string()));
    }

    #[test]
    fn test_settings_from_json() {
        let settings =
            PackagingSettings::from_json_str(r#"{"notice_user": "warehouse"}"#).unwrap();
        assert_eq!(settings.uom_precision_digits, 2);
        assert_eq!(settings.notice_user, Some("warehouse".to_string()));

        assert!(PackagingSettings::from_json_str(r#"{"uom_precision_digits": 40}"#).is_err());
        assert!(PackagingSettings::from_json_str(r#"{"uom_precision_digits": 28}"#).is_err());
        assert!(PackagingSettings::from_json_str(r#"{"uom_precision_digits": 12}"#).is_ok());
        assert!(PackagingSettings::from_json_str("not json").is_err());
    }
}
