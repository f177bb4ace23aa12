//! 包裹異動提醒

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PackagingSettings;
use crate::production::ProductionOrderId;

/// 提醒類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    /// 包裹需銷毀
    Destruct,
    /// 包裹需更新
    Update,
    /// 已新增包裹
    Added,
}

impl NoticeKind {
    /// 提醒摘要
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Destruct => "Packages to destruct",
            Self::Update => "Packages to update",
            Self::Added => "Packages added",
        }
    }

    /// 提醒內容
    pub fn note(&self, package_names: &[String]) -> String {
        let names = package_names.join(",");
        match self {
            Self::Destruct => format!("The packages {} should be destructed", names),
            Self::Update => format!("The packages {} should be updated", names),
            Self::Added => format!("The packages {} have been added", names),
        }
    }
}

/// 排程提醒（交給外部活動排程器）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub order_id: ProductionOrderId,
    pub kind: NoticeKind,
    pub summary: String,
    pub note: String,
    pub activity_type: u32,
    pub user: Option<String>,
    pub planned_at: DateTime<Utc>,
}

impl Notice {
    /// 創建新的提醒
    pub fn new(
        order_id: ProductionOrderId,
        kind: NoticeKind,
        package_names: &[String],
        settings: &PackagingSettings,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            kind,
            summary: kind.summary().to_string(),
            note: kind.note(package_names),
            activity_type: settings.notice_activity_type,
            user: settings.notice_user.clone(),
            planned_at: Utc::now(),
        }
    }
}
