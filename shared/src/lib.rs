use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;

pub use date::Timestamp;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// LocalStorage 中持久化会话令牌的键
pub const STORAGE_TOKEN_KEY: &str = "lms_auth_token";

/// 网关转发函数的路径
pub const FN_COMMAND_PATH: &str = "/functions/auth";
pub const FN_SYNC_PATH: &str = "/functions/sync";

/// 增量同步查询参数名
pub const QUERY_SINCE: &str = "since";

/// 已关闭线索的状态值（活跃统计会排除它）
pub const STATUS_CLOSED: &str = "Closed";

pub const DEFAULT_APP_TITLE: &str = "LeadFlow India";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================
// 上游表格服务的列结构决定了字段集；线路格式统一为 camelCase。

/// 线索记录：联系方式 + 分类 + 归属 + 时间戳
///
/// `id` 在任何集合内唯一，由服务端分配。
/// 客户端只通过 store 动作修改线索，UI 不直接变更。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub location: String,
    pub interest: String,
    pub source: String,
    pub status: String,
    pub assigned_to: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Lead {
    /// 线索是否仍在跟进中
    pub fn is_active(&self) -> bool {
        self.status != STATUS_CLOSED
    }
}

/// 跟进活动记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub lead_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub assigned_to: String,
    pub created_at: String,
    pub updated_at: String,
    pub status: String,
}

/// 待办任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: String,
    pub lead_id: String,
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub due_date: String,
    pub status: String,
    pub priority: String,
    pub created_at: String,
    pub updated_at: String,
}

/// 后台用户（同步快照中的 users 切片）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
}

/// 操作日志条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub action: String,
    pub details: String,
    pub user_id: String,
    pub timestamp: String,
}

/// 意向选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 全局配置：下拉选项列表 + 展示标题
///
/// 读多写少，更新时整体替换而不是逐字段合并。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub task_titles: Vec<String>,
    #[serde(default)]
    pub app_title: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            sources: Vec::new(),
            task_titles: Vec::new(),
            app_title: DEFAULT_APP_TITLE.to_string(),
        }
    }
}

/// 当前登录用户的档案
///
/// `role` 是开放字符串，授权级别由上游决定，客户端不枚举。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_wire_format_is_camel_case() {
        let json = r#"{
            "id": "L-1",
            "name": "Asha",
            "phone": "98",
            "email": "a@x.in",
            "location": "Pune",
            "interest": "Solar",
            "source": "Web",
            "status": "New",
            "assignedTo": "ravi",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.assigned_to, "ravi");
        assert!(lead.notes.is_none());
        assert!(lead.is_active());

        let out = serde_json::to_value(&lead).unwrap();
        assert_eq!(out["assignedTo"], "ravi");
        // 空 notes 不上线路
        assert!(out.get("notes").is_none());
    }

    #[test]
    fn closed_lead_is_not_active() {
        let json = r#"{"id":"L-2","name":"n","phone":"p","email":"e",
            "location":"l","interest":"i","source":"s","status":"Closed",
            "assignedTo":"a","createdAt":"c","updatedAt":"u"}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert!(!lead.is_active());
    }

    #[test]
    fn settings_default_has_title_but_no_options() {
        let settings = AppSettings::default();
        assert_eq!(settings.app_title, DEFAULT_APP_TITLE);
        assert!(settings.locations.is_empty());
    }
}
