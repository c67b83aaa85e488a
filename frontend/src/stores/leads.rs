//! 线索 store
//!
//! 持有本地线索集合与最近一次同步时间。所有修改都走"服务端确认后
//! 落地"：没有乐观更新。同步采用完整快照对账 —— 服务端返回什么，
//! 本地集合就整体换成什么（见 [`LeadsState::settle_fetch`]）。

use crate::api::ApiClient;
use crate::stores::auth::ActionResult;
use leadflow_shared::protocol::{ApiResponse, Command, LeadDraft, LeadPatch, SyncData};
use leadflow_shared::{Lead, Timestamp};
use leptos::prelude::*;

/// 线索状态
#[derive(Clone, Default)]
pub struct LeadsState {
    pub leads: Vec<Lead>,
    /// 最近一次成功同步的时刻，作为下次增量查询的 `since`
    pub last_sync: Timestamp,
    pub is_loading: bool,
}

impl LeadsState {
    pub fn total_leads(&self) -> usize {
        self.leads.len()
    }

    pub fn active_leads(&self) -> usize {
        self.leads.iter().filter(|l| l.is_active()).count()
    }

    /// 最近七天创建的线索数
    ///
    /// `createdAt` 解析失败的记录不计入。
    pub fn new_this_week(&self, now: Timestamp) -> usize {
        let week_ago = now - std::time::Duration::from_secs(7 * 24 * 3600);
        self.leads
            .iter()
            .filter(|l| {
                Timestamp::parse_rfc3339(&l.created_at)
                    .map(|created| created > week_ago)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn lead_by_id(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    /// 落定同步响应 —— 完整快照对账策略
    ///
    /// 成功时本地集合被服务端返回的集合**整体替换**（不是合并）：
    /// 本地已知、但这次快照里没有的线索会被丢弃。这是有意为之的
    /// 策略，代价是并发编辑下可能丢数据。`last_sync` 推进到 `now`，
    /// 与快照内容无关。失败时两者都不动。
    pub fn settle_fetch(&mut self, resp: ApiResponse<SyncData>, now: Timestamp) -> ActionResult {
        match resp.into_result("Failed to fetch leads") {
            Ok(data) => {
                self.leads = data.leads;
                self.last_sync = now;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// 落定创建响应：成功则追加服务端分配好 id 的那条记录
    pub fn settle_create(&mut self, resp: ApiResponse<Lead>) -> Result<Lead, String> {
        match resp.into_result("Failed to create lead") {
            Ok(lead) => {
                self.leads.push(lead.clone());
                Ok(lead)
            }
            Err(e) => Err(e),
        }
    }

    /// 落定更新响应：按 id 合并服务端返回的记录
    ///
    /// 本地没有这个 id 时合并是空操作（远程调用已经发生了）。
    pub fn settle_update(&mut self, id: &str, resp: ApiResponse<Lead>) -> ActionResult {
        match resp.into_result("Failed to update lead") {
            Ok(updated) => {
                if let Some(slot) = self.leads.iter_mut().find(|l| l.id == id) {
                    *slot = updated;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// 落定删除响应：按 id 移除；本地没有时是空操作
    pub fn settle_delete(&mut self, id: &str, resp: ApiResponse<()>) -> ActionResult {
        if resp.success {
            self.leads.retain(|l| l.id != id);
            Ok(())
        } else {
            Err(resp
                .error
                .unwrap_or_else(|| "Failed to delete lead".to_string()))
        }
    }

    // --- 纯本地操作（不触发远程调用） ---

    pub fn add_lead(&mut self, lead: Lead) {
        self.leads.push(lead);
    }

    pub fn remove_lead(&mut self, id: &str) {
        self.leads.retain(|l| l.id != id);
    }

    /// 重置本地状态（例如注销时），下次同步从头拉全量
    pub fn clear_leads(&mut self) {
        self.leads.clear();
        self.last_sync = Timestamp::default();
    }
}

/// 线索上下文
#[derive(Clone, Copy)]
pub struct LeadsContext {
    pub state: ReadSignal<LeadsState>,
    pub set_state: WriteSignal<LeadsState>,
}

impl LeadsContext {
    pub fn new() -> Self {
        let (state, set_state) = signal(LeadsState::default());
        Self { state, set_state }
    }
}

impl Default for LeadsContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取线索上下文
pub fn use_leads() -> LeadsContext {
    use_context::<LeadsContext>().expect("LeadsContext should be provided")
}

/// 拉取同步快照并整体替换本地集合
pub async fn fetch_leads(ctx: &LeadsContext, api: &ApiClient) -> ActionResult {
    ctx.set_state.update(|s| s.is_loading = true);

    let since = ctx.state.get_untracked().last_sync;
    let resp = api.sync_data(since).await;

    let mut result = Err("Failed to fetch leads".to_string());
    ctx.set_state.update(|s| {
        result = s.settle_fetch(resp, Timestamp::now());
        s.is_loading = false;
    });
    result
}

/// 创建线索；id 与时间戳由服务端分配
pub async fn create_lead(
    ctx: &LeadsContext,
    api: &ApiClient,
    draft: LeadDraft,
) -> Result<Lead, String> {
    ctx.set_state.update(|s| s.is_loading = true);

    let resp: ApiResponse<Lead> = api.execute(&Command::CreateLead { lead: draft }).await;

    let mut result = Err("Failed to create lead".to_string());
    ctx.set_state.update(|s| {
        result = s.settle_create(resp);
        s.is_loading = false;
    });
    result
}

/// 按 id 更新线索
pub async fn update_lead(
    ctx: &LeadsContext,
    api: &ApiClient,
    id: &str,
    updates: LeadPatch,
) -> ActionResult {
    ctx.set_state.update(|s| s.is_loading = true);

    let resp: ApiResponse<Lead> = api
        .execute(&Command::UpdateLead {
            id: id.to_string(),
            updates,
        })
        .await;

    let mut result = Err("Failed to update lead".to_string());
    ctx.set_state.update(|s| {
        result = s.settle_update(id, resp);
        s.is_loading = false;
    });
    result
}

/// 按 id 删除线索
pub async fn delete_lead(ctx: &LeadsContext, api: &ApiClient, id: &str) -> ActionResult {
    ctx.set_state.update(|s| s.is_loading = true);

    let resp: ApiResponse<()> = api
        .execute(&Command::DeleteLead { id: id.to_string() })
        .await;

    let mut result = Err("Failed to delete lead".to_string());
    ctx.set_state.update(|s| {
        result = s.settle_delete(id, resp);
        s.is_loading = false;
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(id: &str, status: &str) -> Lead {
        Lead {
            id: id.to_string(),
            name: format!("Lead {}", id),
            phone: "99".to_string(),
            email: format!("{}@x.in", id),
            location: "Pune".to_string(),
            interest: "Solar".to_string(),
            source: "Web".to_string(),
            status: status.to_string(),
            assigned_to: "ravi".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            notes: None,
        }
    }

    fn snapshot(leads: Vec<Lead>) -> SyncData {
        SyncData {
            leads,
            ..SyncData::default()
        }
    }

    #[test]
    fn fetch_replaces_collection_instead_of_merging() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New"), lead("B", "New")];

        let now = Timestamp::new(1_000);
        state
            .settle_fetch(
                ApiResponse::ok(snapshot(vec![lead("A", "New"), lead("C", "New")])),
                now,
            )
            .unwrap();

        // 本地的 B 被丢弃，集合精确等于服务端返回
        let ids: Vec<&str> = state.leads.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(state.last_sync, now);
    }

    #[test]
    fn fetch_advances_last_sync_even_for_empty_snapshot() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New")];

        let now = Timestamp::new(2_000);
        state
            .settle_fetch(ApiResponse::ok(snapshot(Vec::new())), now)
            .unwrap();

        assert!(state.leads.is_empty());
        assert_eq!(state.last_sync, now);
    }

    #[test]
    fn failed_fetch_leaves_state_untouched() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New")];
        let before_sync = state.last_sync;

        let result = state.settle_fetch(ApiResponse::fail("offline"), Timestamp::new(3_000));

        assert_eq!(result.unwrap_err(), "offline");
        assert_eq!(state.total_leads(), 1);
        assert_eq!(state.last_sync, before_sync);
    }

    #[test]
    fn create_appends_exactly_one_server_assigned_record() {
        let mut state = LeadsState::default();

        let created = state.settle_create(ApiResponse::ok(lead("SRV-9", "New"))).unwrap();

        assert_eq!(created.id, "SRV-9");
        assert_eq!(state.total_leads(), 1);
        assert_eq!(state.leads[0].id, "SRV-9");
    }

    #[test]
    fn failed_create_leaves_collection_unchanged() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New")];

        let result = state.settle_create(ApiResponse::fail("quota"));

        assert_eq!(result.unwrap_err(), "quota");
        assert_eq!(state.total_leads(), 1);
    }

    #[test]
    fn update_merges_by_id() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New"), lead("B", "New")];

        state
            .settle_update("B", ApiResponse::ok(lead("B", "Contacted")))
            .unwrap();

        assert_eq!(state.lead_by_id("B").unwrap().status, "Contacted");
        assert_eq!(state.lead_by_id("A").unwrap().status, "New");
    }

    #[test]
    fn update_of_locally_absent_id_is_a_noop() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New")];

        let result = state.settle_update("GHOST", ApiResponse::ok(lead("GHOST", "Contacted")));

        assert!(result.is_ok());
        assert_eq!(state.total_leads(), 1);
        assert!(state.lead_by_id("GHOST").is_none());
    }

    #[test]
    fn delete_removes_by_id_and_tolerates_absent_id() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New"), lead("B", "New")];

        state.settle_delete("A", ApiResponse::ok(())).unwrap();
        assert_eq!(state.total_leads(), 1);

        // 本地不存在的 id：远程调用已发生，本地无事发生
        state.settle_delete("GHOST", ApiResponse::ok(())).unwrap();
        assert_eq!(state.total_leads(), 1);
    }

    #[test]
    fn failed_delete_keeps_record() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New")];

        let result = state.settle_delete("A", ApiResponse::<()>::fail("denied"));

        assert!(result.is_err());
        assert_eq!(state.total_leads(), 1);
    }

    #[test]
    fn clear_resets_collection_and_sync_cursor() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New")];
        state.last_sync = Timestamp::new(9_000);

        state.clear_leads();

        assert!(state.leads.is_empty());
        assert!(state.last_sync.is_epoch());
    }

    #[test]
    fn local_only_mutators_do_not_touch_sync_cursor() {
        let mut state = LeadsState::default();
        state.last_sync = Timestamp::new(5_000);

        state.add_lead(lead("A", "New"));
        assert_eq!(state.total_leads(), 1);

        state.remove_lead("A");
        assert!(state.leads.is_empty());
        assert_eq!(state.last_sync, Timestamp::new(5_000));
    }

    #[test]
    fn active_leads_excludes_closed() {
        let mut state = LeadsState::default();
        state.leads = vec![lead("A", "New"), lead("B", "Closed"), lead("C", "Contacted")];
        assert_eq!(state.total_leads(), 3);
        assert_eq!(state.active_leads(), 2);
    }

    #[test]
    fn new_this_week_counts_recent_creations() {
        let mut state = LeadsState::default();
        let mut fresh = lead("A", "New");
        fresh.created_at = "2024-01-06T00:00:00Z".to_string();
        let mut old = lead("B", "New");
        old.created_at = "2023-12-01T00:00:00Z".to_string();
        let mut broken = lead("C", "New");
        broken.created_at = "yesterday-ish".to_string();
        state.leads = vec![fresh, old, broken];

        // 2024-01-08 作为"现在"
        let now = Timestamp::new(1_704_672_000_000);
        assert_eq!(state.new_this_week(now), 1);
    }
}
