//! 认证 store
//!
//! 状态机：匿名 → 登录中 → 已认证 → （注销/校验失败）回到匿名。
//! 会话生命周期的唯一属主：启动时从 [`SessionStore`] 恢复令牌，
//! 登录成功时写入，注销与校验失败时清除。

use crate::api::ApiClient;
use crate::session::SessionStore;
use leadflow_shared::AuthUser;
use leadflow_shared::protocol::{ApiResponse, Command, Credentials, LoginData, ProfileUpdate};
use leptos::prelude::*;

/// store 动作的统一返回：成功，或带文案的失败
pub type ActionResult = Result<(), String>;

/// 认证状态
#[derive(Clone, Default)]
pub struct AuthState {
    /// 当前用户档案（仅在认证成功后存在）
    pub user: Option<AuthUser>,
    /// 会话令牌（不透明字符串）
    pub token: Option<String>,
    /// 是否有动作在途
    pub is_loading: bool,
}

impl AuthState {
    /// 从持久化存储恢复初始状态
    ///
    /// 只恢复令牌；用户档案要等远程校验返回。
    pub fn restore<S: SessionStore>(session: &S) -> Self {
        Self {
            user: None,
            token: session.load(),
            is_loading: false,
        }
    }

    /// 已认证 = 令牌与用户档案同时存在
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// 持久化令牌是否存在（路由守卫只看这个）
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// 当前角色，未登录时归为 guest
    pub fn user_role(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.role.clone())
            .unwrap_or_else(|| "guest".to_string())
    }

    /// 落定登录响应
    ///
    /// 成功：写入用户与令牌并持久化。失败：不触碰既有会话状态。
    pub fn settle_login<S: SessionStore>(
        &mut self,
        session: &S,
        resp: ApiResponse<LoginData>,
    ) -> ActionResult {
        match resp.into_result("Login failed") {
            Ok(data) => {
                session.save(&data.token);
                self.token = Some(data.token);
                self.user = Some(data.user);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// 无条件清除会话：内存里的用户/令牌 + 持久化令牌
    pub fn clear_session<S: SessionStore>(&mut self, session: &S) {
        self.user = None;
        self.token = None;
        session.clear();
    }

    /// 落定令牌校验响应
    ///
    /// 校验失败和请求失败走同一条路：整体注销。客户端无法区分
    /// "令牌无效"与"校验请求没到达"，两者都清会话。
    pub fn settle_validation<S: SessionStore>(
        &mut self,
        session: &S,
        resp: ApiResponse<AuthUser>,
    ) -> bool {
        match resp.into_result("Token validation failed") {
            Ok(user) => {
                self.user = Some(user);
                true
            }
            Err(_) => {
                self.clear_session(session);
                false
            }
        }
    }

    /// 落定档案更新响应
    ///
    /// 前置条件：必须已有用户档案。没有会话时直接返回失败，
    /// 不做任何合并。
    pub fn settle_profile(&mut self, resp: ApiResponse<AuthUser>) -> ActionResult {
        if self.user.is_none() {
            return Err("No active session".to_string());
        }
        match resp.into_result("Profile update failed") {
            Ok(user) => {
                self.user = Some(user);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 认证状态（只读）
    pub state: ReadSignal<AuthState>,
    /// 设置认证状态（写入）
    pub set_state: WriteSignal<AuthState>,
}

impl AuthContext {
    /// 创建新的认证上下文，令牌从持久化存储播种
    pub fn new<S: SessionStore>(session: &S) -> Self {
        let (state, set_state) = signal(AuthState::restore(session));
        Self { state, set_state }
    }

    /// 令牌存在信号（注入路由守卫用）
    pub fn has_token_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get().has_token())
    }

    /// 完整认证信号（令牌 + 用户档案）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get().is_authenticated())
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录
///
/// 失败时返回失败结果且不改变会话状态；busy 标志在任何分支都会清掉。
pub async fn login<S: SessionStore>(
    ctx: &AuthContext,
    api: &ApiClient,
    session: &S,
    credentials: Credentials,
) -> ActionResult {
    ctx.set_state.update(|s| s.is_loading = true);

    let resp: ApiResponse<LoginData> = api.execute(&Command::Login { credentials }).await;

    let mut result = Err("Login failed".to_string());
    ctx.set_state.update(|s| {
        result = s.settle_login(session, resp);
        s.is_loading = false;
    });
    result
}

/// 注销
///
/// 无条件清除内存与持久化会话。这里不做导航 ——
/// 路由守卫会在下一次求值时把用户带去登录页。
pub fn logout<S: SessionStore>(ctx: &AuthContext, session: &S) {
    ctx.set_state.update(|s| s.clear_session(session));
}

/// 恢复会话
///
/// 有持久化令牌就先采用它，再远程校验；校验没通过（或请求失败）
/// 则整体注销。每次会话恢复都要走一次网络。
pub async fn check_auth<S: SessionStore>(ctx: &AuthContext, api: &ApiClient, session: &S) {
    let Some(token) = session.load() else {
        return;
    };

    ctx.set_state.update(|s| s.token = Some(token.clone()));

    let resp: ApiResponse<AuthUser> = api.execute(&Command::ValidateToken { token }).await;
    ctx.set_state.update(|s| {
        s.settle_validation(session, resp);
    });
}

/// 更新档案
///
/// 前置条件：会话必须已建立。合并只在上游确认成功后发生。
pub async fn update_profile(
    ctx: &AuthContext,
    api: &ApiClient,
    profile: ProfileUpdate,
) -> ActionResult {
    if ctx.state.get_untracked().user.is_none() {
        return Err("No active session".to_string());
    }

    ctx.set_state.update(|s| s.is_loading = true);

    let resp: ApiResponse<AuthUser> = api.execute(&Command::UpdateProfile { profile }).await;

    let mut result = Err("Profile update failed".to_string());
    ctx.set_state.update(|s| {
        result = s.settle_profile(resp);
        s.is_loading = false;
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;

    fn sample_user() -> AuthUser {
        AuthUser {
            id: "U-1".to_string(),
            name: "Ravi".to_string(),
            email: "ravi@leadflow.in".to_string(),
            picture: None,
            role: "manager".to_string(),
        }
    }

    fn login_data() -> LoginData {
        LoginData {
            user: sample_user(),
            token: "tok-123".to_string(),
        }
    }

    #[test]
    fn successful_login_persists_token_across_reload() {
        let session = MemorySession::default();
        let mut state = AuthState::restore(&session);
        assert!(!state.is_authenticated());

        state
            .settle_login(&session, ApiResponse::ok(login_data()))
            .unwrap();
        assert!(state.is_authenticated());
        assert_eq!(state.user_role(), "manager");

        // 模拟刷新页面：用同一个存储重建状态
        let reloaded = AuthState::restore(&session);
        assert_eq!(reloaded.token.as_deref(), Some("tok-123"));
        assert!(reloaded.has_token());
        // 档案要等远程校验，所以刷新后还不算完整认证
        assert!(!reloaded.is_authenticated());
    }

    #[test]
    fn failed_login_leaves_previous_session_untouched() {
        let session = MemorySession::with_token("old-token");
        let mut state = AuthState::restore(&session);
        state.user = Some(sample_user());

        let result = state.settle_login(
            &session,
            ApiResponse::fail("Invalid credentials"),
        );

        assert_eq!(result.unwrap_err(), "Invalid credentials");
        assert_eq!(state.token.as_deref(), Some("old-token"));
        assert!(state.is_authenticated());
        assert_eq!(session.load().as_deref(), Some("old-token"));
    }

    #[test]
    fn logout_clears_both_memory_and_persisted_token() {
        let session = MemorySession::with_token("tok");
        let mut state = AuthState::restore(&session);
        state.user = Some(sample_user());

        state.clear_session(&session);

        assert!(state.user.is_none());
        assert!(state.token.is_none());
        assert!(session.load().is_none());
    }

    #[test]
    fn logout_without_active_session_is_still_clean() {
        let session = MemorySession::default();
        let mut state = AuthState::restore(&session);

        state.clear_session(&session);

        assert!(!state.has_token());
        assert!(session.load().is_none());
    }

    #[test]
    fn failed_validation_logs_out_entirely() {
        let session = MemorySession::with_token("stale");
        let mut state = AuthState::restore(&session);

        let valid = state.settle_validation(&session, ApiResponse::fail("Invalid token"));

        assert!(!valid);
        assert!(state.token.is_none());
        assert!(session.load().is_none());
    }

    #[test]
    fn successful_validation_adopts_profile() {
        let session = MemorySession::with_token("tok");
        let mut state = AuthState::restore(&session);

        let valid = state.settle_validation(&session, ApiResponse::ok(sample_user()));

        assert!(valid);
        assert!(state.is_authenticated());
        assert_eq!(session.load().as_deref(), Some("tok"));
    }

    #[test]
    fn profile_update_without_user_is_a_precondition_failure() {
        let mut state = AuthState::default();
        let result = state.settle_profile(ApiResponse::ok(sample_user()));
        assert_eq!(result.unwrap_err(), "No active session");
        assert!(state.user.is_none());
    }

    #[test]
    fn profile_update_merges_only_on_success() {
        let mut state = AuthState::default();
        state.user = Some(sample_user());

        let mut renamed = sample_user();
        renamed.name = "Ravi K".to_string();
        state.settle_profile(ApiResponse::ok(renamed)).unwrap();
        assert_eq!(state.user.as_ref().unwrap().name, "Ravi K");

        let result = state.settle_profile(ApiResponse::fail("nope"));
        assert!(result.is_err());
        assert_eq!(state.user.as_ref().unwrap().name, "Ravi K");
    }

    #[test]
    fn user_role_defaults_to_guest() {
        assert_eq!(AuthState::default().user_role(), "guest");
    }
}
