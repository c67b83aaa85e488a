//! 应用 store
//!
//! 横切的 UI 状态：加载标志、侧边栏、至多一个激活的模态框、
//! 通知队列（新的在前）、在线/离线标志。连接状态的监听器通过
//! 显式的生命周期钩子安装与移除，而不是在加载时隐式运行。

use crate::web::Timeout;
use leadflow_shared::{AppSettings, Timestamp};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

/// 通知的默认存活时间（毫秒）
pub const DEFAULT_NOTIFICATION_MS: u32 = 5_000;

/// 通知类别，决定横幅样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    /// daisyUI 的 alert 样式类
    pub fn alert_class(&self) -> &'static str {
        match self {
            NotificationKind::Success => "alert alert-success",
            NotificationKind::Error => "alert alert-error",
            NotificationKind::Warning => "alert alert-warning",
            NotificationKind::Info => "alert alert-info",
        }
    }
}

/// 短暂存在的 UI 通知
///
/// `id` 基于毫秒时间戳；`duration_ms == 0` 表示常驻，
/// 不会被自动移除。
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub duration_ms: u32,
}

impl Notification {
    pub fn is_persistent(&self) -> bool {
        self.duration_ms == 0
    }
}

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub settings: AppSettings,
    pub loading: bool,
    pub sidebar_open: bool,
    /// 至多一个激活的模态框 id
    pub active_modal: Option<String>,
    /// 通知队列，插入序，最新的在队首
    pub notifications: Vec<Notification>,
    pub is_online: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            settings: AppSettings::default(),
            loading: false,
            sidebar_open: false,
            active_modal: None,
            notifications: Vec::new(),
            // 初始值在 initialize_app 里用 navigator.onLine 校准
            is_online: true,
        }
    }
}

impl AppState {
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn show_modal(&mut self, modal_id: &str) {
        self.active_modal = Some(modal_id.to_string());
    }

    pub fn hide_modal(&mut self) {
        self.active_modal = None;
    }

    /// 整体替换配置
    pub fn update_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
    }

    /// 入队一条通知并返回入队后的完整记录
    ///
    /// id 取 `now` 的毫秒值；与队列里已有 id 冲突时单调递增，
    /// 保证队列内唯一。`duration_ms` 缺省为 5 秒。
    pub fn push_notification(
        &mut self,
        kind: NotificationKind,
        title: &str,
        message: &str,
        duration_ms: Option<u32>,
        now: Timestamp,
    ) -> Notification {
        let mut id = now.as_millis();
        while self.notifications.iter().any(|n| n.id == id) {
            id += 1;
        }

        let notification = Notification {
            id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
            duration_ms: duration_ms.unwrap_or(DEFAULT_NOTIFICATION_MS),
        };
        self.notifications.insert(0, notification.clone());
        notification
    }

    pub fn remove_notification(&mut self, id: i64) {
        self.notifications.retain(|n| n.id != id);
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    pub fn has_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.first()
    }

    /// 记录连接状态变化并返回要展示的横幅
    ///
    /// 恢复在线 → 普通的成功横幅；掉线 → 常驻警告横幅。
    pub fn set_online(&mut self, online: bool, now: Timestamp) -> Notification {
        self.is_online = online;
        if online {
            self.push_notification(
                NotificationKind::Success,
                "Back Online",
                "Connection restored. Syncing data...",
                None,
                now,
            )
        } else {
            self.push_notification(
                NotificationKind::Warning,
                "Offline",
                "Working offline. Changes will sync when connection is restored.",
                Some(0),
                now,
            )
        }
    }
}

/// 应用上下文
#[derive(Clone, Copy)]
pub struct AppContext {
    pub state: ReadSignal<AppState>,
    pub set_state: WriteSignal<AppState>,
}

impl AppContext {
    pub fn new() -> Self {
        let (state, set_state) = signal(AppState::default());
        Self { state, set_state }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取应用上下文
pub fn use_app() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}

/// 入队通知并安排自动消失
///
/// 非常驻通知到期后"发后不理"地自删；常驻通知只能按 id 显式移除。
pub fn add_notification(
    ctx: &AppContext,
    kind: NotificationKind,
    title: &str,
    message: &str,
    duration_ms: Option<u32>,
) {
    let mut pushed = None;
    ctx.set_state.update(|s| {
        pushed = Some(s.push_notification(kind, title, message, duration_ms, Timestamp::now()));
    });
    if let Some(notification) = pushed {
        schedule_dismissal(ctx, &notification);
    }
}

fn schedule_dismissal(ctx: &AppContext, notification: &Notification) {
    if notification.is_persistent() {
        return;
    }
    let set_state = ctx.set_state;
    let id = notification.id;
    Timeout::new(notification.duration_ms, move || {
        set_state.update(|s| s.remove_notification(id));
    })
    .forget();
}

/// 连接状态监听的持有句柄
///
/// drop 时移除两个事件监听器；[`ConnectivityWatch::destroy`]
/// 是显式的生命周期出口。
pub struct ConnectivityWatch {
    on_online: Closure<dyn Fn()>,
    on_offline: Closure<dyn Fn()>,
}

impl ConnectivityWatch {
    /// 显式销毁（等价于 drop）
    pub fn destroy(self) {}
}

impl Drop for ConnectivityWatch {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "online",
                self.on_online.as_ref().unchecked_ref(),
            );
            let _ = window.remove_event_listener_with_callback(
                "offline",
                self.on_offline.as_ref().unchecked_ref(),
            );
        }
    }
}

/// 安装在线/离线监听并校准初始连接标志
///
/// 返回的句柄决定监听器的生命周期，调用方负责保管。
pub fn initialize_app(ctx: &AppContext) -> ConnectivityWatch {
    let set_state = ctx.set_state;

    // 初始状态直接取 navigator.onLine，不弹横幅
    let online_now = web_sys::window()
        .map(|w| w.navigator().on_line())
        .unwrap_or(true);
    set_state.update(|s| s.is_online = online_now);

    let ctx_online = *ctx;
    let on_online = Closure::<dyn Fn()>::new(move || {
        handle_online_status(&ctx_online, true);
    });
    let ctx_offline = *ctx;
    let on_offline = Closure::<dyn Fn()>::new(move || {
        handle_online_status(&ctx_offline, false);
    });

    if let Some(window) = web_sys::window() {
        let _ = window
            .add_event_listener_with_callback("online", on_online.as_ref().unchecked_ref());
        let _ = window
            .add_event_listener_with_callback("offline", on_offline.as_ref().unchecked_ref());
    }

    ConnectivityWatch {
        on_online,
        on_offline,
    }
}

fn handle_online_status(ctx: &AppContext, online: bool) {
    let mut banner = None;
    ctx.set_state.update(|s| {
        banner = Some(s.set_online(online, Timestamp::now()));
    });
    if let Some(notification) = banner {
        schedule_dismissal(ctx, &notification);
    }
}
