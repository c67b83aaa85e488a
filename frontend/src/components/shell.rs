//! 应用骨架：顶栏 + 侧边导航 + 离线横幅 + 通知堆叠
//!
//! 所有受保护页面都包在这个骨架里。骨架只调用 store 动作，
//! 从不直接改 store 状态。

use crate::session::BrowserSession;
use crate::stores::app::use_app;
use crate::stores::auth::{logout, use_auth};
use crate::stores::leads::use_leads;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;

const NAV_ITEMS: [(AppRoute, &str); 5] = [
    (AppRoute::Dashboard, "Dashboard"),
    (AppRoute::Leads, "Leads"),
    (AppRoute::Activities, "Activities"),
    (AppRoute::Tasks, "Tasks"),
    (AppRoute::Reports, "Reports"),
];

#[component]
pub fn Shell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let app = use_app();
    let leads = use_leads();
    let router = use_router();

    let on_logout = move |_| {
        // 注销清掉会话和本地线索缓存；导航交给路由守卫
        logout(&auth, &BrowserSession);
        leads.set_state.update(|s| s.clear_leads());
    };

    let app_title = move || app.state.get().settings.app_title.clone();
    let user_name = move || {
        auth.state
            .get()
            .user
            .map(|u| u.name)
            .unwrap_or_else(|| "…".to_string())
    };

    view! {
        <div class="min-h-screen bg-base-200">
            // 离线横幅：常驻在顶端，直到连接恢复
            <Show when=move || !app.state.get().is_online>
                <div class="alert alert-warning rounded-none justify-center text-sm py-2">
                    <span>"You are offline. Changes will sync when the connection is restored."</span>
                </div>
            </Show>

            <div class="navbar bg-base-100 shadow-sm">
                <div class="flex-none">
                    <button
                        class="btn btn-square btn-ghost"
                        on:click=move |_| app.set_state.update(|s| s.toggle_sidebar())
                    >
                        "☰"
                    </button>
                </div>
                <div class="flex-1">
                    <span class="text-xl font-bold px-2">{app_title}</span>
                </div>
                <div class="flex-none gap-2 items-center">
                    <span class="text-sm text-base-content/70">{user_name}</span>
                    <button class="btn btn-ghost btn-sm" on:click=on_logout>
                        "Logout"
                    </button>
                </div>
            </div>

            <div class="flex">
                <Show when=move || app.state.get().sidebar_open>
                    <aside class="w-48 min-h-screen bg-base-100 shadow-md">
                        <ul class="menu p-2">
                            {NAV_ITEMS
                                .iter()
                                .map(|(route, label)| {
                                    let route = *route;
                                    let is_active =
                                        move || router.current_route().get() == route;
                                    view! {
                                        <li>
                                            <a
                                                class=move || {
                                                    if is_active() { "active" } else { "" }
                                                }
                                                on:click=move |_| router.navigate(route.to_path())
                                            >
                                                {*label}
                                            </a>
                                        </li>
                                    }
                                })
                                .collect_view()}
                        </ul>
                    </aside>
                </Show>

                <main class="flex-1 p-4 md:p-8">{children()}</main>
            </div>

            // 通知堆叠：最新的在最上面
            <div class="toast toast-top toast-end z-50">
                <For
                    each=move || app.state.get().notifications
                    key=|n| n.id
                    children=move |n| {
                        let id = n.id;
                        view! {
                            <div class=format!("{} shadow-lg", n.kind.alert_class())>
                                <div>
                                    <div class="font-bold">{n.title.clone()}</div>
                                    <div class="text-sm">{n.message.clone()}</div>
                                </div>
                                <button
                                    class="btn btn-ghost btn-xs"
                                    on:click=move |_| {
                                        app.set_state.update(|s| s.remove_notification(id))
                                    }
                                >
                                    "✕"
                                </button>
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}
