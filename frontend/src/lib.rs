//! LeadFlow 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎），守卫只看令牌是否存在
//! - `session`: 会话令牌的唯一属主接口
//! - `api`: 面向 store 的两个逻辑操作（命令执行 / 快照同步）
//! - `stores`: 认证 / 线索 / 应用三个状态切片
//! - `components`: UI 组件层

pub mod api;
mod serde_helper;
pub mod session;

mod components {
    pub mod dashboard;
    mod lead_form;
    pub mod leads;
    pub mod login;
    pub mod pages;
    pub mod shell;
}

pub mod stores {
    pub mod app;
    pub mod auth;
    pub mod leads;
}

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    pub use http::{HttpClient, HttpResponse};
    pub use storage::LocalStorage;
    pub use timer::Timeout;
}

use crate::api::ApiClient;
use crate::components::dashboard::DashboardPage;
use crate::components::leads::LeadsPage;
use crate::components::login::LoginPage;
use crate::components::pages::{ActivitiesPage, ReportsPage, TasksPage};
use crate::components::shell::Shell;
use crate::session::BrowserSession;
use crate::stores::app::{AppContext, initialize_app};
use crate::stores::auth::{AuthContext, check_auth};
use crate::stores::leads::LeadsContext;

use leptos::prelude::*;
use leptos::task::spawn_local;
use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 受保护页面统一包在应用骨架里；登录页独立全屏。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <Shell><DashboardPage /></Shell> }.into_any(),
        AppRoute::Leads => view! { <Shell><LeadsPage /></Shell> }.into_any(),
        AppRoute::Activities => view! { <Shell><ActivitiesPage /></Shell> }.into_any(),
        AppRoute::Tasks => view! { <Shell><TasksPage /></Shell> }.into_any(),
        AppRoute::Reports => view! { <Shell><ReportsPage /></Shell> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建各个 store 上下文；认证状态从持久化令牌播种
    let auth_ctx = AuthContext::new(&BrowserSession);
    provide_context(auth_ctx);

    let leads_ctx = LeadsContext::new();
    provide_context(leads_ctx);

    let app_ctx = AppContext::new();
    provide_context(app_ctx);

    provide_context(ApiClient::same_origin());

    // 2. 显式生命周期：安装连接状态监听，组件销毁时移除
    let watch = initialize_app(&app_ctx);
    on_cleanup(move || watch.destroy());

    // 3. 恢复会话：采用持久化令牌并远程校验
    let api = api::use_api();
    spawn_local(async move {
        check_auth(&auth_ctx, &api, &BrowserSession).await;
    });

    // 4. 路由器：注入令牌存在信号实现守卫
    let has_token = auth_ctx.has_token_signal();

    view! {
        <Router has_token=has_token>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
