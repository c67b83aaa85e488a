use crate::api::use_api;
use crate::stores::app::{NotificationKind, add_notification, use_app};
use crate::stores::leads::{fetch_leads, use_leads};
use leadflow_shared::Timestamp;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let leads = use_leads();
    let app = use_app();
    let api = use_api();

    // 挂载时刷新一次快照
    spawn_local(async move {
        if let Err(e) = fetch_leads(&leads, &api).await {
            add_notification(&app, NotificationKind::Error, "Sync failed", &e, None);
        }
    });

    let total = move || leads.state.get().total_leads();
    let active = move || leads.state.get().active_leads();
    let new_this_week = move || leads.state.get().new_this_week(Timestamp::now());
    let is_loading = move || leads.state.get().is_loading;

    view! {
        <div class="max-w-5xl mx-auto space-y-6">
            <h2 class="text-2xl font-bold">"Dashboard"</h2>

            <Show
                when=move || !is_loading()
                fallback=|| view! {
                    <div class="flex justify-center p-12">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                }
            >
                <div class="stats stats-vertical md:stats-horizontal shadow w-full">
                    <div class="stat">
                        <div class="stat-title">"Total Leads"</div>
                        <div class="stat-value text-primary">{total}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Active"</div>
                        <div class="stat-value">{active}</div>
                        <div class="stat-desc">"not yet closed"</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"New This Week"</div>
                        <div class="stat-value text-secondary">{new_this_week}</div>
                    </div>
                </div>
            </Show>
        </div>
    }
}
