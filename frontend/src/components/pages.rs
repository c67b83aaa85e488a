//! 占位页面：activities / tasks / reports
//!
//! 这些路由在导航面上存在且受守卫保护，但对应的数据切片
//! 还没有被任何 store 消费。

use leptos::prelude::*;

#[component]
fn Placeholder(title: &'static str, hint: &'static str) -> impl IntoView {
    view! {
        <div class="max-w-5xl mx-auto space-y-4">
            <h2 class="text-2xl font-bold">{title}</h2>
            <div class="card bg-base-100 shadow">
                <div class="card-body items-center text-center text-base-content/60">
                    <p>{hint}</p>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn ActivitiesPage() -> impl IntoView {
    view! {
        <Placeholder
            title="Activities"
            hint="Activity tracking is recorded in the workbook and will appear here."
        />
    }
}

#[component]
pub fn TasksPage() -> impl IntoView {
    view! {
        <Placeholder
            title="Tasks"
            hint="Task assignments are recorded in the workbook and will appear here."
        />
    }
}

#[component]
pub fn ReportsPage() -> impl IntoView {
    view! {
        <Placeholder
            title="Reports"
            hint="Reporting views are not wired up yet."
        />
    }
}
