use crate::api::use_api;
use crate::components::lead_form::{LEAD_FORM_MODAL, LeadFormModal};
use crate::stores::app::{NotificationKind, add_notification, use_app};
use crate::stores::leads::{delete_lead, fetch_leads, use_leads};
use leadflow_shared::Lead;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn LeadsPage() -> impl IntoView {
    let leads = use_leads();
    let app = use_app();
    let api = use_api();

    // 正在编辑的线索；None 表示新建
    let editing = RwSignal::new(Option::<Lead>::None);

    spawn_local({
        let api = api.clone();
        async move {
            if let Err(e) = fetch_leads(&leads, &api).await {
                add_notification(&app, NotificationKind::Error, "Sync failed", &e, None);
            }
        }
    });

    let open_create = move |_| {
        editing.set(None);
        app.set_state.update(|s| s.show_modal(LEAD_FORM_MODAL));
    };

    let on_delete = move |id: String| {
        let api = api.clone();
        spawn_local(async move {
            match delete_lead(&leads, &api, &id).await {
                Ok(()) => add_notification(
                    &app,
                    NotificationKind::Success,
                    "Lead deleted",
                    "The lead has been removed.",
                    None,
                ),
                Err(e) => {
                    add_notification(&app, NotificationKind::Error, "Delete failed", &e, None)
                }
            }
        });
    };

    view! {
        <div class="max-w-6xl mx-auto space-y-4">
            <div class="flex justify-between items-center">
                <h2 class="text-2xl font-bold">"Leads"</h2>
                <button class="btn btn-primary btn-sm" on:click=open_create>
                    "+ Add Lead"
                </button>
            </div>

            <Show
                when=move || !leads.state.get().is_loading
                fallback=|| view! {
                    <div class="flex justify-center p-12">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                }
            >
                <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                    <table class="table table-zebra">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th>"Phone"</th>
                                <th>"Location"</th>
                                <th>"Interest"</th>
                                <th>"Status"</th>
                                <th>"Assigned To"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || leads.state.get().leads
                                key=|lead| (lead.id.clone(), lead.updated_at.clone())
                                children=move |lead: Lead| {
                                    let edit_target = lead.clone();
                                    let delete_id = lead.id.clone();
                                    let on_delete = on_delete.clone();
                                    view! {
                                        <tr>
                                            <td class="font-medium">{lead.name.clone()}</td>
                                            <td>{lead.phone.clone()}</td>
                                            <td>{lead.location.clone()}</td>
                                            <td>{lead.interest.clone()}</td>
                                            <td>
                                                <span class="badge badge-outline">
                                                    {lead.status.clone()}
                                                </span>
                                            </td>
                                            <td>{lead.assigned_to.clone()}</td>
                                            <td class="flex gap-1">
                                                <button
                                                    class="btn btn-ghost btn-xs"
                                                    on:click=move |_| {
                                                        editing.set(Some(edit_target.clone()));
                                                        app.set_state
                                                            .update(|s| s.show_modal(LEAD_FORM_MODAL));
                                                    }
                                                >
                                                    "Edit"
                                                </button>
                                                <button
                                                    class="btn btn-ghost btn-xs text-error"
                                                    on:click=move |_| on_delete(delete_id.clone())
                                                >
                                                    "Delete"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                    <Show when=move || leads.state.get().leads.is_empty()>
                        <p class="text-center text-base-content/60 p-8">
                            "No leads yet. Add your first lead to get started."
                        </p>
                    </Show>
                </div>
            </Show>

            <LeadFormModal editing=editing />
        </div>
    }
}
