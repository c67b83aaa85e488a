use crate::api::use_api;
use crate::stores::app::{NotificationKind, add_notification, use_app};
use crate::stores::leads::{create_lead, update_lead, use_leads};
use leadflow_shared::Lead;
use leadflow_shared::protocol::{LeadDraft, LeadPatch};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 线索表单的模态框 id（app store 里至多一个激活模态框）
pub const LEAD_FORM_MODAL: &str = "lead-form";

const STATUS_OPTIONS: [&str; 4] = ["New", "Contacted", "Qualified", "Closed"];

/// 新建/编辑线索的表单模态框
///
/// `editing` 为 Some 时是编辑，None 时是新建。
/// 打开与关闭完全由 app store 的 `active_modal` 驱动。
#[component]
pub fn LeadFormModal(editing: RwSignal<Option<Lead>>) -> impl IntoView {
    let app = use_app();
    let leads = use_leads();
    let api = use_api();

    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let (is_saving, set_is_saving) = signal(false);

    // 表单字段
    let (name, set_name) = signal(String::new());
    let (phone, set_phone) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (location, set_location) = signal(String::new());
    let (interest, set_interest) = signal(String::new());
    let (source, set_source) = signal(String::new());
    let (status, set_status) = signal("New".to_string());
    let (assigned_to, set_assigned_to) = signal(String::new());
    let (notes, set_notes) = signal(String::new());

    let fill_form = move || {
        if let Some(lead) = editing.get_untracked() {
            set_name.set(lead.name);
            set_phone.set(lead.phone);
            set_email.set(lead.email);
            set_location.set(lead.location);
            set_interest.set(lead.interest);
            set_source.set(lead.source);
            set_status.set(lead.status);
            set_assigned_to.set(lead.assigned_to);
            set_notes.set(lead.notes.unwrap_or_default());
        } else {
            set_name.set(String::new());
            set_phone.set(String::new());
            set_email.set(String::new());
            set_location.set(String::new());
            set_interest.set(String::new());
            set_source.set(String::new());
            set_status.set("New".to_string());
            set_assigned_to.set(String::new());
            set_notes.set(String::new());
        }
    };

    // 模态框开关跟随 app store 的 active_modal
    Effect::new(move |_| {
        let open = app.state.get().active_modal.as_deref() == Some(LEAD_FORM_MODAL);
        if let Some(dialog) = dialog_ref.get() {
            if open {
                fill_form();
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_saving.set(true);

        let trimmed_notes = notes.get_untracked();
        let notes_opt = if trimmed_notes.trim().is_empty() {
            None
        } else {
            Some(trimmed_notes)
        };

        let api = api.clone();
        spawn_local(async move {
            let result = match editing.get_untracked() {
                Some(lead) => {
                    let patch = LeadPatch {
                        name: Some(name.get_untracked()),
                        phone: Some(phone.get_untracked()),
                        email: Some(email.get_untracked()),
                        location: Some(location.get_untracked()),
                        interest: Some(interest.get_untracked()),
                        source: Some(source.get_untracked()),
                        status: Some(status.get_untracked()),
                        assigned_to: Some(assigned_to.get_untracked()),
                        notes: notes_opt,
                    };
                    update_lead(&leads, &api, &lead.id, patch)
                        .await
                        .map(|()| "Lead updated")
                }
                None => {
                    let draft = LeadDraft {
                        name: name.get_untracked(),
                        phone: phone.get_untracked(),
                        email: email.get_untracked(),
                        location: location.get_untracked(),
                        interest: interest.get_untracked(),
                        source: source.get_untracked(),
                        status: status.get_untracked(),
                        assigned_to: assigned_to.get_untracked(),
                        notes: notes_opt,
                    };
                    create_lead(&leads, &api, draft).await.map(|_| "Lead created")
                }
            };

            match result {
                Ok(title) => {
                    app.set_state.update(|s| s.hide_modal());
                    add_notification(
                        &app,
                        NotificationKind::Success,
                        title,
                        "Changes have been saved.",
                        None,
                    );
                }
                Err(e) => {
                    add_notification(&app, NotificationKind::Error, "Save failed", &e, None);
                }
            }
            set_is_saving.set(false);
        });
    };

    let settings = move || app.state.get().settings;

    view! {
        <dialog node_ref=dialog_ref class="modal">
            <div class="modal-box max-w-lg">
                <h3 class="font-bold text-lg mb-2">
                    {move || if editing.get().is_some() { "Edit Lead" } else { "New Lead" }}
                </h3>

                <form class="space-y-2" on:submit=on_submit>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Name"</span></label>
                        <input
                            type="text"
                            class="input input-bordered"
                            prop:value=name
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                            required
                        />
                    </div>
                    <div class="grid grid-cols-2 gap-2">
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Phone"</span></label>
                            <input
                                type="tel"
                                class="input input-bordered"
                                prop:value=phone
                                on:input=move |ev| set_phone.set(event_target_value(&ev))
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Email"</span></label>
                            <input
                                type="email"
                                class="input input-bordered"
                                prop:value=email
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                            />
                        </div>
                    </div>
                    <div class="grid grid-cols-2 gap-2">
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Location"</span></label>
                            <input
                                type="text"
                                class="input input-bordered"
                                list="lead-locations"
                                prop:value=location
                                on:input=move |ev| set_location.set(event_target_value(&ev))
                            />
                            <datalist id="lead-locations">
                                <For
                                    each=move || settings().locations
                                    key=|loc| loc.clone()
                                    children=|loc| view! { <option value=loc></option> }
                                />
                            </datalist>
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Source"</span></label>
                            <input
                                type="text"
                                class="input input-bordered"
                                list="lead-sources"
                                prop:value=source
                                on:input=move |ev| set_source.set(event_target_value(&ev))
                            />
                            <datalist id="lead-sources">
                                <For
                                    each=move || settings().sources
                                    key=|src| src.clone()
                                    children=|src| view! { <option value=src></option> }
                                />
                            </datalist>
                        </div>
                    </div>
                    <div class="grid grid-cols-2 gap-2">
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Interest"</span></label>
                            <input
                                type="text"
                                class="input input-bordered"
                                prop:value=interest
                                on:input=move |ev| set_interest.set(event_target_value(&ev))
                            />
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Status"</span></label>
                            <select
                                class="select select-bordered"
                                prop:value=status
                                on:change=move |ev| set_status.set(event_target_value(&ev))
                            >
                                {STATUS_OPTIONS
                                    .iter()
                                    .map(|opt| {
                                        let opt = *opt;
                                        view! { <option value=opt>{opt}</option> }
                                    })
                                    .collect_view()}
                            </select>
                        </div>
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Assigned To"</span></label>
                        <input
                            type="text"
                            class="input input-bordered"
                            prop:value=assigned_to
                            on:input=move |ev| set_assigned_to.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Notes"</span></label>
                        <textarea
                            class="textarea textarea-bordered"
                            prop:value=notes
                            on:input=move |ev| set_notes.set(event_target_value(&ev))
                        ></textarea>
                    </div>

                    <div class="modal-action">
                        <button
                            type="button"
                            class="btn btn-ghost"
                            on:click=move |_| app.set_state.update(|s| s.hide_modal())
                        >
                            "Cancel"
                        </button>
                        <button class="btn btn-primary" disabled=move || is_saving.get()>
                            {move || if is_saving.get() {
                                view! { <span class="loading loading-spinner"></span> "Saving..." }
                                    .into_any()
                            } else {
                                "Save".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </dialog>
    }
}
