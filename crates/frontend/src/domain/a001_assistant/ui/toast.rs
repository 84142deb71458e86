//! Assistant page - transient status message

use super::view_model::AssistantVm;
use crate::domain::a001_assistant::state::NotificationKind;
use crate::shared::icons::icon;
use leptos::prelude::*;
use thaw::*;

#[component]
#[allow(non_snake_case)]
pub fn Toast(vm: AssistantVm) -> impl IntoView {
    let notification = Memo::new(move |_| vm.state.with(|s| s.notification.clone()));

    view! {
        {move || {
            notification
                .get()
                .map(|n| {
                    let intent = match n.kind {
                        NotificationKind::Success => MessageBarIntent::Success,
                        NotificationKind::Error => MessageBarIntent::Error,
                    };
                    let id = n.id;
                    view! {
                        <div
                            role="status"
                            style="position: fixed; top: 16px; right: 16px; z-index: 1000; min-width: 280px; max-width: 420px;"
                        >
                            <MessageBar intent=intent>
                                <div style="display: flex; align-items: center; justify-content: space-between; gap: 12px; width: 100%;">
                                    <span>{n.text}</span>
                                    <button
                                        style="background: none; border: none; cursor: pointer; padding: 2px; color: var(--colorNeutralForeground3);"
                                        title="Close"
                                        on:click=move |_| vm.close_notification(id)
                                    >
                                        {icon("close")}
                                    </button>
                                </div>
                            </MessageBar>
                        </div>
                    }
                })
        }}
    }
}
