use crate::domain::a001_assistant::ui::AssistantPage;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    log::info!(
        "Healthcare AI Assistant, service at {}",
        crate::shared::config::api_base()
    );

    view! {
        <AssistantPage />
    }
}
