//! Assistant page - View Component

use super::toast::Toast;
use super::view_model::AssistantVm;
use crate::domain::a001_assistant::state::{Action, ActiveTab, DEFAULT_IMAGE_PROMPT};
use crate::shared::format::format_file_size;
use crate::shared::icons::icon;
use leptos::prelude::*;
use thaw::*;
use wasm_bindgen::JsCast;
use web_sys::{File, HtmlInputElement};

/// Picker hints; the service accepts .txt and .pdf documents
const DOCUMENT_ACCEPT: &str = ".txt,.pdf";
const IMAGE_ACCEPT: &str = "image/*";

const CARD_STYLE: &str = "padding: 16px; background: var(--colorNeutralBackground1); border: 1px solid var(--colorNeutralStroke2); border-radius: 8px;";
const FIELD_STYLE: &str = "width: 100%; padding: 8px; border: 1px solid var(--colorNeutralStroke1); border-radius: 6px; font: inherit; box-sizing: border-box;";

/// First file of an `<input type="file">` change event
fn picked_file(ev: &web_sys::Event) -> Option<File> {
    let input: HtmlInputElement = ev.target()?.dyn_into().ok()?;
    input.files()?.get(0)
}

#[component]
#[allow(non_snake_case)]
pub fn AssistantPage() -> impl IntoView {
    let vm = AssistantVm::new();
    on_cleanup(move || vm.release());

    let active_tab = Memo::new(move |_| vm.state.with(|s| s.active_tab));

    view! {
        <div style="min-height: 100vh; padding: 24px; display: flex; flex-direction: column; align-items: center; background: var(--colorNeutralBackground2);">
            <div style="width: 100%; max-width: 720px; display: flex; flex-direction: column; gap: 16px;">
                <h1 style="font-size: 24px; font-weight: 600;">"Healthcare AI Assistant"</h1>

                <TabBar vm=vm active_tab=active_tab />

                {move || match active_tab.get() {
                    ActiveTab::Document => view! { <DocumentPanel vm=vm /> }.into_any(),
                    ActiveTab::Image => view! { <ImagePanel vm=vm /> }.into_any(),
                }}
            </div>

            <Toast vm=vm />
        </div>
    }
}

/// Tab bar component
#[component]
fn TabBar(vm: AssistantVm, active_tab: Memo<ActiveTab>) -> impl IntoView {
    let appearance = move |tab: ActiveTab| {
        if active_tab.get() == tab {
            ButtonAppearance::Primary
        } else {
            ButtonAppearance::Subtle
        }
    };

    view! {
        <div style="border-bottom: 1px solid var(--colorNeutralStroke2); padding-bottom: 4px;">
            <Space>
                <Button
                    appearance=move || appearance(ActiveTab::Document)
                    on_click=move |_| vm.switch_tab(ActiveTab::Document)
                >
                    {icon("document")}
                    " Document Chat"
                </Button>
                <Button
                    appearance=move || appearance(ActiveTab::Image)
                    on_click=move |_| vm.switch_tab(ActiveTab::Image)
                >
                    {icon("image")}
                    " Image Diagnostics"
                </Button>
            </Space>
        </div>
    }
}

#[component]
fn DocumentPanel(vm: AssistantVm) -> impl IntoView {
    let document = Memo::new(move |_| vm.state.with(|s| s.document.clone()));
    let answer = Memo::new(move |_| vm.state.with(|s| s.answer.clone()));

    view! {
        <div style=CARD_STYLE>
            <h3 style="font-weight: 600; margin-bottom: 8px;">"Patient document"</h3>
            <Flex align=FlexAlign::Center style="gap: 8px; flex-wrap: wrap;">
                <input
                    type="file"
                    accept=DOCUMENT_ACCEPT
                    on:change=move |ev| {
                        if let Some(file) = picked_file(&ev) {
                            vm.select_document(file);
                        }
                    }
                />
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| vm.submit_upload()
                >
                    {icon("upload")}
                    " Upload"
                </Button>
            </Flex>
            {move || {
                document
                    .get()
                    .map(|d| {
                        view! {
                            <div style="margin-top: 6px; font-size: 13px; color: var(--colorNeutralForeground3);">
                                {format!("Selected: {} ({})", d.name, format_file_size(d.size))}
                            </div>
                        }
                    })
            }}
            <Show when=move || vm.is_loading(Action::Upload)>
                <p style="margin-top: 6px; color: var(--colorNeutralForeground3);">"Uploading..."</p>
            </Show>
        </div>

        <div style=CARD_STYLE>
            <textarea
                rows="4"
                placeholder="Ask a medical question..."
                style=FIELD_STYLE
                prop:value=move || vm.state.with(|s| s.question.clone())
                on:input=move |ev| vm.set_question(event_target_value(&ev))
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Enter" && ev.ctrl_key() {
                        ev.prevent_default();
                        vm.submit_question();
                    }
                }
            />
            <Flex justify=FlexJustify::End style="margin-top: 8px;">
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| vm.submit_question()
                >
                    {icon("send")}
                    " Ask"
                </Button>
            </Flex>
            <Show when=move || vm.is_loading(Action::Chat)>
                <p style="color: var(--colorNeutralForeground3);">"Loading..."</p>
            </Show>
        </div>

        {move || {
            answer
                .get()
                .filter(|a| !a.is_empty())
                .map(|a| {
                    view! {
                        <div style=CARD_STYLE>
                            <p style="font-weight: 600;">"Response:"</p>
                            <p style="margin-top: 8px; white-space: pre-wrap;">{a}</p>
                        </div>
                    }
                })
        }}
    }
}

#[component]
fn ImagePanel(vm: AssistantVm) -> impl IntoView {
    let image = Memo::new(move |_| vm.state.with(|s| s.image.clone()));
    let diagnosis = Memo::new(move |_| vm.state.with(|s| s.diagnosis.clone()));
    let analyzing = Memo::new(move |_| vm.state.with(|s| s.is_loading(Action::AnalyzeImage)));

    view! {
        <div style=CARD_STYLE>
            <h3 style="font-weight: 600; margin-bottom: 8px;">"Medical image"</h3>
            <input
                type="file"
                accept=IMAGE_ACCEPT
                on:change=move |ev| {
                    if let Some(file) = picked_file(&ev) {
                        vm.select_image(file);
                    }
                }
            />
            {move || {
                image
                    .get()
                    .map(|img| {
                        let caption = format!(
                            "{} ({})",
                            img.file.name,
                            format_file_size(img.file.size),
                        );
                        view! {
                            <div style="margin-top: 12px;">
                                {img
                                    .preview_url
                                    .map(|url| {
                                        view! {
                                            <img
                                                src=url
                                                alt="Selected image preview"
                                                style="max-width: 100%; max-height: 320px; border-radius: 8px;"
                                            />
                                        }
                                    })}
                                <div style="font-size: 13px; color: var(--colorNeutralForeground3);">
                                    {caption}
                                </div>
                            </div>
                        }
                    })
            }}
        </div>

        <div style=CARD_STYLE>
            <input
                type="text"
                placeholder=DEFAULT_IMAGE_PROMPT
                style=FIELD_STYLE
                prop:value=move || vm.state.with(|s| s.image_prompt.clone())
                on:input=move |ev| vm.set_image_prompt(event_target_value(&ev))
            />
            <Flex justify=FlexJustify::End style="margin-top: 8px;">
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=Signal::derive(move || !vm.state.with(|s| s.can_analyze()))
                    on_click=move |_| vm.submit_image_analysis()
                >
                    {icon("scan")}
                    {move || if analyzing.get() { " Analyzing..." } else { " Analyze" }}
                </Button>
            </Flex>
        </div>

        {move || {
            diagnosis
                .get()
                .map(|d| {
                    view! {
                        <div style=CARD_STYLE>
                            <p style="font-weight: 600;">"Diagnosis:"</p>
                            <p style="margin-top: 8px; white-space: pre-wrap;">{d}</p>
                        </div>
                    }
                })
        }}
    }
}
