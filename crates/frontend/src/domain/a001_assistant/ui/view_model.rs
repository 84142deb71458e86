//! Assistant page - View Model

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::{File, Url};

use super::model;
use crate::domain::a001_assistant::state::{
    Action, ActiveTab, AssistantState, FileMeta, Notification, Outcome,
};

/// Owns the page state plus the browser objects that cannot live in it
#[derive(Clone, Copy)]
pub struct AssistantVm {
    pub state: RwSignal<AssistantState>,
    document_file: StoredValue<Option<File>, LocalStorage>,
    image_file: StoredValue<Option<File>, LocalStorage>,
    // Replacing the stored Timeout drops the previous one, which cancels it
    toast_timer: StoredValue<Option<Timeout>, LocalStorage>,
}

fn file_meta(file: &File) -> FileMeta {
    FileMeta {
        name: file.name(),
        size: file.size() as u64,
        mime: file.type_(),
    }
}

impl AssistantVm {
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(AssistantState::new()),
            document_file: StoredValue::new_local(None),
            image_file: StoredValue::new_local(None),
            toast_timer: StoredValue::new_local(None),
        }
    }

    pub fn is_loading(&self, action: Action) -> bool {
        self.state.with(|s| s.is_loading(action))
    }

    /// Run an operation that may decline; subscribers are only notified when it didn't
    fn try_begin<U>(&self, op: impl FnOnce(&mut AssistantState) -> Option<U>) -> Option<U> {
        let started = self.state.try_update_untracked(op).flatten();
        if started.is_some() {
            self.state.notify();
        }
        started
    }

    fn complete(&self, finish: impl FnOnce(&mut AssistantState) -> Outcome) {
        // None when the page was unmounted while the request was in flight
        let Some(outcome) = self.state.try_update_untracked(finish) else {
            return;
        };
        if let Outcome::Applied { notification } = outcome {
            self.state.notify();
            if let Some(notification) = notification {
                self.schedule_dismiss(&notification);
            }
        }
    }

    pub fn switch_tab(&self, tab: ActiveTab) {
        self.state.update(|s| s.switch_tab(tab));
    }

    pub fn set_question(&self, text: String) {
        self.state.update(|s| s.set_question(text));
    }

    pub fn set_image_prompt(&self, text: String) {
        self.state.update(|s| s.set_image_prompt(text));
    }

    pub fn select_document(&self, file: File) {
        let meta = file_meta(&file);
        log::debug!("document selected: {} ({} bytes)", meta.name, meta.size);
        self.state.update(|s| s.select_document(meta));
        self.document_file.set_value(Some(file));
    }

    pub fn select_image(&self, file: File) {
        let meta = file_meta(&file);
        let preview_url = match Url::create_object_url_with_blob(&file) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("no preview for {}: {:?}", meta.name, e);
                None
            }
        };

        let mut previous = None;
        self.state
            .update(|s| previous = s.select_image(meta, preview_url));
        self.image_file.set_value(Some(file));

        if let Some(url) = previous {
            revoke_preview(&url);
        }
    }

    pub fn submit_upload(&self) {
        let Some(file) = self.document_file.get_value() else {
            return;
        };
        let Some(ticket) = self.try_begin(|s| s.begin_upload()) else {
            return;
        };

        let vm = *self;
        spawn_local(async move {
            let result = model::upload_document(&file).await;
            vm.complete(|s| s.finish_upload(ticket, result));
        });
    }

    pub fn submit_question(&self) {
        let Some((ticket, request)) = self.try_begin(|s| s.begin_chat()) else {
            return;
        };

        let vm = *self;
        spawn_local(async move {
            let result = model::ask(&request).await;
            vm.complete(|s| s.finish_chat(ticket, result));
        });
    }

    pub fn submit_image_analysis(&self) {
        let Some(file) = self.image_file.get_value() else {
            return;
        };
        let Some(request) = self.try_begin(|s| s.begin_analysis()) else {
            return;
        };

        let vm = *self;
        spawn_local(async move {
            let result = model::analyze_image(&file, &request.prompt).await;
            vm.complete(|s| s.finish_analysis(request.ticket, result));
        });
    }

    fn schedule_dismiss(&self, notification: &Notification) {
        let vm = *self;
        let id = notification.id;
        let timer = Timeout::new(notification.ttl_ms, move || vm.dismiss(id));
        self.toast_timer.set_value(Some(timer));
    }

    fn dismiss(&self, id: u64) {
        if self.state.try_update_untracked(|s| s.dismiss_notification(id)) == Some(true) {
            self.state.notify();
        }
    }

    /// Close button on the toast
    pub fn close_notification(&self, id: u64) {
        self.toast_timer.set_value(None);
        self.dismiss(id);
    }

    /// Release browser resources held by the page
    pub fn release(&self) {
        self.toast_timer.set_value(None);
        let preview = self
            .state
            .try_with_untracked(|s| s.image.as_ref().and_then(|i| i.preview_url.clone()))
            .flatten();
        if let Some(url) = preview {
            revoke_preview(&url);
        }
    }
}

fn revoke_preview(url: &str) {
    if let Err(e) = Url::revoke_object_url(url) {
        log::warn!("failed to revoke preview URL {}: {:?}", url, e);
    }
}
