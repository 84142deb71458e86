//! Assistant page UI module (MVVM standard)
//!
//! Structure:
//! - model.rs: API functions
//! - view_model.rs: AssistantVm wrapping the page state
//! - view.rs: AssistantPage with the document and image panels
//! - toast.rs: transient status message

mod model;
mod toast;
mod view;
mod view_model;

pub use toast::Toast;
pub use view::AssistantPage;
pub use view_model::AssistantVm;
