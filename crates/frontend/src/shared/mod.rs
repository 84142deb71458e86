pub mod api_utils;
pub mod config;
pub mod format;
pub mod icons;
