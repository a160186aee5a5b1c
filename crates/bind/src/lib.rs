//! Locale-aware text: keeps scene text in sync with the active locale.
//!
//! Register [`I18nPlugin`] with the application's [`Extensions`], then create
//! [`I18nText`] nodes or [`attach`] a controller to any [`TextTarget`]. Text
//! is resolved on construction and again on every locale change.
//!
//! # Invariants
//! - A controller holds at most one live subscription.
//! - A missing translation renders as the literal `"undefined"`.
//! - Controllers never keep their target alive.
//!
//! [`Extensions`]: stagetext_scene::Extensions

mod attach;
mod controller;
mod plugin;
mod target;
mod text;

pub use attach::{Localized, attach};
pub use controller::{FALLBACK_TEXT, HookContext, I18nController, I18nOptions, ResolveHook};
pub use plugin::{AppLocalization, ApplicationI18nExt, I18nAppOptions, I18nPlugin, register};
pub use target::TextTarget;
pub use text::{I18nText, I18nTextOptions};

pub fn crate_info() -> &'static str {
    "stagetext-bind v0.1.0"
}
