//! Translation engine: the localization instance text nodes bind to.
//!
//! # Invariants
//! - Locale changes notify subscribers synchronously, in subscription order.
//! - A lookup never fails; a missing key resolves to `None`.
//! - Each subscription is removed only through its own `SubscriptionId`.

pub mod localization;
pub mod options;
pub mod resources;

pub use localization::{I18nError, LocaleHandler, Localization, SubscriptionId};
pub use options::InitOptions;
pub use resources::{ResourceError, Resources};
pub use stagetext_common::Locale;

pub fn crate_info() -> &'static str {
    "stagetext-i18n v0.1.0"
}
