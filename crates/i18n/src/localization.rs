use crate::options::InitOptions;
use crate::resources::{ResourceError, Resources};
use serde_json::Value;
use stagetext_common::{Locale, LocaleError};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

const DEFAULT_NS: &str = "translation";
const DEFAULT_KEY_SEPARATOR: &str = ".";
const DEFAULT_NS_SEPARATOR: &str = ":";

/// Errors from the translation engine and from code reacting to it.
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    #[error("invalid locale: {0}")]
    Locale(#[from] LocaleError),
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
    #[error("resolution hook failed for key {key:?}: {message}")]
    Hook { key: String, message: String },
}

impl I18nError {
    /// Convenience constructor for errors raised by resolution hooks.
    pub fn hook(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Callback invoked with the new locale after every locale change.
pub type LocaleHandler = Rc<dyn Fn(&Locale) -> Result<(), I18nError>>;

/// Handle identifying one subscription on one [`Localization`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone)]
struct Settings {
    fallback: Vec<Locale>,
    default_ns: String,
    key_separator: String,
    ns_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fallback: vec![Locale::dev()],
            default_ns: DEFAULT_NS.into(),
            key_separator: DEFAULT_KEY_SEPARATOR.into(),
            ns_separator: DEFAULT_NS_SEPARATOR.into(),
        }
    }
}

#[derive(Debug)]
struct State {
    settings: Settings,
    resources: Resources,
    locale: Locale,
    initialized: bool,
}

thread_local! {
    static SHARED: Rc<Localization> = Rc::new(Localization::new());
}

/// A translation engine instance.
///
/// Instances are shared as `Rc<Localization>` between the application and
/// every text controller bound to them. All methods take `&self`; state lives
/// behind `RefCell`s and no borrow is held while subscribers run, so handlers
/// may freely translate, subscribe, unsubscribe or even change the locale.
pub struct Localization {
    state: RefCell<State>,
    subscribers: RefCell<Vec<(SubscriptionId, LocaleHandler)>>,
    next_subscription: Cell<u64>,
}

impl Localization {
    /// Create an uninitialized instance. Until [`init`](Self::init) runs,
    /// the active locale is `dev` and every lookup misses.
    pub fn new() -> Self {
        let settings = Settings::default();
        let locale = settings.fallback[0].clone();
        Self {
            state: RefCell::new(State {
                settings,
                resources: Resources::new(),
                locale,
                initialized: false,
            }),
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    /// The thread's default instance. Created on first use; every call on
    /// the same thread returns the same instance.
    pub fn shared() -> Rc<Localization> {
        SHARED.with(Rc::clone)
    }

    /// Install options and resources, activate the initial locale and notify
    /// subscribers.
    ///
    /// The initial locale is `lng`, else the first fallback locale, else
    /// `dev`. Calling `init` again replaces the previous configuration.
    pub fn init(&self, options: InitOptions) -> Result<(), I18nError> {
        let defaults = Settings::default();
        let settings = Settings {
            fallback: options
                .fallback_lng
                .filter(|f| !f.is_empty())
                .unwrap_or(defaults.fallback),
            default_ns: options.default_ns.unwrap_or(defaults.default_ns),
            key_separator: options.key_separator.unwrap_or(defaults.key_separator),
            ns_separator: options.ns_separator.unwrap_or(defaults.ns_separator),
        };
        let locale = options.lng.unwrap_or_else(|| settings.fallback[0].clone());

        if options.show_support_notice.unwrap_or(true) {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                "stagetext-i18n initialized; set show_support_notice = false to silence this notice"
            );
        }

        {
            let mut state = self.state.borrow_mut();
            state.settings = settings;
            state.resources = options.resources.unwrap_or_default();
            state.locale = locale.clone();
            state.initialized = true;
            tracing::debug!(
                %locale,
                locales = state.resources.locales().count(),
                "localization initialized"
            );
        }

        self.emit(&locale)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// The active locale.
    pub fn current_locale(&self) -> Locale {
        self.state.borrow().locale.clone()
    }

    /// Fallback locales in lookup order.
    pub fn fallback_locales(&self) -> Vec<Locale> {
        self.state.borrow().settings.fallback.clone()
    }

    /// Locales with loaded resources.
    pub fn locales(&self) -> Vec<Locale> {
        self.state.borrow().resources.locales().cloned().collect()
    }

    /// Switch the active locale and notify every subscriber.
    ///
    /// Subscribers are called in subscription order with a snapshot of the
    /// subscriber list taken before dispatch. The first handler error stops
    /// dispatch and is returned; the locale stays switched.
    pub fn change_locale(&self, locale: Locale) -> Result<(), I18nError> {
        self.state.borrow_mut().locale = locale.clone();
        self.emit(&locale)
    }

    /// Resolve `key` for `locale`.
    ///
    /// Tries `locale`, then its language-only form, then each fallback
    /// locale. A `ns:` prefix selects the namespace. Returns `None` when no
    /// string leaf is found.
    pub fn translate(&self, key: &str, locale: &Locale) -> Option<String> {
        let state = self.state.borrow();
        let settings = &state.settings;

        let (namespace, key) = match settings.ns_separator.as_str() {
            "" => (settings.default_ns.as_str(), key),
            sep => key
                .split_once(sep)
                .unwrap_or((settings.default_ns.as_str(), key)),
        };

        let mut chain: Vec<&Locale> = Vec::with_capacity(settings.fallback.len() + 2);
        let language_only = locale.language_only();
        for candidate in std::iter::once(locale)
            .chain(language_only.as_ref())
            .chain(settings.fallback.iter())
        {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }

        let found = chain.into_iter().find_map(|l| {
            state
                .resources
                .lookup(l, namespace, key, Some(settings.key_separator.as_str()))
        });
        tracing::trace!(key, %locale, hit = found.is_some(), "translate");
        found.map(str::to_owned)
    }

    /// Resolve `key` for the active locale.
    pub fn t(&self, key: &str) -> Option<String> {
        let locale = self.current_locale();
        self.translate(key, &locale)
    }

    /// Whether `key` resolves for the active locale.
    pub fn exists(&self, key: &str) -> bool {
        self.t(key).is_some()
    }

    /// Add (deep-merge) a resource bundle for one locale and namespace.
    pub fn add_resource_bundle(
        &self,
        locale: Locale,
        namespace: &str,
        bundle: Value,
    ) -> Result<(), I18nError> {
        self.state
            .borrow_mut()
            .resources
            .add_bundle(locale, namespace, bundle)?;
        Ok(())
    }

    /// Register a locale-change handler.
    pub fn subscribe(&self, handler: LocaleHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, handler));
        tracing::trace!(?id, "subscribed to locale changes");
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        let removed = subscribers.len() != before;
        if removed {
            tracing::trace!(?id, "unsubscribed from locale changes");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn emit(&self, locale: &Locale) -> Result<(), I18nError> {
        let handlers: Vec<LocaleHandler> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        tracing::debug!(%locale, subscribers = handlers.len(), "locale changed");
        for handler in handlers {
            handler(locale)?;
        }
        Ok(())
    }
}

impl Default for Localization {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Localization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Localization")
            .field("locale", &state.locale)
            .field("fallback", &state.settings.fallback)
            .field("initialized", &state.initialized)
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loc(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn hello_resources() -> Resources {
        Resources::from_json_str(
            r#"{
                "en": { "translation": { "hello": "Hello!", "menu": { "play": "Play" } },
                        "hud": { "score": "Score" } },
                "es": { "translation": { "hello": "Hola!" } }
            }"#,
        )
        .unwrap()
    }

    fn handler(f: impl Fn(&Locale) -> Result<(), I18nError> + 'static) -> LocaleHandler {
        Rc::new(f)
    }

    fn initialized(opts: InitOptions) -> Localization {
        let l10n = Localization::new();
        l10n.init(opts.with_support_notice(false)).unwrap();
        l10n
    }

    #[test]
    fn uninitialized_defaults() {
        let l10n = Localization::new();
        assert!(!l10n.is_initialized());
        assert_eq!(l10n.current_locale(), loc("dev"));
        assert_eq!(l10n.t("hello"), None);
    }

    #[test]
    fn init_uses_lng_then_fallback() {
        let l10n = initialized(
            InitOptions::new()
                .with_resources(hello_resources())
                .with_fallback([loc("en")]),
        );
        assert!(l10n.is_initialized());
        assert_eq!(l10n.current_locale(), loc("en"));

        let l10n = initialized(
            InitOptions::new()
                .with_resources(hello_resources())
                .with_lng(loc("es"))
                .with_fallback([loc("en")]),
        );
        assert_eq!(l10n.current_locale(), loc("es"));
        assert_eq!(l10n.t("hello").as_deref(), Some("Hola!"));
    }

    #[test]
    fn translate_falls_back() {
        let l10n = initialized(
            InitOptions::new()
                .with_resources(hello_resources())
                .with_fallback([loc("en")]),
        );
        // es has no menu.play, en does
        assert_eq!(l10n.translate("menu.play", &loc("es")).as_deref(), Some("Play"));
        // es-MX -> es
        assert_eq!(l10n.translate("hello", &loc("es-MX")).as_deref(), Some("Hola!"));
        assert_eq!(l10n.translate("missing", &loc("es")), None);
    }

    #[test]
    fn namespaced_keys() {
        let l10n = initialized(
            InitOptions::new()
                .with_resources(hello_resources())
                .with_lng(loc("en")),
        );
        assert_eq!(l10n.t("hud:score").as_deref(), Some("Score"));
        assert_eq!(l10n.t("score"), None);

        let l10n = initialized(
            InitOptions::new()
                .with_resources(hello_resources())
                .with_lng(loc("en"))
                .with_default_ns("hud"),
        );
        assert_eq!(l10n.t("score").as_deref(), Some("Score"));
    }

    #[test]
    fn custom_separators() {
        let l10n = initialized(
            InitOptions::new()
                .with_resources(hello_resources())
                .with_lng(loc("en"))
                .with_key_separator("/")
                .with_ns_separator(""),
        );
        assert_eq!(l10n.t("menu/play").as_deref(), Some("Play"));
        assert_eq!(l10n.t("menu.play"), None);
        assert_eq!(l10n.t("hud:score"), None);
    }

    #[test]
    fn change_locale_notifies_in_order() {
        let l10n = initialized(InitOptions::new().with_resources(hello_resources()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            l10n.subscribe(handler(move |locale| {
                seen.borrow_mut().push(format!("{tag}:{locale}"));
                Ok(())
            }));
        }
        l10n.change_locale(loc("es")).unwrap();
        assert_eq!(*seen.borrow(), ["a:es", "b:es"]);
        assert_eq!(l10n.current_locale(), loc("es"));
    }

    #[test]
    fn init_notifies_existing_subscribers() {
        let l10n = Localization::new();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        l10n.subscribe(handler(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        }));
        l10n.init(InitOptions::new().with_support_notice(false)).unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn unsubscribe_removes_only_own_handler() {
        let l10n = Localization::new();
        let a = l10n.subscribe(handler(|_| Ok(())));
        let b = l10n.subscribe(handler(|_| Ok(())));
        assert_ne!(a, b);
        assert_eq!(l10n.subscriber_count(), 2);
        assert!(l10n.unsubscribe(a));
        assert!(!l10n.unsubscribe(a));
        assert_eq!(l10n.subscriber_count(), 1);
        assert!(l10n.unsubscribe(b));
        assert_eq!(l10n.subscriber_count(), 0);
    }

    #[test]
    fn handler_may_unsubscribe_itself_during_dispatch() {
        let l10n = Rc::new(Localization::new());
        let slot: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let weak = Rc::downgrade(&l10n);
        let own = Rc::clone(&slot);
        let id = l10n.subscribe(handler(move |_| {
            if let (Some(l10n), Some(id)) = (weak.upgrade(), own.get()) {
                l10n.unsubscribe(id);
            }
            Ok(())
        }));
        slot.set(Some(id));
        l10n.change_locale(loc("es")).unwrap();
        assert_eq!(l10n.subscriber_count(), 0);
    }

    #[test]
    fn handler_error_propagates_after_switch() {
        let l10n = Localization::new();
        l10n.subscribe(handler(|_| Err(I18nError::hook("k", "boom"))));
        let err = l10n.change_locale(loc("es")).unwrap_err();
        assert!(matches!(err, I18nError::Hook { .. }));
        assert_eq!(l10n.current_locale(), loc("es"));
    }

    #[test]
    fn add_resource_bundle_is_visible() {
        let l10n = initialized(InitOptions::new().with_lng(loc("fr")));
        assert!(!l10n.exists("hello"));
        l10n.add_resource_bundle(loc("fr"), "translation", json!({ "hello": "Bonjour!" }))
            .unwrap();
        assert!(l10n.exists("hello"));
        assert_eq!(l10n.locales(), vec![loc("fr")]);
    }

    #[test]
    fn shared_is_single_per_thread() {
        let a = Localization::shared();
        let b = Localization::shared();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn reinit_replaces_configuration() {
        let l10n = initialized(
            InitOptions::new()
                .with_resources(hello_resources())
                .with_lng(loc("es")),
        );
        l10n.init(InitOptions::new().with_support_notice(false)).unwrap();
        assert_eq!(l10n.current_locale(), loc("dev"));
        assert_eq!(l10n.t("hello"), None);
        assert_eq!(l10n.fallback_locales(), vec![loc("dev")]);
    }
}
