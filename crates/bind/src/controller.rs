use crate::target::TextTarget;
use stagetext_i18n::{I18nError, Locale, LocaleHandler, Localization, SubscriptionId};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Text written when neither the hook nor the lookup produce a string.
pub const FALLBACK_TEXT: &str = "undefined";

/// Custom resolution hook: `(context, key, locale) -> text`.
///
/// Replaces the default `instance.translate(key, locale)` lookup. Returning
/// `Ok(None)` writes [`FALLBACK_TEXT`].
pub type ResolveHook =
    Rc<dyn Fn(&HookContext<'_>, &str, &Locale) -> Result<Option<String>, I18nError>>;

/// What a [`ResolveHook`] sees of the controller invoking it.
pub struct HookContext<'a> {
    key: &'a str,
    instance: &'a Rc<Localization>,
}

impl<'a> HookContext<'a> {
    /// The controller's current key.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// The controller's localization instance.
    pub fn instance(&self) -> &'a Rc<Localization> {
        self.instance
    }
}

/// Construction options shared by [`I18nController`], [`attach`](crate::attach)
/// and [`I18nText`](crate::I18nText).
#[derive(Clone)]
pub struct I18nOptions {
    pub key: String,
    pub instance: Rc<Localization>,
    pub hook: Option<ResolveHook>,
}

impl I18nOptions {
    pub fn new(key: impl Into<String>, instance: Rc<Localization>) -> Self {
        Self {
            key: key.into(),
            instance,
            hook: None,
        }
    }

    /// Options bound to the thread's shared [`Localization`].
    pub fn shared(key: impl Into<String>) -> Self {
        Self::new(key, Localization::shared())
    }

    pub fn with_hook(
        mut self,
        hook: impl Fn(&HookContext<'_>, &str, &Locale) -> Result<Option<String>, I18nError>
            + 'static,
    ) -> Self {
        self.hook = Some(Rc::new(hook));
        self
    }
}

impl fmt::Debug for I18nOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18nOptions")
            .field("key", &self.key)
            .field("instance", &self.instance)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

struct Inner<T> {
    key: String,
    instance: Rc<Localization>,
    hook: Option<ResolveHook>,
    target: Weak<RefCell<T>>,
    subscription: Option<SubscriptionId>,
}

/// Keeps one target's text in sync with a localization instance.
///
/// The controller subscribes to locale changes on construction and writes the
/// resolved text for its key into the target on every change. It holds only a
/// weak reference to the target; once the target is dropped or reports
/// [`is_destroyed`](TextTarget::is_destroyed), the next notification
/// unsubscribes the controller. Dropping the controller unsubscribes too.
pub struct I18nController<T: TextTarget + 'static> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: TextTarget + 'static> I18nController<T> {
    /// Bind `target`, subscribe to the instance and resolve the key for the
    /// current locale before returning.
    pub fn new(target: &Rc<RefCell<T>>, options: I18nOptions) -> Result<Self, I18nError> {
        let controller = Self {
            inner: Rc::new(RefCell::new(Inner {
                key: String::new(),
                instance: Rc::clone(&options.instance),
                hook: options.hook,
                target: Rc::downgrade(target),
                subscription: None,
            })),
        };
        controller.subscribe();
        controller.set_key(options.key)?;
        Ok(controller)
    }

    pub fn key(&self) -> String {
        self.inner.borrow().key.clone()
    }

    /// Replace the key and write the resolved text before returning.
    pub fn set_key(&self, key: impl Into<String>) -> Result<(), I18nError> {
        let instance = {
            let mut inner = self.inner.borrow_mut();
            inner.key = key.into();
            Rc::clone(&inner.instance)
        };
        update(&self.inner, &instance.current_locale())
    }

    pub fn instance(&self) -> Rc<Localization> {
        Rc::clone(&self.inner.borrow().instance)
    }

    /// Move the subscription to another instance.
    ///
    /// The displayed text is left as is until the next key assignment, locale
    /// change or [`refresh`](Self::refresh).
    pub fn set_instance(&self, instance: Rc<Localization>) {
        teardown(&self.inner);
        self.inner.borrow_mut().instance = instance;
        self.subscribe();
    }

    /// Re-resolve the current key for the instance's current locale.
    pub fn refresh(&self) -> Result<(), I18nError> {
        let instance = self.instance();
        update(&self.inner, &instance.current_locale())
    }

    /// The target, if it is still alive.
    pub fn target(&self) -> Option<Rc<RefCell<T>>> {
        self.inner.borrow().target.upgrade()
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.borrow().subscription.is_some()
    }

    /// Unsubscribe from locale changes. Idempotent.
    pub fn destroy(&self) {
        teardown(&self.inner);
    }

    fn subscribe(&self) {
        let weak = Rc::downgrade(&self.inner);
        let handler: LocaleHandler = Rc::new(move |locale: &Locale| match weak.upgrade() {
            Some(inner) => update(&inner, locale),
            None => Ok(()),
        });
        let instance = Rc::clone(&self.inner.borrow().instance);
        let id = instance.subscribe(handler);
        self.inner.borrow_mut().subscription = Some(id);
    }
}

impl<T: TextTarget + 'static> Drop for I18nController<T> {
    fn drop(&mut self) {
        teardown(&self.inner);
    }
}

impl<T: TextTarget + 'static> fmt::Debug for I18nController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("I18nController")
            .field("key", &inner.key)
            .field("subscription", &inner.subscription)
            .field("hook", &inner.hook.is_some())
            .finish()
    }
}

fn update<T: TextTarget>(inner: &Rc<RefCell<Inner<T>>>, locale: &Locale) -> Result<(), I18nError> {
    let (target, key, instance, hook) = {
        let i = inner.borrow();
        (
            i.target.upgrade(),
            i.key.clone(),
            Rc::clone(&i.instance),
            i.hook.clone(),
        )
    };

    let target = match target {
        Some(t) if !t.borrow().is_destroyed() => t,
        _ => {
            tracing::trace!(key = key.as_str(), "target gone, dropping subscription");
            teardown(inner);
            return Ok(());
        }
    };

    let resolved = match hook {
        Some(hook) => hook(
            &HookContext {
                key: &key,
                instance: &instance,
            },
            &key,
            locale,
        )?,
        None => instance.translate(&key, locale),
    };
    let text = resolved.unwrap_or_else(|| FALLBACK_TEXT.to_string());
    tracing::trace!(key = key.as_str(), %locale, text = text.as_str(), "text resolved");
    target.borrow_mut().set_text(text);
    Ok(())
}

fn teardown<T>(inner: &Rc<RefCell<Inner<T>>>) {
    let (instance, subscription) = {
        let mut i = inner.borrow_mut();
        (Rc::clone(&i.instance), i.subscription.take())
    };
    if let Some(id) = subscription {
        instance.unsubscribe(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagetext_i18n::{InitOptions, Resources};

    /// Minimal non-scene target.
    #[derive(Default)]
    struct Label {
        text: String,
        destroyed: bool,
        writes: usize,
    }

    impl TextTarget for Label {
        fn set_text(&mut self, text: String) {
            self.text = text;
            self.writes += 1;
        }

        fn is_destroyed(&self) -> bool {
            self.destroyed
        }
    }

    fn loc(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn l10n() -> Rc<Localization> {
        let resources = Resources::from_json_str(
            r#"{
                "en": { "translation": { "hello": "Hello!", "bye": "Bye!" } },
                "es": { "translation": { "hello": "Hola!", "bye": "Adios!" } }
            }"#,
        )
        .unwrap();
        let l10n = Rc::new(Localization::new());
        l10n.init(
            InitOptions::new()
                .with_resources(resources)
                .with_fallback([loc("en")])
                .with_support_notice(false),
        )
        .unwrap();
        l10n
    }

    fn label() -> Rc<RefCell<Label>> {
        Rc::new(RefCell::new(Label::default()))
    }

    #[test]
    fn construct_resolves_immediately() {
        let l10n = l10n();
        let target = label();
        let ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&l10n)))
            .unwrap();
        assert_eq!(target.borrow().text, "Hello!");
        assert!(ctrl.is_subscribed());
        assert_eq!(l10n.subscriber_count(), 1);
    }

    #[test]
    fn locale_change_updates_target() {
        let l10n = l10n();
        let target = label();
        let _ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&l10n)))
            .unwrap();
        l10n.change_locale(loc("es")).unwrap();
        assert_eq!(target.borrow().text, "Hola!");
    }

    #[test]
    fn set_key_updates_synchronously() {
        let l10n = l10n();
        let target = label();
        let ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&l10n)))
            .unwrap();
        ctrl.set_key("bye").unwrap();
        assert_eq!(target.borrow().text, "Bye!");
        assert_eq!(ctrl.key(), "bye");
    }

    #[test]
    fn missing_key_writes_fallback_text() {
        let target = label();
        let _ctrl = I18nController::new(&target, I18nOptions::new("nope", l10n())).unwrap();
        assert_eq!(target.borrow().text, FALLBACK_TEXT);
    }

    #[test]
    fn hook_takes_precedence() {
        let l10n = l10n();
        let target = label();
        let options = I18nOptions::new("hello", Rc::clone(&l10n)).with_hook(|cx, key, locale| {
            assert_eq!(cx.key(), key);
            Ok(cx.instance().translate(key, locale).map(|s| format!("{s}!!")))
        });
        let _ctrl = I18nController::new(&target, options).unwrap();
        assert_eq!(target.borrow().text, "Hello!!!");
        l10n.change_locale(loc("es")).unwrap();
        assert_eq!(target.borrow().text, "Hola!!!");
    }

    #[test]
    fn hook_none_writes_fallback_text() {
        let target = label();
        let options = I18nOptions::new("hello", l10n()).with_hook(|_, _, _| Ok(None));
        let _ctrl = I18nController::new(&target, options).unwrap();
        assert_eq!(target.borrow().text, "undefined");
    }

    #[test]
    fn hook_error_propagates_from_every_trigger() {
        let l10n = l10n();
        let target = label();
        let failing = I18nOptions::new("hello", Rc::clone(&l10n))
            .with_hook(|_, key, _| Err(I18nError::hook(key, "boom")));
        assert!(matches!(
            I18nController::new(&target, failing),
            Err(I18nError::Hook { .. })
        ));
        // the failed controller was dropped and left no subscription behind
        assert_eq!(l10n.subscriber_count(), 0);

        let options = I18nOptions::new("hello", Rc::clone(&l10n)).with_hook(|_, key, locale| {
            if locale.as_str() == "es" {
                Err(I18nError::hook(key, "no spanish"))
            } else {
                Ok(Some(key.to_uppercase()))
            }
        });
        let ctrl = I18nController::new(&target, options).unwrap();
        assert_eq!(target.borrow().text, "HELLO");
        assert!(l10n.change_locale(loc("es")).is_err());
        assert!(ctrl.set_key("bye").is_err());
        assert_eq!(target.borrow().text, "HELLO");
    }

    #[test]
    fn destroyed_target_unsubscribes_without_writing() {
        let l10n = l10n();
        let target = label();
        let ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&l10n)))
            .unwrap();
        let writes = target.borrow().writes;
        target.borrow_mut().destroyed = true;

        l10n.change_locale(loc("es")).unwrap();
        assert!(!ctrl.is_subscribed());
        assert_eq!(l10n.subscriber_count(), 0);
        l10n.change_locale(loc("en")).unwrap();
        assert_eq!(target.borrow().writes, writes);
        assert_eq!(target.borrow().text, "Hello!");
    }

    #[test]
    fn set_key_on_destroyed_target_unsubscribes() {
        let l10n = l10n();
        let target = label();
        let ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&l10n)))
            .unwrap();
        target.borrow_mut().destroyed = true;
        let writes = target.borrow().writes;

        ctrl.set_key("bye").unwrap();
        assert_eq!(ctrl.key(), "bye");
        assert!(!ctrl.is_subscribed());
        assert_eq!(l10n.subscriber_count(), 0);
        assert_eq!(target.borrow().writes, writes);
        assert_eq!(target.borrow().text, "Hello!");
    }

    #[test]
    fn dropped_target_unsubscribes() {
        let l10n = l10n();
        let target = label();
        let ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&l10n)))
            .unwrap();
        drop(target);
        assert!(ctrl.target().is_none());
        l10n.change_locale(loc("es")).unwrap();
        assert!(!ctrl.is_subscribed());
    }

    #[test]
    fn destroy_is_idempotent_and_drop_unsubscribes() {
        let l10n = l10n();
        let target = label();
        let ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&l10n)))
            .unwrap();
        ctrl.destroy();
        ctrl.destroy();
        assert_eq!(l10n.subscriber_count(), 0);

        let ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&l10n)))

            .unwrap();
        assert_eq!(l10n.subscriber_count(), 1);
        drop(ctrl);
        assert_eq!(l10n.subscriber_count(), 0);
    }

    #[test]
    fn set_instance_moves_single_subscription() {
        let first = l10n();
        let second = l10n();
        second.change_locale(loc("es")).unwrap();

        let target = label();
        let ctrl = I18nController::new(&target, I18nOptions::new("hello", Rc::clone(&first)))
            .unwrap();
        ctrl.set_instance(Rc::clone(&second));
        ctrl.set_instance(Rc::clone(&second));
        assert_eq!(first.subscriber_count(), 0);
        assert_eq!(second.subscriber_count(), 1);
        assert!(Rc::ptr_eq(&ctrl.instance(), &second));

        // instance swap alone does not re-resolve
        assert_eq!(target.borrow().text, "Hello!");
        ctrl.refresh().unwrap();
        assert_eq!(target.borrow().text, "Hola!");

        first.change_locale(loc("es")).unwrap();
        second.change_locale(loc("en")).unwrap();
        assert_eq!(target.borrow().text, "Hello!");
    }

    #[test]
    fn shared_instance_controllers_are_independent() {
        let l10n = l10n();
        let a = label();
        let b = label();
        let ctrl_a = I18nController::new(&a, I18nOptions::new("hello", Rc::clone(&l10n))).unwrap();
        let _ctrl_b = I18nController::new(&b, I18nOptions::new("bye", Rc::clone(&l10n))).unwrap();
        assert_eq!(l10n.subscriber_count(), 2);

        ctrl_a.destroy();
        assert_eq!(l10n.subscriber_count(), 1);
        l10n.change_locale(loc("es")).unwrap();
        assert_eq!(a.borrow().text, "Hello!");
        assert_eq!(b.borrow().text, "Adios!");
    }

    #[test]
    fn shared_options_use_thread_default() {
        let opts = I18nOptions::shared("hello");
        assert!(Rc::ptr_eq(&opts.instance, &Localization::shared()));
        assert!(opts.hook.is_none());
    }
}
