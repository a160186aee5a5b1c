use crate::controller::{HookContext, I18nController, I18nOptions};
use glam::Vec2;
use stagetext_i18n::{I18nError, Locale, Localization};
use stagetext_scene::{Text, TextStyle};
use std::cell::RefCell;
use std::rc::Rc;

/// Options for [`I18nText`]: localization options plus the node's look.
#[derive(Debug, Clone)]
pub struct I18nTextOptions {
    pub i18n: I18nOptions,
    pub style: TextStyle,
    pub position: Vec2,
}

impl I18nTextOptions {
    pub fn new(key: impl Into<String>, instance: Rc<Localization>) -> Self {
        Self::from(I18nOptions::new(key, instance))
    }

    /// Options bound to the thread's shared [`Localization`].
    pub fn shared(key: impl Into<String>) -> Self {
        Self::from(I18nOptions::shared(key))
    }

    pub fn with_hook(
        mut self,
        hook: impl Fn(&HookContext<'_>, &str, &Locale) -> Result<Option<String>, I18nError>
            + 'static,
    ) -> Self {
        self.i18n = self.i18n.with_hook(hook);
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }
}

impl From<I18nOptions> for I18nTextOptions {
    fn from(i18n: I18nOptions) -> Self {
        Self {
            i18n,
            style: TextStyle::default(),
            position: Vec2::ZERO,
        }
    }
}

/// A scene text node whose text follows the active locale.
///
/// The node itself is a plain shared [`Text`], so it can be put on a stage
/// with [`node`](Self::node). Destroying the `I18nText` destroys both the
/// node and its controller.
#[derive(Debug)]
pub struct I18nText {
    node: Rc<RefCell<Text>>,
    controller: I18nController<Text>,
}

impl I18nText {
    /// Create the node and resolve its text for the current locale.
    pub fn new(options: I18nTextOptions) -> Result<Self, I18nError> {
        let node = Rc::new(RefCell::new(
            Text::new("")
                .with_style(options.style)
                .with_position(options.position),
        ));
        let controller = I18nController::new(&node, options.i18n)?;
        Ok(Self { node, controller })
    }

    /// The underlying scene node.
    pub fn node(&self) -> &Rc<RefCell<Text>> {
        &self.node
    }

    /// Currently displayed text.
    pub fn text(&self) -> String {
        self.node.borrow().text().to_string()
    }

    pub fn key(&self) -> String {
        self.controller.key()
    }

    pub fn set_key(&self, key: impl Into<String>) -> Result<(), I18nError> {
        self.controller.set_key(key)
    }

    pub fn i18n_instance(&self) -> Rc<Localization> {
        self.controller.instance()
    }

    pub fn set_i18n_instance(&self, instance: Rc<Localization>) {
        self.controller.set_instance(instance);
    }

    pub fn controller(&self) -> &I18nController<Text> {
        &self.controller
    }

    pub fn destroyed(&self) -> bool {
        self.node.borrow().destroyed()
    }

    pub fn destroy(&self) {
        self.controller.destroy();
        self.node.borrow_mut().destroy();
    }
}
