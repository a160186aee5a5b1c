use stagetext_i18n::{InitOptions, Localization};
use stagetext_scene::{
    Application, ApplicationOptions, ApplicationPlugin, Extensions, PluginError, SceneError,
};
use std::rc::Rc;

/// Per-application options read by [`I18nPlugin`].
///
/// Pass them with `ApplicationOptions::with(I18nAppOptions { .. })`.
#[derive(Debug, Clone, Default)]
pub struct I18nAppOptions {
    /// Forwarded to [`Localization::init`] on top of the plugin's baseline.
    pub init: InitOptions,
    /// Instance to attach. Defaults to [`Localization::shared`].
    pub instance: Option<Rc<Localization>>,
}

impl I18nAppOptions {
    pub fn new(init: InitOptions) -> Self {
        Self {
            init,
            instance: None,
        }
    }

    pub fn with_instance(mut self, instance: Rc<Localization>) -> Self {
        self.instance = Some(instance);
        self
    }
}

/// Application resource holding the attached localization instance.
#[derive(Debug, Clone)]
pub struct AppLocalization(pub Rc<Localization>);

/// Application plugin attaching a [`Localization`] to every application it
/// initializes.
///
/// On init it attaches the instance from [`I18nAppOptions`] (or the shared
/// one) and initializes it with `show_support_notice = false` overlaid by the
/// caller's [`InitOptions`]. Init errors propagate unchanged as the plugin's
/// error.
#[derive(Debug, Clone, Copy, Default)]
pub struct I18nPlugin;

impl I18nPlugin {
    pub const NAME: &'static str = "i18n";

    fn baseline() -> InitOptions {
        InitOptions::new().with_support_notice(false)
    }
}

impl ApplicationPlugin for I18nPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&self, app: &mut Application, options: &ApplicationOptions) -> Result<(), PluginError> {
        let app_options = options.get::<I18nAppOptions>();
        let instance = app_options
            .and_then(|o| o.instance.clone())
            .unwrap_or_else(Localization::shared);
        let init = Self::baseline().merge(app_options.map(|o| o.init.clone()).unwrap_or_default());

        tracing::debug!(
            custom_instance = app_options.is_some_and(|o| o.instance.is_some()),
            "attaching localization to application"
        );
        app.insert_resource(AppLocalization(Rc::clone(&instance)));
        instance.init(init)?;
        Ok(())
    }

    fn destroy(&self, app: &mut Application) {
        app.remove_resource::<AppLocalization>();
    }
}

/// Register [`I18nPlugin`] with an extension registry.
pub fn register(extensions: &mut Extensions) -> Result<(), SceneError> {
    extensions.add(I18nPlugin)
}

/// Access to the localization instance attached by [`I18nPlugin`].
pub trait ApplicationI18nExt {
    /// The attached instance, or `None` if the plugin has not run.
    fn i18n(&self) -> Option<Rc<Localization>>;
}

impl ApplicationI18nExt for Application {
    fn i18n(&self) -> Option<Rc<Localization>> {
        self.resource::<AppLocalization>().map(|r| Rc::clone(&r.0))
    }
}
