use crate::stage::Stage;
use glam::Vec2;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Error type returned by plugin initialization.
pub type PluginError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from application lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("plugin {0:?} is already registered")]
    DuplicatePlugin(&'static str),
    #[error("plugin {name:?} failed to initialize: {source}")]
    PluginInit {
        name: &'static str,
        #[source]
        source: PluginError,
    },
    #[error("application is already initialized")]
    AlreadyInitialized,
}

/// An application lifecycle extension.
///
/// Plugins are registered with [`Extensions::add`] and run by
/// [`Application::init`]. They typically read their own option struct from
/// [`ApplicationOptions`] and install a resource on the application.
pub trait ApplicationPlugin {
    /// Unique registry name.
    fn name(&self) -> &'static str;

    /// Called once per application during [`Application::init`].
    fn init(&self, app: &mut Application, options: &ApplicationOptions) -> Result<(), PluginError>;

    /// Called during [`Application::destroy`], in reverse registration order.
    fn destroy(&self, _app: &mut Application) {}
}

/// Registry of application plugins.
///
/// Bootstrap code registers plugins explicitly before creating applications.
#[derive(Default, Clone)]
pub struct Extensions {
    plugins: Vec<Rc<dyn ApplicationPlugin>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. Names must be unique.
    pub fn add(&mut self, plugin: impl ApplicationPlugin + 'static) -> Result<(), SceneError> {
        if self.contains(plugin.name()) {
            return Err(SceneError::DuplicatePlugin(plugin.name()));
        }
        tracing::debug!(plugin = plugin.name(), "plugin registered");
        self.plugins.push(Rc::new(plugin));
        Ok(())
    }

    /// Unregister a plugin by name. Returns `true` if it was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.name() != name);
        self.plugins.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    /// Registered plugin names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Options passed to [`Application::init`].
///
/// Besides the host's own fields, options carry one typed value per plugin
/// (see [`with`](Self::with) and [`get`](Self::get)).
pub struct ApplicationOptions {
    pub size: Vec2,
    /// RGBA clear color.
    pub background: [f32; 4],
    plugin_options: HashMap<TypeId, Box<dyn Any>>,
}

impl Default for ApplicationOptions {
    fn default() -> Self {
        Self {
            size: Vec2::new(800.0, 600.0),
            background: [0.0, 0.0, 0.0, 1.0],
            plugin_options: HashMap::new(),
        }
    }
}

impl ApplicationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Attach a plugin option value, replacing any previous value of `T`.
    pub fn with<T: 'static>(mut self, value: T) -> Self {
        self.plugin_options.insert(TypeId::of::<T>(), Box::new(value));
        self
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.plugin_options
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }
}

impl fmt::Debug for ApplicationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationOptions")
            .field("size", &self.size)
            .field("background", &self.background)
            .field("plugin_options", &self.plugin_options.len())
            .finish()
    }
}

/// The host's top-level object: owns the stage, the initialized plugins and
/// any resources those plugins attach.
pub struct Application {
    stage: Stage,
    size: Vec2,
    background: [f32; 4],
    plugins: Vec<Rc<dyn ApplicationPlugin>>,
    resources: HashMap<TypeId, Box<dyn Any>>,
    initialized: bool,
}

impl Application {
    pub fn new() -> Self {
        let defaults = ApplicationOptions::default();
        Self {
            stage: Stage::new(),
            size: defaults.size,
            background: defaults.background,
            plugins: Vec::new(),
            resources: HashMap::new(),
            initialized: false,
        }
    }

    /// Initialize the application and run every registered plugin's `init`,
    /// in registration order. The first plugin error aborts init; plugins that
    /// already ran are destroyed in reverse order, so a retry starts clean.
    pub fn init(
        &mut self,
        extensions: &Extensions,
        options: ApplicationOptions,
    ) -> Result<(), SceneError> {
        if self.initialized {
            return Err(SceneError::AlreadyInitialized);
        }
        self.size = options.size;
        self.background = options.background;

        let mut ready: Vec<Rc<dyn ApplicationPlugin>> = Vec::with_capacity(extensions.len());
        for plugin in &extensions.plugins {
            tracing::debug!(plugin = plugin.name(), "initializing plugin");
            if let Err(source) = plugin.init(self, &options) {
                tracing::debug!(
                    plugin = plugin.name(),
                    rolled_back = ready.len(),
                    "plugin init failed"
                );
                for done in ready.iter().rev() {
                    done.destroy(self);
                }
                return Err(SceneError::PluginInit {
                    name: plugin.name(),
                    source,
                });
            }
            ready.push(Rc::clone(plugin));
        }
        self.plugins = ready;
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn background(&self) -> [f32; 4] {
        self.background
    }

    /// Attach a resource, returning the previous value of the same type.
    pub fn insert_resource<T: 'static>(&mut self, value: T) -> Option<T> {
        self.resources
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn resource<T: 'static>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    pub fn remove_resource<T: 'static>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    /// Tear down plugins in reverse order and destroy the stage.
    pub fn destroy(&mut self) {
        let plugins = std::mem::take(&mut self.plugins);
        for plugin in plugins.iter().rev() {
            tracing::debug!(plugin = plugin.name(), "destroying plugin");
            plugin.destroy(self);
        }
        self.stage.destroy();
        self.initialized = false;
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("size", &self.size)
            .field("nodes", &self.stage.len())
            .field("plugins", &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("resources", &self.resources.len())
            .field("initialized", &self.initialized)
            .finish()
    }
}
