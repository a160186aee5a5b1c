use crate::controller::{I18nController, I18nOptions};
use crate::target::TextTarget;
use stagetext_i18n::I18nError;
use std::cell::RefCell;
use std::rc::Rc;

/// A target paired with the controller that keeps its text localized.
///
/// The target keeps its own type; the pair only adds the controller next to
/// it. Dropping the pair (or calling [`destroy`](Self::destroy)) ends the
/// subscription but leaves the target alive for other owners.
#[derive(Debug)]
pub struct Localized<T: TextTarget + 'static> {
    target: Rc<RefCell<T>>,
    i18n: I18nController<T>,
}

/// Attach a localization controller to any [`TextTarget`].
///
/// The target's text is resolved for the current locale before this returns.
pub fn attach<T: TextTarget + 'static>(
    target: Rc<RefCell<T>>,
    options: I18nOptions,
) -> Result<Localized<T>, I18nError> {
    let i18n = I18nController::new(&target, options)?;
    Ok(Localized { target, i18n })
}

impl<T: TextTarget + 'static> Localized<T> {
    pub fn target(&self) -> &Rc<RefCell<T>> {
        &self.target
    }

    pub fn i18n(&self) -> &I18nController<T> {
        &self.i18n
    }

    pub fn destroy(&self) {
        self.i18n.destroy();
    }

    /// Split into the target and its controller.
    pub fn into_parts(self) -> (Rc<RefCell<T>>, I18nController<T>) {
        (self.target, self.i18n)
    }
}
