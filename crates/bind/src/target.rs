use stagetext_scene::Text;

/// Minimal capability a type needs to display localized text.
pub trait TextTarget {
    /// Replace the displayed text.
    fn set_text(&mut self, text: String);

    /// Whether the target has been torn down. Controllers stop updating and
    /// unsubscribe once this returns `true`.
    fn is_destroyed(&self) -> bool;
}

impl TextTarget for Text {
    fn set_text(&mut self, text: String) {
        Text::set_text(self, text);
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed()
    }
}
