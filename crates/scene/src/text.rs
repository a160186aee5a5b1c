use glam::Vec2;
use stagetext_common::NodeId;

/// Visual style of a text node.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    /// RGBA fill color.
    pub fill: [f32; 4],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            font_size: 26.0,
            fill: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// A text node on the stage.
///
/// Once destroyed a node keeps its last text but is skipped by renderers and
/// removed by [`Stage::prune_destroyed`](crate::Stage::prune_destroyed).
#[derive(Debug, Clone)]
pub struct Text {
    id: NodeId,
    text: String,
    position: Vec2,
    style: TextStyle,
    destroyed: bool,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            text: text.into(),
            position: Vec2::ZERO,
            style: TextStyle::default(),
            destroyed: false,
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut TextStyle {
        &mut self.style
    }

    pub fn destroyed(&self) -> bool {
        self.destroyed
    }

    /// Mark the node destroyed. Idempotent.
    pub fn destroy(&mut self) {
        if !self.destroyed {
            tracing::trace!(node = %self.id.short(), "text node destroyed");
            self.destroyed = true;
        }
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new("")
    }
}
