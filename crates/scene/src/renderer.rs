use crate::stage::Stage;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the stage and produces output. It never mutates nodes.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the given stage.
    fn render(&self, stage: &Stage) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable dump of every live text node. Useful for CLI
/// output, logging, and testing.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, stage: &Stage) -> String {
        let live: Vec<_> = stage
            .children()
            .iter()
            .map(|c| c.borrow())
            .filter(|t| !t.destroyed())
            .collect();

        let mut out = String::new();
        out.push_str(&format!("=== Stage ({} text nodes) ===\n", live.len()));
        for node in live {
            let p = node.position();
            out.push_str(&format!(
                "  [{}] pos=({:.1}, {:.1}) size={:.0} {:?}\n",
                node.id().short(),
                p.x,
                p.y,
                node.style().font_size,
                node.text()
            ));
        }
        out
    }
}
