use crate::text::Text;
use stagetext_common::NodeId;
use std::cell::RefCell;
use std::rc::Rc;

/// Root container of the scene: an ordered list of shared text nodes.
///
/// Nodes are shared (`Rc<RefCell<Text>>`) so that controllers elsewhere can
/// update their text while the stage keeps them in draw order.
#[derive(Debug, Default)]
pub struct Stage {
    children: Vec<Rc<RefCell<Text>>>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. Adding the same node twice is a no-op.
    pub fn add_child(&mut self, node: Rc<RefCell<Text>>) {
        if !self.children.iter().any(|c| Rc::ptr_eq(c, &node)) {
            self.children.push(node);
        }
    }

    /// Remove a node by id. Returns the node if it was on the stage.
    pub fn remove_child(&mut self, id: NodeId) -> Option<Rc<RefCell<Text>>> {
        let idx = self.children.iter().position(|c| c.borrow().id() == id)?;
        Some(self.children.remove(idx))
    }

    pub fn children(&self) -> &[Rc<RefCell<Text>>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Drop destroyed nodes from the stage. Returns how many were removed.
    pub fn prune_destroyed(&mut self) -> usize {
        let before = self.children.len();
        self.children.retain(|c| !c.borrow().destroyed());
        before - self.children.len()
    }

    /// Destroy and detach every node.
    pub fn destroy(&mut self) {
        for child in self.children.drain(..) {
            child.borrow_mut().destroy();
        }
    }
}
