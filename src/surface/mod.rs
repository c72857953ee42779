//! The page as components see it.
//!
//! Components never reach for `document` directly; they mount against a
//! [`Surface`] rooted at an injected container. [`DomSurface`] wraps the live
//! document, [`MemorySurface`] is a small node tree for running components off
//! the browser.

mod dom;
mod memory;

pub use dom::DomSurface;
pub use memory::MemorySurface;

use crate::Result;

/// Handle to a node owned by a surface.
pub type NodeId = usize;

pub trait Surface {
    /// The injected container (the `<body>` in production).
    fn root(&self) -> NodeId;

    /// First attached element with this id.
    fn by_id(&mut self, id: &str) -> Option<NodeId>;
    /// Every attached element carrying `class`, in document order.
    fn by_class(&mut self, class: &str) -> Vec<NodeId>;

    fn create(&mut self, tag: &str) -> Result<NodeId>;
    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()>;
    fn prepend(&mut self, parent: NodeId, child: NodeId) -> Result<()>;
    /// Detach `node` from the tree.
    fn remove(&mut self, node: NodeId) -> Result<()>;

    fn set_id(&mut self, node: NodeId, id: &str) -> Result<()>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()>;
    fn text(&self, node: NodeId) -> Result<String>;

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()>;
    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()>;
    fn has_class(&self, node: NodeId, class: &str) -> Result<bool>;

    fn set_style(&mut self, node: NodeId, prop: &str, value: &str) -> Result<()>;
    fn style(&self, node: NodeId, prop: &str) -> Result<Option<String>>;

    fn input_value(&self, node: NodeId) -> Result<String>;
    fn set_input_value(&mut self, node: NodeId, value: &str) -> Result<()>;

    /// Scroll a container so its last child is visible.
    fn scroll_to_end(&mut self, node: NodeId) -> Result<()>;

    fn exists(&mut self, id: &str) -> bool {
        self.by_id(id).is_some()
    }

    /// Create `<tag>` under `parent` with optional id, class list and text.
    fn spawn(
        &mut self,
        parent: NodeId,
        tag: &str,
        id: Option<&str>,
        classes: &[&str],
        text: Option<&str>,
    ) -> Result<NodeId> {
        let node = self.create(tag)?;
        if let Some(id) = id {
            self.set_id(node, id)?;
        }
        for class in classes {
            self.add_class(node, class)?;
        }
        if let Some(text) = text {
            self.set_text(node, text)?;
        }
        self.append(parent, node)?;
        Ok(node)
    }
}

/// Lifecycle shared by every feature on the page.
pub trait Component {
    fn name(&self) -> &'static str;
    /// Build DOM and start reacting. Mounting twice must be harmless.
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<()>;
    /// Tear down whatever `mount` created.
    fn unmount(&mut self, surface: &mut dyn Surface) -> Result<()>;
    fn is_mounted(&self) -> bool;
}
