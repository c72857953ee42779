use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use super::{NodeId, Surface};
use crate::{Result, SiteError};

/// Surface over the live document, rooted at a container element.
///
/// Elements are interned into a handle table the first time they are created
/// or looked up; handle 0 is the root. Removing an element tombstones its slot
/// and those of its interned descendants, so detached nodes are not kept
/// alive and old handles report [`SiteError::StaleNode`]. Handles are never
/// reused.
pub struct DomSurface {
    doc: Document,
    nodes: Vec<Option<Element>>,
}

impl DomSurface {
    pub fn new(doc: Document, root: Element) -> Self {
        Self {
            doc,
            nodes: vec![Some(root)],
        }
    }

    /// Root the surface at `document.body`.
    pub fn from_body() -> Result<Self> {
        let doc = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SiteError::MissingElement("document".into()))?;
        let body: Element = doc
            .body()
            .ok_or_else(|| SiteError::MissingElement("body".into()))?
            .into();
        Ok(Self::new(doc, body))
    }

    /// Raw element behind a handle, for glue that needs the real DOM type
    /// (canvas contexts, event listeners).
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node).and_then(Option::as_ref)
    }

    /// Number of live handles.
    pub fn live_handles(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    fn get(&self, node: NodeId) -> Result<&Element> {
        self.element(node).ok_or(SiteError::StaleNode(node))
    }

    fn html(&self, node: NodeId) -> Result<&HtmlElement> {
        self.get(node)?
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| SiteError::Js(format!("node {node} is not an HTML element")))
    }

    fn input(&self, node: NodeId) -> Result<&HtmlInputElement> {
        self.get(node)?
            .dyn_ref::<HtmlInputElement>()
            .ok_or_else(|| SiteError::Js(format!("node {node} is not an input")))
    }

    fn intern(&mut self, el: Element) -> NodeId {
        if let Some(pos) = self.nodes.iter().position(|e| e.as_ref() == Some(&el)) {
            return pos;
        }
        self.nodes.push(Some(el));
        self.nodes.len() - 1
    }

    /// Drop `removed` and everything under it from the table.
    fn forget_subtree(&mut self, removed: &Element) {
        for slot in &mut self.nodes {
            if slot.as_ref().is_some_and(|el| removed.contains(Some(&**el))) {
                *slot = None;
            }
        }
    }
}

impl Surface for DomSurface {
    fn root(&self) -> NodeId {
        0
    }

    fn by_id(&mut self, id: &str) -> Option<NodeId> {
        let root = self.element(0)?;
        if root.id() == id {
            return Some(0);
        }
        let el = root.query_selector(&format!("#{id}")).ok().flatten()?;
        Some(self.intern(el))
    }

    fn by_class(&mut self, class: &str) -> Vec<NodeId> {
        let Some(Ok(list)) = self
            .element(0)
            .map(|root| root.query_selector_all(&format!(".{class}")))
        else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                out.push(self.intern(el));
            }
        }
        out
    }

    fn create(&mut self, tag: &str) -> Result<NodeId> {
        let el = self.doc.create_element(tag)?;
        self.nodes.push(Some(el));
        Ok(self.nodes.len() - 1)
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?.append_child(self.get(child)?)?;
        Ok(())
    }

    fn prepend(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent = self.get(parent)?;
        parent.insert_before(self.get(child)?, parent.first_child().as_ref())?;
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        let el = self.get(node)?.clone();
        el.remove();
        self.forget_subtree(&el);
        Ok(())
    }

    fn set_id(&mut self, node: NodeId, id: &str) -> Result<()> {
        self.get(node)?.set_id(id);
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.get(node)?.set_attribute(name, value)?;
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.get(node)?.set_text_content(Some(text));
        Ok(())
    }

    fn text(&self, node: NodeId) -> Result<String> {
        Ok(self.get(node)?.text_content().unwrap_or_default())
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        self.get(node)?.class_list().add_1(class)?;
        Ok(())
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        self.get(node)?.class_list().remove_1(class)?;
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> Result<bool> {
        Ok(self.get(node)?.class_list().contains(class))
    }

    fn set_style(&mut self, node: NodeId, prop: &str, value: &str) -> Result<()> {
        self.html(node)?.style().set_property(prop, value)?;
        Ok(())
    }

    fn style(&self, node: NodeId, prop: &str) -> Result<Option<String>> {
        let v = self.html(node)?.style().get_property_value(prop)?;
        Ok(if v.is_empty() { None } else { Some(v) })
    }

    fn input_value(&self, node: NodeId) -> Result<String> {
        Ok(self.input(node)?.value())
    }

    fn set_input_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        self.input(node)?.set_value(value);
        Ok(())
    }

    fn scroll_to_end(&mut self, node: NodeId) -> Result<()> {
        let el = self.get(node)?;
        el.set_scroll_top(el.scroll_height());
        Ok(())
    }
}
