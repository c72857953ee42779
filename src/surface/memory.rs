use std::collections::BTreeMap;

use super::{NodeId, Surface};
use crate::{Result, SiteError};

#[derive(Debug, Clone, Default)]
struct MemNode {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    styles: BTreeMap<String, String>,
    attrs: BTreeMap<String, String>,
    value: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    scrolled: usize,
}

/// In-memory element tree. Lookups only see nodes attached under the root.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    nodes: Vec<MemNode>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            nodes: vec![MemNode {
                tag: "body".into(),
                ..MemNode::default()
            }],
        }
    }

    /// Add a pre-existing page element under the root, as static HTML would.
    pub fn seed(&mut self, tag: &str, id: Option<&str>, classes: &[&str], text: &str) -> NodeId {
        let idx = self.nodes.len();
        self.nodes.push(MemNode {
            tag: tag.into(),
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            text: text.into(),
            parent: Some(0),
            ..MemNode::default()
        });
        self.nodes[0].children.push(idx);
        idx
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cur = node;
        loop {
            if cur == 0 {
                return true;
            }
            match self.nodes.get(cur).and_then(|n| n.parent) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    /// How many times `scroll_to_end` hit this node.
    pub fn scroll_count(&self, node: NodeId) -> usize {
        self.nodes.get(node).map(|n| n.scrolled).unwrap_or(0)
    }

    fn node(&self, id: NodeId) -> Result<&MemNode> {
        self.nodes.get(id).ok_or(SiteError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemNode> {
        self.nodes.get_mut(id).ok_or(SiteError::StaleNode(id))
    }

    fn walk(&self, from: NodeId, out: &mut Vec<NodeId>) {
        out.push(from);
        for &c in &self.nodes[from].children {
            self.walk(c, out);
        }
    }

    fn attached(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(0, &mut out);
        out
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(p) = self.nodes[node].parent.take() {
            self.nodes[p].children.retain(|&c| c != node);
        }
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId, front: bool) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == 0 || parent == child {
            return Err(SiteError::Js("cannot move the root or nest a node in itself".into()));
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        if front {
            self.nodes[parent].children.insert(0, child);
        } else {
            self.nodes[parent].children.push(child);
        }
        Ok(())
    }
}

impl Surface for MemorySurface {
    fn root(&self) -> NodeId {
        0
    }

    fn by_id(&mut self, id: &str) -> Option<NodeId> {
        self.attached()
            .into_iter()
            .find(|&n| self.nodes[n].id.as_deref() == Some(id))
    }

    fn by_class(&mut self, class: &str) -> Vec<NodeId> {
        self.attached()
            .into_iter()
            .filter(|&n| self.nodes[n].classes.iter().any(|c| c == class))
            .collect()
    }

    fn create(&mut self, tag: &str) -> Result<NodeId> {
        self.nodes.push(MemNode {
            tag: tag.into(),
            ..MemNode::default()
        });
        Ok(self.nodes.len() - 1)
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.adopt(parent, child, false)
    }

    fn prepend(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.adopt(parent, child, true)
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        self.detach(node);
        Ok(())
    }

    fn set_id(&mut self, node: NodeId, id: &str) -> Result<()> {
        self.node_mut(node)?.id = Some(id.into());
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.node_mut(node)?.attrs.insert(name.into(), value.into());
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        // textContent replaces any children
        for c in self.children(node) {
            self.detach(c);
        }
        self.node_mut(node)?.text = text.into();
        Ok(())
    }

    fn text(&self, node: NodeId) -> Result<String> {
        let n = self.node(node)?;
        let mut out = n.text.clone();
        for &c in &n.children {
            out.push_str(&self.text(c)?);
        }
        Ok(out)
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        let n = self.node_mut(node)?;
        if !n.classes.iter().any(|c| c == class) {
            n.classes.push(class.into());
        }
        Ok(())
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        self.node_mut(node)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> Result<bool> {
        Ok(self.node(node)?.classes.iter().any(|c| c == class))
    }

    fn set_style(&mut self, node: NodeId, prop: &str, value: &str) -> Result<()> {
        let n = self.node_mut(node)?;
        if value.is_empty() {
            n.styles.remove(prop);
        } else {
            n.styles.insert(prop.into(), value.into());
        }
        Ok(())
    }

    fn style(&self, node: NodeId, prop: &str) -> Result<Option<String>> {
        Ok(self.node(node)?.styles.get(prop).cloned())
    }

    fn input_value(&self, node: NodeId) -> Result<String> {
        Ok(self.node(node)?.value.clone())
    }

    fn set_input_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        self.node_mut(node)?.value = value.into();
        Ok(())
    }

    fn scroll_to_end(&mut self, node: NodeId) -> Result<()> {
        self.node_mut(node)?.scrolled += 1;
        Ok(())
    }
}
