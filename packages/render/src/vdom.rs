use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Virtual DOM node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// HTML element
    Element {
        tag: String,
        attributes: HashMap<String, String>,
        styles: HashMap<String, String>,
        children: Vec<VNode>,
    },

    /// Text node
    Text { content: String },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: HashMap::new(),
            styles: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element { ref mut styles, .. } = self {
            styles.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            VNode::Text { .. } => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            VNode::Text { .. } => None,
        }
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        match self {
            VNode::Element { styles, .. } => styles.get(name).map(String::as_str),
            VNode::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            VNode::Text { .. } => &[],
        }
    }

    /// Concatenated text content of the subtree.
    pub fn text_content(&self) -> String {
        match self {
            VNode::Text { content } => content.clone(),
            VNode::Element { children, .. } => {
                children.iter().map(VNode::text_content).collect()
            }
        }
    }
}

/// Virtual document: the rendered roots of an editor document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VDocument {
    pub nodes: Vec<VNode>,
}

impl VDocument {
    pub fn new(nodes: Vec<VNode>) -> Self {
        VDocument { nodes }
    }

    /// Every element in the document, depth first.
    pub fn elements(&self) -> Vec<&VNode> {
        fn collect<'a>(node: &'a VNode, out: &mut Vec<&'a VNode>) {
            if matches!(node, VNode::Element { .. }) {
                out.push(node);
            }
            for child in node.children() {
                collect(child, out);
            }
        }
        let mut out = Vec::new();
        for node in &self.nodes {
            collect(node, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_compose() {
        let node = VNode::element("a")
            .with_attr("href", "https://example.com")
            .with_style("color", "#0000ee")
            .with_child(VNode::text("link"));
        assert_eq!(node.tag(), Some("a"));
        assert_eq!(node.attribute("href"), Some("https://example.com"));
        assert_eq!(node.style("color"), Some("#0000ee"));
        assert_eq!(node.text_content(), "link");
    }

    #[test]
    fn serializes_with_a_type_tag() {
        let json = serde_json::to_value(VNode::text("hi")).unwrap();
        assert_eq!(json["type"], "Text");
        assert_eq!(json["content"], "hi");
    }
}
