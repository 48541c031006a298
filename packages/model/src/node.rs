//! Document tree node types.
//!
//! A document is a vector of block-level [`Node`]s. Every node is either an
//! [`Element`] (typed container) or a [`Text`] leaf. The element union is a
//! closed sum: the set of kinds is fixed at compile time and serializes with
//! a `"type"` tag in kebab-case, so the serde form doubles as the persisted
//! document schema.

use serde::{Deserialize, Serialize};

use crate::text::Text;

/// Horizontal alignment for block-level elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }
}

impl std::fmt::Display for Align {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Align {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            "justify" => Ok(Align::Justify),
            _ => Err(()),
        }
    }
}

/// Float position for inline images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Float {
    Left,
    Right,
}

/// Where an image's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Local,
    Remote,
}

/// A node in the document tree: an element or a text leaf.
///
/// Untagged on the wire: an object carrying `"type"` is an element, one
/// carrying `"text"` is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    /// Element kind, if this node is an element.
    pub fn kind(&self) -> Option<ElementKind> {
        self.as_element().map(Element::kind)
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        self.as_element().map(Element::children)
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        self.as_element_mut().map(Element::children_mut)
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

/// Typed element node. The variant IS the `"type"` field of the wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Element {
    Paragraph {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lock: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        draggable: Option<bool>,
        #[serde(default)]
        children: Vec<Node>,
    },

    HeadingOne {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    HeadingTwo {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    HeadingThree {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    HeadingFour {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    HeadingFive {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    HeadingSix {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    BlockQuote {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    BulletedList {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    NumberedList {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    ListItem {
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    CheckListItem {
        #[serde(default)]
        checked: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    /// Inline wrapper around text leaves.
    Link {
        url: String,
        #[serde(default)]
        children: Vec<Node>,
    },

    /// Void: carries exactly one empty text child.
    Image {
        source: ImageSource,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        inline: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        float: Option<Float>,
        #[serde(skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default)]
        children: Vec<Node>,
    },

    /// Void: carries exactly one empty text child.
    Video {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        inline: Option<bool>,
        #[serde(default)]
        children: Vec<Node>,
    },

    /// Void: carries exactly one empty text child.
    Audio {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        inline: Option<bool>,
        #[serde(default)]
        children: Vec<Node>,
    },

    /// Void: carries exactly one empty text child.
    Formula {
        latex: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        inline: Option<bool>,
        #[serde(default)]
        children: Vec<Node>,
    },

    Table {
        #[serde(default)]
        children: Vec<Node>,
    },

    TableRow {
        #[serde(default)]
        children: Vec<Node>,
    },

    TableCell {
        #[serde(default)]
        children: Vec<Node>,
    },
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Paragraph { .. } => ElementKind::Paragraph,
            Element::HeadingOne { .. } => ElementKind::HeadingOne,
            Element::HeadingTwo { .. } => ElementKind::HeadingTwo,
            Element::HeadingThree { .. } => ElementKind::HeadingThree,
            Element::HeadingFour { .. } => ElementKind::HeadingFour,
            Element::HeadingFive { .. } => ElementKind::HeadingFive,
            Element::HeadingSix { .. } => ElementKind::HeadingSix,
            Element::BlockQuote { .. } => ElementKind::BlockQuote,
            Element::BulletedList { .. } => ElementKind::BulletedList,
            Element::NumberedList { .. } => ElementKind::NumberedList,
            Element::ListItem { .. } => ElementKind::ListItem,
            Element::CheckListItem { .. } => ElementKind::CheckListItem,
            Element::Link { .. } => ElementKind::Link,
            Element::Image { .. } => ElementKind::Image,
            Element::Video { .. } => ElementKind::Video,
            Element::Audio { .. } => ElementKind::Audio,
            Element::Formula { .. } => ElementKind::Formula,
            Element::Table { .. } => ElementKind::Table,
            Element::TableRow { .. } => ElementKind::TableRow,
            Element::TableCell { .. } => ElementKind::TableCell,
        }
    }

    pub fn children(&self) -> &Vec<Node> {
        match self {
            Element::Paragraph { children, .. }
            | Element::HeadingOne { children, .. }
            | Element::HeadingTwo { children, .. }
            | Element::HeadingThree { children, .. }
            | Element::HeadingFour { children, .. }
            | Element::HeadingFive { children, .. }
            | Element::HeadingSix { children, .. }
            | Element::BlockQuote { children, .. }
            | Element::BulletedList { children, .. }
            | Element::NumberedList { children, .. }
            | Element::ListItem { children, .. }
            | Element::CheckListItem { children, .. }
            | Element::Link { children, .. }
            | Element::Image { children, .. }
            | Element::Video { children, .. }
            | Element::Audio { children, .. }
            | Element::Formula { children, .. }
            | Element::Table { children, .. }
            | Element::TableRow { children, .. }
            | Element::TableCell { children, .. } => children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        match self {
            Element::Paragraph { children, .. }
            | Element::HeadingOne { children, .. }
            | Element::HeadingTwo { children, .. }
            | Element::HeadingThree { children, .. }
            | Element::HeadingFour { children, .. }
            | Element::HeadingFive { children, .. }
            | Element::HeadingSix { children, .. }
            | Element::BlockQuote { children, .. }
            | Element::BulletedList { children, .. }
            | Element::NumberedList { children, .. }
            | Element::ListItem { children, .. }
            | Element::CheckListItem { children, .. }
            | Element::Link { children, .. }
            | Element::Image { children, .. }
            | Element::Video { children, .. }
            | Element::Audio { children, .. }
            | Element::Formula { children, .. }
            | Element::Table { children, .. }
            | Element::TableRow { children, .. }
            | Element::TableCell { children, .. } => children,
        }
    }

    pub fn align(&self) -> Option<Align> {
        match self {
            Element::Paragraph { align, .. }
            | Element::HeadingOne { align, .. }
            | Element::HeadingTwo { align, .. }
            | Element::HeadingThree { align, .. }
            | Element::HeadingFour { align, .. }
            | Element::HeadingFive { align, .. }
            | Element::HeadingSix { align, .. }
            | Element::BlockQuote { align, .. }
            | Element::BulletedList { align, .. }
            | Element::NumberedList { align, .. }
            | Element::ListItem { align, .. }
            | Element::CheckListItem { align, .. }
            | Element::Image { align, .. } => *align,
            _ => None,
        }
    }

    /// The `lock` flag. Only paragraphs carry one.
    pub fn lock(&self) -> Option<bool> {
        match self {
            Element::Paragraph { lock, .. } => *lock,
            _ => None,
        }
    }

    /// The `draggable` flag. Only paragraphs carry one.
    pub fn draggable(&self) -> Option<bool> {
        match self {
            Element::Paragraph { draggable, .. } => *draggable,
            _ => None,
        }
    }

    /// The `inline` attribute, where the kind carries one.
    fn inline_flag(&self) -> Option<bool> {
        match self {
            Element::Image { inline, .. }
            | Element::Video { inline, .. }
            | Element::Audio { inline, .. }
            | Element::Formula { inline, .. } => *inline,
            _ => None,
        }
    }

    /// Whether this element flows inline with text. Links always do; media
    /// and formula elements do when their `inline` flag is set.
    pub fn is_inline(&self) -> bool {
        self.kind() == ElementKind::Link || self.inline_flag() == Some(true)
    }

    /// Void elements render from their own fields and carry exactly one
    /// empty text child as a caret anchor.
    pub fn is_void(&self) -> bool {
        self.kind().is_void()
    }

    /// Serde view of the element, used for generic field access and
    /// property patching.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Element> {
        serde_json::from_value(value)
    }

    /// Single field of the serde view, by wire name.
    pub fn field(&self, name: &str) -> Option<serde_json::Value> {
        match self.to_value() {
            Ok(serde_json::Value::Object(map)) => map.get(name).cloned(),
            _ => None,
        }
    }

    /// Element of the given kind with empty children and default fields.
    pub fn empty_of_kind(kind: ElementKind) -> Element {
        match kind {
            ElementKind::Paragraph => Element::paragraph(vec![]),
            ElementKind::HeadingOne => Element::HeadingOne { align: None, children: vec![] },
            ElementKind::HeadingTwo => Element::HeadingTwo { align: None, children: vec![] },
            ElementKind::HeadingThree => Element::HeadingThree { align: None, children: vec![] },
            ElementKind::HeadingFour => Element::HeadingFour { align: None, children: vec![] },
            ElementKind::HeadingFive => Element::HeadingFive { align: None, children: vec![] },
            ElementKind::HeadingSix => Element::HeadingSix { align: None, children: vec![] },
            ElementKind::BlockQuote => Element::BlockQuote { align: None, children: vec![] },
            ElementKind::BulletedList => Element::BulletedList { align: None, children: vec![] },
            ElementKind::NumberedList => Element::NumberedList { align: None, children: vec![] },
            ElementKind::ListItem => Element::ListItem { align: None, children: vec![] },
            ElementKind::CheckListItem => Element::CheckListItem {
                checked: false,
                align: None,
                children: vec![],
            },
            ElementKind::Link => Element::Link { url: String::new(), children: vec![] },
            ElementKind::Image => Element::Image {
                source: ImageSource::Remote,
                url: String::new(),
                width: None,
                height: None,
                inline: None,
                float: None,
                align: None,
                children: vec![],
            },
            ElementKind::Video => Element::Video { url: String::new(), inline: None, children: vec![] },
            ElementKind::Audio => Element::Audio { url: String::new(), inline: None, children: vec![] },
            ElementKind::Formula => Element::Formula {
                latex: String::new(),
                inline: None,
                children: vec![],
            },
            ElementKind::Table => Element::Table { children: vec![] },
            ElementKind::TableRow => Element::TableRow { children: vec![] },
            ElementKind::TableCell => Element::TableCell { children: vec![] },
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Element {
        Element::Paragraph {
            align: None,
            lock: None,
            draggable: None,
            children,
        }
    }

    pub fn block_quote(children: Vec<Node>) -> Element {
        Element::BlockQuote { align: None, children }
    }

    pub fn bulleted_list(children: Vec<Node>) -> Element {
        Element::BulletedList { align: None, children }
    }

    pub fn numbered_list(children: Vec<Node>) -> Element {
        Element::NumberedList { align: None, children }
    }

    pub fn list_item(children: Vec<Node>) -> Element {
        Element::ListItem { align: None, children }
    }

    pub fn check_list_item(checked: bool, children: Vec<Node>) -> Element {
        Element::CheckListItem { checked, align: None, children }
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Element {
        Element::Link { url: url.into(), children }
    }

    /// Remote image with the mandatory empty text child in place.
    pub fn image(url: impl Into<String>) -> Element {
        Element::Image {
            source: ImageSource::Remote,
            url: url.into(),
            width: None,
            height: None,
            inline: None,
            float: None,
            align: None,
            children: vec![Node::Text(Text::plain(""))],
        }
    }

    pub fn video(url: impl Into<String>) -> Element {
        Element::Video {
            url: url.into(),
            inline: None,
            children: vec![Node::Text(Text::plain(""))],
        }
    }

    pub fn audio(url: impl Into<String>) -> Element {
        Element::Audio {
            url: url.into(),
            inline: None,
            children: vec![Node::Text(Text::plain(""))],
        }
    }

    pub fn formula(latex: impl Into<String>) -> Element {
        Element::Formula {
            latex: latex.into(),
            inline: None,
            children: vec![Node::Text(Text::plain(""))],
        }
    }
}

/// Fieldless mirror of the element union, used wherever only the kind
/// matters (matching, dispatch, guard lists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    HeadingFour,
    HeadingFive,
    HeadingSix,
    BlockQuote,
    BulletedList,
    NumberedList,
    ListItem,
    CheckListItem,
    Link,
    Image,
    Video,
    Audio,
    Formula,
    Table,
    TableRow,
    TableCell,
}

/// Kinds that wrap their children in a list container.
pub const LIST_KINDS: [ElementKind; 2] = [ElementKind::BulletedList, ElementKind::NumberedList];

/// Kinds `toggle_element` is allowed to switch between.
pub const WRAP_KINDS: [ElementKind; 10] = [
    ElementKind::Paragraph,
    ElementKind::HeadingOne,
    ElementKind::HeadingTwo,
    ElementKind::HeadingThree,
    ElementKind::HeadingFour,
    ElementKind::HeadingFive,
    ElementKind::HeadingSix,
    ElementKind::BlockQuote,
    ElementKind::BulletedList,
    ElementKind::NumberedList,
];

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::HeadingOne => "heading-one",
            ElementKind::HeadingTwo => "heading-two",
            ElementKind::HeadingThree => "heading-three",
            ElementKind::HeadingFour => "heading-four",
            ElementKind::HeadingFive => "heading-five",
            ElementKind::HeadingSix => "heading-six",
            ElementKind::BlockQuote => "block-quote",
            ElementKind::BulletedList => "bulleted-list",
            ElementKind::NumberedList => "numbered-list",
            ElementKind::ListItem => "list-item",
            ElementKind::CheckListItem => "check-list-item",
            ElementKind::Link => "link",
            ElementKind::Image => "image",
            ElementKind::Video => "video",
            ElementKind::Audio => "audio",
            ElementKind::Formula => "formula",
            ElementKind::Table => "table",
            ElementKind::TableRow => "table-row",
            ElementKind::TableCell => "table-cell",
        }
    }

    pub fn is_list(&self) -> bool {
        LIST_KINDS.contains(self)
    }

    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            ElementKind::HeadingOne
                | ElementKind::HeadingTwo
                | ElementKind::HeadingThree
                | ElementKind::HeadingFour
                | ElementKind::HeadingFive
                | ElementKind::HeadingSix
        )
    }

    pub fn is_void(&self) -> bool {
        matches!(
            self,
            ElementKind::Image | ElementKind::Video | ElementKind::Audio | ElementKind::Formula
        )
    }

    /// Whether `toggle_element` may target this kind.
    pub fn is_wrap_toggleable(&self) -> bool {
        WRAP_KINDS.contains(self)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "paragraph" => ElementKind::Paragraph,
            "heading-one" => ElementKind::HeadingOne,
            "heading-two" => ElementKind::HeadingTwo,
            "heading-three" => ElementKind::HeadingThree,
            "heading-four" => ElementKind::HeadingFour,
            "heading-five" => ElementKind::HeadingFive,
            "heading-six" => ElementKind::HeadingSix,
            "block-quote" => ElementKind::BlockQuote,
            "bulleted-list" => ElementKind::BulletedList,
            "numbered-list" => ElementKind::NumberedList,
            "list-item" => ElementKind::ListItem,
            "check-list-item" => ElementKind::CheckListItem,
            "link" => ElementKind::Link,
            "image" => ElementKind::Image,
            "video" => ElementKind::Video,
            "audio" => ElementKind::Audio,
            "formula" => ElementKind::Formula,
            "table" => ElementKind::Table,
            "table-row" => ElementKind::TableRow,
            "table-cell" => ElementKind::TableCell,
            _ => return Err(()),
        };
        Ok(kind)
    }
}
