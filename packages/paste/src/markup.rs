//! Tolerant host-markup parsing.
//!
//! Pasted markup is untrusted and frequently malformed, so this parser
//! never fails: mismatched close tags close the nearest matching open
//! ancestor, stray close tags drop, and unterminated input closes
//! everything at end of input. Script and style content is discarded
//! whole. The result is always a tree rooted at `BODY`.

use std::collections::HashMap;

/// One node of the pasted markup tree. Tag names are upper-cased,
/// attribute names lower-cased.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element {
        tag: String,
        attributes: HashMap<String, String>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

impl MarkupNode {
    pub fn tag(&self) -> Option<&str> {
        match self {
            MarkupNode::Element { tag, .. } => Some(tag),
            MarkupNode::Text(_) => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            MarkupNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            MarkupNode::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[MarkupNode] {
        match self {
            MarkupNode::Element { children, .. } => children,
            MarkupNode::Text(_) => &[],
        }
    }
}

/// Tags that never carry children.
const VOID_TAGS: &[&str] = &[
    "AREA", "BASE", "BR", "COL", "EMBED", "HR", "IMG", "INPUT", "LINK", "META", "SOURCE",
    "TRACK", "WBR",
];

/// Tags whose raw content is discarded whole.
const RAW_TAGS: &[&str] = &["SCRIPT", "STYLE"];

/// Parses pasted markup into a tree rooted at `BODY`.
pub fn parse(input: &str) -> MarkupNode {
    Parser::new(input).parse_document()
}

struct OpenElement {
    tag: String,
    attributes: HashMap<String, String>,
    children: Vec<MarkupNode>,
}

impl OpenElement {
    fn new(tag: String, attributes: HashMap<String, String>) -> OpenElement {
        OpenElement {
            tag,
            attributes,
            children: Vec::new(),
        }
    }

    fn into_node(self) -> MarkupNode {
        MarkupNode::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Parser {
        Parser {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse_document(mut self) -> MarkupNode {
        let mut stack = vec![OpenElement::new("BODY".to_string(), HashMap::new())];

        while !self.is_at_end() {
            if self.starts_with("<!--") {
                self.skip_past("-->");
            } else if self.starts_with("</") {
                self.close_tag(&mut stack);
            } else if self.starts_with("<!") || self.starts_with("<?") {
                self.skip_past(">");
            } else if self.at_open_tag() {
                self.open_tag(&mut stack);
            } else {
                self.text_run(&mut stack);
            }
        }

        while stack.len() > 1 {
            fold_top(&mut stack);
        }
        stack
            .pop()
            .map(OpenElement::into_node)
            .unwrap_or(MarkupNode::Text(String::new()))
    }

    /// `<` followed by a letter starts a tag; anything else is text.
    fn at_open_tag(&self) -> bool {
        self.peek() == Some('<')
            && self
                .peek_at(1)
                .map(|c| c.is_ascii_alphabetic())
                .unwrap_or(false)
    }

    fn text_run(&mut self, stack: &mut [OpenElement]) {
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c == '<'
                && (self.at_open_tag()
                    || self.starts_with("</")
                    || self.starts_with("<!")
                    || self.starts_with("<?"))
            {
                break;
            }
            raw.push(c);
            self.advance();
        }
        if raw.is_empty() {
            // Lone `<` that opens nothing. Consume it so the loop moves on.
            if let Some(c) = self.peek() {
                raw.push(c);
                self.advance();
            }
        }
        if let Some(top) = stack.last_mut() {
            top.children.push(MarkupNode::Text(decode_entities(&raw)));
        }
    }

    fn open_tag(&mut self, stack: &mut Vec<OpenElement>) {
        self.advance(); // <
        let tag = self.tag_name();
        let attributes = self.attributes();
        let self_closing = self.finish_tag();

        if RAW_TAGS.contains(&tag.as_str()) {
            if !self_closing {
                self.skip_raw_content(&tag);
            }
            return;
        }
        if self_closing || VOID_TAGS.contains(&tag.as_str()) {
            let element = OpenElement::new(tag, attributes).into_node();
            if let Some(top) = stack.last_mut() {
                top.children.push(element);
            }
            return;
        }
        stack.push(OpenElement::new(tag, attributes));
    }

    fn close_tag(&mut self, stack: &mut Vec<OpenElement>) {
        self.advance(); // <
        self.advance(); // /
        let tag = self.tag_name();
        self.skip_past(">");
        if tag.is_empty() {
            return;
        }
        // The root never closes; stray close tags drop.
        let Some(found) = stack.iter().skip(1).rposition(|open| open.tag == tag) else {
            return;
        };
        while stack.len() > found + 1 {
            fold_top(stack);
        }
    }

    fn tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' {
                name.push(c.to_ascii_uppercase());
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn attributes(&mut self) -> HashMap<String, String> {
        let mut attributes = HashMap::new();
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { break };
            if c == '>' || c == '/' {
                break;
            }
            let mut name = String::new();
            while let Some(c) = self.peek() {
                if c.is_whitespace() || c == '=' || c == '>' || c == '/' {
                    break;
                }
                name.push(c.to_ascii_lowercase());
                self.advance();
            }
            if name.is_empty() {
                // Unparseable junk; skip one char to guarantee progress.
                self.advance();
                continue;
            }
            self.skip_whitespace();
            let value = if self.peek() == Some('=') {
                self.advance();
                self.skip_whitespace();
                self.attribute_value()
            } else {
                String::new()
            };
            attributes.insert(name, value);
        }
        attributes
    }

    fn attribute_value(&mut self) -> String {
        let mut raw = String::new();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                while let Some(c) = self.peek() {
                    self.advance();
                    if c == quote {
                        break;
                    }
                    raw.push(c);
                }
            }
            _ => {
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '>' || c == '/' {
                        break;
                    }
                    raw.push(c);
                    self.advance();
                }
            }
        }
        decode_entities(&raw)
    }

    /// Consumes up to and including `>`, reporting whether the tag was
    /// self-closing.
    fn finish_tag(&mut self) -> bool {
        let mut self_closing = false;
        while let Some(c) = self.peek() {
            self.advance();
            match c {
                '>' => return self_closing,
                '/' => self_closing = true,
                _ => self_closing = false,
            }
        }
        self_closing
    }

    fn skip_raw_content(&mut self, tag: &str) {
        let close = format!("</{tag}");
        while !self.is_at_end() {
            if self.starts_with_ignore_case(&close) {
                self.skip_past(">");
                return;
            }
            self.advance();
        }
    }

    fn skip_past(&mut self, marker: &str) {
        while !self.is_at_end() {
            if self.starts_with(marker) {
                self.pos += marker.chars().count();
                return;
            }
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.advance();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| {
            self.chars
                .get(self.pos + i)
                .map(|have| have.eq_ignore_ascii_case(&c))
                .unwrap_or(false)
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

fn fold_top(stack: &mut Vec<OpenElement>) {
    if stack.len() < 2 {
        return;
    }
    let top = match stack.pop() {
        Some(top) => top.into_node(),
        None => return,
    };
    if let Some(parent) = stack.last_mut() {
        parent.children.push(top);
    }
}

fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '&' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let Some(end) = chars[i..].iter().take(10).position(|&c| c == ';') else {
            out.push('&');
            i += 1;
            continue;
        };
        let entity: String = chars[i + 1..i + end].iter().collect();
        let decoded = match entity.as_str() {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => numeric_entity(&entity),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                i += end + 1;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
    }
    out
}

fn numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(input: &str) -> Vec<MarkupNode> {
        match parse(input) {
            MarkupNode::Element { tag, children, .. } => {
                assert_eq!(tag, "BODY");
                children
            }
            MarkupNode::Text(_) => panic!("root must be an element"),
        }
    }

    fn text(s: &str) -> MarkupNode {
        MarkupNode::Text(s.to_string())
    }

    #[test]
    fn nested_tags_and_text() {
        let children = body("<p>hello <b>world</b></p>");
        assert_eq!(children.len(), 1);
        let p = &children[0];
        assert_eq!(p.tag(), Some("P"));
        assert_eq!(p.children()[0], text("hello "));
        assert_eq!(p.children()[1].tag(), Some("B"));
        assert_eq!(p.children()[1].children()[0], text("world"));
    }

    #[test]
    fn attributes_quoted_and_bare() {
        let children = body(r#"<a href="https://example.com" target=_blank data-x='1'>go</a>"#);
        let a = &children[0];
        assert_eq!(a.attribute("href"), Some("https://example.com"));
        assert_eq!(a.attribute("target"), Some("_blank"));
        assert_eq!(a.attribute("data-x"), Some("1"));
    }

    #[test]
    fn void_and_self_closing_tags_do_not_nest() {
        let children = body("<p>a<br>b<img src=x.png />c</p>");
        let p = &children[0];
        let tags: Vec<Option<&str>> = p.children().iter().map(MarkupNode::tag).collect();
        assert_eq!(tags, vec![None, Some("BR"), None, Some("IMG"), None]);
    }

    #[test]
    fn mismatched_close_recovers() {
        // </i> closes nothing; </p> closes past the still-open <b>.
        let children = body("<p><b>bold</i> tail</p>after");
        let p = &children[0];
        assert_eq!(p.tag(), Some("P"));
        let b = &p.children()[0];
        assert_eq!(b.tag(), Some("B"));
        assert_eq!(b.children(), &[text("bold"), text(" tail")]);
        assert_eq!(children[1], text("after"));
    }

    #[test]
    fn unterminated_input_closes_at_eof() {
        let children = body("<p><b>dangling");
        assert_eq!(children[0].tag(), Some("P"));
        assert_eq!(children[0].children()[0].tag(), Some("B"));
        assert_eq!(
            children[0].children()[0].children()[0],
            text("dangling")
        );
    }

    #[test]
    fn comments_doctype_and_scripts_vanish() {
        let children = body(
            "<!DOCTYPE html><!-- note --><script>let x = \"<p>\";</script><style>p { color: red }</style><p>kept</p>",
        );
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].tag(), Some("P"));
    }

    #[test]
    fn entities_decode() {
        let children = body("<p>a &amp; b &lt;tag&gt; &#x41;&#66; &unknown;</p>");
        assert_eq!(
            children[0].children()[0],
            text("a & b <tag> AB &unknown;")
        );
    }

    #[test]
    fn stray_angle_brackets_are_text() {
        let children = body("<p>1 < 2 and 3 > 2</p>");
        assert_eq!(children[0].children()[0], text("1 < 2 and 3 > 2"));
    }
}
