//! Text leaves and character-level marks.

use serde::{Deserialize, Serialize};

/// A text leaf: raw content plus formatting marks flattened alongside it
/// on the wire (`{"text": "hi", "bold": true}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Text {
        Text {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Text {
        Text {
            text: text.into(),
            marks,
        }
    }

    /// Length in characters. All offsets in the model are character
    /// offsets, not byte offsets.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Byte index of the given character offset, clamped to the end.
pub fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Character offset of the given byte index.
pub fn byte_to_char(s: &str, byte_offset: usize) -> usize {
    s[..byte_offset.min(s.len())].chars().count()
}

/// The set of supported mark names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Code,
    Underline,
    Linethrough,
    Superscript,
    Subscript,
    Fontsize,
    Color,
    Highlight,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Code => "code",
            Mark::Underline => "underline",
            Mark::Linethrough => "linethrough",
            Mark::Superscript => "superscript",
            Mark::Subscript => "subscript",
            Mark::Fontsize => "fontsize",
            Mark::Color => "color",
            Mark::Highlight => "highlight",
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mark = match s {
            "bold" => Mark::Bold,
            "italic" => Mark::Italic,
            "code" => Mark::Code,
            "underline" => Mark::Underline,
            "linethrough" => Mark::Linethrough,
            "superscript" => Mark::Superscript,
            "subscript" => Mark::Subscript,
            "fontsize" => Mark::Fontsize,
            "color" => Mark::Color,
            "highlight" => Mark::Highlight,
            _ => return Err(()),
        };
        Ok(mark)
    }
}

/// Formatting marks carried by a text leaf. Every field is optional and
/// absent fields stay off the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Marks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superscript: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscript: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fontsize: Option<FontSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

impl Marks {
    pub fn is_empty(&self) -> bool {
        self == &Marks::default()
    }

    /// Current value of a mark as its serde form, if set.
    pub fn get(&self, mark: Mark) -> Option<serde_json::Value> {
        match mark {
            Mark::Bold => self.bold.map(serde_json::Value::Bool),
            Mark::Italic => self.italic.map(serde_json::Value::Bool),
            Mark::Code => self.code.map(serde_json::Value::Bool),
            Mark::Underline => self.underline.map(serde_json::Value::Bool),
            Mark::Linethrough => self.linethrough.map(serde_json::Value::Bool),
            Mark::Superscript => self.superscript.map(serde_json::Value::Bool),
            Mark::Subscript => self.subscript.map(serde_json::Value::Bool),
            Mark::Fontsize => self.fontsize.as_ref().and_then(|f| serde_json::to_value(f).ok()),
            Mark::Color => self.color.clone().map(serde_json::Value::String),
            Mark::Highlight => self.highlight.as_ref().and_then(|h| serde_json::to_value(h).ok()),
        }
    }

    /// Sets a mark from its serde form. Fails when the value does not fit
    /// the mark (a string for `bold`, say).
    pub fn set(&mut self, mark: Mark, value: serde_json::Value) -> serde_json::Result<()> {
        match mark {
            Mark::Bold => self.bold = Some(serde_json::from_value(value)?),
            Mark::Italic => self.italic = Some(serde_json::from_value(value)?),
            Mark::Code => self.code = Some(serde_json::from_value(value)?),
            Mark::Underline => self.underline = Some(serde_json::from_value(value)?),
            Mark::Linethrough => self.linethrough = Some(serde_json::from_value(value)?),
            Mark::Superscript => self.superscript = Some(serde_json::from_value(value)?),
            Mark::Subscript => self.subscript = Some(serde_json::from_value(value)?),
            Mark::Fontsize => self.fontsize = Some(serde_json::from_value(value)?),
            Mark::Color => self.color = Some(serde_json::from_value(value)?),
            Mark::Highlight => self.highlight = Some(serde_json::from_value(value)?),
        }
        Ok(())
    }

    pub fn remove(&mut self, mark: Mark) {
        match mark {
            Mark::Bold => self.bold = None,
            Mark::Italic => self.italic = None,
            Mark::Code => self.code = None,
            Mark::Underline => self.underline = None,
            Mark::Linethrough => self.linethrough = None,
            Mark::Superscript => self.superscript = None,
            Mark::Subscript => self.subscript = None,
            Mark::Fontsize => self.fontsize = None,
            Mark::Color => self.color = None,
            Mark::Highlight => self.highlight = None,
        }
    }

    /// Truthiness of a mark's value: set-and-non-falsy. A `false` flag, an
    /// empty string and a zero font size all count as inactive.
    pub fn is_truthy(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold == Some(true),
            Mark::Italic => self.italic == Some(true),
            Mark::Code => self.code == Some(true),
            Mark::Underline => self.underline == Some(true),
            Mark::Linethrough => self.linethrough == Some(true),
            Mark::Superscript => self.superscript == Some(true),
            Mark::Subscript => self.subscript == Some(true),
            Mark::Fontsize => match &self.fontsize {
                Some(FontSize::Number(n)) => *n != 0.0,
                Some(FontSize::Custom(s)) => !s.is_empty(),
                None => false,
            },
            Mark::Color => self.color.as_deref().is_some_and(|c| !c.is_empty()),
            Mark::Highlight => match &self.highlight {
                Some(Highlight::Flag(flag)) => *flag,
                Some(Highlight::Advanced(_)) => true,
                None => false,
            },
        }
    }

    /// Drops any search annotation. Search spans live only in decoration
    /// output and never persist in the document.
    pub fn strip_search(&mut self) {
        if let Some(Highlight::Advanced(adv)) = &mut self.highlight {
            adv.search = None;
        }
    }
}

/// Font size: a plain number or a named size string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontSize {
    Number(f64),
    Custom(String),
}

/// Highlight mark: a bare flag, or a colored span with an optional search
/// annotation attached by the decoration pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Highlight {
    Flag(bool),
    Advanced(AdvancedHighlight),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedHighlight {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchAnnotation>,
}

/// Identifies one keyword match inside a decorated span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAnnotation {
    pub key: String,
    #[serde(rename = "activeColor")]
    pub active_color: String,
    /// Character offset of the end of the match within its leaf.
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_flatten_into_the_leaf() {
        let mut marks = Marks::default();
        marks.bold = Some(true);
        marks.color = Some("#ff0000".into());
        let leaf = Text::with_marks("hi", marks);
        let json = serde_json::to_value(&leaf).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hi", "bold": true, "color": "#ff0000"}));
        let back: Text = serde_json::from_value(json).unwrap();
        assert_eq!(back, leaf);
    }

    #[test]
    fn highlight_accepts_flag_or_object() {
        let flag: Highlight = serde_json::from_value(serde_json::json!(true)).unwrap();
        assert_eq!(flag, Highlight::Flag(true));

        let adv: Highlight = serde_json::from_value(serde_json::json!({
            "color": "#ffff00",
            "search": {"key": "abc", "activeColor": "#ff9632", "offset": 5}
        }))
        .unwrap();
        match adv {
            Highlight::Advanced(adv) => {
                assert_eq!(adv.color, "#ffff00");
                let search = adv.search.unwrap();
                assert_eq!(search.key, "abc");
                assert_eq!(search.active_color, "#ff9632");
                assert_eq!(search.offset, 5);
            }
            other => panic!("expected advanced highlight, got {other:?}"),
        }
    }

    #[test]
    fn annotation_uses_camel_case_on_the_wire() {
        let ann = SearchAnnotation {
            key: "k".into(),
            active_color: "#ff9632".into(),
            offset: 2,
        };
        let json = serde_json::to_value(&ann).unwrap();
        assert!(json.get("activeColor").is_some());
        assert!(json.get("active_color").is_none());
    }

    #[test]
    fn truthiness_follows_value_shape() {
        let mut marks = Marks::default();
        assert!(!marks.is_truthy(Mark::Bold));
        marks.bold = Some(false);
        assert!(!marks.is_truthy(Mark::Bold));
        marks.bold = Some(true);
        assert!(marks.is_truthy(Mark::Bold));

        marks.fontsize = Some(FontSize::Number(0.0));
        assert!(!marks.is_truthy(Mark::Fontsize));
        marks.fontsize = Some(FontSize::Number(14.0));
        assert!(marks.is_truthy(Mark::Fontsize));

        marks.highlight = Some(Highlight::Flag(false));
        assert!(!marks.is_truthy(Mark::Highlight));
        marks.highlight = Some(Highlight::Advanced(AdvancedHighlight {
            color: "#ffff00".into(),
            search: None,
        }));
        assert!(marks.is_truthy(Mark::Highlight));
    }

    #[test]
    fn get_set_remove_roundtrip() {
        let mut marks = Marks::default();
        marks.set(Mark::Fontsize, serde_json::json!(18)).unwrap();
        assert_eq!(marks.fontsize, Some(FontSize::Number(18.0)));
        assert_eq!(marks.get(Mark::Fontsize), Some(serde_json::json!(18.0)));

        assert!(marks.set(Mark::Bold, serde_json::json!("yes")).is_err());

        marks.set(Mark::Bold, serde_json::json!(true)).unwrap();
        marks.remove(Mark::Bold);
        assert_eq!(marks.get(Mark::Bold), None);
    }

    #[test]
    fn strip_search_clears_only_the_annotation() {
        let mut marks = Marks::default();
        marks.highlight = Some(Highlight::Advanced(AdvancedHighlight {
            color: "#ffff00".into(),
            search: Some(SearchAnnotation {
                key: "k".into(),
                active_color: "#ff9632".into(),
                offset: 3,
            }),
        }));
        marks.strip_search();
        assert_eq!(
            marks.highlight,
            Some(Highlight::Advanced(AdvancedHighlight {
                color: "#ffff00".into(),
                search: None,
            }))
        );
    }

    #[test]
    fn char_byte_conversion_handles_multibyte() {
        let s = "añb";
        assert_eq!(char_to_byte(s, 0), 0);
        assert_eq!(char_to_byte(s, 1), 1);
        assert_eq!(char_to_byte(s, 2), 3);
        assert_eq!(char_to_byte(s, 3), 4);
        assert_eq!(byte_to_char(s, 3), 2);
    }
}
