//! HTML rendering
//!
//! A minimal element tree for producing markup. Text nodes and attribute
//! values are escaped when the tree is rendered, so callers never pass
//! pre-escaped strings around.

use std::fmt;

/// Escape every HTML-significant character in `input`
///
/// Covers `& < > " ' / \` =`, which is enough to embed the result in
/// element content and quoted or unquoted attribute values. The mapping is
/// one-way.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    push_escaped(&mut out, input);
    out
}

fn push_escaped(out: &mut String, input: &str) {
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            other => out.push(other),
        }
    }
}

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta"];

/// A node in the element tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An HTML element with attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, Option<String>)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, Some(value.into())));
        self
    }

    /// Set an attribute only when a value is present
    pub fn attr_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    /// Add a valueless boolean attribute such as `disabled`
    pub fn flag(mut self, name: &'static str) -> Self {
        self.attrs.push((name, None));
        self
    }

    pub fn flag_if(self, name: &'static str, condition: bool) -> Self {
        if condition { self.flag(name) } else { self }
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                push_escaped(out, value);
                out.push('"');
            }
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }

        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(out),
                Node::Text(text) => push_escaped(out, text),
            }
        }

        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_full_entity_map() {
        assert_eq!(
            escape_html("<script>&\"'</script>"),
            "&lt;script&gt;&amp;&quot;&#39;&lt;&#x2F;script&gt;"
        );
        assert_eq!(escape_html("a=`b`"), "a&#x3D;&#x60;b&#x60;");
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_escape_is_one_way() {
        // Escaping an escaped string escapes the ampersands again
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_element_escapes_text_and_attributes() {
        let html = Element::new("td")
            .attr("title", "\"quoted\"")
            .text("<b>")
            .render();
        assert_eq!(html, "<td title=\"&quot;quoted&quot;\">&lt;b&gt;</td>");
    }

    #[test]
    fn test_void_and_flag_attributes() {
        let html = Element::new("input")
            .attr("type", "checkbox")
            .flag_if("checked", true)
            .flag_if("disabled", false)
            .render();
        assert_eq!(html, "<input type=\"checkbox\" checked>");
    }

    #[test]
    fn test_nested_children() {
        let html = Element::new("ul")
            .children(["a", "b"].map(|t| Element::new("li").text(t)))
            .render();
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>");
    }
}
