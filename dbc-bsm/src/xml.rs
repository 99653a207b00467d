//! Minimal XML document tree
//!
//! The generated configuration is built as a tree of elements and comments
//! and written by one renderer, which owns indentation (one tab per level),
//! escaping and self-closing tags. Nothing else in the crate writes markup.

use std::fmt;
use std::io::{self, Write};

/// XML declaration written before the root element
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Comment(String),
    /// Empty line, used to separate sections for readability
    Blank,
}

/// An element with attributes and either text or child nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in output order
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Builder method: append an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((name.into(), value.to_string()));
        self
    }

    /// Builder method: set the text content
    pub fn text(mut self, text: impl ToString) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Builder method: append a child element
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder method: append any node
    pub fn node(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    /// Append a child element in place
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Value of the first attribute with this name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// All descendant elements (depth first) with the given tag name
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }
}

/// A complete document: declaration, top-level comments and the root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub comments: Vec<String>,
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            comments: Vec::new(),
            root,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", XML_DECLARATION)?;
        for comment in &self.comments {
            write_comment(f, comment, 0)?;
        }
        write_element(f, &self.root, 0)
    }
}

/// Write the document to a sink
pub fn render<W: Write + ?Sized>(document: &Document, out: &mut W) -> io::Result<()> {
    write!(out, "{}", document)?;
    out.flush()
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("\t")?;
    }
    Ok(())
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    match node {
        Node::Element(element) => write_element(f, element, depth),
        Node::Comment(text) => write_comment(f, text, depth),
        Node::Blank => f.write_str("\n"),
    }
}

fn write_element(f: &mut fmt::Formatter<'_>, element: &Element, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    write!(f, "<{}", element.name)?;
    for (name, value) in &element.attributes {
        write!(f, " {}=\"{}\"", name, escape_attribute(value))?;
    }

    match (&element.text, element.children.is_empty()) {
        (None, true) => f.write_str(" />\n"),
        (Some(text), true) => writeln!(f, ">{}</{}>", escape_text(text), element.name),
        (text, false) => {
            f.write_str(">\n")?;
            if let Some(text) = text {
                indent(f, depth + 1)?;
                writeln!(f, "{}", escape_text(text))?;
            }
            for child in &element.children {
                write_node(f, child, depth + 1)?;
            }
            indent(f, depth)?;
            writeln!(f, "</{}>", element.name)
        }
    }
}

fn write_comment(f: &mut fmt::Formatter<'_>, text: &str, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    writeln!(f, "<!-- {} -->", sanitize_comment(text))
}

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Comments may not contain "--"
fn sanitize_comment(text: &str) -> String {
    let mut text = text.trim_end().to_string();
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    text
}
