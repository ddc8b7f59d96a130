//! Arena node tree with a small HTML parser and serializer
//!
//! The parser covers the markup tests write: elements, quoted, unquoted and
//! bare attributes, void elements, text, comments, doctypes and raw-text
//! `script`/`style` bodies. Entities are kept verbatim. Unknown end tags are
//! dropped and unclosed elements close at the end of input.

use indexmap::IndexMap;

/// Index of a node in its [`Arena`]
pub type NodeId = usize;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Tree root; never matched by selectors
    Document,
    /// Element with lowercase tag and attributes in source order
    Element {
        /// Lowercase tag name
        tag: String,
        /// Attributes in source order
        attrs: IndexMap<String, String>,
    },
    /// Text run, stored verbatim
    Text(String),
}

/// One arena slot
#[derive(Debug, Clone)]
pub struct Node {
    /// Payload
    pub data: NodeData,
    /// Parent, `None` for roots and detached nodes
    pub parent: Option<NodeId>,
    /// Children in order
    pub children: Vec<NodeId>,
}

/// Node storage; ids are never reused
#[derive(Debug, Clone)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Arena holding only the document node, id `0`
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node
    pub const DOCUMENT: NodeId = 0;

    /// Node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Tag name, `None` for non-elements
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Whether the id names an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    /// Attribute value
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// Set an attribute, keeping its position when it already exists
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id].data {
            attrs.insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    /// Remove an attribute
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id].data {
            attrs.shift_remove(name);
        }
    }

    /// Whitespace-separated classes
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Parent element or document
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Child element ids
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// Descendants of `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    /// True when `id` is `ancestor` or below it
    pub fn is_inclusive_descendant(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// True when the node is reachable from the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_descendant(Self::DOCUMENT, id)
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: IndexMap::new(),
        })
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Remove the node from its parent; a detached node is left alone
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&child| child != id);
        }
    }

    /// Detach every child of `id`
    pub fn clear_children(&mut self, id: NodeId) {
        for child in std::mem::take(&mut self.nodes[id].children) {
            self.nodes[child].parent = None;
        }
    }

    /// Parse `html` and append the nodes under `parent`, returning the
    /// top-level node ids
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Vec<NodeId> {
        let mut parser = Parser::new(html);
        let mut stack = vec![parent];
        let mut top_level = Vec::new();

        while let Some(token) = parser.next_token() {
            let current = *stack.last().unwrap_or(&parent);
            match token {
                Token::Text(text) => {
                    let id = self.push(NodeData::Text(text));
                    self.append_child(current, id);
                    if current == parent {
                        top_level.push(id);
                    }
                }
                Token::Start {
                    tag,
                    attrs,
                    self_closing,
                } => {
                    let id = self.push(NodeData::Element {
                        tag: tag.clone(),
                        attrs,
                    });
                    self.append_child(current, id);
                    if current == parent {
                        top_level.push(id);
                    }
                    if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                        let body = parser.raw_text_until(&tag);
                        if !body.is_empty() {
                            let text = self.push(NodeData::Text(body));
                            self.append_child(id, text);
                        }
                    } else if !self_closing && !VOID_ELEMENTS.contains(&tag.as_str()) {
                        stack.push(id);
                    }
                }
                Token::End(tag) => {
                    // never pop past the insertion parent
                    if let Some(pos) = stack
                        .iter()
                        .skip(1)
                        .rposition(|&open| self.tag(open) == Some(tag.as_str()))
                    {
                        stack.truncate(pos + 1);
                    }
                }
            }
        }
        top_level
    }

    /// Serialize the children of `id`
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[id].children {
            self.serialize_into(child, &mut out);
        }
        out
    }

    /// Serialize `id` itself
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(id, &mut out);
        out
    }

    /// Concatenated text below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in std::iter::once(id).chain(self.descendants(id)) {
            if let NodeData::Text(text) = &self.nodes[node].data {
                out.push_str(text);
            }
        }
        out
    }

    fn serialize_into(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].data {
            NodeData::Document => out.push_str(&self.inner_html(id)),
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for &child in &self.nodes[id].children {
                    self.serialize_into(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }
}

#[derive(Debug)]
enum Token {
    Text(String),
    Start {
        tag: String,
        attrs: IndexMap<String, String>,
        self_closing: bool,
    },
    End(String),
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return None;
            }

            if let Some(comment) = rest.strip_prefix("<!--") {
                self.pos += 4 + comment.find("-->").map_or(comment.len(), |end| end + 3);
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos += rest.find('>').map_or(rest.len(), |end| end + 1);
                continue;
            }
            if let Some(after) = rest.strip_prefix("</") {
                if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    let end = after.find('>').unwrap_or(after.len());
                    let tag = after[..end].trim().to_ascii_lowercase();
                    self.pos += 2 + (end + 1).min(after.len());
                    return Some(Token::End(tag));
                }
            }
            if let Some(after) = rest.strip_prefix('<') {
                if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    self.pos += 1;
                    return Some(self.start_tag());
                }
            }

            // text up to the next tag-like '<'
            let end = rest
                .match_indices('<')
                .map(|(offset, _)| offset)
                .find(|&offset| offset > 0)
                .unwrap_or(rest.len());
            let text = &rest[..end];
            self.pos += end;
            return Some(Token::Text(text.to_string()));
        }
    }

    fn start_tag(&mut self) -> Token {
        let tag = self.take_while(|c| !c.is_whitespace() && c != '>' && c != '/');
        let tag = tag.to_ascii_lowercase();
        let mut attrs = IndexMap::new();
        let mut self_closing = false;

        loop {
            self.take_while(char::is_whitespace);
            let rest = self.rest();
            if rest.is_empty() {
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let name = self
                .take_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
                .to_ascii_lowercase();
            self.take_while(char::is_whitespace);
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.take_while(char::is_whitespace);
                self.attribute_value()
            } else {
                String::new()
            };
            if !name.is_empty() {
                attrs.entry(name).or_insert(value);
            }
        }

        Token::Start {
            tag,
            attrs,
            self_closing,
        }
    }

    fn attribute_value(&mut self) -> String {
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                let end = body.find(quote).unwrap_or(body.len());
                self.pos += 1 + (end + 1).min(body.len());
                body[..end].to_string()
            }
            _ => self
                .take_while(|c| !c.is_whitespace() && c != '>')
                .to_string(),
        }
    }

    /// Consume the body of a raw-text element and its end tag.
    fn raw_text_until(&mut self, tag: &str) -> String {
        let rest = self.rest();
        let close = format!("</{tag}");
        let lower = rest.to_ascii_lowercase();
        match lower.find(&close) {
            Some(start) => {
                let body = rest[..start].to_string();
                let after = &rest[start..];
                self.pos += after.find('>').map_or(after.len(), |end| end + 1) + start;
                body
            }
            None => {
                self.pos = self.input.len();
                rest.to_string()
            }
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|&(_, c)| !predicate(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        &rest[..end]
    }
}
