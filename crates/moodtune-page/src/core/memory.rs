//! In-memory document used for native replay and tests.
//!
//! # Design
//! - Elements live in an arena addressed by [`NodeId`]; removal only detaches,
//!   so stale handles stay valid and report `is_attached == false`.
//! - Selector support covers what the page markup uses: `.class`, `#id`,
//!   `tag`, and `tag[attr*='needle']`. Anything else matches nothing.

use std::collections::BTreeMap;

use crate::core::dom::PageDom;

/// Handle to an element in a [`MemoryPage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, Default)]
struct ElementData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Selector {
    Class(String),
    Id(String),
    Tag(String),
    AttrContains {
        tag: Option<String>,
        attr: String,
        needle: String,
    },
    Unsupported,
}

impl Selector {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(class) = raw.strip_prefix('.') {
            return if is_ident(class) {
                Self::Class(class.to_string())
            } else {
                Self::Unsupported
            };
        }
        if let Some(id) = raw.strip_prefix('#') {
            return if is_ident(id) {
                Self::Id(id.to_string())
            } else {
                Self::Unsupported
            };
        }
        if let Some((tag, rest)) = raw.split_once('[') {
            let Some(inner) = rest.strip_suffix(']') else {
                return Self::Unsupported;
            };
            let Some((attr, value)) = inner.split_once("*=") else {
                return Self::Unsupported;
            };
            let needle = value
                .trim()
                .trim_matches(|c| c == '\'' || c == '"')
                .to_string();
            let attr = attr.trim();
            if !is_ident(attr) || (!tag.is_empty() && !is_ident(tag)) {
                return Self::Unsupported;
            }
            return Self::AttrContains {
                tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
                attr: attr.to_ascii_lowercase(),
                needle,
            };
        }
        if is_ident(raw) {
            Self::Tag(raw.to_ascii_lowercase())
        } else {
            Self::Unsupported
        }
    }

    fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Class(class) => element.classes.iter().any(|c| c == class),
            Self::Id(id) => element.id.as_deref() == Some(id.as_str()),
            Self::Tag(tag) => element.tag == *tag,
            Self::AttrContains { tag, attr, needle } => {
                tag.as_ref().is_none_or(|tag| element.tag == *tag)
                    && element
                        .attributes
                        .get(attr)
                        .is_some_and(|value| value.contains(needle.as_str()))
            }
            Self::Unsupported => false,
        }
    }
}

fn is_ident(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Arena-backed document with an `<html>` root.
#[derive(Clone, Debug)]
pub struct MemoryPage {
    nodes: Vec<ElementData>,
    root: NodeId,
    body: Option<NodeId>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// Document with `<html><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut page = Self::without_body();
        let body = page.element(page.root, "body");
        page.body = Some(body);
        page
    }

    /// Document with only an `<html>` root, as seen while the parser has not reached `<body>`.
    #[must_use]
    pub fn without_body() -> Self {
        Self {
            nodes: vec![ElementData {
                tag: "html".to_string(),
                ..ElementData::default()
            }],
            root: NodeId(0),
            body: None,
        }
    }

    /// The `<html>` element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Create an element and append it to `parent`.
    pub fn element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.alloc(tag);
        self.attach(parent, node);
        node
    }

    /// Set an attribute. `id` and `class` update the element's id and class list.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.nodes.get_mut(node.0) else {
            return;
        };
        match name {
            "id" => element.id = Some(value.to_string()),
            "class" => {
                element.classes = value.split_whitespace().map(str::to_string).collect();
            }
            _ => {
                element
                    .attributes
                    .insert(name.to_ascii_lowercase(), value.to_string());
            }
        }
    }

    /// Whether the element is reachable from the document root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, node)
    }

    /// Classes carried by the element, in insertion order.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes
            .get(node.0)
            .map_or(&[], |element| element.classes.as_slice())
    }

    /// Inline style value for `property`.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(node.0)
            .and_then(|element| element.styles.get(property))
            .map(String::as_str)
    }

    /// Text content set through [`PageDom::set_text`].
    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(node.0)
            .and_then(|element| element.text.as_deref())
    }

    /// Tag name of the element.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|element| element.tag.as_str())
    }

    /// Direct children of the element.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map_or(&[], |element| element.children.as_slice())
    }

    /// Number of attached elements carrying `id`.
    #[must_use]
    pub fn count_by_id(&self, id: &str) -> usize {
        self.document_order()
            .into_iter()
            .filter(|node| self.nodes[node.0].id.as_deref() == Some(id))
            .count()
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        });
        node
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len()
            || child.0 >= self.nodes.len()
            || self.is_inclusive_ancestor(child, parent)
        {
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|element| element.parent);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node.0).and_then(|e| e.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.retain(|child| *child != node);
        }
    }

    fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        order
    }
}

impl PageDom for MemoryPage {
    type Node = NodeId;

    fn body(&self) -> Option<NodeId> {
        self.body.filter(|body| self.is_attached(*body))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        self.document_order()
            .into_iter()
            .filter(|node| selector.matches(&self.nodes[node.0]))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|node| self.nodes[node.0].id.as_deref() == Some(id))
    }

    fn create_element(&mut self, tag: &str) -> Option<NodeId> {
        Some(self.alloc(tag))
    }

    fn set_id(&mut self, node: &NodeId, id: &str) {
        self.set_attribute(*node, "id", id);
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        let Some(children) = self
            .nodes
            .get_mut(node.0)
            .map(|element| std::mem::take(&mut element.children))
        else {
            return;
        };
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[node.0].text = Some(text.to_string());
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.attach(*parent, *child);
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if let Some(element) = self.nodes.get_mut(node.0) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        if let Some(element) = self.nodes.get_mut(node.0) {
            element.classes.retain(|c| c != class);
        }
    }

    fn toggle_class(&mut self, node: &NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            self.has_class(node, class)
        }
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.classes(*node).iter().any(|c| c == class)
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        if let Some(element) = self.nodes.get_mut(node.0) {
            element
                .styles
                .insert(property.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(page: &mut MemoryPage, href: &str) -> NodeId {
        let body = page.body().unwrap_or(page.root());
        let anchor = page.element(body, "a");
        page.set_attribute(anchor, "href", href);
        anchor
    }

    #[test]
    fn selectors_match_in_document_order() {
        let mut page = MemoryPage::new();
        let body = page.body().unwrap_or(page.root());
        let section = page.element(body, "section");
        let first = page.element(section, "button");
        page.set_attribute(first, "class", "mood-btn calm");
        let second = page.element(body, "button");
        page.set_attribute(second, "class", "mood-btn");
        page.set_attribute(second, "id", "happy");

        assert_eq!(page.query_selector_all(".mood-btn"), vec![first, second]);
        assert_eq!(page.query_selector(".calm"), Some(first));
        assert_eq!(page.query_selector("#happy"), Some(second));
        assert_eq!(page.query_selector_all("button").len(), 2);
        assert_eq!(page.query_selector(".missing"), None);
    }

    #[test]
    fn attribute_contains_selector_matches_substring() {
        let mut page = MemoryPage::new();
        let hit = link(&mut page, "/playlist?mood=calm");
        let also = link(&mut page, "/my-playlists");
        link(&mut page, "/history");
        let body = page.body().unwrap_or(page.root());
        let div = page.element(body, "div");
        page.set_attribute(div, "href", "/playlist");

        assert_eq!(
            page.query_selector_all("a[href*='playlist']"),
            vec![hit, also]
        );
        assert_eq!(page.query_selector_all("[href*=\"playlist\"]").len(), 3);
    }

    #[test]
    fn unsupported_selectors_match_nothing() {
        let mut page = MemoryPage::new();
        link(&mut page, "/playlist");
        assert!(page.query_selector_all("body > a").is_empty());
        assert!(page.query_selector_all("a[href^='/']").is_empty());
        assert!(page.query_selector_all("").is_empty());
    }

    #[test]
    fn removed_nodes_are_detached_and_unfindable() {
        let mut page = MemoryPage::new();
        let body = page.body().unwrap_or(page.root());
        let flash = page.element(body, "div");
        page.set_attribute(flash, "class", "flash-message");
        page.remove(&flash);
        assert!(!page.is_attached(flash));
        assert_eq!(page.query_selector(".flash-message"), None);
        page.remove(&flash);
        assert!(page.children(body).is_empty());
    }

    #[test]
    fn element_by_id_ignores_detached_elements() {
        let mut page = MemoryPage::new();
        let loader = page.create_element("div");
        let Some(loader) = loader else {
            panic!("memory page always creates elements");
        };
        page.set_id(&loader, "loading");
        assert_eq!(page.element_by_id("loading"), None);
        let body = page.body().unwrap_or(page.root());
        page.append_child(&body, &loader);
        assert_eq!(page.element_by_id("loading"), Some(loader));
        assert_eq!(page.count_by_id("loading"), 1);
    }

    #[test]
    fn class_operations_are_idempotent() {
        let mut page = MemoryPage::new();
        let body = page.body().unwrap_or(page.root());
        page.add_class(&body, "fade-in");
        page.add_class(&body, "fade-in");
        assert_eq!(page.classes(body), ["fade-in".to_string()]);
        assert!(page.toggle_class(&body, "dark-mode"));
        assert!(!page.toggle_class(&body, "dark-mode"));
        page.remove_class(&body, "absent");
        assert_eq!(page.classes(body).len(), 1);
    }

    #[test]
    fn appending_an_ancestor_into_its_descendant_is_ignored() {
        let mut page = MemoryPage::new();
        let body = page.body().unwrap_or(page.root());
        let outer = page.element(body, "div");
        let inner = page.element(outer, "div");
        page.append_child(&inner, &outer);
        assert_eq!(page.children(body), [outer]);
        assert!(page.children(inner).is_empty());
        assert!(page.is_attached(inner));
    }

    #[test]
    fn set_text_replaces_children() {
        let mut page = MemoryPage::new();
        let body = page.body().unwrap_or(page.root());
        let paragraph = page.element(body, "p");
        let span = page.element(paragraph, "span");
        page.set_text(&paragraph, "hello");
        assert_eq!(page.text(paragraph), Some("hello"));
        assert!(!page.is_attached(span));
    }

    #[test]
    fn page_without_body_reports_none() {
        let page = MemoryPage::without_body();
        assert_eq!(page.body(), None);
        assert_eq!(page.tag(page.root()), Some("html"));
    }
}
