//! Document seam used by the page controller.
//!
//! Implemented over `web_sys` in the browser build and by
//! [`crate::core::memory::MemoryPage`] natively. Every lookup returns an
//! `Option` or an empty collection; implementations never fail on absence.

/// Minimal mutable view of a document.
pub trait PageDom {
    /// Handle to an element. Equality must mean "same element".
    type Node: Clone + PartialEq;

    /// The `<body>` element, when the document has one.
    fn body(&self) -> Option<Self::Node>;

    /// First element in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// Every element in document order matching `selector`.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Element carrying `id`, when attached to the document.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Option<Self::Node>;

    /// Set the element's `id`.
    fn set_id(&mut self, node: &Self::Node, id: &str);

    /// Replace the element's children with a text node.
    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Detach the element from its parent. Detached elements are left alone.
    fn remove(&mut self, node: &Self::Node);

    /// Add a class; adding a present class is a no-op.
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// Remove a class; removing an absent class is a no-op.
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    /// Flip a class and report whether it is present afterward.
    fn toggle_class(&mut self, node: &Self::Node, class: &str) -> bool;

    /// Whether the element carries `class`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Set an inline style property.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);
}
