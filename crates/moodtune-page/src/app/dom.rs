//! `web_sys` implementation of the document seam.

use gloo::console;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::core::dom::PageDom;

/// Live browser document.
#[derive(Clone, Debug)]
pub(crate) struct WebDom {
    document: Document,
}

impl WebDom {
    pub(crate) const fn new(document: Document) -> Self {
        Self { document }
    }
}

impl PageDom for WebDom {
    type Node = Element;

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn query_selector(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn create_element(&mut self, tag: &str) -> Option<Element> {
        self.document
            .create_element(tag)
            .map_err(|err| log_dom_error("create_element", &err))
            .ok()
    }

    fn set_id(&mut self, node: &Element, id: &str) {
        node.set_id(id);
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn append_child(&mut self, parent: &Element, child: &Element) {
        if let Err(err) = parent.append_child(child) {
            log_dom_error("append_child", &err);
        }
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        if let Err(err) = node.class_list().add_1(class) {
            log_dom_error("class_list.add", &err);
        }
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        if let Err(err) = node.class_list().remove_1(class) {
            log_dom_error("class_list.remove", &err);
        }
    }

    fn toggle_class(&mut self, node: &Element, class: &str) -> bool {
        node.class_list().toggle(class).unwrap_or_else(|err| {
            log_dom_error("class_list.toggle", &err);
            node.class_list().contains(class)
        })
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(err) = element.style().set_property(property, value) {
            log_dom_error("style.set_property", &err);
        }
    }
}

fn log_dom_error(operation: &'static str, err: &JsValue) {
    console::error!("dom operation failed", operation, err.clone());
}
