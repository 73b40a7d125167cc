//! Browser wiring: builds the controller over the live document and attaches
//! the event listeners it needs.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::console;
use gloo::events::EventListener;
use gloo::utils::window;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, MouseEvent, PageTransitionEvent};

use crate::config::PageConfig;
use crate::core::controller::PageInteractionController;
use crate::core::events::{ClickEvent, PageShowEvent, PointerButton};

mod dom;
mod preferences;
mod timers;

use dom::WebDom;
use preferences::BrowserStorage;
use timers::TimeoutScheduler;

/// Element holding an optional JSON [`PageConfig`] override.
pub(crate) const CONFIG_ELEMENT_ID: &str = "moodtune-config";

pub(crate) type WebController = PageInteractionController<WebDom, BrowserStorage, TimeoutScheduler>;

/// Entrypoint invoked by Trunk for wasm32 builds.
pub fn run_page() {
    console_error_panic_hook::set_once();
    let window = window();
    let Some(document) = window.document() else {
        return;
    };
    let config = load_config(&document);

    let controller = Rc::new_cyclic(|weak| {
        RefCell::new(PageInteractionController::new(
            WebDom::new(document.clone()),
            BrowserStorage,
            TimeoutScheduler::new(weak.clone()),
            config,
        ))
    });
    controller.borrow_mut().activate();

    let mut listeners = Vec::new();

    if document.ready_state() == "loading" {
        let controller = Rc::clone(&controller);
        listeners.push(EventListener::once(&document, "DOMContentLoaded", move |_| {
            dispatch(&controller, WebController::on_ready);
        }));
    } else {
        controller.borrow_mut().on_ready();
    }

    let mood_buttons = controller.borrow().mood_buttons().to_vec();
    for button in mood_buttons {
        let controller = Rc::clone(&controller);
        let target = button.clone();
        listeners.push(EventListener::new(&button, "click", move |_| {
            dispatch(&controller, |page| page.on_mood_click(&target));
        }));
    }

    let playlist_links = controller.borrow().playlist_links().to_vec();
    for link in playlist_links {
        let controller = Rc::clone(&controller);
        let target = link.clone();
        listeners.push(EventListener::new(&link, "click", move |event| {
            let click = click_details(event);
            dispatch(&controller, |page| page.on_playlist_click(&target, click));
        }));
    }

    let theme_toggle = controller.borrow().theme_toggle().cloned();
    if let Some(toggle) = theme_toggle {
        let controller = Rc::clone(&controller);
        listeners.push(EventListener::new(&toggle, "click", move |_| {
            dispatch(&controller, |page| {
                page.on_theme_toggle();
            });
        }));
    }

    {
        let controller = Rc::clone(&controller);
        listeners.push(EventListener::new(&window, "pageshow", move |event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(PageTransitionEvent::persisted);
            dispatch(&controller, |page| {
                page.on_page_show(PageShowEvent { persisted });
            });
        }));
    }

    for listener in listeners {
        listener.forget();
    }
}

fn dispatch(controller: &Rc<RefCell<WebController>>, handler: impl FnOnce(&mut WebController)) {
    if let Ok(mut controller) = controller.try_borrow_mut() {
        handler(&mut *controller);
    }
}

fn click_details(event: &Event) -> ClickEvent {
    event
        .dyn_ref::<MouseEvent>()
        .map_or_else(ClickEvent::primary, |mouse| ClickEvent {
            button: PointerButton::from_code(mouse.button()),
            ctrl_key: mouse.ctrl_key(),
            meta_key: mouse.meta_key(),
        })
}

fn load_config(document: &Document) -> PageConfig {
    let Some(raw) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
    else {
        return PageConfig::default();
    };
    match PageConfig::from_json(&raw) {
        Ok(config) => config,
        Err(err) => {
            console::error!("ignoring invalid page config override", err.to_string());
            PageConfig::default()
        }
    }
}
