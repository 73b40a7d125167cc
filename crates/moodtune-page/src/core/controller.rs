//! Page interaction controller.
//!
//! # Design
//! - One method per browser event; the host wires listeners and forwards events.
//! - Mood buttons, playlist links, and the theme toggle are captured once by
//!   [`PageInteractionController::activate`]; nodes added afterward are ignored.
//! - Missing elements are a silent no-op. Only rejected storage writes are logged.

use tracing::{debug, warn};

use crate::config::PageConfig;
use crate::core::dom::PageDom;
use crate::core::events::{ClickEvent, PageShowEvent, PageTask};
use crate::core::schedule::Scheduler;
use crate::core::storage::KeyValueStore;
use crate::core::theme::ThemeMode;

/// Drives every page behavior against a document, a store, and a scheduler.
pub struct PageInteractionController<D: PageDom, S, T> {
    dom: D,
    storage: S,
    scheduler: T,
    config: PageConfig,
    activated: bool,
    mood_buttons: Vec<D::Node>,
    playlist_links: Vec<D::Node>,
    theme_toggle: Option<D::Node>,
    fading_flash: Option<D::Node>,
}

impl<D, S, T> PageInteractionController<D, S, T>
where
    D: PageDom,
    S: KeyValueStore,
    T: Scheduler,
{
    /// Build an inactive controller. Call [`Self::activate`] once the script runs.
    #[must_use]
    pub const fn new(dom: D, storage: S, scheduler: T, config: PageConfig) -> Self {
        Self {
            dom,
            storage,
            scheduler,
            config,
            activated: false,
            mood_buttons: Vec::new(),
            playlist_links: Vec::new(),
            theme_toggle: None,
            fading_flash: None,
        }
    }

    /// Run script-evaluation work: schedule the flash dismissal, capture the
    /// interactive elements, and restore a persisted dark theme.
    ///
    /// Only the first call has an effect.
    pub fn activate(&mut self) {
        if self.activated {
            return;
        }
        self.activated = true;

        self.scheduler
            .schedule(self.config.flash_delay(), PageTask::FadeFlash);

        self.mood_buttons = self.dom.query_selector_all(&self.config.mood_selector);
        self.playlist_links = self
            .dom
            .query_selector_all(&self.config.playlist_link_selector);
        self.theme_toggle = self.dom.element_by_id(&self.config.theme_toggle_id);

        if self.theme_toggle.is_some() {
            let stored = self.storage.get(&self.config.theme_storage_key);
            if ThemeMode::from_stored(stored.as_deref()) == ThemeMode::Dark {
                if let Some(body) = self.dom.body() {
                    self.dom.add_class(&body, &self.config.dark_mode_class);
                    debug!("restored dark theme from storage");
                }
            }
        }
    }

    /// Document became interactive: mark the body for the fade-in transition.
    pub fn on_ready(&mut self) {
        if let Some(body) = self.dom.body() {
            self.dom.add_class(&body, &self.config.fade_in_class);
        }
    }

    /// Execute deferred work queued on the scheduler.
    pub fn run_task(&mut self, task: PageTask) {
        match task {
            PageTask::FadeFlash => self.fade_flash(),
            PageTask::RemoveFlash => self.remove_flash(),
        }
    }

    /// A captured mood button was clicked: it becomes the only selected one.
    pub fn on_mood_click(&mut self, button: &D::Node) {
        if !self.mood_buttons.contains(button) {
            return;
        }
        let class = &self.config.selected_mood_class;
        for other in &self.mood_buttons {
            self.dom.remove_class(other, class);
        }
        self.dom.add_class(button, class);
    }

    /// A captured playlist link was clicked: show the loading indicator unless
    /// the click opens the playlist in another tab or window.
    ///
    /// At most one indicator is attached; repeated clicks keep the existing one.
    pub fn on_playlist_click(&mut self, link: &D::Node, click: ClickEvent) {
        if !self.playlist_links.contains(link) || click.opens_elsewhere() {
            return;
        }
        if self.dom.element_by_id(&self.config.loader_id).is_some() {
            return;
        }
        let Some(body) = self.dom.body() else {
            return;
        };
        let (Some(loader), Some(spinner), Some(message)) = (
            self.dom.create_element("div"),
            self.dom.create_element("div"),
            self.dom.create_element("p"),
        ) else {
            return;
        };
        self.dom.set_id(&loader, &self.config.loader_id);
        self.dom.add_class(&spinner, &self.config.spinner_class);
        self.dom.set_text(&message, &self.config.loader_message);
        self.dom.append_child(&loader, &spinner);
        self.dom.append_child(&loader, &message);
        self.dom.append_child(&body, &loader);
        debug!(id = %self.config.loader_id, "inserted playlist loading indicator");
    }

    /// The theme toggle was clicked: flip dark mode and persist the result.
    ///
    /// Returns the new mode, or `None` when the page has no toggle control.
    pub fn on_theme_toggle(&mut self) -> Option<ThemeMode> {
        self.theme_toggle.as_ref()?;
        let body = self.dom.body()?;
        let dark = self.dom.toggle_class(&body, &self.config.dark_mode_class);
        let mode = ThemeMode::from_marker(dark);
        if let Err(err) = self
            .storage
            .set(&self.config.theme_storage_key, mode.as_str())
        {
            warn!(error = %err, key = %self.config.theme_storage_key, "failed to persist theme");
        } else {
            debug!(theme = mode.as_str(), "persisted theme preference");
        }
        Some(mode)
    }

    /// The window fired `pageshow`: drop a stale loading indicator after a
    /// back/forward cache restore.
    pub fn on_page_show(&mut self, event: PageShowEvent) {
        if !event.persisted {
            return;
        }
        if let Some(loader) = self.dom.element_by_id(&self.config.loader_id) {
            self.dom.remove(&loader);
            debug!("removed loading indicator after cache restore");
        }
    }

    /// Whether the page has a theme toggle control.
    #[must_use]
    pub const fn theme_toggle_enabled(&self) -> bool {
        self.theme_toggle.is_some()
    }

    /// Mood buttons captured at activation.
    #[must_use]
    pub fn mood_buttons(&self) -> &[D::Node] {
        &self.mood_buttons
    }

    /// Playlist links captured at activation.
    #[must_use]
    pub fn playlist_links(&self) -> &[D::Node] {
        &self.playlist_links
    }

    /// Theme toggle captured at activation.
    #[must_use]
    pub const fn theme_toggle(&self) -> Option<&D::Node> {
        self.theme_toggle.as_ref()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Read access to the document.
    #[must_use]
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable access to the document, for hosts that add markup after activation.
    pub const fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Read access to the store.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the scheduler.
    pub const fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    fn fade_flash(&mut self) {
        let Some(flash) = self.dom.query_selector(&self.config.flash_selector) else {
            return;
        };
        self.dom.set_style(&flash, "opacity", "0");
        self.fading_flash = Some(flash);
        self.scheduler
            .schedule(self.config.flash_fade(), PageTask::RemoveFlash);
        debug!("faded flash message");
    }

    fn remove_flash(&mut self) {
        if let Some(flash) = self.fading_flash.take() {
            self.dom.remove(&flash);
            debug!("removed flash message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::PointerButton;
    use crate::core::memory::{MemoryPage, NodeId};
    use crate::core::schedule::ManualScheduler;
    use crate::core::storage::MemoryStore;
    use std::time::Duration;

    type TestController = PageInteractionController<MemoryPage, MemoryStore, ManualScheduler>;

    struct Fixture {
        page: MemoryPage,
        body: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let page = MemoryPage::new();
            let body = page.body().unwrap_or(page.root());
            Self { page, body }
        }

        fn add(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
            let node = self.page.element(self.body, tag);
            for (name, value) in attrs {
                self.page.set_attribute(node, name, value);
            }
            node
        }

        fn start(self, storage: MemoryStore) -> TestController {
            let mut controller = PageInteractionController::new(
                self.page,
                storage,
                ManualScheduler::new(),
                PageConfig::default(),
            );
            controller.activate();
            controller
        }
    }

    fn advance_to(controller: &mut TestController, ms: u64) {
        let deadline = Duration::from_millis(ms);
        while let Some(task) = controller.scheduler_mut().next_due(deadline) {
            controller.run_task(task);
        }
        controller.scheduler_mut().settle(deadline);
    }

    fn body_of(controller: &TestController) -> NodeId {
        controller
            .dom()
            .body()
            .unwrap_or_else(|| controller.dom().root())
    }

    #[test]
    fn ready_marks_body_once() {
        let mut controller = Fixture::new().start(MemoryStore::new());
        controller.on_ready();
        controller.on_ready();
        let body = body_of(&controller);
        let count = controller
            .dom()
            .classes(body)
            .iter()
            .filter(|class| *class == "fade-in")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn ready_without_body_is_a_no_op() {
        let mut controller = PageInteractionController::new(
            MemoryPage::without_body(),
            MemoryStore::new(),
            ManualScheduler::new(),
            PageConfig::default(),
        );
        controller.activate();
        controller.on_ready();
        let root = controller.dom().root();
        assert!(controller.dom().classes(root).is_empty());
    }

    #[test]
    fn flash_message_fades_then_disappears() {
        let mut fixture = Fixture::new();
        let flash = fixture.add("div", &[("class", "flash-message")]);
        let mut controller = fixture.start(MemoryStore::new());

        advance_to(&mut controller, 2_999);
        assert!(controller.dom().is_attached(flash));
        assert_eq!(controller.dom().style(flash, "opacity"), None);

        advance_to(&mut controller, 3_000);
        assert_eq!(controller.dom().style(flash, "opacity"), Some("0"));
        assert!(controller.dom().is_attached(flash));

        advance_to(&mut controller, 3_499);
        assert!(controller.dom().is_attached(flash));

        advance_to(&mut controller, 3_501);
        assert!(!controller.dom().is_attached(flash));
    }

    #[test]
    fn only_the_first_flash_message_is_dismissed() {
        let mut fixture = Fixture::new();
        let first = fixture.add("div", &[("class", "flash-message")]);
        let second = fixture.add("div", &[("class", "flash-message")]);
        let mut controller = fixture.start(MemoryStore::new());
        advance_to(&mut controller, 10_000);
        assert!(!controller.dom().is_attached(first));
        assert!(controller.dom().is_attached(second));
    }

    #[test]
    fn missing_flash_timer_fires_without_creating_anything() {
        let mut controller = Fixture::new().start(MemoryStore::new());
        assert_eq!(controller.scheduler_mut().pending(), 1);
        advance_to(&mut controller, 10_000);
        assert_eq!(controller.scheduler_mut().pending(), 0);
        assert!(controller.dom().query_selector(".flash-message").is_none());
        let body = body_of(&controller);
        assert!(controller.dom().children(body).is_empty());
    }

    #[test]
    fn flash_inserted_after_timer_is_never_dismissed() {
        let mut controller = Fixture::new().start(MemoryStore::new());
        advance_to(&mut controller, 3_000);
        let body = body_of(&controller);
        let late = controller.dom_mut().element(body, "div");
        controller
            .dom_mut()
            .set_attribute(late, "class", "flash-message");
        advance_to(&mut controller, 60_000);
        assert!(controller.dom().is_attached(late));
        assert_eq!(controller.dom().style(late, "opacity"), None);
    }

    #[test]
    fn mood_selection_is_mutually_exclusive() {
        let mut fixture = Fixture::new();
        let b1 = fixture.add("button", &[("class", "mood-btn")]);
        let b2 = fixture.add("button", &[("class", "mood-btn")]);
        let b3 = fixture.add("button", &[("class", "mood-btn")]);
        let mut controller = fixture.start(MemoryStore::new());

        for button in [b1, b2, b3] {
            assert!(!controller.dom().has_class(&button, "active-mood"));
        }
        controller.on_mood_click(&b2);
        controller.on_mood_click(&b1);
        assert!(controller.dom().has_class(&b1, "active-mood"));
        assert!(!controller.dom().has_class(&b2, "active-mood"));
        assert!(!controller.dom().has_class(&b3, "active-mood"));

        controller.on_mood_click(&b1);
        assert!(controller.dom().has_class(&b1, "active-mood"));
    }

    #[test]
    fn mood_buttons_added_later_are_not_covered() {
        let mut fixture = Fixture::new();
        let b1 = fixture.add("button", &[("class", "mood-btn")]);
        let mut controller = fixture.start(MemoryStore::new());
        controller.on_mood_click(&b1);

        let body = body_of(&controller);
        let late = controller.dom_mut().element(body, "button");
        controller.dom_mut().set_attribute(late, "class", "mood-btn");
        controller.on_mood_click(&late);

        assert!(controller.dom().has_class(&b1, "active-mood"));
        assert!(!controller.dom().has_class(&late, "active-mood"));
        assert_eq!(controller.mood_buttons(), [b1]);
    }

    #[test]
    fn plain_playlist_click_appends_loader() {
        let mut fixture = Fixture::new();
        let link = fixture.add("a", &[("href", "/playlist?mood=happy")]);
        let mut controller = fixture.start(MemoryStore::new());

        controller.on_playlist_click(&link, ClickEvent::primary());

        let dom = controller.dom();
        assert_eq!(dom.count_by_id("loading"), 1);
        let Some(loader) = dom.element_by_id("loading") else {
            panic!("loader should be attached");
        };
        let body = body_of(&controller);
        assert_eq!(dom.children(body).last(), Some(&loader));
        let children = dom.children(loader);
        assert_eq!(children.len(), 2);
        assert!(dom.has_class(&children[0], "loading-spinner"));
        assert_eq!(dom.tag(children[1]), Some("p"));
        assert_eq!(dom.text(children[1]), Some("Fetching your playlist..."));
    }

    #[test]
    fn modified_playlist_clicks_skip_the_loader() {
        let mut fixture = Fixture::new();
        let link = fixture.add("a", &[("href", "/playlist")]);
        let mut controller = fixture.start(MemoryStore::new());

        let clicks = [
            ClickEvent {
                ctrl_key: true,
                ..ClickEvent::primary()
            },
            ClickEvent {
                meta_key: true,
                ..ClickEvent::primary()
            },
            ClickEvent {
                button: PointerButton::Auxiliary,
                ..ClickEvent::primary()
            },
        ];
        for click in clicks {
            controller.on_playlist_click(&link, click);
        }
        assert_eq!(controller.dom().count_by_id("loading"), 0);
    }

    #[test]
    fn non_playlist_links_are_not_captured() {
        let mut fixture = Fixture::new();
        let other = fixture.add("a", &[("href", "/history")]);
        let mut controller = fixture.start(MemoryStore::new());
        controller.on_playlist_click(&other, ClickEvent::primary());
        assert_eq!(controller.dom().count_by_id("loading"), 0);
        assert!(controller.playlist_links().is_empty());
    }

    #[test]
    fn theme_toggle_flips_and_persists() {
        let mut fixture = Fixture::new();
        fixture.add("button", &[("id", "theme-toggle")]);
        let mut controller = fixture.start(MemoryStore::new());
        let body = body_of(&controller);

        assert!(controller.theme_toggle_enabled());
        assert!(!controller.dom().has_class(&body, "dark-mode"));

        assert_eq!(controller.on_theme_toggle(), Some(ThemeMode::Dark));
        assert!(controller.dom().has_class(&body, "dark-mode"));
        assert_eq!(controller.storage().get("theme").as_deref(), Some("dark"));

        assert_eq!(controller.on_theme_toggle(), Some(ThemeMode::Light));
        assert!(!controller.dom().has_class(&body, "dark-mode"));
        assert_eq!(controller.storage().get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn stored_dark_theme_applies_before_any_click() {
        let mut fixture = Fixture::new();
        fixture.add("button", &[("id", "theme-toggle")]);
        let controller = fixture.start(MemoryStore::with_entry("theme", "dark"));
        let body = body_of(&controller);
        assert!(controller.dom().has_class(&body, "dark-mode"));
    }

    #[test]
    fn stored_light_theme_leaves_page_light() {
        let mut fixture = Fixture::new();
        fixture.add("button", &[("id", "theme-toggle")]);
        let controller = fixture.start(MemoryStore::with_entry("theme", "light"));
        let body = body_of(&controller);
        assert!(!controller.dom().has_class(&body, "dark-mode"));
    }

    #[test]
    fn theme_behavior_is_inert_without_toggle() {
        let mut controller = Fixture::new().start(MemoryStore::with_entry("theme", "dark"));
        let body = body_of(&controller);
        assert!(!controller.theme_toggle_enabled());
        assert!(!controller.dom().has_class(&body, "dark-mode"));
        assert_eq!(controller.on_theme_toggle(), None);
        assert_eq!(controller.storage().get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn rejected_theme_write_still_toggles_the_page() {
        let mut fixture = Fixture::new();
        fixture.add("button", &[("id", "theme-toggle")]);
        let mut storage = MemoryStore::new();
        storage.set_read_only(true);
        let mut controller = fixture.start(storage);
        let body = body_of(&controller);
        assert_eq!(controller.on_theme_toggle(), Some(ThemeMode::Dark));
        assert!(controller.dom().has_class(&body, "dark-mode"));
        assert_eq!(controller.storage().get("theme"), None);
    }

    #[test]
    fn cache_restore_removes_stale_loader() {
        let mut fixture = Fixture::new();
        let link = fixture.add("a", &[("href", "/playlist")]);
        let mut controller = fixture.start(MemoryStore::new());
        controller.on_playlist_click(&link, ClickEvent::primary());

        controller.on_page_show(PageShowEvent { persisted: false });
        assert_eq!(controller.dom().count_by_id("loading"), 1);

        controller.on_page_show(PageShowEvent { persisted: true });
        assert_eq!(controller.dom().count_by_id("loading"), 0);

        controller.on_page_show(PageShowEvent { persisted: true });
        assert_eq!(controller.dom().count_by_id("loading"), 0);
    }

    #[test]
    fn repeated_playlist_clicks_keep_a_single_loader() {
        let mut fixture = Fixture::new();
        let first = fixture.add("a", &[("href", "/playlist?mood=calm")]);
        let second = fixture.add("a", &[("href", "/playlist?mood=sad")]);
        let mut controller = fixture.start(MemoryStore::new());

        controller.on_playlist_click(&first, ClickEvent::primary());
        controller.on_playlist_click(&second, ClickEvent::primary());
        assert_eq!(controller.dom().count_by_id("loading"), 1);

        controller.on_page_show(PageShowEvent { persisted: true });
        assert_eq!(controller.dom().count_by_id("loading"), 0);

        controller.on_playlist_click(&first, ClickEvent::primary());
        assert_eq!(controller.dom().count_by_id("loading"), 1);
    }

    #[test]
    fn activation_runs_once() {
        let mut fixture = Fixture::new();
        fixture.add("button", &[("class", "mood-btn")]);
        let mut controller = fixture.start(MemoryStore::new());
        controller.activate();
        assert_eq!(controller.scheduler_mut().pending(), 1);
        assert_eq!(controller.mood_buttons().len(), 1);
    }
}
