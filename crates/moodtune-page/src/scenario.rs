//! Deterministic replay of scripted page sessions.
//!
//! A [`Scenario`] describes the server-rendered markup and the user/timer
//! events that happen afterward. [`run`] builds a [`MemoryPage`], activates the
//! controller, applies every step against a virtual clock, and returns a
//! [`Snapshot`] of the observable page state.
//!
//! ```json
//! {
//!   "page": { "flash_message": true, "mood_buttons": 3, "links": ["/playlist?mood=calm"] },
//!   "steps": [
//!     { "action": "ready" },
//!     { "action": "click_mood", "index": 1 },
//!     { "action": "advance", "ms": 3500 }
//!   ]
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::config::PageConfig;
use crate::core::controller::PageInteractionController;
use crate::core::dom::PageDom;
use crate::core::events::{ClickEvent, PageShowEvent, PointerButton};
use crate::core::memory::{MemoryPage, NodeId};
use crate::core::schedule::ManualScheduler;
use crate::core::storage::{KeyValueStore, MemoryStore};
use crate::error::ScenarioError;

/// Scripted page session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Configuration override; defaults apply when absent.
    #[serde(default)]
    pub config: Option<PageConfig>,
    /// Markup and storage present when the page loads.
    #[serde(default)]
    pub page: PageFixture,
    /// Events applied in order after activation.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Decode a scenario document.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] for malformed or unknown input.
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(raw).map_err(|source| ScenarioError::Parse { source })
    }
}

/// Server-rendered state of the page at load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageFixture {
    /// Render a flash message.
    pub flash_message: bool,
    /// Number of mood buttons to render.
    pub mood_buttons: usize,
    /// `href` of every anchor to render, playlist or not.
    pub links: Vec<String>,
    /// Render the theme toggle control.
    pub theme_toggle: bool,
    /// Theme value already persisted for the origin.
    pub stored_theme: Option<String>,
    /// Make storage reject writes.
    pub read_only_storage: bool,
}

/// One scripted event.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    /// The document became interactive.
    Ready,
    /// Advance the virtual clock, running every timer that comes due.
    Advance {
        /// Milliseconds to advance.
        ms: u64,
    },
    /// Click the mood button at `index` (fixture order, including late additions).
    ClickMood {
        /// Index into the rendered mood buttons.
        index: usize,
    },
    /// Click the anchor at `index` in [`PageFixture::links`].
    ClickLink {
        /// Index into the rendered links.
        index: usize,
        /// Mouse button used.
        #[serde(default)]
        button: PointerButton,
        /// Control key held.
        #[serde(default)]
        ctrl_key: bool,
        /// Meta key held.
        #[serde(default)]
        meta_key: bool,
    },
    /// Click the theme toggle control.
    ToggleTheme,
    /// The window fired `pageshow`.
    PageShow {
        /// Restored from the back/forward cache.
        #[serde(default)]
        persisted: bool,
    },
    /// Render another mood button after activation.
    AddMoodButton,
    /// Render another flash message after activation.
    AddFlashMessage,
}

/// Observable page state after a replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Virtual time elapsed since activation.
    pub elapsed_ms: u64,
    /// Classes on `<body>`.
    pub body_classes: Vec<String>,
    /// Number of flash messages still attached.
    pub flash_messages: usize,
    /// Inline opacity of the first attached flash message.
    pub flash_opacity: Option<String>,
    /// Indexes of mood buttons carrying the selected marker.
    pub selected_moods: Vec<usize>,
    /// Number of attached loading indicators.
    pub loaders: usize,
    /// Theme value in storage.
    pub stored_theme: Option<String>,
    /// Whether the theme toggle was found at activation.
    pub theme_toggle_enabled: bool,
}

type ReplayController = PageInteractionController<MemoryPage, MemoryStore, ManualScheduler>;

struct Session {
    controller: ReplayController,
    mood_buttons: Vec<NodeId>,
    links: Vec<NodeId>,
    flash_class: String,
    mood_class: String,
}

impl Session {
    fn load(config: PageConfig, fixture: &PageFixture) -> Result<Self, ScenarioError> {
        let flash_class = fixture_class("flash_selector", &config.flash_selector)?;
        let mood_class = fixture_class("mood_selector", &config.mood_selector)?;

        let mut page = MemoryPage::new();
        let body = page.body().unwrap_or_else(|| page.root());
        if fixture.flash_message {
            add_flash(&mut page, body, &flash_class);
        }
        let mood_buttons: Vec<NodeId> = (0..fixture.mood_buttons)
            .map(|_| add_mood_button(&mut page, body, &mood_class))
            .collect();
        let links: Vec<NodeId> = fixture
            .links
            .iter()
            .map(|href| {
                let anchor = page.element(body, "a");
                page.set_attribute(anchor, "href", href);
                anchor
            })
            .collect();
        if fixture.theme_toggle {
            let toggle = page.element(body, "button");
            page.set_attribute(toggle, "id", &config.theme_toggle_id);
        }

        let mut storage = fixture
            .stored_theme
            .as_ref()
            .map_or_else(MemoryStore::new, |theme| {
                MemoryStore::with_entry(config.theme_storage_key.clone(), theme.clone())
            });
        storage.set_read_only(fixture.read_only_storage);

        let mut controller =
            PageInteractionController::new(page, storage, ManualScheduler::new(), config);
        controller.activate();
        Ok(Self {
            controller,
            mood_buttons,
            links,
            flash_class,
            mood_class,
        })
    }

    fn apply(&mut self, step: &Step) -> Result<(), ScenarioError> {
        debug!(?step, "applying scenario step");
        match step {
            Step::Ready => self.controller.on_ready(),
            Step::Advance { ms } => self.advance(Duration::from_millis(*ms)),
            Step::ClickMood { index } => {
                let button = lookup(&self.mood_buttons, "mood_button", *index)?;
                self.controller.on_mood_click(&button);
            }
            Step::ClickLink {
                index,
                button,
                ctrl_key,
                meta_key,
            } => {
                let link = lookup(&self.links, "link", *index)?;
                let click = ClickEvent {
                    button: *button,
                    ctrl_key: *ctrl_key,
                    meta_key: *meta_key,
                };
                self.controller.on_playlist_click(&link, click);
            }
            Step::ToggleTheme => {
                self.controller.on_theme_toggle();
            }
            Step::PageShow { persisted } => self.controller.on_page_show(PageShowEvent {
                persisted: *persisted,
            }),
            Step::AddMoodButton => {
                let page = self.controller.dom_mut();
                let body = page.body().unwrap_or_else(|| page.root());
                let button = add_mood_button(page, body, &self.mood_class);
                self.mood_buttons.push(button);
            }
            Step::AddFlashMessage => {
                let page = self.controller.dom_mut();
                let body = page.body().unwrap_or_else(|| page.root());
                add_flash(page, body, &self.flash_class);
            }
        }
        Ok(())
    }

    fn advance(&mut self, by: Duration) {
        let deadline = self.controller.scheduler_mut().now().saturating_add(by);
        while let Some(task) = self.controller.scheduler_mut().next_due(deadline) {
            debug!(?task, "timer fired");
            self.controller.run_task(task);
        }
        self.controller.scheduler_mut().settle(deadline);
    }

    fn snapshot(&mut self) -> Snapshot {
        let elapsed = self.controller.scheduler_mut().now();
        let controller = &self.controller;
        let page = controller.dom();
        let config = controller.config();
        let flashes = page.query_selector_all(&config.flash_selector);
        Snapshot {
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            body_classes: page
                .body()
                .map(|body| page.classes(body).to_vec())
                .unwrap_or_default(),
            flash_messages: flashes.len(),
            flash_opacity: flashes
                .first()
                .and_then(|flash| page.style(*flash, "opacity"))
                .map(str::to_string),
            selected_moods: self
                .mood_buttons
                .iter()
                .enumerate()
                .filter(|(_, button)| page.has_class(button, &config.selected_mood_class))
                .map(|(index, _)| index)
                .collect(),
            loaders: page.count_by_id(&config.loader_id),
            stored_theme: controller.storage().get(&config.theme_storage_key),
            theme_toggle_enabled: controller.theme_toggle_enabled(),
        }
    }
}

fn lookup(nodes: &[NodeId], kind: &'static str, index: usize) -> Result<NodeId, ScenarioError> {
    nodes
        .get(index)
        .copied()
        .ok_or(ScenarioError::UnknownNode { kind, index })
}

fn add_flash(page: &mut MemoryPage, body: NodeId, class: &str) -> NodeId {
    let flash = page.element(body, "div");
    page.set_attribute(flash, "class", class);
    page.set_text(&flash, "Saved!");
    flash
}

fn add_mood_button(page: &mut MemoryPage, body: NodeId, class: &str) -> NodeId {
    let button = page.element(body, "button");
    page.set_attribute(button, "class", class);
    button
}

/// Class to render for fixture markup matched by a `.class` selector.
fn fixture_class(field: &'static str, selector: &str) -> Result<String, ScenarioError> {
    selector
        .trim()
        .strip_prefix('.')
        .filter(|class| {
            !class.is_empty()
                && class
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
        .map(str::to_string)
        .ok_or_else(|| ScenarioError::FixtureSelector {
            field,
            selector: selector.to_string(),
        })
}

/// Replay a scenario and capture the resulting page state.
///
/// # Errors
///
/// Returns [`ScenarioError::Config`] for an invalid configuration override,
/// [`ScenarioError::FixtureSelector`] when the flash or mood selector is not a
/// plain `.class` selector the fixture can render, and
/// [`ScenarioError::UnknownNode`] when a step indexes a missing fixture element.
pub fn run(scenario: &Scenario) -> Result<Snapshot, ScenarioError> {
    let config = scenario.config.clone().unwrap_or_default();
    config.validate()?;

    let span = info_span!("scenario", steps = scenario.steps.len());
    let _entered = span.enter();
    info!("replaying page session");

    let mut session = Session::load(config, &scenario.page)?;
    for step in &scenario.steps {
        session.apply(step)?;
    }
    Ok(session.snapshot())
}
