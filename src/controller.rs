use crate::config::SiteConfig;
use crate::events::{EventKind, ObserverKind, PageEvent};
use crate::rate_limit::{Debounce, Throttle};
use crate::telemetry::{LogLevel, LogRecord};
use serde::Serialize;
use serde_json::{json, Map, Value};

const SCROLLED_CLASS: &str = "scrolled";
const ACTIVE_CLASS: &str = "active";
const VISIBLE_CLASS: &str = "visible";
const DEFERRED_SOURCE_ATTR: &str = "data-src";
const STAGGER_STEP_MS: u64 = 100;
const PARALLAX_BASE_SPEED: f64 = 0.1;
const PARALLAX_SPEED_STEP: f64 = 0.05;
const CONTACT_CONFIRMATION: &str = "Thank you for your message. We will get back to you soon!";
const STARTUP_MESSAGE: &str = "Taqadum Investment LLC - Website Initialized";

pub trait Viewport {
    fn scroll_y(&self) -> f64;
    fn navbar_height(&self) -> f64;
    fn hero_height(&self) -> f64;
    fn sections(&self) -> Vec<SectionBounds>;
    fn anchor_top(&self, selector: &str) -> Option<f64>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub offset_top: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Navbar,
    NavToggle,
    NavMenu,
    NavLink(usize),
    Reveal(usize),
    LazyImage(usize),
    Shape(usize),
    Year,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollMotion {
    Smooth,
    Instant,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    PreventDefault,
    SetClass {
        target: Target,
        class: &'static str,
        present: bool,
    },
    SetStyle {
        target: Target,
        property: &'static str,
        value: String,
    },
    SetAttribute {
        target: Target,
        name: &'static str,
        value: String,
    },
    RemoveAttribute {
        target: Target,
        name: &'static str,
    },
    SetText {
        target: Target,
        text: String,
    },
    ScrollLock(bool),
    ScrollTo {
        top: f64,
        motion: ScrollMotion,
    },
    StopObserving(Target),
    Alert(&'static str),
    ResetForm,
    Log(LogRecord),
    ScheduleResizeSettle {
        delay_ms: u64,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevealTarget {
    pub stagger_index: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct PageInventory {
    pub has_navbar: bool,
    pub nav_links: Vec<Option<String>>,
    pub reveal_targets: Vec<RevealTarget>,
    pub lazy_sources: Vec<String>,
    pub shape_count: usize,
    pub observer_supported: bool,
    pub reduced_motion: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ActiveLink {
    Untracked,
    Cleared,
    Link(usize),
}

#[derive(Debug)]
struct RevealElement {
    stagger_index: Option<usize>,
    revealed: bool,
}

#[derive(Debug)]
struct LazyImage {
    deferred_src: String,
    loaded: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartupSummary<'a> {
    message: &'a str,
    nav_links: usize,
    reveal_elements: usize,
    lazy_images: usize,
    shapes: usize,
    parallax: bool,
    intersection_observer: bool,
}

pub struct Tick<'a> {
    pub now_ms: f64,
    pub viewport: &'a dyn Viewport,
}

type Handler = fn(&mut PageController, &PageEvent, &Tick<'_>, &mut Vec<Effect>);

const HANDLERS: &[(EventKind, Handler)] = &[
    (EventKind::Scroll, PageController::on_scroll_navbar),
    (EventKind::Scroll, PageController::on_scroll_active_link),
    (EventKind::Scroll, PageController::on_scroll_parallax),
    (EventKind::Resize, PageController::on_resize),
    (EventKind::ResizeSettled, PageController::on_resize_settled),
    (EventKind::MenuToggle, PageController::on_menu_toggle),
    (EventKind::NavLinkClick, PageController::on_nav_link_click),
    (EventKind::DocumentClick, PageController::on_document_click),
    (EventKind::KeyDown, PageController::on_key_down),
    (EventKind::Intersection, PageController::on_intersection),
    (EventKind::FormSubmit, PageController::on_form_submit),
];

#[derive(Debug)]
pub struct PageController {
    config: SiteConfig,
    has_navbar: bool,
    nav_links: Vec<Option<String>>,
    reveal_elements: Vec<RevealElement>,
    lazy_images: Vec<LazyImage>,
    shape_count: usize,
    observer_supported: bool,
    reduced_motion: bool,
    navbar_scrolled: Option<bool>,
    menu_open: bool,
    active_link: ActiveLink,
    navbar_throttle: Throttle,
    active_link_throttle: Throttle,
    parallax_throttle: Throttle,
    resize_debounce: Debounce,
}

impl PageController {
    pub fn new(config: SiteConfig, inventory: PageInventory) -> Self {
        let reveal_elements = inventory
            .reveal_targets
            .into_iter()
            .map(|target| RevealElement {
                stagger_index: target.stagger_index,
                revealed: false,
            })
            .collect();
        let lazy_images = inventory
            .lazy_sources
            .into_iter()
            .map(|deferred_src| LazyImage {
                deferred_src,
                loaded: false,
            })
            .collect();

        Self {
            navbar_throttle: Throttle::new(config.navbar_throttle_ms),
            active_link_throttle: Throttle::new(config.active_link_throttle_ms),
            parallax_throttle: Throttle::new(config.parallax_throttle_ms),
            resize_debounce: Debounce::new(config.resize_debounce_ms),
            config,
            has_navbar: inventory.has_navbar,
            nav_links: inventory.nav_links,
            reveal_elements,
            lazy_images,
            shape_count: inventory.shape_count,
            observer_supported: inventory.observer_supported,
            reduced_motion: inventory.reduced_motion,
            navbar_scrolled: None,
            menu_open: false,
            active_link: ActiveLink::Untracked,
        }
    }

    pub fn start(&mut self, year: u32, viewport: &dyn Viewport) -> Vec<Effect> {
        let mut effects = vec![Effect::SetText {
            target: Target::Year,
            text: year.to_string(),
        }];

        if !self.observer_supported {
            effects.push(Effect::Log(LogRecord::new(
                LogLevel::Warn,
                "intersection_observer.unsupported",
                json!({ "revealedImmediately": self.reveal_elements.len() }),
            )));
            for (index, element) in self.reveal_elements.iter_mut().enumerate() {
                element.revealed = true;
                effects.push(Effect::SetClass {
                    target: Target::Reveal(index),
                    class: VISIBLE_CLASS,
                    present: true,
                });
            }
        }

        self.update_navbar(viewport, &mut effects);

        let summary = StartupSummary {
            message: STARTUP_MESSAGE,
            nav_links: self.nav_links.len(),
            reveal_elements: self.reveal_elements.len(),
            lazy_images: self.lazy_images.len(),
            shapes: self.shape_count,
            parallax: self.parallax_active(),
            intersection_observer: self.observer_supported,
        };
        effects.push(Effect::Log(LogRecord::new(
            LogLevel::Info,
            "site.initialized",
            serde_json::to_value(summary).unwrap_or(Value::Null),
        )));

        effects
    }

    pub fn handle(&mut self, event: &PageEvent, tick: &Tick<'_>) -> Vec<Effect> {
        let kind = event.kind();
        let mut effects = Vec::new();
        for &(_, handler) in HANDLERS.iter().filter(|(bound, _)| *bound == kind) {
            handler(self, event, tick, &mut effects);
        }
        effects
    }

    fn parallax_active(&self) -> bool {
        self.config.parallax_enabled && self.shape_count > 0 && !self.reduced_motion
    }

    fn on_scroll_navbar(&mut self, _event: &PageEvent, tick: &Tick<'_>, out: &mut Vec<Effect>) {
        if self.navbar_throttle.admit(tick.now_ms) {
            self.update_navbar(tick.viewport, out);
        }
    }

    fn on_scroll_active_link(&mut self, _event: &PageEvent, tick: &Tick<'_>, out: &mut Vec<Effect>) {
        if self.active_link_throttle.admit(tick.now_ms) {
            self.update_active_link(tick.viewport, out);
        }
    }

    fn on_scroll_parallax(&mut self, _event: &PageEvent, tick: &Tick<'_>, out: &mut Vec<Effect>) {
        if !self.parallax_active() || !self.parallax_throttle.admit(tick.now_ms) {
            return;
        }

        let scroll_y = tick.viewport.scroll_y();
        if scroll_y >= tick.viewport.hero_height() {
            return;
        }

        for index in 0..self.shape_count {
            out.push(Effect::SetStyle {
                target: Target::Shape(index),
                property: "transform",
                value: format!("translateY({:.2}px)", scroll_y * parallax_speed(index)),
            });
        }
    }

    fn on_resize(&mut self, _event: &PageEvent, tick: &Tick<'_>, out: &mut Vec<Effect>) {
        let delay_ms = self.resize_debounce.call(tick.now_ms);
        out.push(Effect::ScheduleResizeSettle { delay_ms });
    }

    fn on_resize_settled(&mut self, _event: &PageEvent, tick: &Tick<'_>, out: &mut Vec<Effect>) {
        if self.resize_debounce.settle(tick.now_ms) {
            self.update_navbar(tick.viewport, out);
            self.update_active_link(tick.viewport, out);
        }
    }

    fn on_menu_toggle(&mut self, _event: &PageEvent, _tick: &Tick<'_>, out: &mut Vec<Effect>) {
        self.set_menu_open(!self.menu_open, out);
    }

    fn on_nav_link_click(&mut self, event: &PageEvent, tick: &Tick<'_>, out: &mut Vec<Effect>) {
        let PageEvent::NavLinkClick { href } = event else {
            return;
        };
        if !href.starts_with('#') {
            return;
        }

        out.push(Effect::PreventDefault);

        let viewport = tick.viewport;
        if let Some(anchor_top) = viewport.anchor_top(href) {
            let motion = if self.reduced_motion {
                ScrollMotion::Instant
            } else {
                ScrollMotion::Smooth
            };
            out.push(Effect::ScrollTo {
                top: anchor_top + viewport.scroll_y() - viewport.navbar_height(),
                motion,
            });
        }

        self.set_menu_open(false, out);
    }

    fn on_document_click(&mut self, event: &PageEvent, _tick: &Tick<'_>, out: &mut Vec<Effect>) {
        let PageEvent::DocumentClick {
            inside_menu,
            inside_toggle,
        } = event
        else {
            return;
        };

        if self.menu_open && !inside_menu && !inside_toggle {
            self.set_menu_open(false, out);
        }
    }

    fn on_key_down(&mut self, event: &PageEvent, _tick: &Tick<'_>, out: &mut Vec<Effect>) {
        let PageEvent::KeyDown { key } = event else {
            return;
        };

        if key == "Escape" && self.menu_open {
            self.set_menu_open(false, out);
        }
    }

    fn on_intersection(&mut self, event: &PageEvent, _tick: &Tick<'_>, out: &mut Vec<Effect>) {
        let PageEvent::Intersection {
            observer,
            index,
            is_intersecting,
        } = event
        else {
            return;
        };
        if !is_intersecting {
            return;
        }

        match observer {
            ObserverKind::Reveal => self.reveal(*index, out),
            ObserverKind::LazyImage => self.load_image(*index, out),
        }
    }

    fn on_form_submit(&mut self, event: &PageEvent, _tick: &Tick<'_>, out: &mut Vec<Effect>) {
        let PageEvent::FormSubmit { fields } = event else {
            return;
        };

        let mut submitted = Map::new();
        for (name, value) in fields {
            submitted.insert(name.clone(), Value::String(value.clone()));
        }

        out.push(Effect::PreventDefault);
        out.push(Effect::Log(LogRecord::new(
            LogLevel::Info,
            "contact_form.submitted",
            json!({ "fields": submitted }),
        )));
        out.push(Effect::Alert(CONTACT_CONFIRMATION));
        out.push(Effect::ResetForm);
    }

    fn update_navbar(&mut self, viewport: &dyn Viewport, out: &mut Vec<Effect>) {
        if !self.has_navbar {
            return;
        }

        let scrolled = viewport.scroll_y() > self.config.navbar_scroll_threshold;
        if self.navbar_scrolled == Some(scrolled) {
            return;
        }

        self.navbar_scrolled = Some(scrolled);
        out.push(Effect::SetClass {
            target: Target::Navbar,
            class: SCROLLED_CLASS,
            present: scrolled,
        });
    }

    // Overlapping ranges resolve to the last matching section.
    fn update_active_link(&mut self, viewport: &dyn Viewport, out: &mut Vec<Effect>) {
        let scroll_y = viewport.scroll_y();
        let navbar_height = viewport.navbar_height();

        let Some(current) = viewport
            .sections()
            .into_iter()
            .rev()
            .find(|section| {
                let top = section.offset_top - navbar_height - self.config.active_link_offset;
                scroll_y >= top && scroll_y < top + section.height
            })
        else {
            return;
        };

        let anchor = format!("#{}", current.id);
        let next = self
            .nav_links
            .iter()
            .position(|href| href.as_deref() == Some(anchor.as_str()))
            .map_or(ActiveLink::Cleared, ActiveLink::Link);

        if next == self.active_link {
            return;
        }

        self.active_link = next;
        for index in 0..self.nav_links.len() {
            out.push(Effect::SetClass {
                target: Target::NavLink(index),
                class: ACTIVE_CLASS,
                present: next == ActiveLink::Link(index),
            });
        }
    }

    fn set_menu_open(&mut self, open: bool, out: &mut Vec<Effect>) {
        if self.menu_open == open {
            return;
        }

        self.menu_open = open;
        out.push(Effect::SetClass {
            target: Target::NavToggle,
            class: ACTIVE_CLASS,
            present: open,
        });
        out.push(Effect::SetClass {
            target: Target::NavMenu,
            class: ACTIVE_CLASS,
            present: open,
        });
        out.push(Effect::ScrollLock(open));
    }

    fn reveal(&mut self, index: usize, out: &mut Vec<Effect>) {
        let Some(element) = self.reveal_elements.get_mut(index) else {
            return;
        };
        if element.revealed {
            return;
        }
        element.revealed = true;

        let target = Target::Reveal(index);
        if let Some(stagger_index) = element.stagger_index {
            out.push(Effect::SetStyle {
                target,
                property: "transition-delay",
                value: format!("{}ms", stagger_delay_ms(stagger_index)),
            });
        }
        out.push(Effect::SetClass {
            target,
            class: VISIBLE_CLASS,
            present: true,
        });
        out.push(Effect::StopObserving(target));
    }

    fn load_image(&mut self, index: usize, out: &mut Vec<Effect>) {
        let Some(image) = self.lazy_images.get_mut(index) else {
            return;
        };
        if image.loaded {
            return;
        }
        image.loaded = true;

        let target = Target::LazyImage(index);
        out.push(Effect::SetAttribute {
            target,
            name: "src",
            value: image.deferred_src.clone(),
        });
        out.push(Effect::RemoveAttribute {
            target,
            name: DEFERRED_SOURCE_ATTR,
        });
        out.push(Effect::StopObserving(target));
    }
}

pub fn stagger_delay_ms(index: usize) -> u64 {
    index as u64 * STAGGER_STEP_MS
}

pub fn parallax_speed(index: usize) -> f64 {
    PARALLAX_BASE_SPEED + index as f64 * PARALLAX_SPEED_STEP
}
