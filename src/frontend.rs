use crate::config::SiteConfig;
use crate::controller::{
    Effect, PageController, PageInventory, RevealTarget, ScrollMotion, SectionBounds, Target, Tick,
    Viewport,
};
use crate::events::{Binding, EventKind, EventSource, ObserverKind, PageEvent, BINDINGS};
use crate::telemetry::{LogLevel, Logger};
use gloo_timers::callback::Timeout;
use js_sys::{Array, Reflect};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, Element, Event, EventTarget, FormData, HtmlElement, HtmlFormElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, Node,
    ScrollBehavior, ScrollToOptions, Window,
};

const STAGGER_GROUP_CLASSES: [&str; 2] = ["service-card", "feature-item"];
const REVEAL_THRESHOLD: f64 = 0.1;
const REVEAL_ROOT_MARGIN: &str = "0px";

thread_local! {
    static PAGE: RefCell<Option<Rc<Page>>> = const { RefCell::new(None) };
}

struct PageElements {
    body: Option<HtmlElement>,
    navbar: Option<HtmlElement>,
    nav_toggle: Option<Element>,
    nav_menu: Option<Element>,
    nav_links: Vec<Element>,
    reveal: Vec<Element>,
    lazy_images: Vec<Element>,
    shapes: Vec<Element>,
    year: Option<Element>,
    contact_form: Option<HtmlFormElement>,
}

impl PageElements {
    fn collect(document: &Document, observer_supported: bool) -> Self {
        let lazy_images = if observer_supported {
            query_all(document, "img[data-src]")
        } else {
            Vec::new()
        };

        Self {
            body: document.body(),
            navbar: element_by_id(document, "navbar"),
            nav_toggle: element_by_id(document, "navToggle"),
            nav_menu: element_by_id(document, "navMenu"),
            nav_links: query_all(document, ".nav-link"),
            reveal: query_all(document, ".reveal"),
            lazy_images,
            shapes: query_all(document, ".shape"),
            year: element_by_id(document, "year"),
            contact_form: element_by_id(document, "contact-form"),
        }
    }

    fn inventory(&self, observer_supported: bool, reduced_motion: bool) -> PageInventory {
        PageInventory {
            has_navbar: self.navbar.is_some(),
            nav_links: self
                .nav_links
                .iter()
                .map(|link| link.get_attribute("href"))
                .collect(),
            reveal_targets: self
                .reveal
                .iter()
                .map(|element| RevealTarget {
                    stagger_index: stagger_index(element),
                })
                .collect(),
            lazy_sources: self
                .lazy_images
                .iter()
                .map(|image| image.get_attribute("data-src").unwrap_or_default())
                .collect(),
            shape_count: self.shapes.len(),
            observer_supported,
            reduced_motion,
        }
    }

    fn observed(&self, kind: ObserverKind) -> &[Element] {
        match kind {
            ObserverKind::Reveal => &self.reveal,
            ObserverKind::LazyImage => &self.lazy_images,
        }
    }

    fn target(&self, target: Target) -> Option<&Element> {
        match target {
            Target::Navbar => self.navbar.as_deref(),
            Target::NavToggle => self.nav_toggle.as_ref(),
            Target::NavMenu => self.nav_menu.as_ref(),
            Target::NavLink(index) => self.nav_links.get(index),
            Target::Reveal(index) => self.reveal.get(index),
            Target::LazyImage(index) => self.lazy_images.get(index),
            Target::Shape(index) => self.shapes.get(index),
            Target::Year => self.year.as_ref(),
        }
    }

    fn listener_targets(&self, source: EventSource, page: &Page) -> Vec<EventTarget> {
        match source {
            EventSource::Window => vec![page.window.clone().into()],
            EventSource::Document => vec![page.document.clone().into()],
            EventSource::NavToggle => self.nav_toggle.iter().cloned().map(Into::into).collect(),
            EventSource::NavLinks => self.nav_links.iter().cloned().map(Into::into).collect(),
            EventSource::ContactForm => self.contact_form.iter().cloned().map(Into::into).collect(),
        }
    }
}

type ListenerCallback = Closure<dyn FnMut(Event)>;

struct Listener {
    target: EventTarget,
    dom_event: &'static str,
    callback: ListenerCallback,
}

struct ObserverHandle {
    kind: ObserverKind,
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

struct Page {
    window: Window,
    document: Document,
    elements: PageElements,
    controller: RefCell<PageController>,
    logger: Logger,
    listeners: RefCell<Vec<Listener>>,
    observers: RefCell<Vec<ObserverHandle>>,
    resize_timer: RefCell<Option<Timeout>>,
}

impl Viewport for Page {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn navbar_height(&self) -> f64 {
        self.elements
            .navbar
            .as_ref()
            .map(|navbar| f64::from(navbar.offset_height()))
            .unwrap_or(0.0)
    }

    fn hero_height(&self) -> f64 {
        self.document
            .query_selector(".hero")
            .ok()
            .flatten()
            .and_then(|hero| hero.dyn_into::<HtmlElement>().ok())
            .map(|hero| f64::from(hero.offset_height()))
            .unwrap_or(0.0)
    }

    fn sections(&self) -> Vec<SectionBounds> {
        query_all(&self.document, "section[id]")
            .into_iter()
            .filter_map(|section| section.dyn_into::<HtmlElement>().ok())
            .map(|section| SectionBounds {
                id: section.id(),
                offset_top: f64::from(section.offset_top()),
                height: f64::from(section.offset_height()),
            })
            .collect()
    }

    fn anchor_top(&self, selector: &str) -> Option<f64> {
        // An href such as "#" is not a valid selector; treat it as no match.
        let anchor = self.document.query_selector(selector).ok().flatten()?;
        Some(anchor.get_bounding_client_rect().top())
    }
}

impl Page {
    fn now_ms(&self) -> f64 {
        self.window
            .performance()
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn dispatch(self: &Rc<Self>, event: PageEvent, dom_event: Option<&Event>) {
        let effects = {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                return;
            };
            let tick = Tick {
                now_ms: self.now_ms(),
                viewport: self.as_ref(),
            };
            controller.handle(&event, &tick)
        };

        self.apply(effects, dom_event);
    }

    fn translate(&self, kind: EventKind, event: &Event) -> Option<PageEvent> {
        match kind {
            EventKind::Scroll => Some(PageEvent::Scroll),
            EventKind::Resize => Some(PageEvent::Resize),
            EventKind::MenuToggle => Some(PageEvent::MenuToggle),
            EventKind::NavLinkClick => {
                let link = event.current_target()?.dyn_into::<Element>().ok()?;
                Some(PageEvent::NavLinkClick {
                    href: link.get_attribute("href")?,
                })
            }
            EventKind::DocumentClick => {
                let clicked = event.target().and_then(|target| target.dyn_into::<Node>().ok());
                let inside = |container: Option<&Element>| {
                    container
                        .map(|container| container.contains(clicked.as_ref()))
                        .unwrap_or(false)
                };
                Some(PageEvent::DocumentClick {
                    inside_menu: inside(self.elements.nav_menu.as_ref()),
                    inside_toggle: inside(self.elements.nav_toggle.as_ref()),
                })
            }
            EventKind::KeyDown => Some(PageEvent::KeyDown {
                key: event.dyn_ref::<KeyboardEvent>()?.key(),
            }),
            EventKind::FormSubmit => {
                let form = self.elements.contact_form.as_ref()?;
                Some(PageEvent::FormSubmit {
                    fields: form_fields(form),
                })
            }
            EventKind::ResizeSettled | EventKind::Intersection => None,
        }
    }

    fn apply(self: &Rc<Self>, effects: Vec<Effect>, dom_event: Option<&Event>) {
        for effect in effects {
            match effect {
                Effect::PreventDefault => {
                    if let Some(event) = dom_event {
                        event.prevent_default();
                    }
                }
                Effect::SetClass {
                    target,
                    class,
                    present,
                } => {
                    if let Some(element) = self.elements.target(target) {
                        let _ = element.class_list().toggle_with_force(class, present);
                    }
                }
                Effect::SetStyle {
                    target,
                    property,
                    value,
                } => {
                    if let Some(element) = self.html_target(target) {
                        let _ = element.style().set_property(property, &value);
                    }
                }
                Effect::SetAttribute { target, name, value } => {
                    if let Some(element) = self.elements.target(target) {
                        let _ = element.set_attribute(name, &value);
                    }
                }
                Effect::RemoveAttribute { target, name } => {
                    if let Some(element) = self.elements.target(target) {
                        let _ = element.remove_attribute(name);
                    }
                }
                Effect::SetText { target, text } => {
                    if let Some(element) = self.elements.target(target) {
                        element.set_text_content(Some(&text));
                    }
                }
                Effect::ScrollLock(locked) => {
                    if let Some(body) = self.elements.body.as_ref() {
                        let style = body.style();
                        if locked {
                            let _ = style.set_property("overflow", "hidden");
                        } else {
                            let _ = style.remove_property("overflow");
                        }
                    }
                }
                Effect::ScrollTo { top, motion } => {
                    let options = ScrollToOptions::new();
                    options.set_top(top);
                    options.set_behavior(match motion {
                        ScrollMotion::Smooth => ScrollBehavior::Smooth,
                        ScrollMotion::Instant => ScrollBehavior::Instant,
                    });
                    self.window.scroll_to_with_scroll_to_options(&options);
                }
                Effect::StopObserving(target) => self.stop_observing(target),
                Effect::Alert(message) => {
                    let _ = self.window.alert_with_message(message);
                }
                Effect::ResetForm => {
                    if let Some(form) = self.elements.contact_form.as_ref() {
                        form.reset();
                    }
                }
                Effect::Log(record) => self.logger.emit(&record),
                Effect::ScheduleResizeSettle { delay_ms } => {
                    let page = Rc::downgrade(self);
                    let delay = u32::try_from(delay_ms).unwrap_or(u32::MAX);
                    let timeout = Timeout::new(delay, move || {
                        if let Some(page) = page.upgrade() {
                            page.dispatch(PageEvent::ResizeSettled, None);
                        }
                    });
                    // Dropping the previous handle cancels it.
                    self.resize_timer.replace(Some(timeout));
                }
            }
        }
    }

    fn html_target(&self, target: Target) -> Option<&HtmlElement> {
        self.elements.target(target)?.dyn_ref::<HtmlElement>()
    }

    fn stop_observing(&self, target: Target) {
        let kind = match target {
            Target::Reveal(_) => ObserverKind::Reveal,
            Target::LazyImage(_) => ObserverKind::LazyImage,
            _ => return,
        };
        let Some(element) = self.elements.target(target) else {
            return;
        };

        for handle in self.observers.borrow().iter().filter(|handle| handle.kind == kind) {
            handle.observer.unobserve(element);
        }
    }

    fn teardown(&self) {
        for listener in self.listeners.borrow_mut().drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.dom_event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        for handle in self.observers.borrow_mut().drain(..) {
            handle.observer.disconnect();
        }
        self.resize_timer.replace(None);
    }

    fn bind_listeners(self: &Rc<Self>) {
        for binding in BINDINGS {
            for target in self.elements.listener_targets(binding.source, self) {
                if let Err(error) = self.listen(&target, *binding) {
                    self.logger.log_event(
                        LogLevel::Warn,
                        "binding.failed",
                        json!({
                            "domEvent": binding.dom_event,
                            "error": format!("{error:?}"),
                        }),
                    );
                }
            }
        }
    }

    fn listen(self: &Rc<Self>, target: &EventTarget, binding: Binding) -> Result<(), JsValue> {
        let page = Rc::downgrade(self);
        let kind = binding.kind;
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(page) = page.upgrade() else {
                return;
            };
            if let Some(page_event) = page.translate(kind, &event) {
                page.dispatch(page_event, Some(&event));
            }
        });

        target.add_event_listener_with_callback(binding.dom_event, closure.as_ref().unchecked_ref())?;
        self.listeners.borrow_mut().push(Listener {
            target: target.clone(),
            dom_event: binding.dom_event,
            callback: closure,
        });
        Ok(())
    }

    fn observe(
        self: &Rc<Self>,
        kind: ObserverKind,
        options: Option<&IntersectionObserverInit>,
    ) -> Result<(), JsValue> {
        let elements = self.elements.observed(kind);
        if elements.is_empty() {
            return Ok(());
        }

        let page = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let Some(page) = page.upgrade() else {
                    return;
                };
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let target = entry.target();
                    let Some(index) = page
                        .elements
                        .observed(kind)
                        .iter()
                        .position(|element| *element == target)
                    else {
                        continue;
                    };
                    page.dispatch(
                        PageEvent::Intersection {
                            observer: kind,
                            index,
                            is_intersecting: entry.is_intersecting(),
                        },
                        None,
                    );
                }
            },
        );

        let observer = match options {
            Some(options) => {
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), options)?
            }
            None => IntersectionObserver::new(callback.as_ref().unchecked_ref())?,
        };
        for element in elements {
            observer.observe(element);
        }

        self.observers.borrow_mut().push(ObserverHandle {
            kind,
            observer,
            _callback: callback,
        });
        Ok(())
    }

    fn observe_all(self: &Rc<Self>) {
        let reveal_options = IntersectionObserverInit::new();
        reveal_options.set_threshold(&JsValue::from_f64(REVEAL_THRESHOLD));
        reveal_options.set_root_margin(REVEAL_ROOT_MARGIN);

        let observers = [
            (ObserverKind::Reveal, Some(&reveal_options)),
            (ObserverKind::LazyImage, None),
        ];
        for (kind, options) in observers {
            if let Err(error) = self.observe(kind, options) {
                self.logger.log_event(
                    LogLevel::Warn,
                    "binding.failed",
                    json!({
                        "observer": format!("{kind:?}"),
                        "error": format!("{error:?}"),
                    }),
                );
            }
        }
    }
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn stagger_index(element: &Element) -> Option<usize> {
    let classes = element.class_list();
    if !STAGGER_GROUP_CLASSES
        .iter()
        .any(|class| classes.contains(class))
    {
        return None;
    }

    let siblings = element.parent_element()?.children();
    (0..siblings.length()).position(|index| siblings.item(index).as_ref() == Some(element))
}

fn form_fields(form: &HtmlFormElement) -> Vec<(String, String)> {
    let Ok(data) = FormData::new_with_form(form) else {
        return Vec::new();
    };
    let Ok(Some(entries)) = js_sys::try_iter(&data) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let pair = Array::from(&entry);
            let name = pair.get(0).as_string()?;
            Some((name, pair.get(1).as_string().unwrap_or_default()))
        })
        .collect()
}

fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

fn intersection_observer_supported(window: &Window) -> bool {
    Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

fn start_page() {
    let Some(window) = window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let config = SiteConfig::from_attributes(|name| {
        document
            .body()
            .and_then(|body| body.get_attribute(name))
    });
    let logger = Logger::new(config.log_level);
    let observer_supported = intersection_observer_supported(&window);
    let reduced_motion = prefers_reduced_motion(&window);
    let elements = PageElements::collect(&document, observer_supported);
    let controller = PageController::new(config, elements.inventory(observer_supported, reduced_motion));

    let page = Rc::new(Page {
        window,
        document,
        elements,
        controller: RefCell::new(controller),
        logger,
        listeners: RefCell::new(Vec::new()),
        observers: RefCell::new(Vec::new()),
        resize_timer: RefCell::new(None),
    });

    page.bind_listeners();
    if observer_supported {
        page.observe_all();
    }

    let year = js_sys::Date::new_0().get_full_year();
    let effects = page.controller.borrow_mut().start(year, page.as_ref());
    page.apply(effects, None);

    let previous = PAGE.with(|slot| slot.borrow_mut().replace(page));
    if let Some(previous) = previous {
        previous.teardown();
    }
}

pub fn run() {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(start_page);
        let _ = document.add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.unchecked_ref(),
        );
    } else {
        start_page();
    }
}
