#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverKind {
    Reveal,
    LazyImage,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    Scroll,
    Resize,
    ResizeSettled,
    MenuToggle,
    NavLinkClick {
        href: String,
    },
    DocumentClick {
        inside_menu: bool,
        inside_toggle: bool,
    },
    KeyDown {
        key: String,
    },
    Intersection {
        observer: ObserverKind,
        index: usize,
        is_intersecting: bool,
    },
    FormSubmit {
        fields: Vec<(String, String)>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Scroll,
    Resize,
    ResizeSettled,
    MenuToggle,
    NavLinkClick,
    DocumentClick,
    KeyDown,
    Intersection,
    FormSubmit,
}

impl PageEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Scroll => EventKind::Scroll,
            Self::Resize => EventKind::Resize,
            Self::ResizeSettled => EventKind::ResizeSettled,
            Self::MenuToggle => EventKind::MenuToggle,
            Self::NavLinkClick { .. } => EventKind::NavLinkClick,
            Self::DocumentClick { .. } => EventKind::DocumentClick,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::Intersection { .. } => EventKind::Intersection,
            Self::FormSubmit { .. } => EventKind::FormSubmit,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSource {
    Window,
    Document,
    NavToggle,
    NavLinks,
    ContactForm,
}

#[derive(Clone, Copy, Debug)]
pub struct Binding {
    pub source: EventSource,
    pub dom_event: &'static str,
    pub kind: EventKind,
}

pub const BINDINGS: &[Binding] = &[
    Binding {
        source: EventSource::NavToggle,
        dom_event: "click",
        kind: EventKind::MenuToggle,
    },
    Binding {
        source: EventSource::NavLinks,
        dom_event: "click",
        kind: EventKind::NavLinkClick,
    },
    Binding {
        source: EventSource::Window,
        dom_event: "scroll",
        kind: EventKind::Scroll,
    },
    Binding {
        source: EventSource::Window,
        dom_event: "resize",
        kind: EventKind::Resize,
    },
    Binding {
        source: EventSource::Document,
        dom_event: "keydown",
        kind: EventKind::KeyDown,
    },
    Binding {
        source: EventSource::Document,
        dom_event: "click",
        kind: EventKind::DocumentClick,
    },
    Binding {
        source: EventSource::ContactForm,
        dom_event: "submit",
        kind: EventKind::FormSubmit,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_listener_kind_is_bound_once() {
        for binding in BINDINGS {
            let count = BINDINGS
                .iter()
                .filter(|other| other.kind == binding.kind)
                .count();
            assert_eq!(count, 1, "{:?} bound more than once", binding.kind);
        }
    }

    #[test]
    fn timer_and_observer_kinds_have_no_listener() {
        assert!(BINDINGS
            .iter()
            .all(|binding| !matches!(binding.kind, EventKind::ResizeSettled | EventKind::Intersection)));
    }
}
