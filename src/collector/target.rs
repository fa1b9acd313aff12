//! Click target resolution
//!
//! Hosts describe the clicked element through [`UiElement`]. A click counts
//! toward the button tally when the element, or one of its ancestors, is an
//! interactive control.

/// Label recorded when a control has neither visible text nor an accessible label.
pub const FALLBACK_LABEL: &str = "unknown";

/// Minimal view of a host UI element.
pub trait UiElement {
    /// Whether this element is tagged as an interactive control (a button).
    fn is_interactive_control(&self) -> bool;

    /// Visible text content, including descendants.
    fn text_content(&self) -> Option<&str>;

    /// Accessible label (e.g. `aria-label`).
    fn accessible_label(&self) -> Option<&str>;

    fn parent(&self) -> Option<&Self>;
}

/// Return the element itself or its nearest ancestor that is an interactive control.
pub fn find_control<E: UiElement>(target: &E) -> Option<&E> {
    let mut current = Some(target);
    while let Some(element) = current {
        if element.is_interactive_control() {
            return Some(element);
        }
        current = element.parent();
    }
    None
}

/// Resolve the tally label for a click on `target`.
///
/// Returns `None` when the click did not land on or inside a control.
pub fn resolve_button_label<E: UiElement>(target: &E) -> Option<String> {
    let control = find_control(target)?;

    let label = non_empty(control.text_content())
        .or_else(|| non_empty(control.accessible_label()))
        .unwrap_or(FALLBACK_LABEL);

    Some(label.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Owned element tree for hosts that snapshot the event target before handing it over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub interactive: bool,
    pub text: Option<String>,
    pub aria_label: Option<String>,
    pub parent: Option<Box<Element>>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(text: impl Into<String>) -> Self {
        Self {
            interactive: true,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn with_parent(mut self, parent: Element) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

impl UiElement for Element {
    fn is_interactive_control(&self) -> bool {
        self.interactive
    }

    fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn accessible_label(&self) -> Option<&str> {
        self.aria_label.as_deref()
    }

    fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }
}
