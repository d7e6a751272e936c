use crate::dom;
use watio_access::StyleSurface;
use web_sys::HtmlElement;

/// Classes and custom properties on the document root.
#[derive(Debug, Clone, Default)]
pub struct DocumentSurface {
    root: Option<HtmlElement>,
}

impl DocumentSurface {
    #[must_use]
    pub fn from_document() -> Self {
        Self {
            root: dom::document_root(),
        }
    }

    /// A surface that drops every write.
    #[must_use]
    pub const fn detached() -> Self {
        Self { root: None }
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.root.is_some()
    }
}

impl StyleSurface for DocumentSurface {
    fn set_property(&self, name: &str, value: &str) {
        if let Some(root) = &self.root
            && let Err(err) = root.style().set_property(name, value)
        {
            log::warn!("could not set {name}: {}", dom::js_error_message(&err));
        }
    }

    fn remove_property(&self, name: &str) {
        if let Some(root) = &self.root {
            let _ = root.style().remove_property(name);
        }
    }

    fn add_class(&self, class: &str) {
        if let Some(root) = &self.root {
            let _ = root.class_list().add_1(class);
        }
    }

    fn remove_class(&self, class: &str) {
        if let Some(root) = &self.root {
            let _ = root.class_list().remove_1(class);
        }
    }
}
