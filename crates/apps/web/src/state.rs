//! Page-wide state shared by every event handler

use crate::dom::js_error;
use crate::{arrangement, detect, library, upload};
use brickyard_studio::{FailurePolicy, Session};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::{Document, File, Window};

pub struct App {
    pub window: Window,
    pub document: Document,
    /// Base URL of the generation backend
    pub backend_url: String,
    pub session: Session,
    /// Raw file behind the session's preview, re-sent on each run
    pub file: Option<File>,
}

pub type Shared = Rc<RefCell<App>>;

impl App {
    pub fn new(window: Window, document: Document, backend_url: impl Into<String>) -> Self {
        Self {
            window,
            document,
            backend_url: backend_url.into(),
            session: Session::new(FailurePolicy::Alert),
            file: None,
        }
    }

    pub fn alert(&self, message: &str) {
        if self.window.alert_with_message(message).is_err() {
            tracing::warn!("alert suppressed: {message}");
        }
    }
}

/// Re-render every section from the current session.
///
/// Callers must not hold a mutable borrow of the app.
pub fn refresh(shared: &Shared) {
    let app = shared.borrow();
    let rendered = upload::render(&app)
        .and_then(|_| detect::render(&app))
        .and_then(|_| library::render(&app))
        .and_then(|_| arrangement::render(&app));
    if let Err(e) = rendered {
        tracing::error!("render failed: {}", js_error(e));
    }
}
