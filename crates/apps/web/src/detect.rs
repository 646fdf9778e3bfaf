//! Generate and reset controls plus the run status line

use crate::dom::{self, element, on};
use crate::gateway;
use crate::state::{refresh, App, Shared};
use brickyard_studio::{RunOutcome, SessionError};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlButtonElement, HtmlElement};

pub fn attach(shared: &Shared) -> Result<(), JsValue> {
    let document = shared.borrow().document.clone();
    let generate: HtmlButtonElement = element(&document, dom::GENERATE_BUTTON)?;
    let reset: HtmlButtonElement = element(&document, dom::RESET_BUTTON)?;

    {
        let shared = shared.clone();
        on(&generate, "click", move |_| start(&shared))?;
    }
    {
        let shared = shared.clone();
        on(&reset, "click", move |_| {
            shared.borrow_mut().session.reset_detection();
            refresh(&shared);
        })?;
    }
    Ok(())
}

fn start(shared: &Shared) {
    let started = {
        let mut app = shared.borrow_mut();
        let Some(file) = app.file.clone() else {
            app.alert(&SessionError::MissingImage.to_string());
            return;
        };
        match app.session.start_detection() {
            Ok((ticket, _)) => Some((ticket, file)),
            Err(e) => {
                app.alert(&e.to_string());
                None
            }
        }
    };
    let Some((ticket, file)) = started else {
        return;
    };
    refresh(shared);

    let (window, backend_url) = {
        let app = shared.borrow();
        (app.window.clone(), app.backend_url.clone())
    };
    let shared = shared.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = gateway::generate(&window, &backend_url, &file).await;
        if let Err(message) = &result {
            tracing::error!("3D generation failed: {message}");
        }
        let alert = shared.borrow_mut().session.finish_detection(ticket, result);
        refresh(&shared);
        if let Some(message) = alert {
            shared.borrow().alert(&format!("3D generation failed: {message}"));
        }
    });
}

/// Status line under the controls
pub fn status_text(running: bool, outcome: Option<&RunOutcome>) -> String {
    if running {
        return "Generating 3D Models...".into();
    }
    match outcome {
        Some(RunOutcome::Succeeded { count }) => {
            let plural = if *count == 1 { "" } else { "s" };
            format!(
                "3D Generation Complete! Generated {count} 3D model{plural}. \
                 Check your library to view and interact with the 3D assets."
            )
        }
        Some(RunOutcome::Failed { message, .. }) => format!("3D generation failed: {message}"),
        None => String::new(),
    }
}

pub fn render(app: &App) -> Result<(), JsValue> {
    let generate: HtmlButtonElement = element(&app.document, dom::GENERATE_BUTTON)?;
    let reset: HtmlButtonElement = element(&app.document, dom::RESET_BUTTON)?;
    let status: HtmlElement = element(&app.document, dom::STATUS)?;

    let session = &app.session;
    let running = session.is_running();

    generate.set_disabled(running || session.image().is_none());
    generate.set_text_content(Some(if running {
        "Generating 3D Models..."
    } else {
        "Generate 3D Models"
    }));
    reset.set_hidden(session.batch().is_empty());
    reset.set_disabled(running);

    let text = status_text(running, session.run().last_outcome());
    status.set_hidden(text.is_empty());
    status.set_text_content(Some(&text));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(true, None), "Generating 3D Models...");
        assert_eq!(status_text(false, None), "");
        assert!(status_text(false, Some(&RunOutcome::Succeeded { count: 1 }))
            .contains("Generated 1 3D model."));
        assert!(status_text(false, Some(&RunOutcome::Succeeded { count: 3 }))
            .contains("Generated 3 3D models."));
        let failed = RunOutcome::Failed {
            message: "No 3D models generated".into(),
            substituted: false,
        };
        assert_eq!(
            status_text(false, Some(&failed)),
            "3D generation failed: No 3D models generated"
        );
    }
}
