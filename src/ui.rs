use crate::config::Settings;
use crate::controller::ConversationController;
use crate::session::SessionId;
use crate::views::ChatView;
use dioxus::prelude::*;
use std::rc::Rc;

const STYLES: &str = r#"
:root {
    --color-bg-primary: #ffffff;
    --color-bg-sidebar: #f8fafc;
    --color-text-primary: #111827;
    --color-text-muted: #6b7280;
    --color-border: #e5e7eb;
    --color-user-bg: #111827;
    --color-user-text: #ffffff;
    --color-error: #b91c1c;
    --color-info: #1d4ed8;
}
body { margin: 0; font-family: system-ui, sans-serif; background: var(--color-bg-primary); color: var(--color-text-primary); }
.app { display: flex; height: 100vh; }
.sidebar { width: 16rem; padding: 1rem; background: var(--color-bg-sidebar); border-right: 1px solid var(--color-border); display: flex; flex-direction: column; gap: 0.75rem; }
.sidebar select, .sidebar .btn { width: 100%; }
.sidebar hr { border: none; border-top: 1px solid var(--color-border); width: 100%; }
.main-container { flex: 1; display: flex; flex-direction: column; min-width: 0; }
.header { padding: 0.75rem 1.25rem; border-bottom: 1px solid var(--color-border); font-weight: 600; }
.chat-list { flex: 1; overflow-y: auto; padding: 1rem 1.25rem; display: flex; flex-direction: column; gap: 0.75rem; }
.message-row { display: flex; }
.message-row.user { justify-content: flex-end; }
.bubble { max-width: 75%; padding: 0.6rem 0.9rem; border-radius: 12px; border: 1px solid var(--color-border); }
.bubble.user { background: var(--color-user-bg); color: var(--color-user-text); white-space: pre-wrap; }
.bubble-controls { display: flex; justify-content: flex-end; }
.action-btn { font-size: 0.75rem; background: none; border: none; color: var(--color-text-muted); cursor: pointer; }
.welcome { text-align: center; padding: 2rem; background: var(--color-bg-sidebar); border-radius: 15px; color: var(--color-text-muted); }
.notice { margin: 0.5rem 1.25rem 0; padding: 0.5rem 0.75rem; border-radius: 8px; border: 1px solid currentColor; }
.notice.info { color: var(--color-info); }
.notice.error { color: var(--color-error); }
.shimmer-text { color: var(--color-text-muted); font-style: italic; }
.composer { border-top: 1px solid var(--color-border); padding: 0.75rem 1.25rem; display: flex; gap: 0.5rem; align-items: flex-end; }
.composer textarea { flex: 1; resize: none; padding: 0.5rem; border-radius: 8px; border: 1px solid var(--color-border); font: inherit; }
.btn { padding: 0.45rem 0.9rem; border-radius: 8px; border: 1px solid var(--color-border); background: #ffffff; cursor: pointer; }
.btn-primary { background: var(--color-user-bg); color: var(--color-user-text); }
.fatal { max-width: 36rem; margin: 4rem auto; padding: 1.5rem; border-radius: 12px; color: var(--color-error); border: 1px solid currentColor; }
.diagnostics { font-size: 0.7rem; color: var(--color-text-muted); word-break: break-all; }
"#;

/// Controller plus the session it serves, shared by the chat components.
#[derive(Clone)]
pub struct AppHandle {
    pub controller: Rc<ConversationController>,
    pub session_id: SessionId,
}

impl PartialEq for AppHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.controller, &other.controller) && self.session_id == other.session_id
    }
}

fn boot() -> Result<AppHandle, String> {
    let settings = Settings::from_env().map_err(|err| err.to_string())?;
    let controller = ConversationController::from_settings(&settings).map_err(|err| err.to_string())?;
    let session_id = SessionId::current(settings.session_seed.as_deref()).clone();
    Ok(AppHandle {
        controller: Rc::new(controller),
        session_id,
    })
}

#[component]
pub fn App() -> Element {
    let booted = use_hook(boot);

    rsx! {
        style { dangerous_inner_html: STYLES }
        match booted {
            Ok(handle) => rsx! { ChatView { handle } },
            Err(message) => rsx! { ConfigErrorScreen { message } },
        }
    }
}

/// Shown instead of the chat when start-up configuration is unusable.
#[component]
fn ConfigErrorScreen(message: String) -> Element {
    rsx! {
        div { class: "fatal",
            h2 { "PairD cannot start" }
            p { "{message}" }
        }
    }
}
