use crate::controller::ConversationController;
use crate::session::{ExportArtifact, SessionContext};
use crate::types::ModelOption;
use crate::ui::AppHandle;
use crate::views::shared::{Notice, save_artifact};
use dioxus::prelude::*;

fn report_saved(mut notice: Signal<Option<Notice>>, artifact: Option<ExportArtifact>) {
    let next = match artifact {
        None => Notice::info("Nothing to export yet."),
        Some(artifact) => match save_artifact(&artifact) {
            Ok(path) => Notice::info(format!("💾 Saved {path}")),
            Err(err) => Notice::error(format!("❌ {err}")),
        },
    };
    notice.set(Some(next));
}

/// Model picker, history actions and store diagnostics.
#[component]
pub fn Sidebar(
    handle: AppHandle,
    session: Signal<SessionContext>,
    notice: Signal<Option<Notice>>,
    busy: bool,
) -> Element {
    let mut session = session;
    let mut notice = notice;

    let on_model = {
        let controller = handle.controller.clone();
        move |evt: FormEvent| {
            if let Some(model) = ModelOption::from_label(&evt.value()) {
                session.with_mut(|ctx| controller.change_model(ctx, model));
            }
        }
    };

    let on_clear = {
        let controller = handle.controller.clone();
        move |_| match session.with_mut(|ctx| controller.clear(ctx)) {
            Ok(removed) => {
                if !removed {
                    tracing::warn!("saved session file could not be removed");
                }
                notice.set(Some(Notice::info("🗑️ Chat cleared")));
            }
            Err(err) => notice.set(Some(Notice::error(err.to_string()))),
        }
    };

    let on_upload = {
        let controller = handle.controller.clone();
        move |evt: FormEvent| {
            let controller = controller.clone();
            async move {
                let Some(engine) = evt.files() else {
                    return;
                };
                let Some(name) = engine.files().into_iter().next() else {
                    return;
                };
                let Some(bytes) = engine.read_file(&name).await else {
                    notice.set(Some(Notice::error(format!("❌ Error loading file: could not read {name}"))));
                    return;
                };
                match session.with_mut(|ctx| controller.import(ctx, &bytes)) {
                    Ok(summary) => {
                        let loaded = session.with_mut(ConversationController::take_loaded_notice);
                        let text = if loaded {
                            format!("{summary}\n📁 Conversation loaded from file - Continue where you left off!")
                        } else {
                            summary
                        };
                        notice.set(Some(Notice::info(text)));
                    }
                    Err(err) => notice.set(Some(Notice::error(err.to_string()))),
                }
            }
        }
    };

    let on_export_json = {
        let controller = handle.controller.clone();
        move |_| {
            let artifact = session.with_mut(|ctx| controller.export(ctx));
            report_saved(notice, artifact);
        }
    };

    let on_export_text = {
        let controller = handle.controller.clone();
        move |_| {
            let artifact = session.with_mut(|ctx| controller.export_text(ctx));
            report_saved(notice, artifact);
        }
    };

    let snapshot = session();
    let selected = snapshot.selected_model;
    let has_history = !snapshot.history.is_empty();
    let diagnostics = snapshot.diagnostics.clone();

    rsx! {
        aside { class: "sidebar",
            h3 { "PairD 2" }
            label { "Model" }
            select { disabled: busy, onchange: on_model,
                for model in ModelOption::ALL {
                    option {
                        value: model.label(),
                        selected: model == selected,
                        "{model.label()}"
                    }
                }
            }
            hr {}
            button { class: "btn", disabled: busy, onclick: on_clear, "🗑️ Clear Chat" }
            label { "Load conversation" }
            input {
                r#type: "file",
                accept: ".json",
                disabled: busy,
                onchange: on_upload,
            }
            button {
                class: "btn",
                disabled: busy || !has_history,
                onclick: on_export_json,
                "💾 Download JSON"
            }
            button {
                class: "btn",
                disabled: busy || !has_history,
                onclick: on_export_text,
                "📄 Download text"
            }
            hr {}
            div { class: "diagnostics",
                div { "Session: {snapshot.session_id}" }
                if let Some(saved) = diagnostics.last_save_time {
                    div { "Last saved: {saved}" }
                }
                if let Some(path) = diagnostics.save_file_path {
                    div { "File: {path}" }
                }
                if let Some(err) = diagnostics.save_error {
                    div { "{err}" }
                }
                if let Some(err) = diagnostics.load_error {
                    div { "{err}" }
                }
            }
        }
    }
}
