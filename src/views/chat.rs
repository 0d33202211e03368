use crate::controller::{ConversationController, StreamOutcome, TurnError};
use crate::session::SessionContext;
use crate::types::{ChatMessage, Role};
use crate::ui::AppHandle;
use crate::views::Sidebar;
use crate::views::shared::{Notice, copy_to_clipboard, markdown_to_html};
use dioxus::events::Key;
use dioxus::prelude::*;

const WELCOME: &str = "I'm here to help! This conversation is secure and private.";

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[component]
pub fn ChatView(handle: AppHandle) -> Element {
    let open_controller = handle.controller.clone();
    let open_id = handle.session_id.clone();
    let mut session = use_signal(move || open_controller.open_session(open_id));
    let mut notice = use_signal(move || {
        session
            .with_mut(ConversationController::take_restored_notice)
            .map(|count| Notice::info(format!("Restored {count} messages from your previous session")))
    });
    let mut streaming = use_signal(|| Option::<String>::None);
    let mut input = use_signal(String::new);

    let send_message = {
        let controller = handle.controller.clone();
        move |text: String| {
            let turn = match session.with_mut(|ctx| controller.start_turn(ctx, &text)) {
                Ok(turn) => turn,
                Err(TurnError::EmptyInput) => return,
                Err(err) => {
                    tracing::debug!(%err, "submit ignored");
                    return;
                }
            };
            input.set(String::new());
            streaming.set(Some(String::new()));

            let controller = controller.clone();
            spawn(async move {
                let mut sink = move |piece: &str| {
                    streaming.with_mut(|buffer| {
                        if let Some(buffer) = buffer {
                            buffer.push_str(piece);
                        }
                    });
                };
                let outcome = controller.stream_turn(turn, &mut sink).await;
                if let StreamOutcome::Failed { error, .. } = &outcome {
                    notice.set(Some(Notice::error(format!(
                        "❌ Error generating response: {error}"
                    ))));
                }
                session.with_mut(|ctx| controller.finish_turn(ctx, outcome));
                streaming.set(None);
            });
        }
    };

    let mut send_on_enter = send_message.clone();
    let mut send_on_click = send_message;

    let snapshot: SessionContext = session();
    let busy = snapshot.is_awaiting_completion();
    let model_label = snapshot.selected_model.label();
    let messages: Vec<ChatMessage> = snapshot.history.messages().to_vec();
    let live_reply = streaming();

    rsx! {
        div { class: "app",
            Sidebar { handle: handle.clone(), session, notice, busy }
            div { class: "main-container",
                div { class: "header", "PairD 2 · {model_label}" }
                if let Some(current) = notice() {
                    div {
                        class: format_args!("notice {}", if current.is_error { "error" } else { "info" }),
                        onclick: move |_| notice.set(None),
                        "{current.text}"
                    }
                }
                div { id: "chat-list", class: "chat-list",
                    if messages.is_empty() && live_reply.is_none() {
                        div { class: "welcome", "{WELCOME}" }
                    }
                    for (i, msg) in messages.iter().enumerate() {
                        div { key: "{i}", class: format_args!("message-row {}", role_class(msg.role)),
                            div { class: format_args!("bubble {}", role_class(msg.role)),
                                match msg.role {
                                    Role::Assistant => rsx! {
                                        AssistantBubble { content: msg.content.clone(), show_copy: true }
                                    },
                                    Role::User => rsx! { "{msg.content}" },
                                }
                            }
                        }
                    }
                    if let Some(partial) = live_reply {
                        div { class: "message-row assistant",
                            div { class: "bubble assistant",
                                if partial.is_empty() {
                                    div { class: "shimmer-text", "Thinking…" }
                                } else {
                                    AssistantBubble { content: partial, show_copy: false }
                                }
                            }
                        }
                    }
                }
                form { class: "composer",
                    onsubmit: move |ev| ev.prevent_default(),
                    textarea {
                        rows: "2",
                        placeholder: "Type your message here...",
                        value: "{input}",
                        oninput: move |ev| input.set(ev.value()),
                        onkeydown: move |ev| {
                            if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                ev.prevent_default();
                                send_on_enter(input());
                            }
                        },
                        disabled: busy,
                        autofocus: true,
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: busy || input().trim().is_empty(),
                        onclick: move |_| send_on_click(input()),
                        "Send"
                    }
                }
            }
        }
    }
}

#[component]
fn AssistantBubble(content: String, show_copy: bool) -> Element {
    let content_html = markdown_to_html(&content);
    let on_copy = move |_| copy_to_clipboard(content.clone());

    rsx! {
        if show_copy {
            div { class: "bubble-controls",
                button { class: "action-btn", title: "Copy markdown", onclick: on_copy, "Copy" }
            }
        }
        div { class: "md", dangerous_inner_html: "{content_html}" }
    }
}
