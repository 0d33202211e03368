use crate::session::ExportArtifact;
use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use once_cell::sync::Lazy;

#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::PathBuf};

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options
});

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.light"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &MARKDOWN_OPTIONS, &plugins)
}

/// Status line shown above the chat.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub is_error: bool,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            text: text.into(),
        }
    }
}

/// Writes a download into the user's downloads folder and returns its path.
#[cfg(not(target_arch = "wasm32"))]
pub fn save_artifact(artifact: &ExportArtifact) -> Result<String, String> {
    let dir = dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir).map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
    let path = dir.join(&artifact.file_name);
    fs::write(&path, &artifact.contents)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    Ok(path.to_string_lossy().into_owned())
}

#[cfg(target_arch = "wasm32")]
pub fn save_artifact(artifact: &ExportArtifact) -> Result<String, String> {
    Err(format!(
        "Saving {} is not available in the browser build",
        artifact.file_name
    ))
}

pub fn copy_to_clipboard(text: String) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(err) = clipboard.set_text(text) {
                    tracing::warn!(error = %err, "clipboard write failed");
                }
            }
            Err(err) => tracing::warn!(error = %err, "clipboard unavailable"),
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        let _ = text;
    }
}
