//! Release note composition.
//!
//! Under CI the body is a fixed placeholder. Interactively the user's editor
//! is opened on a temporary file; lines starting with `#` are discarded.

use super::PublishError;
use crate::runner::CommandRunner;
use camino::Utf8Path;
use log::{debug, warn};
use std::fs;
use std::io::Write;

/// Release body used when no human is around to write one.
pub const PLACEHOLDER_NOTES: &str = "(placeholder)";

/// Editor used when `EDITOR` is unset.
pub const DEFAULT_EDITOR: &str = "nano";

/// Source of the release note body for a new draft.
pub trait ReleaseNotes {
    /// Compose the body for the release named `release_name`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::EmptyReleaseNotes`] when the user supplied no
    /// text, or [`PublishError::Editor`] when the editor cannot be run.
    fn compose(&self, release_name: &str) -> Result<String, PublishError>;
}

/// Fixed placeholder body.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderNotes;

impl ReleaseNotes for PlaceholderNotes {
    fn compose(&self, _release_name: &str) -> Result<String, PublishError> {
        Ok(PLACEHOLDER_NOTES.to_owned())
    }
}

/// Body written by the user in their editor.
pub struct EditorNotes<'a> {
    editor: String,
    runner: &'a dyn CommandRunner,
}

impl<'a> EditorNotes<'a> {
    /// Compose notes with `editor`, launched through `runner`.
    #[must_use]
    pub fn new(editor: impl Into<String>, runner: &'a dyn CommandRunner) -> Self {
        Self {
            editor: editor.into(),
            runner,
        }
    }

    fn editor_error(&self, reason: impl ToString) -> PublishError {
        PublishError::Editor {
            editor: self.editor.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ReleaseNotes for EditorNotes<'_> {
    fn compose(&self, release_name: &str) -> Result<String, PublishError> {
        let mut file = tempfile::Builder::new()
            .prefix("meson-release-notes")
            .suffix(".tmp")
            .tempfile()?;
        write!(file, "{}", seed_message(release_name))?;
        file.flush()?;

        let path = Utf8Path::from_path(file.path())
            .ok_or_else(|| self.editor_error("temporary file path is not valid UTF-8"))?;
        let cwd = path.parent().unwrap_or(Utf8Path::new("."));
        debug!("opening {path} in {}", self.editor);
        let status = self
            .runner
            .run_inherited(&self.editor, &[path.as_str()], cwd)
            .map_err(|e| self.editor_error(e))?;
        if !status.success() {
            warn!("{} exited with {status}; using the saved text", self.editor);
        }

        let text = strip_comments(&fs::read_to_string(path)?);
        if text.is_empty() {
            return Err(PublishError::EmptyReleaseNotes);
        }
        Ok(text)
    }
}

/// Pick the note source from the environment: the placeholder under CI,
/// otherwise `$EDITOR` (default `nano`).
#[must_use]
pub fn notes_from_env(runner: &dyn CommandRunner) -> Box<dyn ReleaseNotes + '_> {
    if meson_common::env::is_ci() {
        return Box::new(PlaceholderNotes);
    }
    let editor = std::env::var("EDITOR")
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_owned());
    Box::new(EditorNotes::new(editor, runner))
}

fn seed_message(release_name: &str) -> String {
    format!("\n# Please enter the body of your release note for {release_name}.")
}

/// Drop `#` comment lines and surrounding whitespace.
fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}
