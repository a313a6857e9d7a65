/// Per-screen session state shared by the three actions
///
/// The title and the picked image used to be ambient mutable fields read by
/// whichever action fired. Here they live in one struct and are cloned out
/// at trigger time, so a running background task never reads shared state.

use std::path::PathBuf;

/// Field-level error shown when the title is blank
pub const REQUIRED_MARK: &str = "*required";

#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Raw contents of the title input
    pub title: String,
    /// Locally picked image, if any (the image reference)
    pub picked: Option<PathBuf>,
    /// Error text rendered under the title input
    pub field_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The trimmed title, or None when blank
    pub fn trimmed_title(&self) -> Option<String> {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Validate the title before a remote call: returns the trimmed title,
    /// or sets the field error and returns None. One check for all three
    /// actions.
    pub fn require_title(&mut self) -> Option<String> {
        match self.trimmed_title() {
            Some(title) => {
                self.field_error = None;
                Some(title)
            }
            None => {
                self.field_error = Some(REQUIRED_MARK.to_string());
                None
            }
        }
    }

    /// Clear everything back to the pristine screen
    pub fn reset(&mut self) {
        self.title.clear();
        self.picked = None;
        self.field_error = None;
    }
}
