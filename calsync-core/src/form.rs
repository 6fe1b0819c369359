//! State of the "new event" modal.

use serde::{Deserialize, Serialize};

/// Field values of an event that hasn't been saved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl Draft {
    /// A draft pre-filled from a range the user selected on the calendar.
    pub fn for_range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Draft {
            title: None,
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Closed,
    Open(Draft),
}

/// Opens, edits and closes the modal. There is no edit mode for saved
/// events: they can only be deleted.
#[derive(Debug, Default)]
pub struct FormController {
    state: FormState,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Open(_))
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            FormState::Open(draft) => Some(draft),
            FormState::Closed => None,
        }
    }

    /// "Add new event": open with every field blank.
    pub fn open_new(&mut self) {
        self.state = FormState::Open(Draft::default());
    }

    /// Open pre-filled with the selected range. The title starts blank.
    pub fn open_for_range(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.state = FormState::Open(Draft::for_range(start, end));
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        if let FormState::Open(draft) = &mut self.state {
            draft.title = Some(title.into());
        }
    }

    pub fn set_start(&mut self, start: impl Into<String>) {
        if let FormState::Open(draft) = &mut self.state {
            draft.start = Some(start.into());
        }
    }

    pub fn set_end(&mut self, end: impl Into<String>) {
        if let FormState::Open(draft) = &mut self.state {
            draft.end = Some(end.into());
        }
    }

    /// Discard the draft.
    pub fn cancel(&mut self) {
        self.state = FormState::Closed;
    }

    /// Close the modal and hand over the draft, if one was open.
    pub fn take(&mut self) -> Option<Draft> {
        match std::mem::take(&mut self.state) {
            FormState::Open(draft) => Some(draft),
            FormState::Closed => None,
        }
    }
}
