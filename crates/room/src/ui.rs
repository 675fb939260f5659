//! Overlay state and how it drives navigation mode.
//!
//! Opening any modal leaves navigation so the pointer is free; closing it
//! walks back in. Saving the club config is the one exit that stays out.

/// An overlay covering the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Details for the book with this id.
    Book(String),
    Search,
    Admin,
}

/// What the overlay layer wants the navigation flag to become.
pub type NavRequest = Option<bool>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    modal: Option<Modal>,
    highlighted: Option<String>,
}

impl UiState {
    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn open_search(&mut self) -> NavRequest {
        self.modal = Some(Modal::Search);
        Some(false)
    }

    pub fn open_admin(&mut self) -> NavRequest {
        self.modal = Some(Modal::Admin);
        Some(false)
    }

    /// A book on the shelf was clicked. Clicking the highlighted book clears
    /// the highlight.
    pub fn select_book(&mut self, book_id: &str) -> NavRequest {
        if self.highlighted.as_deref() == Some(book_id) {
            self.highlighted = None;
        }
        self.modal = Some(Modal::Book(book_id.to_owned()));
        Some(false)
    }

    /// A search result was picked: highlight it and walk back into the room.
    pub fn select_search_result(&mut self, highlight_id: String) -> NavRequest {
        self.highlighted = Some(highlight_id);
        self.modal = None;
        Some(true)
    }

    /// Dismiss the current modal without acting on it.
    pub fn close_modal(&mut self) -> NavRequest {
        self.modal.take().map(|_| true)
    }

    /// The admin form was saved.
    pub fn admin_saved(&mut self) -> NavRequest {
        if self.modal == Some(Modal::Admin) {
            self.modal = None;
        }
        None
    }
}
