//! The shelf catalog and its search.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFormat {
    Pocket,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    pub title: &'static str,
    pub author: &'static str,
    pub color: &'static str,
    pub format: BookFormat,
}

const fn book(
    title: &'static str,
    author: &'static str,
    color: &'static str,
    format: BookFormat,
) -> Book {
    Book {
        title,
        author,
        color,
        format,
    }
}

/// The classics shelved in every room.
pub const CLASSICS: [Book; 9] = [
    book("Don Quijote", "Cervantes", "#8B4513", BookFormat::Standard),
    book("1984", "Orwell", "#333333", BookFormat::Pocket),
    book("La Odisea", "Homero", "#CD853F", BookFormat::Standard),
    book("Hamlet", "Shakespeare", "#2F4F4F", BookFormat::Pocket),
    book("El Principito", "Saint-Exupéry", "#4682B4", BookFormat::Pocket),
    book("Drácula", "Stoker", "#800000", BookFormat::Standard),
    book("Dune", "Herbert", "#DAA520", BookFormat::Standard),
    book("Rayuela", "Cortázar", "#556B2F", BookFormat::Pocket),
    book("Ficciones", "Borges", "#191970", BookFormat::Pocket),
];

/// Case-insensitive substring match on title or author, in shelf order.
/// An empty query matches everything.
pub fn search(query: &str) -> Vec<&'static Book> {
    let needle = query.to_lowercase();
    CLASSICS
        .iter()
        .filter(|b| {
            b.title.to_lowercase().contains(&needle) || b.author.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Id used to highlight a classic on the shelves.
pub fn highlight_id(book: &Book) -> String {
    format!("classic-{}", book.title)
}
