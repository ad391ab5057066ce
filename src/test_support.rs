//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::book::Book;
use crate::core::config::Timing;
use crate::core::progress::{MemoryStore, save_progress};
use crate::core::state::App;

/// Four pages: plain intro, two quiz groups, a sorting exercise, an ending.
pub const TEST_BOOK: &str = r#"
id = "test"
title = "Test Book"

[[pages]]
id = "intro"
heading = "Introduction"
body = "Welcome to the **test** book."

[[pages]]
id = "quiz"
heading = "Quiz"
body = "Answer both questions."

[[pages.quiz]]
id = "colors"
prompt = "Which colour is warm?"
options = [
    { id = "red", label = "Red", correct = true },
    { id = "blue", label = "Blue" },
]

[[pages.quiz]]
id = "shapes"
prompt = "Which shape is round?"
options = [
    { id = "circle", label = "Circle", correct = true },
    { id = "square", label = "Square" },
]

[[pages]]
id = "sorting"
heading = "Sorting"

[pages.drag_drop]
prompt = "Drop each word on its kind."
items = [
    { id = "run", label = "run", type = "verb" },
    { id = "tree", label = "tree", type = "noun" },
]
zones = [
    { id = "verbs", label = "Verbs", accept = "verb" },
    { id = "nouns", label = "Nouns", accept = "noun" },
]

[[pages]]
id = "end"
heading = "The End"
body = "Thanks for reading."
"#;

pub fn test_book() -> Book {
    Book::from_toml(TEST_BOOK).expect("test book is valid")
}

/// Creates a test App on the first page with an in-memory store.
pub fn test_app() -> App {
    App::new(test_book(), Box::new(MemoryStore::new()), Timing::default(), false)
        .expect("test app builds")
}

/// Creates a test App resumed at `page_index`.
pub fn test_app_at(page_index: usize) -> App {
    let book = test_book();
    let mut store = MemoryStore::new();
    save_progress(&mut store, &book.progress_key(), page_index);
    App::new(book, Box::new(store), Timing::default(), false).expect("test app builds")
}
