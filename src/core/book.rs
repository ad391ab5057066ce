//! # Book Content
//!
//! A book is a TOML file: a title plus an ordered list of pages. Each page
//! has a heading, a markdown body, and optionally quiz groups and a
//! drag-and-drop exercise.
//!
//! ```toml
//! id = "grammar"
//! title = "Parts of Speech"
//!
//! [[pages]]
//! id = "cover"
//! heading = "Parts of Speech"
//! body = "Welcome."
//!
//! [[pages.quiz]]
//! id = "q1"
//! prompt = "Which word is a verb?"
//! options = [
//!     { id = "a", label = "run", correct = true },
//!     { id = "b", label = "tree" },
//! ]
//! ```
//!
//! Loading validates everything the rest of the app assumes: at least one
//! page, and unique ids for pages and every activity widget.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::ops::Index;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::core::activity::drag_drop::{DragItem, DropZone};
use crate::core::activity::quiz::{QuizGroup, QuizOption};

/// The book shipped with the binary, used when no `--book` is given.
const DEFAULT_BOOK: &str = include_str!("../../assets/default_book.toml");

// ============================================================================
// File Format
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    pub heading: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub quiz: Vec<QuizSpec>,
    pub drag_drop: Option<DragDropSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSpec {
    pub id: String,
    pub prompt: String,
    pub options: Vec<OptionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionSpec {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DragDropSpec {
    #[serde(default)]
    pub prompt: String,
    pub items: Vec<ItemSpec>,
    pub zones: Vec<ZoneSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub id: String,
    pub label: String,
    /// The tag this item carries when dragged.
    #[serde(rename = "type")]
    pub type_tag: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneSpec {
    pub id: String,
    pub label: String,
    /// The tag this zone accepts.
    pub accept: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum BookError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Empty,
    DuplicatePage(String),
    DuplicateQuiz(String),
    DuplicateOption { group: String, option: String },
    DuplicateItem(String),
    DuplicateZone(String),
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::Io(e) => write!(f, "book I/O error: {e}"),
            BookError::Parse(e) => write!(f, "book parse error: {e}"),
            BookError::Empty => write!(f, "book has no pages"),
            BookError::DuplicatePage(id) => write!(f, "duplicate page id '{id}'"),
            BookError::DuplicateQuiz(id) => write!(f, "duplicate quiz id '{id}'"),
            BookError::DuplicateOption { group, option } => {
                write!(f, "duplicate option '{option}' in quiz '{group}'")
            }
            BookError::DuplicateItem(id) => write!(f, "duplicate drag item id '{id}'"),
            BookError::DuplicateZone(id) => write!(f, "duplicate drop zone id '{id}'"),
        }
    }
}

impl std::error::Error for BookError {}

// ============================================================================
// Page Sequence
// ============================================================================

/// Ordered, fixed, duplicate-free list of page ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSequence {
    ids: Vec<String>,
}

impl PageSequence {
    pub fn new<I, S>(ids: I) -> Result<Self, BookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(BookError::Empty);
        }
        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(BookError::DuplicatePage(id.clone()));
            }
        }
        Ok(Self { ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false: construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn position(&self, page_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == page_id)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn first(&self) -> &str {
        &self.ids[0]
    }

    pub fn last(&self) -> &str {
        &self.ids[self.ids.len() - 1]
    }

    pub fn last_index(&self) -> usize {
        self.ids.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl Index<usize> for PageSequence {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        self.get(index).unwrap_or_else(|| {
            panic!("page index {index} out of range for {} pages", self.len())
        })
    }
}

// ============================================================================
// Loading
// ============================================================================

impl Book {
    /// Parse and validate a book from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, BookError> {
        let book: Book = toml::from_str(text).map_err(BookError::Parse)?;
        book.validate()?;
        Ok(book)
    }

    /// Load and validate a book file.
    pub fn load(path: &Path) -> Result<Self, BookError> {
        let text = fs::read_to_string(path).map_err(BookError::Io)?;
        let book = Self::from_toml(&text)?;
        info!(
            "Loaded book '{}' ({} pages) from {}",
            book.title,
            book.pages.len(),
            path.display()
        );
        Ok(book)
    }

    /// The built-in book.
    pub fn builtin() -> Result<Self, BookError> {
        Self::from_toml(DEFAULT_BOOK)
    }

    pub fn sequence(&self) -> Result<PageSequence, BookError> {
        PageSequence::new(self.pages.iter().map(|p| p.id.clone()))
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// Key under which this book's progress is stored.
    pub fn progress_key(&self) -> String {
        format!("{}.progress", self.id)
    }

    fn validate(&self) -> Result<(), BookError> {
        self.sequence()?;

        let mut quizzes = HashSet::new();
        let mut items = HashSet::new();
        let mut zones = HashSet::new();
        for page in &self.pages {
            for quiz in &page.quiz {
                if !quizzes.insert(quiz.id.as_str()) {
                    return Err(BookError::DuplicateQuiz(quiz.id.clone()));
                }
                let mut options = HashSet::new();
                for option in &quiz.options {
                    if !options.insert(option.id.as_str()) {
                        return Err(BookError::DuplicateOption {
                            group: quiz.id.clone(),
                            option: option.id.clone(),
                        });
                    }
                }
            }
            if let Some(dd) = &page.drag_drop {
                for item in &dd.items {
                    if !items.insert(item.id.as_str()) {
                        return Err(BookError::DuplicateItem(item.id.clone()));
                    }
                }
                for zone in &dd.zones {
                    if !zones.insert(zone.id.as_str()) {
                        return Err(BookError::DuplicateZone(zone.id.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Build the live quiz model (all groups, book order).
    pub fn quiz_groups(&self) -> Vec<QuizGroup> {
        self.pages
            .iter()
            .flat_map(|page| page.quiz.iter().map(move |q| (page, q)))
            .map(|(page, q)| QuizGroup {
                id: q.id.clone(),
                page: page.id.clone(),
                prompt: q.prompt.clone(),
                options: q
                    .options
                    .iter()
                    .map(|o| QuizOption::new(&o.id, &o.label, o.correct))
                    .collect(),
            })
            .collect()
    }

    /// Build the live drag items (all pages, book order).
    pub fn drag_items(&self) -> Vec<DragItem> {
        self.pages
            .iter()
            .filter_map(|page| page.drag_drop.as_ref().map(|dd| (page, dd)))
            .flat_map(|(page, dd)| {
                dd.items
                    .iter()
                    .map(move |i| DragItem::new(&i.id, &page.id, &i.label, &i.type_tag))
            })
            .collect()
    }

    /// Build the live drop zones (all pages, book order).
    pub fn drop_zones(&self) -> Vec<DropZone> {
        self.pages
            .iter()
            .filter_map(|page| page.drag_drop.as_ref().map(|dd| (page, dd)))
            .flat_map(|(page, dd)| {
                dd.zones
                    .iter()
                    .map(move |z| DropZone::new(&z.id, &page.id, &z.label, &z.accept))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
id = "small"
title = "Small Book"

[[pages]]
id = "a"
heading = "Alpha"
body = "First."

[[pages]]
id = "b"
heading = "Beta"

[[pages.quiz]]
id = "q1"
prompt = "Pick one"
options = [
    { id = "x", label = "right", correct = true },
    { id = "y", label = "wrong" },
]

[pages.drag_drop]
prompt = "Sort"
items = [{ id = "run", label = "run", type = "verb" }]
zones = [{ id = "verbs", label = "Verbs", accept = "verb" }]
"#;

    #[test]
    fn test_page_sequence_rejects_duplicates() {
        let err = PageSequence::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, BookError::DuplicatePage(id) if id == "a"));
    }

    #[test]
    fn test_page_sequence_rejects_empty() {
        let err = PageSequence::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, BookError::Empty));
    }

    #[test]
    fn test_page_sequence_lookup() {
        let seq = PageSequence::new(["a", "b", "c"]).unwrap();
        assert_eq!(seq.position("b"), Some(1));
        assert_eq!(seq.position("z"), None);
        assert_eq!(seq.first(), "a");
        assert_eq!(seq.last(), "c");
        assert_eq!(seq.last_index(), 2);
        assert_eq!(seq.get(3), None);
    }

    #[test]
    fn test_parse_small_book() {
        let book = Book::from_toml(SMALL).unwrap();
        assert_eq!(book.title, "Small Book");
        assert_eq!(book.pages.len(), 2);
        assert_eq!(book.pages[1].body, "");
        assert_eq!(book.progress_key(), "small.progress");

        let groups = book.quiz_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].page, "b");
        assert!(groups[0].options[0].is_correct);
        assert!(!groups[0].options[1].is_correct);

        let items = book.drag_items();
        assert_eq!(items[0].type_tag, "verb");
        assert_eq!(book.drop_zones()[0].accept_tag, "verb");
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let text = SMALL.replace(r#"{ id = "y""#, r#"{ id = "x""#);
        let err = Book::from_toml(&text).unwrap_err();
        assert!(matches!(err, BookError::DuplicateOption { .. }));
    }

    #[test]
    fn test_duplicate_page_rejected() {
        let text = SMALL.replace(r#"id = "b""#, r#"id = "a""#);
        assert!(matches!(
            Book::from_toml(&text).unwrap_err(),
            BookError::DuplicatePage(_)
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(
            Book::from_toml("pages = 3").unwrap_err(),
            BookError::Parse(_)
        ));
    }

    #[test]
    fn test_builtin_book_is_valid() {
        let book = Book::builtin().unwrap();
        assert!(book.pages.len() > 2);
        assert!(!book.quiz_groups().is_empty());
        assert!(!book.drag_items().is_empty());
    }
}
