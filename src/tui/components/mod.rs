//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Receive everything they draw as struct fields:
//! - `TitleBar`: book title, page position, status message
//! - `NavBar`: previous/next buttons and the progress gauge
//!
//! ### Stateful Components (Persistent State + Transient Wrapper)
//!
//! State lives in `TuiState`; a wrapper borrowing it is built each frame:
//! - `PageView` / `PageViewState`: scrollable page with hit regions
//! - `Contents` / `ContentsState`: table of contents overlay
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as props, not by reaching into global
//! state:
//!
//! ```rust,ignore
//! NavBar::new(app.nav.is_previous_enabled(), app.nav.is_next_enabled(), ratio)
//!     .render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status line)
//! ├── nav_bar.rs       (Prev / progress / Next)
//! ├── page_view.rs     (Current page content)
//! └── contents.rs      (Table of contents overlay)
//! ```

pub mod contents;
mod nav_bar;
pub mod page_view;
mod title_bar;

pub use contents::{Contents, ContentsEvent, ContentsState};
pub use nav_bar::{NavBar, NavButton};
pub use page_view::{PageView, PageViewState};
pub use title_bar::TitleBar;
