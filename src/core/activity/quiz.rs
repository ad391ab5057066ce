//! Multiple-choice quiz evaluation.
//!
//! Free functions over explicit groups. The quiz holds no state of its own
//! beyond each option's selection, and every evaluation is one event.

use log::{debug, warn};

use crate::core::surface::{Surface, VisualTag, WidgetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Unselected,
    MarkedCorrect,
    MarkedIncorrect,
}

impl SelectionState {
    pub fn is_selected(self) -> bool {
        !matches!(self, SelectionState::Unselected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOption {
    pub id: String,
    pub label: String,
    pub is_correct: bool,
    pub selection: SelectionState,
}

impl QuizOption {
    pub fn new(id: &str, label: &str, is_correct: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            is_correct,
            selection: SelectionState::Unselected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizGroup {
    pub id: String,
    /// Page the group is shown on.
    pub page: String,
    pub prompt: String,
    pub options: Vec<QuizOption>,
}

/// Result of clicking an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
}

impl Verdict {
    pub fn message(self) -> &'static str {
        if self.correct { "Correct!" } else { "Try again" }
    }
}

/// Select `option_id` in `group`.
///
/// Clears every option in the group, then marks the clicked one according
/// to its `is_correct` flag. Returns `None` if the option is unknown.
pub fn select_option(
    group: &mut QuizGroup,
    option_id: &str,
    surface: &mut dyn Surface,
) -> Option<Verdict> {
    let Some(index) = group.options.iter().position(|o| o.id == option_id) else {
        warn!("Quiz '{}' has no option '{}'", group.id, option_id);
        return None;
    };

    for option in &mut group.options {
        option.selection = SelectionState::Unselected;
        let widget = WidgetId::option(&group.id, &option.id);
        surface.remove_tag(&widget, VisualTag::Correct);
        surface.remove_tag(&widget, VisualTag::Incorrect);
    }

    let option = &mut group.options[index];
    let (state, tag) = if option.is_correct {
        (SelectionState::MarkedCorrect, VisualTag::Correct)
    } else {
        (SelectionState::MarkedIncorrect, VisualTag::Incorrect)
    };
    option.selection = state;
    surface.add_tag(&WidgetId::option(&group.id, &option.id), tag);

    debug!("Quiz '{}': selected '{}' ({:?})", group.id, option_id, state);
    Some(Verdict {
        correct: option.is_correct,
    })
}

/// True iff every option in every group is selected and no option marked
/// correct is actually wrong.
pub fn check_all_answers(groups: &[QuizGroup]) -> bool {
    groups.iter().flat_map(|g| g.options.iter()).all(|option| {
        match option.selection {
            SelectionState::Unselected => false,
            SelectionState::MarkedCorrect => option.is_correct,
            SelectionState::MarkedIncorrect => true,
        }
    })
}
