//! The habit-creation conversation as a pure state machine.

pub(crate) const TITLE_PROMPT: &str = "Let's create a new habit. What should it be called?";
pub(crate) const DESCRIPTION_PROMPT: &str =
    "Got it. Now describe the habit (for example: \"walk 30 minutes every day\").";
const EMPTY_TITLE: &str = "The title can't be empty. What should the habit be called?";
const EMPTY_DESCRIPTION: &str = "The description can't be empty. Please describe the habit.";

/// Where a habit-creation dialog stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    /// No dialog open; waiting for the start command.
    AwaitingCommand,
    AwaitingHabitTitle,
    AwaitingHabitDescription { title: String },
    /// Both answers collected; the habit is being written.
    Committing { title: String, description: String },
}

/// What the coordinator has to do after a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// Send this text to the chat.
    Reply(&'static str),
    /// Create the habit from the collected answers.
    Commit { title: String, description: String },
    /// Nothing to do.
    Ignore,
}

impl DialogState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AwaitingCommand => "awaiting_command",
            Self::AwaitingHabitTitle => "awaiting_habit_title",
            Self::AwaitingHabitDescription { .. } => "awaiting_habit_description",
            Self::Committing { .. } => "committing",
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::AwaitingCommand)
    }

    /// Enter the dialog on the start command.
    pub(crate) fn start() -> (Self, Step) {
        (Self::AwaitingHabitTitle, Step::Reply(TITLE_PROMPT))
    }

    /// Consume one free-text answer.
    pub(crate) fn answer(self, text: &str) -> (Self, Step) {
        let text = text.trim();
        match self {
            Self::AwaitingHabitTitle if text.is_empty() => (self, Step::Reply(EMPTY_TITLE)),
            Self::AwaitingHabitTitle => (
                Self::AwaitingHabitDescription {
                    title: text.to_string(),
                },
                Step::Reply(DESCRIPTION_PROMPT),
            ),
            Self::AwaitingHabitDescription { .. } if text.is_empty() => {
                (self, Step::Reply(EMPTY_DESCRIPTION))
            }
            Self::AwaitingHabitDescription { title } => {
                let description = text.to_string();
                (
                    Self::Committing {
                        title: title.clone(),
                        description: description.clone(),
                    },
                    Step::Commit { title, description },
                )
            }
            // Input while idle or mid-commit is not part of the dialog.
            Self::AwaitingCommand | Self::Committing { .. } => (self, Step::Ignore),
        }
    }
}
