//! Built-in bot commands and their reply texts.

#[cfg(test)]
mod tests;

use habitbot_core::traits::HabitSummary;

/// Commands shown in the Telegram autocomplete menu, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/newhabit", "Create a new habit step by step"),
    ("/habits", "List your habits"),
    ("/cancel", "Abort the habit you are creating"),
    ("/help", "Show available commands"),
];

/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    NewHabit,
    Habits,
    Cancel,
}

impl Command {
    /// Parse a command from the first word of a message. Returns `None` for
    /// plain text and unknown `/` prefixes, which are treated as dialog input.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        // Strip @botname suffix (e.g. "/help@habit_bot" → "/help").
        let cmd = first.split('@').next().unwrap_or(first);
        match cmd {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/newhabit" | "/new_habit" | "/create" => Some(Self::NewHabit),
            "/habits" => Some(Self::Habits),
            "/cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// `/start` reply. Users without a Telegram username are greeted without one.
pub fn greeting(username: Option<&str>) -> String {
    let hello = match username {
        Some(name) => format!("Hi @{name}!"),
        None => "Hi!".to_string(),
    };
    format!("{hello} I help you keep track of your habits.\n\n{}", help())
}

pub fn help() -> String {
    let mut out = String::from("Available commands:");
    for (cmd, description) in COMMANDS {
        out.push_str(&format!("\n{cmd} — {description}"));
    }
    out
}

/// Render the `/habits` reply.
pub fn format_habits(habits: &[HabitSummary]) -> String {
    if habits.is_empty() {
        return "You have no habits yet. Send /newhabit to create one.".to_string();
    }
    let mut out = format!("Your habits ({}):", habits.len());
    for (n, habit) in habits.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", n + 1, habit.title));
        if !habit.description.is_empty() {
            out.push_str(&format!(" — {}", habit.description));
        }
    }
    out
}
