use super::*;

#[test]
fn test_parse_all_commands() {
    assert_eq!(Command::parse("/start"), Some(Command::Start));
    assert_eq!(Command::parse("/help"), Some(Command::Help));
    assert_eq!(Command::parse("/newhabit"), Some(Command::NewHabit));
    assert_eq!(Command::parse("/new_habit"), Some(Command::NewHabit));
    assert_eq!(Command::parse("/create"), Some(Command::NewHabit));
    assert_eq!(Command::parse("/habits"), Some(Command::Habits));
    assert_eq!(Command::parse("/cancel"), Some(Command::Cancel));
}

#[test]
fn test_parse_commands_with_botname_suffix_and_args() {
    assert_eq!(Command::parse("/help@habit_bot"), Some(Command::Help));
    assert_eq!(
        Command::parse("/newhabit@habit_bot now"),
        Some(Command::NewHabit)
    );
    assert_eq!(Command::parse("  /start  "), Some(Command::Start));
    assert!(Command::parse("/unknown@habit_bot").is_none());
}

#[test]
fn test_parse_free_text_returns_none() {
    assert!(Command::parse("My Habit").is_none());
    assert!(Command::parse("Daily walk /help").is_none());
    assert!(Command::parse("/unknown").is_none());
    assert!(Command::parse("").is_none());
    assert!(Command::parse("   ").is_none());
}

#[test]
fn test_help_lists_every_command() {
    let text = help();
    for (cmd, _) in COMMANDS {
        assert!(text.contains(cmd), "help should mention {cmd}");
    }
    assert!(greeting(Some("ann")).starts_with("Hi @ann!"));
    assert!(greeting(None).starts_with("Hi! I help you"));
}

#[test]
fn test_format_habits() {
    assert!(format_habits(&[]).contains("/newhabit"));

    let habits = vec![
        HabitSummary {
            id: 1,
            title: "Read".to_string(),
            description: "10 pages".to_string(),
        },
        HabitSummary {
            id: 2,
            title: "Run".to_string(),
            description: String::new(),
        },
    ];
    assert_eq!(
        format_habits(&habits),
        "Your habits (2):\n1. Read — 10 pages\n2. Run"
    );
}
