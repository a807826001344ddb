//! Command processor: routes one event to a reply, a store read, or the
//! dialog coordinator.

use super::dialog::{DialogHandle, DialogSignal};
use super::users::{normalize_username, KnownUsers};
use crate::commands::{self, Command};
use async_trait::async_trait;
use habitbot_core::{
    error::{BotError, ErrorKind},
    event::Event,
    traits::{ChatSender, EventProcessor, HabitStore},
};
use std::sync::Arc;
use tracing::debug;

pub struct Processor {
    sender: Arc<dyn ChatSender>,
    store: Arc<dyn HabitStore>,
    dialog: DialogHandle,
    users: KnownUsers,
}

impl Processor {
    pub fn new(
        sender: Arc<dyn ChatSender>,
        store: Arc<dyn HabitStore>,
        dialog: DialogHandle,
        users: KnownUsers,
    ) -> Self {
        Self {
            sender,
            store,
            dialog,
            users,
        }
    }
}

#[async_trait]
impl EventProcessor for Processor {
    async fn process(&self, event: Event) -> Result<(), BotError> {
        let (text, meta) = match event {
            Event::Message { text, meta } => (text, meta),
            Event::Unknown => {
                return Err(BotError::new(
                    ErrorKind::UnknownEventType,
                    "can't process message",
                ))
            }
        };
        let chat_id = meta.chat_id;
        // /start and /help work without a username; everything that touches
        // the dialog or the store needs one.
        let username = || meta.sender().map(str::to_string);
        if let Ok(name) = meta.sender() {
            self.users.record(name);
        }

        let Some(command) = Command::parse(&text) else {
            // Free text: the coordinator decides whether it answers a dialog.
            let username = username()?;
            return self.dialog.send(DialogSignal::Answer {
                chat_id,
                username,
                text,
            });
        };
        debug!("chat {chat_id}: {command:?}");

        match command {
            Command::Start => {
                let greeting = commands::greeting(meta.sender().ok());
                self.sender.send_text(chat_id, &greeting).await
            }
            Command::Help => self.sender.send_text(chat_id, &commands::help()).await,
            Command::NewHabit => self.dialog.send(DialogSignal::Start {
                chat_id,
                username: username()?,
            }),
            Command::Cancel => self.dialog.send(DialogSignal::Cancel {
                chat_id,
                username: username()?,
            }),
            Command::Habits => {
                let habits = self
                    .store
                    .list_habits(&normalize_username(&username()?))
                    .await?;
                self.sender
                    .send_text(chat_id, &commands::format_habits(&habits))
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::dialog::{DialogCoordinator, DialogState};
    use habitbot_core::config::DialogConfig;
    use habitbot_core::event::{translate, Meta};
    use habitbot_core::traits::HabitSummary;
    use habitbot_core::update::Update;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait]
    impl ChatSender for RecordingSender {
        async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        habits: Mutex<Vec<(String, HabitSummary)>>,
    }

    #[async_trait]
    impl HabitStore for MemoryStore {
        async fn create_habit(
            &self,
            owner: &str,
            title: &str,
            description: &str,
        ) -> Result<i64, BotError> {
            let mut habits = self.habits.lock().unwrap();
            let id = habits.len() as i64 + 1;
            habits.push((
                owner.to_string(),
                HabitSummary {
                    id,
                    title: title.to_string(),
                    description: description.to_string(),
                },
            ));
            Ok(id)
        }

        async fn list_habits(&self, owner: &str) -> Result<Vec<HabitSummary>, BotError> {
            Ok(self
                .habits
                .lock()
                .unwrap()
                .iter()
                .filter(|(o, _)| o == owner)
                .map(|(_, h)| h.clone())
                .collect())
        }
    }

    struct Fixture {
        processor: Processor,
        sender: Arc<RecordingSender>,
        dialog: DialogHandle,
        users: KnownUsers,
        cancel: CancellationToken,
    }

    fn fixture() -> Fixture {
        let sender = Arc::new(RecordingSender::default());
        let store = Arc::new(MemoryStore::default());
        let (coordinator, dialog) =
            DialogCoordinator::new(store.clone(), sender.clone(), &DialogConfig::default());
        let cancel = CancellationToken::new();
        tokio::spawn(coordinator.run(cancel.clone()));
        let users = KnownUsers::new();
        let processor = Processor::new(sender.clone(), store, dialog.clone(), users.clone());
        Fixture {
            processor,
            sender,
            dialog,
            users,
            cancel,
        }
    }

    async fn say(f: &Fixture, username: &str, text: &str) -> Result<(), BotError> {
        f.processor
            .process(translate(&Update::text(1, 42, username, text)))
            .await
    }

    #[tokio::test]
    async fn test_unknown_event_is_rejected() {
        let f = fixture();
        let err = f.processor.process(Event::Unknown).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEventType);
        assert!(f.sender.sent.lock().unwrap().is_empty());
        f.cancel.cancel();
    }

    fn anonymous(text: &str) -> Event {
        Event::Message {
            text: text.to_string(),
            meta: Meta {
                chat_id: 42,
                username: None,
            },
        }
    }

    #[tokio::test]
    async fn test_start_and_help_answer_users_without_username() {
        let f = fixture();
        f.processor.process(anonymous("/start")).await.unwrap();
        f.processor.process(anonymous("/help")).await.unwrap();

        let sent = f.sender.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, 42);
        assert!(sent[0].1.starts_with("Hi! "));
        assert!(sent[1].1.contains("/newhabit"));
        assert!(f.users.is_empty());
        f.cancel.cancel();
    }

    #[tokio::test]
    async fn test_dialog_and_store_commands_need_username() {
        let f = fixture();
        for text in ["/newhabit", "/habits", "/cancel", "My Habit"] {
            let err = f.processor.process(anonymous(text)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Meta, "for {text:?}");
        }
        assert!(f.sender.sent.lock().unwrap().is_empty());
        assert!(f.users.is_empty());
        f.cancel.cancel();
    }

    #[tokio::test]
    async fn test_start_and_help_reply_and_record_user() {
        let f = fixture();
        say(&f, "Ann", "/start").await.unwrap();
        say(&f, "Ann", "/help@habit_bot").await.unwrap();

        let sent = f.sender.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].1.starts_with("Hi @Ann!"));
        assert!(sent[1].1.contains("/newhabit"));
        assert!(f.users.contains("ann"));
        f.cancel.cancel();
    }

    #[tokio::test]
    async fn test_new_habit_flow_through_processor() {
        let f = fixture();
        say(&f, "ann", "/newhabit").await.unwrap();
        assert_eq!(f.dialog.state_of("ann").await, DialogState::AwaitingHabitTitle);

        say(&f, "ann", "Read").await.unwrap();
        say(&f, "ann", "10 pages a day").await.unwrap();
        assert_eq!(f.dialog.state_of("ann").await, DialogState::AwaitingCommand);

        say(&f, "ann", "/habits").await.unwrap();
        let sent = f.sender.sent.lock().unwrap().clone();
        let last = &sent.last().unwrap().1;
        assert!(last.contains("1. Read"), "got: {last}");
        f.cancel.cancel();
    }

    #[tokio::test]
    async fn test_cancel_routes_to_dialog() {
        let f = fixture();
        say(&f, "ann", "/create").await.unwrap();
        say(&f, "ann", "/cancel").await.unwrap();
        assert!(!f.dialog.has_open_dialog("ann").await);
        f.cancel.cancel();
    }

    #[tokio::test]
    async fn test_free_text_without_dialog_is_ignored() {
        let f = fixture();
        say(&f, "ann", "just chatting").await.unwrap();
        say(&f, "ann", "/unknown").await.unwrap();
        assert!(!f.dialog.has_open_dialog("ann").await);
        assert!(f.sender.sent.lock().unwrap().is_empty());
        f.cancel.cancel();
    }

    #[tokio::test]
    async fn test_habits_empty_list() {
        let f = fixture();
        say(&f, "bob", "/habits").await.unwrap();
        let sent = f.sender.sent.lock().unwrap().clone();
        assert!(sent[0].1.contains("no habits yet"));
        f.cancel.cancel();
    }
}
