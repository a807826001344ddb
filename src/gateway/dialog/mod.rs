//! Dialog coordinator: conducts the multi-message habit-creation flow.
//!
//! One coordinator task runs per process and owns the receiving ends of two
//! channels: an inbox of [`DialogSignal`]s fed by the command processor, and
//! a query channel the HTTP adapter uses to ask whether a user has a dialog
//! open. Only one dialog can be open at a time.

mod state;


pub use state::DialogState;

use super::users::normalize_username;
use habitbot_core::{
    config::DialogConfig,
    error::{BotError, ErrorKind},
    traits::{ChatSender, HabitStore},
};
use state::Step;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const BUSY_REPLY: &str =
    "Someone else is creating a habit right now. Please try again in a few minutes.";
const CANCELLED_REPLY: &str = "Habit creation cancelled.";
const NOTHING_TO_CANCEL: &str = "There is nothing to cancel.";
const EXPIRED_REPLY: &str = "Habit creation timed out. Send /newhabit to start over.";
const QUERY_CAPACITY: usize = 8;

/// Input for the coordinator, sent by the command processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogSignal {
    /// The start trigger (`/newhabit`).
    Start { chat_id: i64, username: String },
    /// Free text that may answer the current dialog question.
    Answer {
        chat_id: i64,
        username: String,
        text: String,
    },
    Cancel { chat_id: i64, username: String },
}

/// Request half of the adapter handshake.
struct DialogQuery {
    username: String,
    reply: oneshot::Sender<DialogState>,
}

/// The one open dialog.
struct Session {
    chat_id: i64,
    /// Normalized owner username.
    owner: String,
    state: DialogState,
    deadline: Instant,
}

/// Sending side of the coordinator's channels. Cheap to clone.
#[derive(Clone)]
pub struct DialogHandle {
    inbox: mpsc::Sender<DialogSignal>,
    queries: mpsc::Sender<DialogQuery>,
    query_timeout: Duration,
}

impl DialogHandle {
    /// Hand a signal to the coordinator without waiting.
    ///
    /// A full inbox drops the signal; the caller logs the error and moves on.
    pub fn send(&self, signal: DialogSignal) -> Result<(), BotError> {
        self.inbox.try_send(signal).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                BotError::new(ErrorKind::DialogClosed, "dialog inbox full, input dropped")
            }
            mpsc::error::TrySendError::Closed(_) => {
                BotError::new(ErrorKind::DialogClosed, "dialog coordinator stopped")
            }
        })
    }

    /// Ask the coordinator for the dialog state of `username`.
    ///
    /// Answers [`DialogState::AwaitingCommand`] when the user has no open
    /// dialog, and also when the coordinator is gone or does not reply in
    /// time.
    pub async fn state_of(&self, username: &str) -> DialogState {
        let (reply, rx) = oneshot::channel();
        let query = DialogQuery {
            username: normalize_username(username),
            reply,
        };
        let handshake = async {
            self.queries.send(query).await.ok()?;
            rx.await.ok()
        };
        match tokio::time::timeout(self.query_timeout, handshake).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!("dialog coordinator stopped; reporting no open dialog");
                DialogState::AwaitingCommand
            }
            Err(_) => {
                warn!("dialog query for {username} timed out");
                DialogState::AwaitingCommand
            }
        }
    }

    pub async fn has_open_dialog(&self, username: &str) -> bool {
        self.state_of(username).await.is_open()
    }
}

/// The coordinator task. Create with [`DialogCoordinator::new`], then drive
/// with [`DialogCoordinator::run`].
pub struct DialogCoordinator {
    inbox: mpsc::Receiver<DialogSignal>,
    queries: mpsc::Receiver<DialogQuery>,
    store: Arc<dyn HabitStore>,
    sender: Arc<dyn ChatSender>,
    timeout: Duration,
    session: Option<Session>,
}

impl DialogCoordinator {
    /// Build the coordinator and the only handle that can reach it.
    pub fn new(
        store: Arc<dyn HabitStore>,
        sender: Arc<dyn ChatSender>,
        config: &DialogConfig,
    ) -> (Self, DialogHandle) {
        let (inbox_tx, inbox_rx) = mpsc::channel(config.inbox_capacity.max(1));
        let (query_tx, query_rx) = mpsc::channel(QUERY_CAPACITY);
        let coordinator = Self {
            inbox: inbox_rx,
            queries: query_rx,
            store,
            sender,
            timeout: config.timeout(),
            session: None,
        };
        let handle = DialogHandle {
            inbox: inbox_tx,
            queries: query_tx,
            query_timeout: config.query_timeout(),
        };
        (coordinator, handle)
    }

    /// Serve signals and queries until cancelled or every handle is dropped.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("dialog coordinator started");
        loop {
            let deadline = self.session.as_ref().map(|s| s.deadline);
            // Expiry and queued signals are applied before a query is answered.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = idle_deadline(deadline) => self.expire().await,
                signal = self.inbox.recv() => match signal {
                    Some(signal) => self.handle(signal, &cancel).await,
                    None => break,
                },
                Some(query) = self.queries.recv() => self.answer_query(query),
            }
        }
        info!("dialog coordinator stopped");
    }

    fn current_state(&self, username: &str) -> DialogState {
        match &self.session {
            Some(session) if session.owner == username => session.state.clone(),
            _ => DialogState::AwaitingCommand,
        }
    }

    fn answer_query(&self, query: DialogQuery) {
        // The asker may have timed out already.
        let _ = query.reply.send(self.current_state(&query.username));
    }

    async fn handle(&mut self, signal: DialogSignal, cancel: &CancellationToken) {
        match signal {
            DialogSignal::Start { chat_id, username } => self.start(chat_id, &username).await,
            DialogSignal::Answer {
                chat_id,
                username,
                text,
            } => self.answer(chat_id, &username, &text, cancel).await,
            DialogSignal::Cancel { chat_id, username } => self.cancel(chat_id, &username).await,
        }
    }

    async fn start(&mut self, chat_id: i64, username: &str) {
        let owner = normalize_username(username);
        if let Some(session) = &self.session {
            if session.owner != owner {
                debug!("dialog busy with {}, refusing {owner}", session.owner);
                self.reply(chat_id, BUSY_REPLY).await;
                return;
            }
        }

        let (state, step) = DialogState::start();
        debug!("dialog {owner}: -> {}", state.name());
        self.session = Some(Session {
            chat_id,
            owner,
            state,
            deadline: Instant::now() + self.timeout,
        });
        if let Step::Reply(text) = step {
            self.reply(chat_id, text).await;
        }
    }

    async fn answer(
        &mut self,
        chat_id: i64,
        username: &str,
        text: &str,
        cancel: &CancellationToken,
    ) {
        let owner = normalize_username(username);
        let timeout = self.timeout;
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.chat_id == chat_id && s.owner == owner)
        else {
            debug!("no open dialog for {owner} in chat {chat_id}, ignoring input");
            return;
        };

        let current = std::mem::replace(&mut session.state, DialogState::AwaitingCommand);
        let (next, step) = current.answer(text);
        debug!("dialog {owner}: -> {}", next.name());
        session.state = next;
        session.deadline = Instant::now() + timeout;

        match step {
            Step::Reply(text) => self.reply(chat_id, text).await,
            Step::Commit { title, description } => {
                self.commit(chat_id, &owner, &title, &description, cancel)
                    .await;
            }
            Step::Ignore => {}
        }
    }

    /// Write the habit. Queries keep being answered while the store works.
    async fn commit(
        &mut self,
        chat_id: i64,
        owner: &str,
        title: &str,
        description: &str,
        cancel: &CancellationToken,
    ) {
        let store = self.store.clone();
        let create = store.create_habit(owner, title, description);
        tokio::pin!(create);

        let result = loop {
            tokio::select! {
                biased;
                result = &mut create => break Some(result),
                Some(query) = self.queries.recv() => self.answer_query(query),
                _ = cancel.cancelled() => break None,
            }
        };

        self.session = None;
        debug!("dialog {owner}: -> {}", DialogState::AwaitingCommand.name());

        match result {
            Some(Ok(habit_id)) => {
                info!("habit {habit_id} created for {owner}");
                self.reply(
                    chat_id,
                    &format!("Habit \"{title}\" created! Send /habits to see all your habits."),
                )
                .await;
            }
            Some(Err(e)) => {
                let err =
                    BotError::new(ErrorKind::DialogCommit, "can't create habit").with_source(e);
                error!("{err}");
                let text =
                    format!("Sorry, I couldn't save your habit \"{title}\". Please try again.");
                self.reply(chat_id, &text).await;
            }
            None => warn!("shutdown interrupted habit creation for {owner}"),
        }
    }

    async fn cancel(&mut self, chat_id: i64, username: &str) {
        let owner = normalize_username(username);
        let owned = self.session.as_ref().is_some_and(|s| s.owner == owner);
        let session = if owned { self.session.take() } else { None };
        match session {
            Some(session) => {
                debug!("dialog {owner}: cancelled");
                self.reply(session.chat_id, CANCELLED_REPLY).await;
            }
            None => self.reply(chat_id, NOTHING_TO_CANCEL).await,
        }
    }

    async fn expire(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                "dialog for {} expired in state {}",
                session.owner,
                session.state.name()
            );
            self.reply(session.chat_id, EXPIRED_REPLY).await;
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.sender.send_text(chat_id, text).await {
            warn!("dialog reply to chat {chat_id} failed: {e}");
        }
    }
}

/// Resolves at the session deadline; never resolves without a session.
async fn idle_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
