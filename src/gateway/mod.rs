//! Gateway: wires the Telegram client, the store and the dialog
//! coordinator together and supervises the long-running tasks.

mod consumer;
mod dialog;
mod processor;
mod supervisor;
mod users;

pub use dialog::{DialogCoordinator, DialogHandle, DialogSignal};
pub use users::KnownUsers;

use crate::api::{self, Adapter};
use crate::commands::COMMANDS;
use consumer::Consumer;
use habitbot_channels::telegram::TelegramClient;
use habitbot_core::{config::Config, traits::HabitStore};
use habitbot_store::Store;
use processor::Processor;
use std::sync::Arc;
use std::time::Instant;
use supervisor::{ExitReason, Supervisor};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Gateway {
    config: Config,
    client: Arc<TelegramClient>,
    store: Arc<dyn HabitStore>,
    uptime: Instant,
}

impl Gateway {
    pub fn new(config: Config, client: TelegramClient, store: Store) -> Self {
        Self {
            config,
            client: Arc::new(client),
            store: Arc::new(store),
            uptime: Instant::now(),
        }
    }

    /// Run until SIGINT/SIGTERM or until a task dies.
    pub async fn run(self) -> anyhow::Result<()> {
        let users = KnownUsers::new();
        let (coordinator, dialog) =
            DialogCoordinator::new(self.store.clone(), self.client.clone(), &self.config.dialog);
        let processor = Arc::new(Processor::new(
            self.client.clone(),
            self.store.clone(),
            dialog.clone(),
            users.clone(),
        ));
        let consumer = Consumer::new(self.client.clone(), processor, &self.config.telegram);

        self.client.register_commands(COMMANDS).await;

        let mut supervisor = Supervisor::new(CancellationToken::new());
        supervisor.spawn("dialog", coordinator.run(supervisor.token()));
        supervisor.spawn("consumer", consumer.run(supervisor.token()));
        if self.config.api.enabled {
            let adapter = Adapter::new(users, dialog);
            supervisor.spawn(
                "api",
                api::serve(
                    self.config.api.clone(),
                    adapter,
                    self.uptime,
                    supervisor.token(),
                ),
            );
        }

        info!("{} is running", self.config.bot.name);
        let reason = supervisor
            .run_until(shutdown_signal(), self.config.api.shutdown_timeout())
            .await;
        info!("Shutdown complete.");

        match reason {
            ExitReason::Signal | ExitReason::NoTasks => Ok(()),
            ExitReason::TaskExited(name) => anyhow::bail!("task {name} exited unexpectedly"),
            ExitReason::TaskPanicked(name) => anyhow::bail!("task {name} panicked"),
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
