//! Supervision of the long-running tasks: one JoinSet, one cancellation
//! token, one shutdown path.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Why the supervisor started shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The external shutdown future resolved (SIGINT/SIGTERM).
    Signal,
    /// A task returned although nothing asked it to.
    TaskExited(&'static str),
    TaskPanicked(&'static str),
    /// Nothing was spawned.
    NoTasks,
}

pub struct Supervisor {
    tasks: JoinSet<()>,
    names: HashMap<Id, &'static str>,
    cancel: CancellationToken,
}

impl Supervisor {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            tasks: JoinSet::new(),
            names: HashMap::new(),
            cancel,
        }
    }

    /// The token every supervised task must observe.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.tasks.spawn(task);
        self.names.insert(handle.id(), name);
        debug!("task {name} spawned");
    }

    /// Wait for `shutdown` or the first task to end, then cancel everything
    /// and join the rest within `grace`. Stragglers are aborted.
    pub async fn run_until<S>(mut self, shutdown: S, grace: Duration) -> ExitReason
    where
        S: Future<Output = ()>,
    {
        let reason = tokio::select! {
            _ = shutdown => ExitReason::Signal,
            joined = self.tasks.join_next_with_id() => match joined {
                Some(Ok((id, ()))) => {
                    let name = self.name_of(id);
                    warn!("task {name} exited unexpectedly");
                    ExitReason::TaskExited(name)
                }
                Some(Err(e)) => self.report_failure(&e),
                None => ExitReason::NoTasks,
            },
        };

        info!("shutting down ({reason:?})");
        self.cancel.cancel();

        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = self.tasks.join_next_with_id().await {
                match joined {
                    Ok((id, ())) => debug!("task {} stopped", self.name_of(id)),
                    Err(e) => {
                        self.report_failure(&e);
                    }
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                "{} task(s) still running after {}s, aborting",
                self.tasks.len(),
                grace.as_secs()
            );
            self.tasks.abort_all();
            while self.tasks.join_next().await.is_some() {}
        }
        reason
    }

    fn name_of(&self, id: Id) -> &'static str {
        self.names.get(&id).copied().unwrap_or("unnamed")
    }

    fn report_failure(&self, e: &JoinError) -> ExitReason {
        let name = self.name_of(e.id());
        if e.is_panic() {
            error!("task {name} panicked");
            ExitReason::TaskPanicked(name)
        } else {
            debug!("task {name} was cancelled");
            ExitReason::TaskExited(name)
        }
    }
}
