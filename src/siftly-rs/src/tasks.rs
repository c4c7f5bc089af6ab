//! Waiting for asynchronous tasks to reach a terminal state

use crate::{AsTaskUid, Client, ClientError, Result, Task, WaitConfig};
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Parameters for one wait: an overall deadline, the delay between two
/// status queries, and an optional cancellation token.
#[derive(Debug, Clone)]
pub struct WaitParams {
    deadline: Deadline,
    interval: Duration,
    cancel: Option<CancellationToken>,
}

#[derive(Debug, Clone, Copy)]
enum Deadline {
    /// Relative to the moment the wait starts
    After(Duration),
    At(Instant),
}

impl WaitParams {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            deadline: Deadline::After(timeout),
            interval,
            cancel: None,
        }
    }

    pub fn from_config(config: &WaitConfig) -> Self {
        Self::new(config.timeout(), config.interval())
    }

    /// Replace the relative timeout with an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Deadline::At(deadline);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `None` when the timeout is too large to be represented as an instant
    fn resolve_deadline(&self, started: Instant) -> Option<Instant> {
        match self.deadline {
            Deadline::After(timeout) => started.checked_add(timeout),
            Deadline::At(at) => Some(at),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }
}

impl Default for WaitParams {
    /// 5 second deadline, 50 ms interval
    fn default() -> Self {
        Self::from_config(&WaitConfig::default())
    }
}

/// Polls `GET /tasks/{uid}` until the task leaves the pending states.
///
/// `defaults` apply whenever a wait is started without explicit parameters.
#[derive(Clone)]
pub struct TaskPoller {
    client: Client,
    defaults: WaitParams,
}

impl TaskPoller {
    pub fn new(client: Client, defaults: WaitParams) -> Self {
        Self { client, defaults }
    }

    pub fn defaults(&self) -> &WaitParams {
        &self.defaults
    }

    /// Block until `task` is terminal and return it as the server reported it.
    ///
    /// A `failed` task is returned as `Ok`; only the deadline or cancellation
    /// produce an error here.
    pub async fn wait(&self, task: impl AsTaskUid, params: Option<WaitParams>) -> Result<Task> {
        let params = params.unwrap_or_else(|| self.defaults.clone());
        let started = Instant::now();
        let deadline = params.resolve_deadline(started);
        self.wait_until(task.task_uid(), &params, started, deadline).await
    }

    /// Wait for every task in order under one shared deadline
    pub async fn wait_all<T: AsTaskUid>(
        &self,
        tasks: &[T],
        params: Option<WaitParams>,
    ) -> Result<Vec<Task>> {
        let params = params.unwrap_or_else(|| self.defaults.clone());
        let started = Instant::now();
        let deadline = params.resolve_deadline(started);

        let mut finished = Vec::with_capacity(tasks.len());
        for task in tasks {
            finished.push(
                self.wait_until(task.task_uid(), &params, started, deadline)
                    .await?,
            );
        }
        Ok(finished)
    }

    async fn wait_until(
        &self,
        task_uid: u64,
        params: &WaitParams,
        started: Instant,
        deadline: Option<Instant>,
    ) -> Result<Task> {
        loop {
            if params.is_cancelled() {
                return Err(ClientError::WaitCancelled { task_uid });
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(ClientError::WaitTimeout {
                    task_uid,
                    waited: started.elapsed(),
                });
            }

            let task = self.client.get_task(task_uid).await?;
            if task.status.is_terminal() {
                info!(
                    "Task {} finished as {} after {:?}",
                    task_uid,
                    task.status,
                    started.elapsed()
                );
                return Ok(task);
            }
            debug!("Task {} is {}, polling again", task_uid, task.status);

            tokio::select! {
                _ = time::sleep(params.interval) => {}
                _ = sleep_until_deadline(deadline) => {}
                _ = params.cancelled() => {}
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl Client {
    /// Poller using this client's configured wait defaults
    pub fn task_poller(&self) -> TaskPoller {
        TaskPoller::new(self.clone(), WaitParams::from_config(&self.config.wait))
    }

    /// Wait for `task` to reach a terminal state.
    ///
    /// Without `params` the client's `wait` configuration applies
    /// (5 s / 50 ms unless overridden).
    pub async fn wait_for_task(
        &self,
        task: impl AsTaskUid,
        params: Option<WaitParams>,
    ) -> Result<Task> {
        self.task_poller().wait(task, params).await
    }

    /// Wait for several tasks, returning them in input order
    pub async fn wait_for_tasks<T: AsTaskUid>(
        &self,
        tasks: &[T],
        params: Option<WaitParams>,
    ) -> Result<Vec<Task>> {
        self.task_poller().wait_all(tasks, params).await
    }
}
