//! Thread/run driver: creates the thread, posts the message, starts the run and polls it to a
//! terminal status.

use std::time::Duration;

use tokio::time::Instant;

use super::config::{PollingSettings, RetrySettings};
use super::error::{ConversationError, GatewayResult};
use super::retry;
use crate::domain::{AgentHandle, AgentsClient, ConversationThread, MessageRole, Run, RunStatus};

/// A run that reached a non-failed terminal status
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub thread: ConversationThread,
    pub run: Run,
    /// Number of sleep-then-refetch cycles the poll loop performed
    pub poll_cycles: u32,
}

pub struct RunDriver {
    interval: Duration,
    max_wait: Option<Duration>,
    retry: RetrySettings,
}

impl RunDriver {
    pub fn new(polling: &PollingSettings, retry: RetrySettings) -> Self {
        Self {
            interval: polling.interval(),
            max_wait: polling.max_wait(),
            retry,
        }
    }

    /// Run `text` against the handle's agent on a brand new thread.
    ///
    /// Thread, message and run creation are each attempted exactly once.
    pub async fn execute(&self, handle: &AgentHandle, text: &str) -> GatewayResult<RunOutcome> {
        let client = handle.connection.as_ref();

        let thread = client.create_thread().await?;
        tracing::info!("Thread {} created for agent '{}'", thread.id, handle.logical_name);

        client
            .create_message(&thread.id, MessageRole::User, text)
            .await
            .map_err(|e| {
                tracing::error!("Failed to post message to thread {}: {}", thread.id, e);
                e
            })?;

        let run = client
            .create_run(&thread.id, &handle.agent_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to start run on thread {}: {}", thread.id, e);
                e
            })?;
        tracing::debug!("Run {} started on thread {} ({})", run.id, thread.id, run.status);

        let (run, poll_cycles) = self.poll(client, &thread, run).await?;

        if run.status == RunStatus::Failed {
            tracing::warn!(
                "Run {} on thread {} failed: {:?}",
                run.id,
                thread.id,
                run.last_error
            );
            return Err(ConversationError::RunFailed {
                thread_id: thread.id,
                run_id: run.id,
                last_error: run.last_error,
            });
        }

        tracing::info!(
            "Run {} on thread {} finished with status {} after {} poll(s)",
            run.id,
            thread.id,
            run.status,
            poll_cycles
        );

        Ok(RunOutcome {
            thread,
            run,
            poll_cycles,
        })
    }

    async fn poll(
        &self,
        client: &dyn AgentsClient,
        thread: &ConversationThread,
        mut run: Run,
    ) -> GatewayResult<(Run, u32)> {
        let started = Instant::now();
        let run_id = run.id.clone();
        let mut cycles = 0u32;

        while run.status.is_pending() {
            if let Some(max_wait) = self.max_wait {
                let waited = started.elapsed();
                if waited >= max_wait {
                    self.cancel_quietly(client, &thread.id, &run_id).await;
                    return Err(ConversationError::Timeout {
                        thread_id: thread.id.clone(),
                        run_id,
                        waited,
                    });
                }
            }

            tokio::time::sleep(self.interval).await;
            run = retry::idempotent(&self.retry, "get_run", || client.get_run(&thread.id, &run_id)).await?;
            cycles += 1;
            tracing::debug!("Run {} poll #{}: {}", run_id, cycles, run.status);
        }

        Ok((run, cycles))
    }

    async fn cancel_quietly(&self, client: &dyn AgentsClient, thread_id: &str, run_id: &str) {
        match client.cancel_run(thread_id, run_id).await {
            Ok(run) => tracing::warn!("Run {} timed out, cancel requested ({})", run_id, run.status),
            Err(e) => tracing::warn!("Run {} timed out and could not be cancelled: {}", run_id, e),
        }
    }
}
