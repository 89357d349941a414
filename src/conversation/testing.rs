//! Scripted in-memory agent service used by unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::conversation::error::{TransportError, TransportResult};
use crate::domain::{
    AgentsClient, AgentsConnector, ContentPart, ConversationThread, ListOrder, MessageRole,
    RemoteAgent, Run, RunError, RunStatus, TextContent, ThreadMessage,
};

#[derive(Default)]
pub struct ScriptedBackend {
    pub connects: AtomicUsize,
    pub agent_lookups: AtomicUsize,
    pub threads_created: AtomicUsize,
    pub runs_created: AtomicUsize,
    pub get_run_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub cancels: AtomicUsize,
    /// Text of every message appended through `create_message`
    pub sent: Mutex<Vec<String>>,
    statuses: Mutex<VecDeque<RunStatus>>,
    last_error: Mutex<Option<RunError>>,
    transcript: Mutex<Option<Vec<ThreadMessage>>>,
    fail_connect: Mutex<Option<String>>,
    fail_create_thread: Mutex<bool>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Status returned by `create_run` followed by each `get_run`; the last one repeats
    pub fn with_statuses(self: Arc<Self>, statuses: &[RunStatus]) -> Arc<Self> {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn with_last_error(self: Arc<Self>, code: &str, message: &str) -> Arc<Self> {
        *self.last_error.lock().unwrap() = Some(RunError {
            code: code.to_string(),
            message: message.to_string(),
        });
        self
    }

    pub fn with_transcript(self: Arc<Self>, messages: Vec<ThreadMessage>) -> Arc<Self> {
        *self.transcript.lock().unwrap() = Some(messages);
        self
    }

    pub fn failing_connect(self: Arc<Self>, reason: &str) -> Arc<Self> {
        *self.fail_connect.lock().unwrap() = Some(reason.to_string());
        self
    }

    pub fn failing_create_thread(self: Arc<Self>) -> Arc<Self> {
        *self.fail_create_thread.lock().unwrap() = true;
        self
    }

    pub fn allow_connect(&self) {
        *self.fail_connect.lock().unwrap() = None;
    }

    pub fn connector(self: &Arc<Self>) -> Arc<dyn AgentsConnector> {
        Arc::new(ScriptedConnector(self.clone()))
    }

    fn next_status(&self) -> RunStatus {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap_or(RunStatus::Completed)
        } else {
            statuses.front().copied().unwrap_or(RunStatus::Completed)
        }
    }

    fn run(&self, thread_id: &str, status: RunStatus) -> Run {
        let last_error = if status == RunStatus::Failed {
            self.last_error.lock().unwrap().clone()
        } else {
            None
        };
        Run {
            id: "run_1".to_string(),
            thread_id: thread_id.to_string(),
            status,
            last_error,
        }
    }
}

pub fn text_message(id: &str, role: MessageRole, text: &str, created_at: i64) -> ThreadMessage {
    ThreadMessage {
        id: id.to_string(),
        role,
        content: vec![ContentPart::Text {
            text: TextContent { value: text.to_string() },
        }],
        created_at,
    }
}

pub fn image_message(id: &str, role: MessageRole, created_at: i64) -> ThreadMessage {
    ThreadMessage {
        id: id.to_string(),
        role,
        content: vec![ContentPart::Other],
        created_at,
    }
}

struct ScriptedConnector(Arc<ScriptedBackend>);

#[async_trait]
impl AgentsConnector for ScriptedConnector {
    async fn connect(&self) -> TransportResult<Arc<dyn AgentsClient>> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent first-time callers overlap
        tokio::time::sleep(Duration::from_millis(10)).await;
        if let Some(reason) = self.0.fail_connect.lock().unwrap().clone() {
            return Err(TransportError::Authentication(reason));
        }
        Ok(self.0.clone())
    }
}

#[async_trait]
impl AgentsClient for ScriptedBackend {
    async fn get_agent(&self, agent_id: &str) -> TransportResult<RemoteAgent> {
        self.agent_lookups.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(RemoteAgent {
            id: agent_id.to_string(),
            name: Some(format!("{} display", agent_id)),
        })
    }

    async fn create_thread(&self) -> TransportResult<ConversationThread> {
        if *self.fail_create_thread.lock().unwrap() {
            return Err(TransportError::Api {
                status: 500,
                message: "thread store unavailable".to_string(),
            });
        }
        let n = self.threads_created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ConversationThread {
            id: format!("thread_{}", n),
        })
    }

    async fn create_message(
        &self,
        _thread_id: &str,
        role: MessageRole,
        text: &str,
    ) -> TransportResult<ThreadMessage> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(text_message("msg_user", role, text, 1))
    }

    async fn create_run(&self, thread_id: &str, _agent_id: &str) -> TransportResult<Run> {
        self.runs_created.fetch_add(1, Ordering::SeqCst);
        let status = self.next_status();
        Ok(self.run(thread_id, status))
    }

    async fn get_run(&self, thread_id: &str, _run_id: &str) -> TransportResult<Run> {
        self.get_run_calls.fetch_add(1, Ordering::SeqCst);
        let status = self.next_status();
        Ok(self.run(thread_id, status))
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        _order: ListOrder,
    ) -> TransportResult<Vec<ThreadMessage>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(transcript) = self.transcript.lock().unwrap().clone() {
            return Ok(transcript);
        }
        let mut messages: Vec<ThreadMessage> = self
            .sent
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, text)| text_message(&format!("msg_{}", i), MessageRole::User, text, i as i64))
            .collect();
        messages.push(text_message("msg_reply", MessageRole::Assistant, "ok", 100));
        Ok(messages)
    }

    async fn cancel_run(&self, thread_id: &str, _run_id: &str) -> TransportResult<Run> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(self.run(thread_id, RunStatus::Cancelling))
    }
}
