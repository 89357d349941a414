//! Transcript extraction: thread messages → ordered text-only records

use super::config::RetrySettings;
use super::error::GatewayResult;
use super::retry;
use crate::domain::{AgentsClient, ContentPart, ConversationThread, ListOrder, ThreadMessage, TranscriptMessage};

/// Fetch every message on `thread`, oldest first, and project it to text
pub async fn extract(
    client: &dyn AgentsClient,
    thread: &ConversationThread,
    retry_settings: &RetrySettings,
) -> GatewayResult<Vec<TranscriptMessage>> {
    let messages = retry::idempotent(retry_settings, "list_messages", || {
        client.list_messages(&thread.id, ListOrder::Asc)
    })
    .await?;

    let transcript = project(&messages);
    tracing::debug!(
        "Thread {}: {} message(s), {} with text",
        thread.id,
        messages.len(),
        transcript.len()
    );
    Ok(transcript)
}

/// Keep each message's first text part; messages without text are dropped
pub fn project(messages: &[ThreadMessage]) -> Vec<TranscriptMessage> {
    messages
        .iter()
        .filter_map(|message| {
            let text = message.content.iter().find_map(ContentPart::as_text)?;
            Some(TranscriptMessage {
                role: message.role,
                content: text.to_string(),
                timestamp: message.created_at,
            })
        })
        .collect()
}
