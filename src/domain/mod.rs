//! Core types shared between the orchestrator and its adapters

pub mod agents;
pub mod conversation;

pub use agents::{
    AgentsClient, AgentsConnector, ContentPart, ConversationThread, ListOrder, MessageRole,
    RemoteAgent, Run, RunError, RunStatus, TextContent, ThreadMessage,
};
pub use conversation::{
    AgentHandle, ConversationFailure, ConversationResult, ConversationSuccess, ErrorKind,
    TranscriptMessage,
};
