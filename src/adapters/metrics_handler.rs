use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ConversationResult, ErrorKind};

pub struct MetricsCollector {
    registry: Registry,

    // Conversation metrics
    pub conversations_total: CounterVec,
    pub conversation_duration: HistogramVec,
    pub run_poll_cycles: HistogramVec,

    // Connection metrics
    pub agent_connections: Counter,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let conversations_total = CounterVec::new(
            Opts::new("gateway_conversations_total", "Total conversations by outcome"),
            &["agent", "outcome"],
        )?;
        registry.register(Box::new(conversations_total.clone()))?;

        let conversation_duration = HistogramVec::new(
            HistogramOpts::new(
                "gateway_conversation_duration_seconds",
                "End-to-end conversation duration in seconds",
            )
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
            &["agent"],
        )?;
        registry.register(Box::new(conversation_duration.clone()))?;

        let run_poll_cycles = HistogramVec::new(
            HistogramOpts::new("gateway_run_poll_cycles", "Status polls needed per run")
                .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["agent"],
        )?;
        registry.register(Box::new(run_poll_cycles.clone()))?;

        let agent_connections = Counter::new(
            "gateway_agent_connections_total",
            "Connections established to the agent service",
        )?;
        registry.register(Box::new(agent_connections.clone()))?;

        Ok(Self {
            registry,
            conversations_total,
            conversation_duration,
            run_poll_cycles,
            agent_connections,
        })
    }

    pub fn record_conversation(&self, agent: &str, result: &ConversationResult, elapsed: Duration) {
        let outcome = match result {
            ConversationResult::Success(_) => "success",
            ConversationResult::Failure(failure) => match failure.kind {
                ErrorKind::Validation => "validation",
                ErrorKind::UnknownAgent => "unknown_agent",
                ErrorKind::Transport => "transport",
                ErrorKind::RunFailed => "run_failed",
                ErrorKind::Timeout => "timeout",
                ErrorKind::Internal => "internal",
            },
        };
        self.conversations_total.with_label_values(&[agent, outcome]).inc();
        self.conversation_duration
            .with_label_values(&[agent])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_poll_cycles(&self, agent: &str, cycles: u32) {
        self.run_poll_cycles
            .with_label_values(&[agent])
            .observe(f64::from(cycles));
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub struct MetricsHandler {
    collector: Arc<MetricsCollector>,
}

impl MetricsHandler {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }

    pub async fn metrics(&self) -> String {
        self.collector.encode().unwrap_or_else(|e| {
            tracing::error!("Failed to encode metrics: {}", e);
            String::from("# Error encoding metrics\n")
        })
    }
}
