use common::output_stream::OutputStream;

/// Receives one update per dispatched column. Must not block.
pub trait ProgressSink: Send + Sync {
    fn update(&self, message: &str, current: usize, total: usize);
}

/// Forwards progress to the `tracing` subscriber at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn update(&self, message: &str, current: usize, total: usize) {
        tracing::debug!(current, total, "{message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub message: String,
    pub current: usize,
    pub total: usize,
}

impl ProgressSink for OutputStream<ProgressUpdate> {
    fn update(&self, message: &str, current: usize, total: usize) {
        self.write(ProgressUpdate {
            message: message.to_string(),
            current,
            total,
        });
    }
}

/// `"<template>: <current> of <total>"`; an empty template yields an empty message.
pub fn progress_message(template: &str, current: usize, total: usize) -> String {
    if template.is_empty() {
        String::new()
    } else {
        format!("{template}: {current} of {total}")
    }
}
