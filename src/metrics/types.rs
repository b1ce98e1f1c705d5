use serde::{Deserialize, Serialize};

/// One request's timing: the server's own processing time from the response
/// body and the round trip measured by the hammer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingSample {
    pub tag: String,
    pub reported_ms: i64,
    pub measured_ms: u64,
}

/// The `{tag, time}` fragment servers embed in response bodies.
#[derive(Debug, Deserialize)]
pub struct TimingFragment {
    #[serde(default)]
    pub tag: String,
    pub time: i64,
}

impl TimingFragment {
    /// # Errors
    ///
    /// Returns an error when the body is not a JSON object with an integer
    /// `time` field.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// Everything one hammer observed during a run. `timed_out`,
/// `transport_errors`, and `parse_errors` are sub-tallies of `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerResult {
    pub passes: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub transport_errors: u64,
    pub parse_errors: u64,
    pub byte_count: u64,
    pub samples: Vec<TimingSample>,
}

impl WorkerResult {
    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.succeeded.saturating_add(self.failed)
    }

    pub(crate) const fn start_pass(&mut self) {
        self.passes = self.passes.saturating_add(1);
    }

    pub(crate) fn record_response(
        &mut self,
        success: bool,
        body_len: usize,
        sample: Option<TimingSample>,
    ) {
        if success {
            self.succeeded = self.succeeded.saturating_add(1);
        } else {
            self.failed = self.failed.saturating_add(1);
        }
        self.byte_count = self
            .byte_count
            .saturating_add(u64::try_from(body_len).unwrap_or(u64::MAX));
        if let Some(sample) = sample {
            self.samples.push(sample);
        }
    }

    pub(crate) fn record_unparsed(&mut self, body_len: usize) {
        self.record_response(false, body_len, None);
        self.parse_errors = self.parse_errors.saturating_add(1);
    }

    pub(crate) const fn record_timeout(&mut self) {
        self.failed = self.failed.saturating_add(1);
        self.timed_out = self.timed_out.saturating_add(1);
    }

    pub(crate) const fn record_transport_error(&mut self) {
        self.failed = self.failed.saturating_add(1);
        self.transport_errors = self.transport_errors.saturating_add(1);
    }

    /// Folds `other` into `self`, moving its samples.
    pub fn merge(&mut self, other: WorkerResult) {
        self.passes = self.passes.saturating_add(other.passes);
        self.succeeded = self.succeeded.saturating_add(other.succeeded);
        self.failed = self.failed.saturating_add(other.failed);
        self.timed_out = self.timed_out.saturating_add(other.timed_out);
        self.transport_errors = self.transport_errors.saturating_add(other.transport_errors);
        self.parse_errors = self.parse_errors.saturating_add(other.parse_errors);
        self.byte_count = self.byte_count.saturating_add(other.byte_count);
        self.samples.extend(other.samples);
    }
}
