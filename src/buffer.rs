//! Materialized traces.
//!
//! A [`TraceBuffer`] is the eager, immutable result of one tracer invocation.
//! Playback reads it by index; a new "generate" replaces it wholesale.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LimitsConfig;
use crate::error::{VizError, VizResult};
use crate::trace::{Algorithm, Step, TraceInput, Tracer};

/// Protocol violation found by [`TraceBuffer::audit`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AuditViolation {
    /// The run produced no Steps.
    #[error("trace is empty")]
    Empty,
    /// The first Step carries a non-zero counter.
    #[error("first step has non-zero metrics")]
    StartMetricsNonZero,
    /// The last Step is not flagged terminal.
    #[error("last step is not terminal")]
    MissingTerminal,
    /// A Step other than the last is flagged terminal.
    #[error("step {index} is terminal but not last")]
    EarlyTerminal {
        /// Offending step index.
        index: usize,
    },
    /// A counter went down between consecutive Steps.
    #[error("metric '{metric}' decreased at step {index}")]
    MetricDecreased {
        /// Offending step index.
        index: usize,
        /// Counter name.
        metric: String,
    },
    /// A highlight points outside its subject.
    #[error("step {index} highlights a position out of bounds")]
    HighlightOutOfBounds {
        /// Offending step index.
        index: usize,
    },
}

/// Immutable Step sequence of one tracer run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceBuffer {
    algorithm: Option<Algorithm>,
    steps: Vec<Step>,
}

impl TraceBuffer {
    /// Run `tracer` over `input` to completion.
    ///
    /// Preconditions are checked before the first Step is produced, so a
    /// failure never yields a partial buffer. The caller's input is only
    /// borrowed.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the tracer rejects the input
    /// - `InputTooLarge` if the input exceeds the ceiling for its kind
    /// - `StepLimitExceeded` if the run produces more than `limits.max_steps`
    pub fn materialize(
        tracer: &dyn Tracer,
        input: &TraceInput,
        limits: &LimitsConfig,
    ) -> VizResult<Self> {
        let algorithm = tracer.algorithm();

        if let Err(e) = tracer.validate(input) {
            warn!(%algorithm, error = %e, "input rejected");
            return Err(e);
        }

        let limit = limits.ceiling_for(input.kind());
        let len = input.size();
        if len > limit {
            warn!(%algorithm, len, limit, "input over ceiling");
            return Err(VizError::InputTooLarge { len, limit });
        }

        let mut steps = Vec::new();
        for step in tracer.trace(input)? {
            if steps.len() >= limits.max_steps {
                warn!(%algorithm, limit = limits.max_steps, "step guard tripped");
                return Err(VizError::StepLimitExceeded {
                    limit: limits.max_steps,
                });
            }
            steps.push(step);
        }

        debug!(%algorithm, input_size = len, steps = steps.len(), "trace materialized");
        Ok(Self {
            algorithm: Some(algorithm),
            steps,
        })
    }

    /// Wrap Steps produced elsewhere.
    #[must_use]
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self {
            algorithm: None,
            steps,
        }
    }

    /// A buffer with no Steps.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Algorithm that produced this buffer, if it was materialized.
    #[must_use]
    pub const fn algorithm(&self) -> Option<Algorithm> {
        self.algorithm
    }

    /// Number of Steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the buffer holds no Steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// All Steps in order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The final Step.
    #[must_use]
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Iterate over the Steps.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Blake3 digest of the bincode encoding of every Step.
    ///
    /// Two runs of the same tracer over the same input have equal
    /// fingerprints.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if a Step cannot be encoded.
    pub fn fingerprint(&self) -> VizResult<[u8; 32]> {
        let mut hasher = blake3::Hasher::new();
        for step in &self.steps {
            let bytes =
                bincode::serialize(step).map_err(|e| VizError::serialization(e.to_string()))?;
            hasher.update(&bytes);
        }
        Ok(*hasher.finalize().as_bytes())
    }

    /// Check the protocol invariants of this run.
    ///
    /// Returns every violation found; an empty list means the run is
    /// well-formed.
    #[must_use]
    pub fn audit(&self) -> Vec<AuditViolation> {
        let Some(first) = self.steps.first() else {
            return vec![AuditViolation::Empty];
        };

        let mut violations = Vec::new();
        if !first.metrics().is_zero() {
            violations.push(AuditViolation::StartMetricsNonZero);
        }

        let last = self.steps.len() - 1;
        for (index, step) in self.steps.iter().enumerate() {
            if step.is_terminal() && index != last {
                violations.push(AuditViolation::EarlyTerminal { index });
            }
            if !step.highlight().fits(step.subject()) {
                violations.push(AuditViolation::HighlightOutOfBounds { index });
            }
        }
        if !self.steps[last].is_terminal() {
            violations.push(AuditViolation::MissingTerminal);
        }

        for (offset, pair) in self.steps.windows(2).enumerate() {
            if let Some(metric) = pair[1].metrics().first_decrease(pair[0].metrics()) {
                violations.push(AuditViolation::MetricDecreased {
                    index: offset + 1,
                    metric: metric.to_string(),
                });
            }
        }

        violations
    }
}

impl<'a> IntoIterator for &'a TraceBuffer {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
