use super::distribution::EmotionDistribution;
use crate::error::ServiceError;
use std::sync::{Arc, Mutex};

/// A frozen multi-class emotion classifier.
///
/// Implementations must be safe to share across concurrent requests:
/// classification takes `&self` and must not mutate shared state.
pub trait EmotionClassifier: Send + Sync {
    /// Classifies every unit in a single batched call, returning one raw
    /// probability distribution per unit, in input order.
    fn classify_batch(&self, units: &[String]) -> Result<Vec<EmotionDistribution>, ServiceError>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

pub type SharedClassifier = Arc<dyn EmotionClassifier>;

/// Serializes every inference behind one process-wide lock, for runtimes that
/// cannot run concurrent inferences safely.
pub struct SerializedClassifier {
    inner: SharedClassifier,
    inference_lock: Mutex<()>,
}

impl SerializedClassifier {
    pub fn new(inner: SharedClassifier) -> Self {
        Self {
            inner,
            inference_lock: Mutex::new(()),
        }
    }
}

impl EmotionClassifier for SerializedClassifier {
    fn classify_batch(&self, units: &[String]) -> Result<Vec<EmotionDistribution>, ServiceError> {
        let _guard = self
            .inference_lock
            .lock()
            .map_err(|_| ServiceError::InferenceFailure("Inference lock poisoned".to_string()))?;
        self.inner.classify_batch(units)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
