use condmask_rules::MaskingCategory;

use crate::errors::GenerationError;
use crate::generator::ValueGenerator;

/// Deterministic generator yielding `"<category>#<n>"`, where `n` counts
/// successful calls starting at 1.
#[derive(Debug, Clone, Default)]
pub struct SequenceGenerator {
    calls: u64,
    failing: Vec<MaskingCategory>,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every request for `category` fail.
    pub fn failing_on(mut self, category: MaskingCategory) -> Self {
        self.failing.push(category);
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl ValueGenerator for SequenceGenerator {
    fn generate(&mut self, category: &MaskingCategory) -> Result<String, GenerationError> {
        if self.failing.contains(category) {
            return Err(GenerationError::Failed {
                category: category.to_string(),
                message: "configured to fail".to_string(),
            });
        }
        self.calls += 1;
        Ok(format!("{category}#{}", self.calls))
    }
}
