use condmask_rules::MaskingCategory;

use crate::errors::GenerationError;

/// Sentinel written when a rule names an unrecognized masking category.
pub const MASKED: &str = "MASKED";
/// Sentinel written when a generator fails internally.
pub const MASKED_ERROR: &str = "MASKED_ERROR";

/// Capability that produces a synthetic value for a masking category.
///
/// Implementations may return a different value on every call.
pub trait ValueGenerator {
    fn generate(&mut self, category: &MaskingCategory) -> Result<String, GenerationError>;
}

impl<G: ValueGenerator + ?Sized> ValueGenerator for &mut G {
    fn generate(&mut self, category: &MaskingCategory) -> Result<String, GenerationError> {
        (**self).generate(category)
    }
}

/// Replacement value for a masked field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskedValue {
    Generated(String),
    /// The category was not recognized.
    Masked,
    /// The generator failed.
    MaskedError,
}

impl MaskedValue {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Generated(value) => value,
            Self::Masked => MASKED,
            Self::MaskedError => MASKED_ERROR,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Self::Generated(_))
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Generated(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

/// Produce the replacement for `category`, absorbing every failure into a
/// sentinel value.
pub fn masked_value<G: ValueGenerator + ?Sized>(
    generator: &mut G,
    category: &MaskingCategory,
) -> MaskedValue {
    if let MaskingCategory::Unknown(tag) = category {
        tracing::warn!(
            event = "masking_type_unknown",
            masking_type = %tag,
            sentinel = MASKED,
            "unknown masking type, writing sentinel"
        );
        return MaskedValue::Masked;
    }

    match generator.generate(category) {
        Ok(value) => MaskedValue::Generated(value),
        Err(err) => {
            tracing::error!(
                event = "masking_failed",
                masking_type = %category,
                error = %err,
                sentinel = MASKED_ERROR,
                "value generation failed, writing sentinel"
            );
            MaskedValue::MaskedError
        }
    }
}
