//! Errors surfaced to the host.
//!
//! Only precondition violations in the surrounding application are errors.
//! Degenerate geometry, unknown style tags and out-of-range scroll offsets
//! are all handled by fallback and never reach this type.

use thiserror::Error;

use crate::element::ElementId;

/// Errors returned by tree mutations and configuration loading.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("element {0:?} does not exist")]
    UnknownElement(ElementId),

    #[error("element {child:?} is not a child of {parent:?}")]
    NotAChild { parent: ElementId, child: ElementId },

    #[error("element {0:?} cannot hold children")]
    NotAContainer(ElementId),

    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: ElementId, child: ElementId },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert() {
        let err: EngineError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
