use thiserror::Error;

/// Errors reported by the fallible constructors.
///
/// Every variant is raised synchronously at construction time and is never
/// produced by any later table operation. Lookup misses are `Option::None`,
/// not errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// The lower load factor was larger than the upper load factor.
    #[error("lower load factor ({lower}) must not exceed upper load factor ({upper})")]
    LoadFactorOrder {
        /// The rejected lower bound.
        lower: f64,
        /// The rejected upper bound.
        upper: f64,
    },

    /// One of the load factors fell outside `[0, 1]`.
    #[error("load factors must lie within [0, 1], got lower {lower} and upper {upper}")]
    LoadFactorRange {
        /// The rejected lower bound.
        lower: f64,
        /// The rejected upper bound.
        upper: f64,
    },

    /// The bulk-load constructor was handed key and value sequences of
    /// different lengths.
    #[error("bulk load requires matching lengths, got {keys} keys and {values} values")]
    LengthMismatch {
        /// Number of keys supplied.
        keys: usize,
        /// Number of values supplied.
        values: usize,
    },
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_messages_name_the_offending_values() {
        let err = ConfigError::LoadFactorOrder {
            lower: 0.9,
            upper: 0.1,
        };
        assert!(err.to_string().contains("0.9"));
        assert!(err.to_string().contains("0.1"));

        let err = ConfigError::LengthMismatch { keys: 3, values: 2 };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('2'));
    }
}
