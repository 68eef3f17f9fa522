//! Commonly used constants

/// Fewest decimals a major-unit amount is rendered with.
pub const MIN_MAJOR_UNIT_DECIMALS: usize = 2;
