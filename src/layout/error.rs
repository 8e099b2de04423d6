use thiserror::Error;

/// Structural and configuration failures detected before any geometry is written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("tree has {levels} level(s); a heatmap needs a group level above the leaves")]
    TooShallow { levels: usize },
    #[error("leaf {name:?} sits at depth {depth}, expected every leaf at depth {expected}")]
    UnevenLeafDepth {
        name: Option<String>,
        depth: usize,
        expected: usize,
    },
    #[error("leaf {name:?} has a non-finite value")]
    NonFiniteValue { name: Option<String> },
    #[error("invalid canvas size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("{name} must be a non-negative finite number, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("map height must be at least 1")]
    InvalidMapHeight,
    #[error("legend needs at least one segment")]
    InvalidSegments,
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    #[error("color ramp needs at least one color")]
    EmptyColorRamp,
    #[error("invalid number format `{0}`")]
    InvalidFormat(String),
}
