/// Vector length contract shared by every write and query path. The
/// collection is created at a fixed dimension; a vector of any other length
/// corrupts similarity scores for the whole collection, so mismatches fail
/// before anything reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dimension mismatch: expected {expected}, got {actual}")]
pub struct DimensionMismatch {
    pub expected: usize,
    pub actual: usize,
}

pub fn ensure_dimension(expected: usize, actual: usize) -> Result<(), DimensionMismatch> {
    if actual == expected {
        Ok(())
    } else {
        Err(DimensionMismatch { expected, actual })
    }
}
