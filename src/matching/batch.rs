//! Batch partitioning and batch-size policy

/// Batch size for high-throughput model classes
pub const FAST_BATCH_SIZE: usize = 100;

/// Batch size for standard model classes
pub const STANDARD_BATCH_SIZE: usize = 50;

/// Throughput class of an inference model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelClass {
    /// Lightweight, high-throughput models (the "flash" family)
    Fast,
    /// Everything else
    Standard,
}

impl ModelClass {
    /// Classifies a model by its identifier
    pub fn from_model_name(model: &str) -> Self {
        if model.to_ascii_lowercase().contains("flash") {
            Self::Fast
        } else {
            Self::Standard
        }
    }

    /// Number of old URLs sent per request for this class
    pub fn batch_size(&self) -> usize {
        match self {
            Self::Fast => FAST_BATCH_SIZE,
            Self::Standard => STANDARD_BATCH_SIZE,
        }
    }
}

/// Splits items into contiguous, order-preserving batches
///
/// Every batch holds `batch_size` items except possibly the last. A
/// `batch_size` of zero is treated as one.
///
/// # Example
///
/// ```
/// use redirect_mapper::matching::partition;
///
/// let batches = partition(&[1, 2, 3, 4, 5], 2);
/// assert_eq!(batches, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
/// ```
pub fn partition<T>(items: &[T], batch_size: usize) -> Vec<&[T]> {
    items.chunks(batch_size.max(1)).collect()
}
