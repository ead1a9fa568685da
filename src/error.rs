use thiserror::Error;

/// Failures reported by [`Heap::allocate`](crate::Heap::allocate).
///
/// None of these leave the heap in a bad state. The caller may free memory or
/// reconfigure and try again.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
  /// The request was for zero bytes, or its size with the header overflows.
  #[error("invalid allocation size {size}")]
  InvalidSize { size: usize },

  /// Growing once more would take the heap past its configured ceiling.
  #[error(
    "growing by {increment} bytes would exceed the ceiling ({grown} of {ceiling} bytes in use)"
  )]
  OutOfConfiguredSpace {
    grown: usize,
    increment: usize,
    ceiling: usize,
  },

  /// The growth provider could not extend the region.
  #[error("growth provider failed to extend the heap by {increment} bytes")]
  GrowthFailed { increment: usize },
}

pub type Result<T> = std::result::Result<T, HeapError>;
