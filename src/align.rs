/// Rounds `value` up to the next multiple of a power of two.
///
/// With a single argument the value is rounded to the chunk header
/// alignment ([`HEADER_ALIGN`](crate::HEADER_ALIGN)).
///
/// # Examples
///
/// ```rust
/// use fitalloc::{HEADER_ALIGN, align};
///
/// assert_eq!(align!(13, 16), 16);
/// assert_eq!(align!(32, 16), 32);
///
/// match HEADER_ALIGN {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align!($value, $crate::HEADER_ALIGN)
  };
  ($value:expr, $to:expr) => {
    ($value + $to - 1) & !($to - 1)
  };
}
