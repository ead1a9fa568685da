use std::{
  mem,
  ptr::{self, NonNull},
};

/// Source of fresh memory for a [`Heap`](crate::Heap).
///
/// A provider manages a single region that only grows at its end (the
/// "break") and can be rewound to an earlier boundary.
pub trait GrowthProvider {
  /// Returns the current end of the region.
  fn current_break(&mut self) -> *mut u8;

  /// Extends the region by `increment` bytes and returns the start of the new
  /// bytes, or `None` when the region cannot grow.
  fn grow(
    &mut self,
    increment: usize,
  ) -> Option<NonNull<u8>>;

  /// Moves the end of the region back to `boundary`.
  ///
  /// # Safety
  ///
  /// `boundary` must have been returned by [`current_break`](Self::current_break)
  /// on this provider, and nothing may still use memory past it.
  unsafe fn reset(
    &mut self,
    boundary: NonNull<u8>,
  );
}

/// The process data segment, grown with `sbrk(2)` and rewound with `brk(2)`.
///
/// Only one heap may drive the program break at a time, and nothing else in
/// the process may move it while that heap is live. That includes the system
/// allocator: glibc's `malloc` also grows its main arena with `brk`, so any
/// `malloc` call between two growth steps can interleave its memory with the
/// heap's, and [`reset`](GrowthProvider::reset) then cuts that memory off.
/// Keep the process from allocating through `malloc` while such a heap is
/// live, or use a [`FixedRegion`].
#[cfg(any(target_os = "linux", target_os = "android"))]
#[derive(Debug, Default)]
pub struct ProgramBreak {
  _private: (),
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl ProgramBreak {
  pub const fn new() -> Self {
    Self { _private: () }
  }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl GrowthProvider for ProgramBreak {
  fn current_break(&mut self) -> *mut u8 {
    unsafe { libc::sbrk(0) }.cast()
  }

  fn grow(
    &mut self,
    increment: usize,
  ) -> Option<NonNull<u8>> {
    let increment = libc::intptr_t::try_from(increment).ok()?;
    let address = unsafe { libc::sbrk(increment) };

    if address == usize::MAX as *mut libc::c_void {
      return None;
    }

    NonNull::new(address.cast())
  }

  unsafe fn reset(
    &mut self,
    boundary: NonNull<u8>,
  ) {
    if unsafe { libc::brk(boundary.as_ptr().cast()) } != 0 {
      log::warn!(
        "brk({:?}) refused, program break left at {:?}",
        boundary,
        self.current_break()
      );
    }
  }
}

const WORD: usize = mem::size_of::<u64>();

/// A fixed-capacity buffer whose break moves inside it.
///
/// The buffer is reserved up front and released on drop. Growth past the
/// capacity fails. Several regions can live side by side.
#[derive(Debug)]
pub struct FixedRegion {
  base: NonNull<u64>,
  words: usize,
  offset: usize,
}

impl FixedRegion {
  /// Reserves `capacity` bytes, rounded up to a whole number of words.
  pub fn new(capacity: usize) -> Self {
    let words = crate::align!(capacity, WORD) / WORD;
    let buffer: Box<[u64]> = vec![0u64; words].into_boxed_slice();
    let base = NonNull::new(Box::into_raw(buffer).cast::<u64>()).unwrap_or(NonNull::dangling());

    Self {
      base,
      words,
      offset: 0,
    }
  }

  pub fn capacity(&self) -> usize {
    self.words * WORD
  }

  /// Bytes handed out so far.
  pub fn used(&self) -> usize {
    self.offset
  }

  /// First address of the buffer.
  pub fn base(&self) -> NonNull<u8> {
    self.base.cast()
  }

  /// Whether `address` lies inside the bytes handed out so far.
  pub fn contains(
    &self,
    address: *const u8,
  ) -> bool {
    let start = self.base.as_ptr().addr();
    (start..start + self.offset).contains(&address.addr())
  }
}

impl GrowthProvider for FixedRegion {
  fn current_break(&mut self) -> *mut u8 {
    unsafe { self.base().add(self.offset) }.as_ptr()
  }

  fn grow(
    &mut self,
    increment: usize,
  ) -> Option<NonNull<u8>> {
    let end = self.offset.checked_add(increment)?;
    if end > self.capacity() {
      return None;
    }

    let start = unsafe { self.base().add(self.offset) };
    self.offset = end;
    Some(start)
  }

  unsafe fn reset(
    &mut self,
    boundary: NonNull<u8>,
  ) {
    let offset = boundary.as_ptr().addr().wrapping_sub(self.base.as_ptr().addr());
    debug_assert!(offset <= self.offset);
    self.offset = offset.min(self.offset);
  }
}

impl Drop for FixedRegion {
  fn drop(&mut self) {
    if self.words == 0 {
      return;
    }
    unsafe {
      drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
        self.base.as_ptr(),
        self.words,
      )));
    }
  }
}
