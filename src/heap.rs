use std::{fmt, ptr::NonNull};

use log::{Level, debug, log_enabled, trace, warn};

use crate::{
  HEADER_SIZE, align,
  chunk::Chunk,
  coalesce::coalesce,
  error::{HeapError, Result},
  provider::GrowthProvider,
  registry::FreeList,
  strategy::Strategy,
};

#[cfg(any(target_os = "linux", target_os = "android"))]
use crate::provider::ProgramBreak;

/// Bytes requested from the growth provider each time the heap runs dry.
pub const DEFAULT_INCREMENT: usize = 4096;

/// Settings applied by [`Heap::with_config`] and [`Heap::reconfigure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  pub strategy: Strategy,
  /// Upper bound on the total bytes the heap may grow by.
  pub ceiling: usize,
  /// Bytes added per growth step.
  pub increment: usize,
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self::new()
  }
}

impl HeapConfig {
  /// First-fit, zero ceiling, [`DEFAULT_INCREMENT`].
  pub const fn new() -> Self {
    Self {
      strategy: Strategy::FirstFit,
      ceiling: 0,
      increment: DEFAULT_INCREMENT,
    }
  }

  pub const fn with_strategy(
    mut self,
    strategy: Strategy,
  ) -> Self {
    self.strategy = strategy;
    self
  }

  pub const fn with_ceiling(
    mut self,
    ceiling: usize,
  ) -> Self {
    self.ceiling = ceiling;
    self
  }

  pub const fn with_increment(
    mut self,
    increment: usize,
  ) -> Self {
    self.increment = increment;
    self
  }

  /// The increment rounded up to the header alignment, never below one header.
  fn normalized_increment(&self) -> usize {
    let increment = self.increment.clamp(HEADER_SIZE, usize::MAX - HEADER_SIZE);
    align!(increment)
  }
}

/// Point-in-time statistics of the free list. Sizes exclude headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocInfo {
  pub free_size: usize,
  pub free_chunks: usize,
  pub largest_free_chunk_size: usize,
  pub smallest_free_chunk_size: usize,
}

impl fmt::Display for AllocInfo {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "{} free bytes in {} chunks (largest {}, smallest {})",
      self.free_size, self.free_chunks, self.largest_free_chunk_size, self.smallest_free_chunk_size
    )
  }
}

/// A free chunk as seen from outside the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeChunk {
  /// Start of the chunk header.
  pub addr: NonNull<u8>,
  /// Total size, header included.
  pub size: usize,
}

impl FreeChunk {
  pub fn payload_size(&self) -> usize {
    self.size - HEADER_SIZE
  }
}

/// A growable heap serving raw allocations from a [`GrowthProvider`].
///
/// Every chunk starts with a header holding its size. Free chunks are kept in
/// an intrusive list searched with the configured [`Strategy`]. When nothing
/// fits, the heap grows by a fixed increment until it reaches its ceiling.
///
/// Pointers handed out are unchecked and caller-managed: the heap does not
/// track them and cannot detect misuse.
pub struct Heap<P: GrowthProvider> {
  provider: P,
  free: FreeList,
  strategy: Strategy,
  ceiling: usize,
  increment: usize,
  grown: usize,
  initial_break: Option<NonNull<u8>>,
}

/// A heap on top of the process program break.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub type BrkHeap = Heap<ProgramBreak>;

impl<P: GrowthProvider> Heap<P> {
  /// Creates a heap with the default [`HeapConfig`].
  ///
  /// The default ceiling is zero, so the heap cannot grow until it is given
  /// a ceiling through [`configure`](Self::configure).
  pub fn new(provider: P) -> Self {
    Self::with_config(provider, HeapConfig::default())
  }

  pub fn with_config(
    provider: P,
    config: HeapConfig,
  ) -> Self {
    Self {
      provider,
      free: FreeList::new(),
      strategy: config.strategy,
      ceiling: config.ceiling,
      increment: config.normalized_increment(),
      grown: 0,
      initial_break: None,
    }
  }

  /// Allocates `size` bytes and returns a pointer to them.
  ///
  /// The memory stays valid until it is passed to
  /// [`deallocate`](Self::deallocate) or the heap is reconfigured. It is not
  /// zeroed, and it is only aligned as far as the chunk it was carved from.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    let required = match size.checked_add(HEADER_SIZE) {
      Some(required) if size > 0 => required,
      _ => return Err(HeapError::InvalidSize { size }),
    };

    self.record_initial_break();

    let chunk = loop {
      if let Some(chunk) = self.strategy.select(&self.free, required) {
        break chunk;
      }
      self.grow()?;
    };

    self.free.remove(chunk);

    if chunk.size() - required > HEADER_SIZE {
      let rest = unsafe { chunk.split(required) };
      trace!(
        "split {:#x}: keep {} bytes, free {} bytes",
        chunk.addr(),
        required,
        rest.size()
      );
      self.free.push_front(rest);
    }

    trace!(
      "allocate({}) -> {:p} [{} bytes, {}]",
      size,
      chunk.payload(),
      chunk.size(),
      self.strategy
    );
    Ok(chunk.payload())
  }

  /// Returns a pointer obtained from [`allocate`](Self::allocate) to the heap.
  ///
  /// A null pointer is ignored.
  ///
  /// # Safety
  ///
  /// `ptr` must come from `allocate` on this heap, must not have been
  /// deallocated already, and must not predate the last reconfiguration.
  /// None of this is checked.
  pub unsafe fn deallocate(
    &mut self,
    ptr: *mut u8,
  ) {
    let Some(payload) = NonNull::new(ptr) else {
      return;
    };

    let chunk = unsafe { Chunk::from_payload(payload) };
    self.free.push_front(chunk);
    let merges = coalesce(&mut self.free, chunk);

    trace!("deallocate({:p}) [{} bytes, {} merges]", payload, chunk.size(), merges);
  }

  /// Switches strategy and ceiling and empties the heap.
  ///
  /// Every pointer handed out before this call becomes invalid: the free list
  /// is dropped and the provider is rewound to the boundary recorded on the
  /// first allocation. The growth increment is kept.
  pub fn configure(
    &mut self,
    strategy: Strategy,
    ceiling: usize,
  ) {
    self.reconfigure(HeapConfig {
      strategy,
      ceiling,
      increment: self.increment,
    });
  }

  /// Like [`configure`](Self::configure), also replacing the increment.
  pub fn reconfigure(
    &mut self,
    config: HeapConfig,
  ) {
    self.strategy = config.strategy;
    self.ceiling = config.ceiling;
    self.increment = config.normalized_increment();

    if log_enabled!(Level::Debug) {
      debug!("dropping {} free chunks", self.free.len());
    }
    self.free.clear();
    self.grown = 0;

    if let Some(boundary) = self.initial_break {
      unsafe { self.provider.reset(boundary) };
    }

    debug!(
      "configured {} heap: ceiling {} bytes, increment {} bytes",
      self.strategy, self.ceiling, self.increment
    );
  }

  /// Walks the free list and summarises it.
  pub fn inspect(&self) -> AllocInfo {
    let mut info = AllocInfo::default();
    if self.free.is_empty() {
      return info;
    }

    for chunk in self.free.iter() {
      let payload = chunk.payload_size();

      info.free_size += payload;
      info.free_chunks += 1;
      info.largest_free_chunk_size = info.largest_free_chunk_size.max(payload);
      info.smallest_free_chunk_size = if info.free_chunks == 1 {
        payload
      } else {
        info.smallest_free_chunk_size.min(payload)
      };
    }

    info
  }

  /// Free chunks in list order, head first.
  pub fn free_chunks(&self) -> impl Iterator<Item = FreeChunk> + '_ {
    self.free.iter().map(|chunk| FreeChunk {
      addr: chunk.as_ptr().cast(),
      size: chunk.size(),
    })
  }

  pub fn strategy(&self) -> Strategy {
    self.strategy
  }

  pub fn ceiling(&self) -> usize {
    self.ceiling
  }

  pub fn increment(&self) -> usize {
    self.increment
  }

  /// Bytes obtained from the provider since the last reconfiguration.
  pub fn grown_size(&self) -> usize {
    self.grown
  }

  /// Provider boundary recorded on the first allocation, if any.
  pub fn initial_break(&self) -> Option<NonNull<u8>> {
    self.initial_break
  }

  pub fn provider(&self) -> &P {
    &self.provider
  }

  fn record_initial_break(&mut self) {
    if self.initial_break.is_some() {
      return;
    }

    self.initial_break = NonNull::new(self.provider.current_break());
    debug!("recorded initial break {:?}", self.initial_break);
  }

  fn grow(&mut self) -> Result<()> {
    let increment = self.increment;

    if self.grown.checked_add(increment).is_none_or(|total| total > self.ceiling) {
      warn!(
        "refusing to grow by {} bytes: {} of {} bytes already in use",
        increment, self.grown, self.ceiling
      );
      return Err(HeapError::OutOfConfiguredSpace {
        grown: self.grown,
        increment,
        ceiling: self.ceiling,
      });
    }

    let Some(start) = self.provider.grow(increment) else {
      warn!("growth provider could not extend the heap by {} bytes", increment);
      return Err(HeapError::GrowthFailed { increment });
    };

    self.grown += increment;
    let chunk = unsafe { Chunk::init(start, increment) };
    self.free.push_front(chunk);
    let merges = coalesce(&mut self.free, chunk);

    debug!(
      "grew heap by {} bytes at {:p} ({} of {} bytes, {} merges)",
      increment, start, self.grown, self.ceiling, merges
    );
    Ok(())
  }
}

impl<P: GrowthProvider> fmt::Debug for Heap<P> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Heap")
      .field("strategy", &self.strategy)
      .field("ceiling", &self.ceiling)
      .field("increment", &self.increment)
      .field("grown", &self.grown)
      .field("initial_break", &self.initial_break)
      .field("free", &self.inspect())
      .finish()
  }
}
