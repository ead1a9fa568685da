#![allow(dead_code)]

use std::ptr::NonNull;

use fitalloc::{FixedRegion, GrowthProvider, Heap, HeapConfig, Strategy};

pub const REGION_SIZE: usize = 1024 * 1024;

/// Wraps a provider and counts the calls made into it.
#[derive(Debug)]
pub struct Counting<P> {
  pub inner: P,
  pub grows: usize,
  pub resets: usize,
}

impl<P> Counting<P> {
  pub fn new(inner: P) -> Self {
    Self {
      inner,
      grows: 0,
      resets: 0,
    }
  }
}

impl<P: GrowthProvider> GrowthProvider for Counting<P> {
  fn current_break(&mut self) -> *mut u8 {
    self.inner.current_break()
  }

  fn grow(
    &mut self,
    increment: usize,
  ) -> Option<NonNull<u8>> {
    self.grows += 1;
    self.inner.grow(increment)
  }

  unsafe fn reset(
    &mut self,
    boundary: NonNull<u8>,
  ) {
    self.resets += 1;
    unsafe { self.inner.reset(boundary) }
  }
}

pub type TestHeap = Heap<Counting<FixedRegion>>;

pub fn heap(
  strategy: Strategy,
  ceiling: usize,
) -> TestHeap {
  heap_in(REGION_SIZE, strategy, ceiling)
}

pub fn heap_in(
  capacity: usize,
  strategy: Strategy,
  ceiling: usize,
) -> TestHeap {
  Heap::with_config(
    Counting::new(FixedRegion::new(capacity)),
    HeapConfig::new().with_strategy(strategy).with_ceiling(ceiling),
  )
}

/// Allocates the single free chunk left in the heap, leaving the list empty.
pub fn drain(heap: &mut TestHeap) -> NonNull<u8> {
  let info = heap.inspect();
  assert_eq!(info.free_chunks, 1, "expected a single tail chunk");
  let ptr = heap.allocate(info.largest_free_chunk_size).unwrap();
  assert_eq!(heap.inspect().free_chunks, 0);
  ptr
}

pub unsafe fn fill(
  ptr: NonNull<u8>,
  len: usize,
  byte: u8,
) {
  unsafe { ptr.as_ptr().write_bytes(byte, len) }
}

pub unsafe fn holds(
  ptr: NonNull<u8>,
  len: usize,
  byte: u8,
) -> bool {
  unsafe { std::slice::from_raw_parts(ptr.as_ptr(), len) }
    .iter()
    .all(|b| *b == byte)
}
