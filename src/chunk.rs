use std::{
  mem,
  ptr::{self, NonNull},
};

use static_assertions::const_assert;

/// Metadata stored in the leading bytes of every chunk, free or allocated.
///
/// `size` counts the whole chunk, header included. `link` is only meaningful
/// while the chunk sits in the free list.
#[repr(C)]
pub struct Header {
  pub size: u64,
  pub link: Option<NonNull<Header>>,
}

/// Bytes taken by a [`Header`] in front of every payload.
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// Natural alignment of a [`Header`].
pub const HEADER_ALIGN: usize = mem::align_of::<Header>();

const_assert!(HEADER_SIZE % HEADER_ALIGN == 0);
const_assert!(HEADER_SIZE >= mem::size_of::<u64>() + mem::size_of::<usize>());

/// Handle to a header living somewhere in managed memory.
///
/// Splitting carves chunks at unrounded offsets, so a chunk may start at any
/// address. Every field access goes through unaligned reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Chunk(NonNull<Header>);

impl Chunk {
  /// Writes a fresh, unlinked header of `size` bytes at `at`.
  ///
  /// # Safety
  ///
  /// `at..at + size` must be writable memory owned by the heap and
  /// `size >= HEADER_SIZE`.
  pub unsafe fn init(
    at: NonNull<u8>,
    size: usize,
  ) -> Self {
    debug_assert!(size >= HEADER_SIZE);

    let header = at.cast::<Header>();
    unsafe {
      header.as_ptr().write_unaligned(Header {
        size: size as u64,
        link: None,
      });
    }
    Self(header)
  }

  /// Recovers the chunk owning a payload pointer handed out by the heap.
  ///
  /// # Safety
  ///
  /// `payload` must have been produced by [`Chunk::payload`] on a live chunk.
  pub unsafe fn from_payload(payload: NonNull<u8>) -> Self {
    Self(unsafe { payload.sub(HEADER_SIZE) }.cast())
  }

  pub fn as_ptr(self) -> NonNull<Header> {
    self.0
  }

  pub fn size(self) -> usize {
    unsafe { ptr::addr_of!((*self.0.as_ptr()).size).read_unaligned() as usize }
  }

  pub fn set_size(
    self,
    size: usize,
  ) {
    unsafe { ptr::addr_of_mut!((*self.0.as_ptr()).size).write_unaligned(size as u64) }
  }

  pub fn link(self) -> Option<Chunk> {
    unsafe { ptr::addr_of!((*self.0.as_ptr()).link).read_unaligned() }.map(Chunk)
  }

  pub fn set_link(
    self,
    link: Option<Chunk>,
  ) {
    unsafe { ptr::addr_of_mut!((*self.0.as_ptr()).link).write_unaligned(link.map(Chunk::as_ptr)) }
  }

  /// Usable bytes after the header.
  pub fn payload_size(self) -> usize {
    self.size() - HEADER_SIZE
  }

  pub fn payload(self) -> NonNull<u8> {
    unsafe { self.0.cast::<u8>().add(HEADER_SIZE) }
  }

  pub fn addr(self) -> usize {
    self.0.as_ptr().addr()
  }

  /// First address past the chunk.
  pub fn end(self) -> usize {
    self.addr() + self.size()
  }

  /// Shrinks this chunk to `at` bytes and turns the tail into its own chunk.
  ///
  /// # Safety
  ///
  /// `HEADER_SIZE <= at` and `at + HEADER_SIZE <= self.size()`.
  pub unsafe fn split(
    self,
    at: usize,
  ) -> Chunk {
    let size = self.size();
    debug_assert!(at >= HEADER_SIZE && at + HEADER_SIZE <= size);

    let tail = unsafe { Chunk::init(self.0.cast::<u8>().add(at), size - at) };
    self.set_size(at);
    tail
  }
}
