use crate::chunk::Chunk;

/// Singly-linked list of free chunks threaded through their own headers.
///
/// New chunks go in at the head. The list is not sorted by size or address.
#[derive(Debug, Default)]
pub(crate) struct FreeList {
  head: Option<Chunk>,
}

impl FreeList {
  pub const fn new() -> Self {
    Self { head: None }
  }

  pub fn head(&self) -> Option<Chunk> {
    self.head
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_none()
  }

  pub fn len(&self) -> usize {
    self.iter().count()
  }

  /// Links `chunk` in front of the current head.
  ///
  /// The list takes ownership of the chunk's `link` field. The chunk must not
  /// already be a member.
  pub fn push_front(
    &mut self,
    chunk: Chunk,
  ) {
    chunk.set_link(self.head);
    self.head = Some(chunk);
  }

  /// Unlinks `chunk` by identity. Returns `false` if it was not a member.
  pub fn remove(
    &mut self,
    chunk: Chunk,
  ) -> bool {
    let mut prev: Option<Chunk> = None;
    let mut current = self.head;

    while let Some(node) = current {
      if node == chunk {
        match prev {
          None => self.head = node.link(),
          Some(prev) => prev.set_link(node.link()),
        }
        return true;
      }
      prev = Some(node);
      current = node.link();
    }

    false
  }

  /// Forgets every member without touching their memory.
  pub fn clear(&mut self) {
    self.head = None;
  }

  pub fn iter(&self) -> Iter<'_> {
    Iter {
      next: self.head(),
      _list: self,
    }
  }
}

pub(crate) struct Iter<'a> {
  next: Option<Chunk>,
  _list: &'a FreeList,
}

impl Iterator for Iter<'_> {
  type Item = Chunk;

  fn next(&mut self) -> Option<Chunk> {
    let current = self.next?;
    self.next = current.link();
    Some(current)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use std::ptr::NonNull;

  use super::*;

  /// Header-aligned scratch memory for building chunks by hand.
  #[repr(align(16))]
  pub(crate) struct MemPool<const N: usize>(pub [u8; N]);

  impl<const N: usize> MemPool<N> {
    pub fn new() -> Box<Self> {
      Box::new(Self([0; N]))
    }

    /// Writes a chunk of `size` bytes `offset` bytes into the pool.
    pub fn chunk(
      &mut self,
      offset: usize,
      size: usize,
    ) -> Chunk {
      assert!(offset + size <= N);
      let at = NonNull::new(self.0.as_mut_ptr()).unwrap();
      unsafe { Chunk::init(at.add(offset), size) }
    }
  }

  fn sizes(list: &FreeList) -> Vec<usize> {
    list.iter().map(Chunk::size).collect()
  }

  #[test]
  fn test_push_front_order() {
    let mut pool = MemPool::<1024>::new();
    let mut list = FreeList::new();
    assert!(list.is_empty());
    assert_eq!(list.head(), None);

    list.push_front(pool.chunk(0, 100));
    list.push_front(pool.chunk(200, 50));
    list.push_front(pool.chunk(400, 75));

    assert_eq!(sizes(&list), vec![75, 50, 100]);
    assert_eq!(list.len(), 3);
    assert!(!list.is_empty());
    assert_eq!(list.head().map(Chunk::size), Some(75));
  }

  #[test]
  fn test_remove() {
    let mut pool = MemPool::<1024>::new();
    let mut list = FreeList::new();
    let a = pool.chunk(0, 100);
    let b = pool.chunk(200, 50);
    let c = pool.chunk(400, 75);
    list.push_front(a);
    list.push_front(b);
    list.push_front(c);

    assert!(list.remove(b));
    assert_eq!(sizes(&list), vec![75, 100]);

    assert!(list.remove(c));
    assert_eq!(sizes(&list), vec![100]);

    assert!(!list.remove(b));

    assert!(list.remove(a));
    assert!(list.is_empty());
  }

  #[test]
  fn test_clear() {
    let mut pool = MemPool::<1024>::new();
    let mut list = FreeList::new();
    list.push_front(pool.chunk(0, 100));
    list.push_front(pool.chunk(200, 50));

    list.clear();

    assert!(list.is_empty());
    assert_eq!(list.iter().count(), 0);
  }
}
