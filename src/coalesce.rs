use crate::{chunk::Chunk, registry::FreeList};

/// Merges a freshly inserted chunk with its free address neighbours.
///
/// Every other member is already merged, so only `chunk` can touch another
/// free chunk: at most one ending where it starts and one starting where it
/// ends. Both are found in a single walk of the list. The lower chunk absorbs
/// the upper one and keeps its place in the list.
///
/// Returns the number of merges performed, at most two.
pub(crate) fn coalesce(
  list: &mut FreeList,
  chunk: Chunk,
) -> usize {
  let mut lower: Option<Chunk> = None;
  let mut upper: Option<Chunk> = None;

  for other in list.iter() {
    if other.end() == chunk.addr() {
      lower = Some(other);
    } else if chunk.end() == other.addr() {
      upper = Some(other);
    }
  }

  let mut merged = chunk;
  let mut merges = 0;

  if let Some(lower) = lower {
    list.remove(merged);
    lower.set_size(lower.size() + merged.size());
    merged = lower;
    merges += 1;
  }

  if let Some(upper) = upper {
    list.remove(upper);
    merged.set_size(merged.size() + upper.size());
    merges += 1;
  }

  merges
}
