//! # fitalloc - A Free-List Heap Allocator
//!
//! This crate provides a user-space heap that manages one growable memory
//! region and serves raw allocations from it with a selectable placement
//! strategy: **first-fit**, **best-fit** or **worst-fit**.
//!
//! ## Overview
//!
//! ```text
//!   Managed Region:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                                                                      │
//!   │   ┌──────┬──────┬─────────┬──────┬──────────────┬────────────────┐   │
//!   │   │  A1  │ free │   A2    │  A3  │     free     │      free      │   │
//!   │   └──────┴──┬───┴─────────┴──────┴──────┬───────┴───────┬────────┘   │
//!   │             │                           │               ▲        ▲   │
//!   │             └──────── free list ────────┘               │        │   │
//!   │                                                     last growth  │   │
//!   │                                                               break  │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   allocate:   strategy picks a free chunk ─► miss? grow by one increment
//!               ─► split the winner if the leftover can hold a header
//!   deallocate: push the chunk on the free list ─► merge address neighbours
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   fitalloc
//!   ├── align      - Rounding macro (align!)
//!   ├── chunk      - Chunk header layout and access (internal)
//!   ├── registry   - Intrusive free list (internal)
//!   ├── strategy   - First/best/worst-fit selection
//!   ├── coalesce   - Merging of adjacent free chunks (internal)
//!   ├── provider   - GrowthProvider trait, ProgramBreak, FixedRegion
//!   ├── heap       - Heap, HeapConfig, AllocInfo
//!   └── error      - HeapError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitalloc::{FixedRegion, Heap, Strategy};
//!
//! let mut heap = Heap::new(FixedRegion::new(64 * 1024));
//! heap.configure(Strategy::BestFit, 16 * 1024);
//!
//! let ptr = heap.allocate(64).unwrap();
//! unsafe {
//!     ptr.as_ptr().write_bytes(0xAB, 64);
//!     heap.deallocate(ptr.as_ptr());
//! }
//!
//! let info = heap.inspect();
//! assert_eq!(info.free_chunks, 1);
//! ```
//!
//! ## How It Works
//!
//! Every chunk, free or allocated, starts with a header:
//!
//! ```text
//!   Single Chunk:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Chunk Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: u64       │  │  ┌──────────────────────────┐  │
//!   │  │ link: next free │  │  │                          │  │
//!   │  └─────────────────┘  │  │  size - HEADER_SIZE      │  │
//!   │      HEADER_SIZE      │  │  bytes usable            │  │
//!   │                       │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! `size` covers the header too. `link` threads free chunks into a list and
//! is ignored while the chunk is allocated.
//!
//! A chunk is split when the part left over after the request is larger than
//! one header; otherwise the caller gets the whole chunk. After every
//! deallocation and every growth step, the inserted chunk is merged with the
//! free chunks directly below and above it, so no two free chunks ever touch.
//!
//! The region itself comes from a [`GrowthProvider`]. On Linux
//! [`ProgramBreak`] grows the data segment with `sbrk(2)`; [`FixedRegion`]
//! carves from a buffer reserved up front.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: `Heap` is neither `Send` nor `Sync`
//! - **No alignment guarantees**: payloads are only as aligned as the chunk
//!   they were carved from
//! - **Unchecked pointers**: double frees and foreign pointers are not detected
//! - **Destructive reconfiguration**: [`Heap::configure`] invalidates every
//!   outstanding pointer
//!
//! ## Safety
//!
//! Allocation is safe; using the returned memory and handing it back with
//! [`Heap::deallocate`] require `unsafe` blocks.

pub mod align;
mod chunk;
mod coalesce;
mod error;
mod heap;
mod provider;
mod registry;
mod strategy;

pub use chunk::{HEADER_ALIGN, HEADER_SIZE, Header};
pub use error::{HeapError, Result};
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use heap::BrkHeap;
pub use heap::{AllocInfo, DEFAULT_INCREMENT, FreeChunk, Heap, HeapConfig};
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use provider::ProgramBreak;
pub use provider::{FixedRegion, GrowthProvider};
pub use strategy::{ParseStrategyError, Strategy};
