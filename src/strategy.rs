use std::{fmt, str::FromStr};

use crate::{chunk::Chunk, registry::FreeList};

/// Placement strategy used to pick a free chunk for a request.
///
/// A chunk is admissible when its size, header included, is at least the
/// required size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
  /// First admissible chunk in list order.
  #[default]
  FirstFit,
  /// Smallest admissible chunk; the earliest one wins ties.
  BestFit,
  /// Largest admissible chunk; the earliest one wins ties.
  WorstFit,
}

impl Strategy {
  pub const ALL: [Strategy; 3] = [Strategy::FirstFit, Strategy::BestFit, Strategy::WorstFit];

  pub const fn as_str(&self) -> &'static str {
    match self {
      Strategy::FirstFit => "first-fit",
      Strategy::BestFit => "best-fit",
      Strategy::WorstFit => "worst-fit",
    }
  }

  pub(crate) fn select(
    &self,
    list: &FreeList,
    required: usize,
  ) -> Option<Chunk> {
    match self {
      Strategy::FirstFit => first_fit(list, required),
      Strategy::BestFit => best_fit(list, required),
      Strategy::WorstFit => worst_fit(list, required),
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown placement strategy `{0}` (expected first-fit, best-fit or worst-fit)")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
  type Err = ParseStrategyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().replace('_', "-").as_str() {
      "first-fit" | "firstfit" | "first" => Ok(Strategy::FirstFit),
      "best-fit" | "bestfit" | "best" => Ok(Strategy::BestFit),
      "worst-fit" | "worstfit" | "worst" => Ok(Strategy::WorstFit),
      _ => Err(ParseStrategyError(s.to_owned())),
    }
  }
}

pub(crate) fn first_fit(
  list: &FreeList,
  required: usize,
) -> Option<Chunk> {
  list.iter().find(|chunk| chunk.size() >= required)
}

pub(crate) fn best_fit(
  list: &FreeList,
  required: usize,
) -> Option<Chunk> {
  let mut best: Option<Chunk> = None;

  for chunk in list.iter() {
    if chunk.size() < required {
      continue;
    }
    if best.is_none_or(|best| chunk.size() < best.size()) {
      best = Some(chunk);
    }
  }

  best
}

pub(crate) fn worst_fit(
  list: &FreeList,
  required: usize,
) -> Option<Chunk> {
  let mut worst: Option<Chunk> = None;

  for chunk in list.iter() {
    if chunk.size() < required {
      continue;
    }
    if worst.is_none_or(|worst| chunk.size() > worst.size()) {
      worst = Some(chunk);
    }
  }

  worst
}
