// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direction runs and the reordering used by fragments.
//!
//! Every character carries a resolved direction. A line is displayed by
//! laying out maximal runs of equal direction along the paragraph's base
//! direction and reversing the characters of right-to-left runs. Blocks
//! nested inside a run of the opposite direction keep the base direction, so
//! they are flipped back after their run is reversed. The same traversal maps
//! visual order back to logical order, which is why a single [`reorder`]
//! serves both directions.

use alloc::vec::Vec;
use core::ops::Range;

use smallvec::SmallVec;

use crate::string::TextMeta;

/// A resolved text direction.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    /// Left-to-right.
    #[default]
    LeftToRight,
    /// Right-to-left.
    RightToLeft,
}

impl Direction {
    /// Returns the direction for a character's `rtl` flag.
    pub fn from_rtl(rtl: bool) -> Self {
        if rtl {
            Self::RightToLeft
        } else {
            Self::LeftToRight
        }
    }

    /// Returns `true` for [`Direction::RightToLeft`].
    pub fn is_rtl(self) -> bool {
        self == Self::RightToLeft
    }

    /// The other direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::LeftToRight => Self::RightToLeft,
            Self::RightToLeft => Self::LeftToRight,
        }
    }
}

/// Where a character sits in the reordering.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Embedding {
    /// The character belongs to a right-to-left run.
    pub(crate) rtl: bool,
    /// The character flows in the base direction inside an opposite run.
    pub(crate) nested: bool,
}

impl Embedding {
    pub(crate) const RTL: Self = Self {
        rtl: true,
        nested: false,
    };

    pub(crate) fn of(meta: &TextMeta) -> Self {
        Self {
            rtl: meta.rtl,
            nested: meta.nested,
        }
    }

    /// The run direction for a character of direction `direction`.
    pub(crate) fn run(direction: Direction) -> Self {
        Self {
            rtl: direction.is_rtl(),
            nested: false,
        }
    }

    /// The direction the character itself is read in.
    pub(crate) fn flow(self, base: Direction) -> Direction {
        if self.nested {
            base
        } else {
            Direction::from_rtl(self.rtl)
        }
    }

    #[must_use]
    pub(crate) fn nested(self) -> Self {
        Self {
            nested: true,
            ..self
        }
    }
}

/// The direction content of a fragment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum RunDirection {
    /// Every character is left-to-right.
    LeftToRight,
    /// Every character is right-to-left.
    RightToLeft,
    /// Both directions occur.
    Mixed,
}

impl RunDirection {
    /// Classifies a sequence of direction flags. Empty content takes `base`.
    pub fn of(rtl: &[bool], base: Direction) -> Self {
        match (rtl.iter().any(|r| *r), rtl.iter().any(|r| !*r)) {
            (true, true) => Self::Mixed,
            (true, false) => Self::RightToLeft,
            (false, true) => Self::LeftToRight,
            (false, false) => Self::from(base),
        }
    }

    /// The direction in which a fragment with this content is split and merged.
    ///
    /// Uniform content follows its own direction; mixed content follows the base.
    pub fn layout_direction(self, base: Direction) -> Direction {
        match self {
            Self::LeftToRight => Direction::LeftToRight,
            Self::RightToLeft => Direction::RightToLeft,
            Self::Mixed => base,
        }
    }

    /// Returns `true` if every character runs opposite to `base`.
    pub fn is_opposite_of(self, base: Direction) -> bool {
        self == Self::from(base.opposite())
    }
}

impl From<Direction> for RunDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::LeftToRight => Self::LeftToRight,
            Direction::RightToLeft => Self::RightToLeft,
        }
    }
}

/// A maximal run of characters sharing a direction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct Run {
    pub(crate) range: Range<usize>,
    pub(crate) direction: Direction,
}

pub(crate) type Runs = SmallVec<[Run; 4]>;

/// Splits direction flags into maximal runs.
pub(crate) fn runs(rtl: &[bool]) -> Runs {
    let mut out = Runs::new();
    let mut start = 0;
    for i in 1..=rtl.len() {
        if i == rtl.len() || rtl[i] != rtl[start] {
            out.push(Run {
                range: start..i,
                direction: Direction::from_rtl(rtl[start]),
            });
            start = i;
        }
    }
    out
}

/// Reorders a line.
///
/// Given the embeddings of a line in one order, returns the indices of that
/// line in the other order: applied to logical embeddings it yields, for each
/// visual position, the logical index shown there; applied to visual
/// embeddings it yields, for each logical position, the visual index holding it.
pub(crate) fn reorder(embeddings: &[Embedding], base: Direction) -> Vec<usize> {
    let rtl: Vec<bool> = embeddings.iter().map(|e| e.rtl).collect();
    let runs = runs(&rtl);
    let mut out = Vec::with_capacity(rtl.len());
    let mut push = |run: &Run| match run.direction {
        Direction::LeftToRight => out.extend(run.range.clone()),
        Direction::RightToLeft => out.extend(run.range.clone().rev()),
    };
    match base {
        Direction::LeftToRight => runs.iter().for_each(&mut push),
        Direction::RightToLeft => runs.iter().rev().for_each(&mut push),
    }
    // A nested block lies within one opposite run, so it is a contiguous
    // stretch of the output.
    let mut start = 0;
    while start < out.len() {
        if !embeddings[out[start]].nested {
            start += 1;
            continue;
        }
        let mut end = start + 1;
        while end < out.len() && embeddings[out[end]].nested {
            end += 1;
        }
        out[start..end].reverse();
        start = end;
    }
    out
}

/// For a line stored in visual order, the visual index of each logical character.
pub(crate) fn logical_order(visual: &[Embedding], base: Direction) -> Vec<usize> {
    reorder(visual, base)
}

/// For a line given in logical order, the logical index shown at each visual position.
pub(crate) fn visual_order(logical: &[Embedding], base: Direction) -> Vec<usize> {
    reorder(logical, base)
}

/// Inverts a permutation.
pub(crate) fn invert(order: &[usize]) -> Vec<usize> {
    let mut out = alloc::vec![0; order.len()];
    for (i, &j) in order.iter().enumerate() {
        out[j] = i;
    }
    out
}

/// Returns `true` if cutting a visual line at `v` separates a logical prefix from
/// a logical suffix.
///
/// No line can be cut inside a nested block. Mixed lines can also not be cut
/// strictly inside a run that goes against the base direction.
pub(crate) fn is_structural_cut(visual: &[Embedding], base: Direction, v: usize) -> bool {
    if v == 0 || v >= visual.len() {
        return false;
    }
    let (before, after) = (visual[v - 1], visual[v]);
    if before.nested && after.nested {
        return false;
    }
    let rtl: Vec<bool> = visual.iter().map(|e| e.rtl).collect();
    match RunDirection::of(&rtl, base) {
        RunDirection::LeftToRight | RunDirection::RightToLeft => true,
        RunDirection::Mixed => before.rtl != after.rtl || Direction::from_rtl(after.rtl) == base,
    }
}

/// Converts a logical cut (number of logically leading characters) into the
/// visual split position for a line of `len` characters laid out in `direction`.
pub(crate) fn logical_cut_to_visual(len: usize, direction: Direction, cut: usize) -> usize {
    match direction {
        Direction::LeftToRight => cut,
        Direction::RightToLeft => len - cut,
    }
}
