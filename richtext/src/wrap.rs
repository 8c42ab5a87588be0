// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The wrap engine: fragment split and merge, rewrap and unwrap.

use alloc::vec::Vec;
use core::ops::Range;

use smallvec::SmallVec;

use crate::analysis::BreakOpportunity;
use crate::bidi::{self, Direction, Embedding, RunDirection};
use crate::error::{internal_assert, internal_fault, Result};
use crate::fragment::{Fragment, FragmentId};
use crate::location::LocationId;
use crate::metrics::CharacterMetrics;
use crate::model::RichText;
use crate::paragraph::{Paragraph, ParagraphId};
use crate::string::RichString;

/// Which side of a split stays in the original fragment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SplitKind {
    /// Keep the visual head; the tail becomes a new fragment.
    LeftToRight,
    /// Keep the visual tail; the head becomes a new fragment. Right-to-left
    /// lines read from the right, so the tail is the logically earlier part.
    RightToLeft,
}

impl From<Direction> for SplitKind {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::LeftToRight => Self::LeftToRight,
            Direction::RightToLeft => Self::RightToLeft,
        }
    }
}

impl From<SplitKind> for Direction {
    fn from(kind: SplitKind) -> Self {
        match kind {
            SplitKind::LeftToRight => Self::LeftToRight,
            SplitKind::RightToLeft => Self::RightToLeft,
        }
    }
}

/// Where a split may happen.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SplitRule {
    /// Only at a break opportunity.
    AtBreak,
    /// At any position that keeps both halves contiguous in logical order.
    Unconditional,
}

/// How two fragments are joined.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MergeKind {
    /// Join the logically adjacent direction runs when they share a direction.
    Bidi,
    /// Concatenate along the base direction only.
    ///
    /// This gives the same result as [`MergeKind::Bidi`] when the first
    /// fragment logically ends with a character of the base direction.
    Paragraph,
}

/// What a rewrap step did to a fragment.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct WrapStep {
    /// Content from the following fragments was merged in.
    pub toosmall: bool,
    /// The fragment was split.
    pub toobig: bool,
}

/// A piece of a merge result: which fragment it comes from and which
/// visual range of it.
type Piece = (bool, Range<usize>);

impl RichText {
    /// Splits a fragment at visual position `position`.
    ///
    /// `kind` must match the fragment's layout direction: its own direction
    /// when uniform, the base direction when mixed. Returns the new fragment,
    /// which always holds the logically later part and follows the original.
    pub fn split_fragment(
        &mut self,
        fragment: FragmentId,
        position: usize,
        kind: SplitKind,
        rule: SplitRule,
    ) -> Result<FragmentId> {
        self.with_mutation(|m| m.split(fragment, position, kind, rule))
    }

    /// Merges a fragment with the one following it, possibly from the next
    /// paragraph. Returns `false` if there is no following fragment.
    pub fn merge_fragment(&mut self, fragment: FragmentId, kind: MergeKind) -> Result<bool> {
        self.with_mutation(|m| m.merge(fragment, kind))
    }

    pub(crate) fn split(
        &mut self,
        id: FragmentId,
        position: usize,
        kind: SplitKind,
        rule: SplitRule,
    ) -> Result<FragmentId> {
        let base = self.direction;
        let fragment = self
            .fragments
            .get(id)
            .ok_or_else(|| internal_fault!("split of a removed fragment"))?;
        let len = fragment.len();
        internal_assert!(
            position > 0 && position < len,
            "split position {position} outside of a fragment of {len} characters"
        );
        internal_assert!(
            Direction::from(kind) == fragment.layout_direction(base),
            "{kind:?} split of a {:?} fragment",
            fragment.run_direction(base)
        );
        internal_assert!(
            fragment.legal_cuts(base, rule)[position],
            "illegal {rule:?} split at {position}"
        );
        let (keep, split_off) = match kind {
            SplitKind::LeftToRight => (0..position, position..len),
            SplitKind::RightToLeft => (position..len, 0..position),
        };
        let paragraph = fragment.paragraph;
        let mut new_fragment = Fragment::new(
            paragraph,
            fragment.text.slice(split_off.clone()),
            fragment.metrics.slice(split_off.clone()),
            fragment.breaks[split_off.clone()].to_vec(),
        );
        let mut kept_locations = Vec::new();
        let mut moved: Vec<(LocationId, usize)> = Vec::new();
        for &loc in &fragment.locations {
            let Some(location) = self.locations.get(loc) else {
                continue;
            };
            let offset = location.offset;
            if offset >= len {
                moved.push((loc, split_off.len()));
            } else if split_off.contains(&offset) {
                moved.push((loc, offset - split_off.start));
            } else {
                kept_locations.push((loc, offset - keep.start));
            }
        }

        let fonts = &*self.fonts;
        new_fragment.refresh(fonts, base, self.default_font);
        new_fragment.locations = moved.iter().map(|(loc, _)| *loc).collect();
        let starts_paragraph = {
            let order = new_fragment.logical_order(base);
            order
                .first()
                .is_some_and(|&v| new_fragment.breaks[v] == BreakOpportunity::Mandatory)
        };
        let new_id = self.fragments.insert(new_fragment);

        let fragment = &mut self.fragments[id];
        fragment.text = fragment.text.slice(keep.clone());
        fragment.metrics = fragment.metrics.slice(keep.clone());
        fragment.breaks = fragment.breaks[keep].to_vec();
        fragment.locations = kept_locations.iter().map(|(loc, _)| *loc).collect();
        fragment.refresh(fonts, base, self.default_font);

        for (loc, offset) in kept_locations {
            if let Some(location) = self.locations.get_mut(loc) {
                location.offset = offset;
            }
        }
        for (loc, offset) in moved {
            if let Some(location) = self.locations.get_mut(loc) {
                location.fragment = new_id;
                location.offset = offset;
            }
        }

        let index = self
            .fragment_position(id)
            .map(|(_, index)| index)
            .ok_or_else(|| internal_fault!("fragment missing from its paragraph"))?;
        self.paragraphs[paragraph].fragments.insert(index + 1, new_id);
        self.mark_dirty(paragraph);
        if starts_paragraph {
            self.split_paragraph_before(new_id)?;
        }
        log::trace!("split fragment at {position} ({kind:?}, {rule:?})");
        Ok(new_id)
    }

    /// Moves `first` and every later fragment of its paragraph into a new
    /// paragraph following it.
    fn split_paragraph_before(&mut self, first: FragmentId) -> Result<()> {
        let (paragraph, index) = self
            .fragment_position(first)
            .ok_or_else(|| internal_fault!("fragment missing from its paragraph"))?;
        let position = self
            .paragraph_position(paragraph)
            .ok_or_else(|| internal_fault!("paragraph missing from the document"))?;
        let tail = self.paragraphs[paragraph].fragments.split_off(index);
        let new_paragraph = self.paragraphs.insert(Paragraph::new(tail.clone()));
        for id in tail {
            self.fragments[id].paragraph = new_paragraph;
        }
        self.order.insert(position + 1, new_paragraph);
        self.mark_dirty(paragraph);
        self.mark_dirty(new_paragraph);
        Ok(())
    }

    pub(crate) fn merge(&mut self, id: FragmentId, kind: MergeKind) -> Result<bool> {
        let Some(next) = self.next_fragment(id) else {
            return Ok(false);
        };
        let base = self.direction;
        let f = self
            .fragments
            .get(id)
            .ok_or_else(|| internal_fault!("merge of a removed fragment"))?;
        let g = &self.fragments[next];
        // `true` pieces come from the left fragment.
        let (left, right) = match base {
            Direction::LeftToRight => (f, g),
            Direction::RightToLeft => (g, f),
        };
        let swap = match kind {
            MergeKind::Paragraph => None,
            MergeKind::Bidi => {
                let left_runs = bidi::runs(&left.rtl_flags());
                let right_runs = bidi::runs(&right.rtl_flags());
                match (left_runs.last(), right_runs.first()) {
                    (Some(a), Some(b)) if a.direction != base && b.direction != base => {
                        Some((a.range.start, b.range.end))
                    }
                    _ => None,
                }
            }
        };
        let pieces: SmallVec<[Piece; 4]> = match swap {
            Some((a, b)) => [
                (true, 0..a),
                (false, 0..b),
                (true, a..left.len()),
                (false, b..right.len()),
            ]
            .into_iter()
            .filter(|(_, r)| !r.is_empty())
            .collect(),
            None => [(true, 0..left.len()), (false, 0..right.len())]
                .into_iter()
                .filter(|(_, r)| !r.is_empty())
                .collect(),
        };

        let fonts = &*self.fonts;
        let mut text = RichString::default();
        let mut metrics = CharacterMetrics::default();
        let mut breaks = Vec::with_capacity(left.len() + right.len());
        let mut left_map = alloc::vec![0; left.len()];
        let mut right_map = alloc::vec![0; right.len()];
        for (from_left, range) in pieces {
            let (source, map) = if from_left {
                (left, &mut left_map)
            } else {
                (right, &mut right_map)
            };
            let piece_text = source.text.slice(range.clone());
            metrics.append(
                fonts,
                &text,
                &source.metrics.slice(range.clone()),
                &piece_text,
            );
            text.append(&piece_text);
            breaks.extend_from_slice(&source.breaks[range.clone()]);
            let start = breaks.len() - range.len();
            for (i, v) in range.enumerate() {
                map[v] = start + i;
            }
        }
        let merged_len = text.len();
        let (f_map, g_map) = match base {
            Direction::LeftToRight => (left_map, right_map),
            Direction::RightToLeft => (right_map, left_map),
        };
        let relocate = |map: &[usize], offset: usize| map.get(offset).copied().unwrap_or(merged_len);
        let mut relocated: Vec<(LocationId, usize)> = Vec::new();
        for &loc in &f.locations {
            if let Some(location) = self.locations.get(loc) {
                relocated.push((loc, relocate(&f_map, location.offset)));
            }
        }
        for &loc in &g.locations {
            if let Some(location) = self.locations.get(loc) {
                relocated.push((loc, relocate(&g_map, location.offset)));
            }
        }

        let g_paragraph = g.paragraph;
        let f_paragraph = f.paragraph;
        self.fragments.remove(next);
        self.paragraphs[g_paragraph].fragments.retain(|&x| x != next);
        let fragment = &mut self.fragments[id];
        fragment.text = text;
        fragment.metrics = metrics;
        fragment.breaks = breaks;
        fragment.locations = relocated.iter().map(|(loc, _)| *loc).collect();
        fragment.refresh(fonts, base, self.default_font);
        for (loc, offset) in relocated {
            if let Some(location) = self.locations.get_mut(loc) {
                location.fragment = id;
                location.offset = offset;
            }
        }

        if g_paragraph != f_paragraph {
            let rest = core::mem::take(&mut self.paragraphs[g_paragraph].fragments);
            for &moved in &rest {
                self.fragments[moved].paragraph = f_paragraph;
            }
            self.paragraphs[f_paragraph].fragments.extend(rest);
            self.drop_paragraph(g_paragraph);
        }
        self.mark_dirty(f_paragraph);
        log::trace!("merged fragments ({kind:?}) into {merged_len} characters");
        Ok(true)
    }

    /// The merge kind that joins `fragment` to its successor exactly.
    pub(crate) fn junction_merge_kind(&self, fragment: FragmentId) -> MergeKind {
        match self.fragments.get(fragment) {
            Some(f) if f.ends_at_base_level(self.direction) => MergeKind::Paragraph,
            _ => MergeKind::Bidi,
        }
    }

    /// Rewraps the text to `width` pixels. `0` unwraps it.
    ///
    /// Returns `false` if the text is already wrapped to `width`.
    pub fn rewrap(&mut self, width: u32) -> Result<bool> {
        if width == self.word_wrap_width {
            return Ok(false);
        }
        if width == 0 {
            return self.unwrap();
        }
        log::debug!("rewrap from {} to {width}", self.word_wrap_width);
        self.word_wrap_width = width;
        self.with_mutation(|m| {
            for paragraph in m.order.clone() {
                m.rewrap_paragraph(paragraph)?;
            }
            Ok(true)
        })
    }

    /// Removes all wrapping: every paragraph becomes a single fragment.
    ///
    /// Returns `false` if nothing changed.
    pub fn unwrap(&mut self) -> Result<bool> {
        let was_wrapped = self.word_wrap_width != 0;
        self.word_wrap_width = 0;
        log::debug!("unwrap");
        let merged = self.with_mutation(|m| {
            let mut changed = false;
            for paragraph in m.order.clone() {
                changed |= m.unwrap_paragraph(paragraph)?;
            }
            Ok(changed)
        })?;
        Ok(merged || was_wrapped)
    }

    /// Merges every fragment of a paragraph into one.
    pub(crate) fn unwrap_paragraph(&mut self, paragraph: ParagraphId) -> Result<bool> {
        let base = self.direction;
        let mut changed = false;
        // Uniform opposite-direction neighbours first.
        let mut i = 0;
        while let Some(&id) = self.paragraphs[paragraph].fragments.get(i) {
            if let Some(&next) = self.paragraphs[paragraph].fragments.get(i + 1) {
                let a = self.fragments[id].run_direction(base);
                let b = self.fragments[next].run_direction(base);
                if a == b && a.is_opposite_of(base) {
                    self.merge(id, MergeKind::Bidi)?;
                    changed = true;
                    continue;
                }
            }
            i += 1;
        }
        while self.paragraphs[paragraph].fragments.len() > 1 {
            let first = self.paragraphs[paragraph].fragments[0];
            let kind = self.junction_merge_kind(first);
            self.merge(first, kind)?;
            changed = true;
        }
        Ok(changed)
    }

    pub(crate) fn rewrap_paragraph(&mut self, paragraph: ParagraphId) -> Result<()> {
        if self.word_wrap_width == 0 {
            return Ok(());
        }
        let mut i = 0;
        while let Some(&id) = self.paragraphs[paragraph].fragments.get(i) {
            self.rewrap_fragment(id)?;
            i += 1;
        }
        Ok(())
    }

    /// Fits one fragment to the wrap width: absorbs following fragments of
    /// the paragraph while their first unbreakable piece fits, then splits
    /// while the fragment is too wide.
    pub(crate) fn rewrap_fragment(&mut self, id: FragmentId) -> Result<WrapStep> {
        let target = self.word_wrap_width;
        let mut step = WrapStep::default();
        while let Some(next) = self.next_in_paragraph(id) {
            let extra = self.compute_initial_width_for_bidi(id, next);
            if self.fragments[id].width.saturating_add(extra) > target {
                break;
            }
            self.merge(id, MergeKind::Bidi)?;
            step.toosmall = true;
        }
        while self.fragments[id].width > target {
            let Some(position) = self.find_split(id, target) else {
                break;
            };
            let kind = SplitKind::from(self.fragments[id].layout_direction(self.direction));
            self.split(id, position, kind, SplitRule::AtBreak)?;
            step.toobig = true;
        }
        if step != WrapStep::default() {
            log::trace!("rewrapped fragment: {step:?}");
        }
        Ok(step)
    }

    /// The width `next` adds to `fragment` when merged, up to the first
    /// place where the merged fragment could be broken again.
    pub(crate) fn compute_initial_width_for_bidi(&self, fragment: FragmentId, next: FragmentId) -> u32 {
        let base = self.direction;
        let (Some(f), Some(g)) = (self.fragments.get(fragment), self.fragments.get(next)) else {
            return 0;
        };
        let f_runs = f.run_direction(base);
        let g_runs = g.run_direction(base);
        let merged_uniform = f_runs == g_runs && f_runs != RunDirection::Mixed;
        let order = g.logical_order(base);
        let visual = g.embeddings();
        let logical: Vec<Embedding> = order.iter().map(|&v| visual[v]).collect();
        let cut = (1..g.len()).find(|&c| {
            let (before, after) = (logical[c - 1], logical[c]);
            g.breaks[order[c]].is_break()
                && !(before.nested && after.nested)
                && (merged_uniform
                    || before.rtl != after.rtl
                    || Direction::from_rtl(after.rtl) == base)
        });
        match cut {
            None => g.width,
            Some(c) => match g.layout_direction(base) {
                Direction::LeftToRight => g.metrics.range_width(0..c),
                Direction::RightToLeft => g.metrics.range_width(g.len() - c..g.len()),
            },
        }
    }

    /// Chooses the split position for a fragment wider than `target`.
    ///
    /// The largest fitting piece is found with a binary search over the
    /// cumulative widths, measured from the visual side that is logically
    /// first, then narrowed to the nearest legal break. When nothing fits the
    /// first legal break past the limit is used.
    fn find_split(&self, id: FragmentId, target: u32) -> Option<usize> {
        let base = self.direction;
        let f = self.fragments.get(id)?;
        let len = f.len();
        if len < 2 {
            return None;
        }
        let legal = f.legal_cuts(base, SplitRule::AtBreak);
        match f.layout_direction(base) {
            Direction::LeftToRight => {
                let prefix = f.metrics.prefix_widths();
                let limit = prefix.partition_point(|&w| w <= target).saturating_sub(1);
                (1..=limit.min(len - 1))
                    .rev()
                    .find(|&v| legal[v])
                    .or_else(|| (limit + 1..len).find(|&v| legal[v]))
            }
            Direction::RightToLeft => {
                let suffix = f.metrics.suffix_widths();
                let limit = suffix.partition_point(|&w| w > target);
                (limit.max(1)..len)
                    .find(|&v| legal[v])
                    .or_else(|| (1..limit.min(len)).rev().find(|&v| legal[v]))
            }
        }
    }
}
