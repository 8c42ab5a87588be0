// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single wrapped line of a paragraph.

use alloc::vec::Vec;

use crate::analysis::{is_mandatory_break, BreakOpportunity};
use crate::bidi::{self, Direction, Embedding, RunDirection};
use crate::font::{FontId, FontMetrics};
use crate::location::LocationId;
use crate::metrics::CharacterMetrics;
use crate::paragraph::ParagraphId;
use crate::string::RichString;
use crate::wrap::SplitRule;

slotmap::new_key_type! {
    /// Handle to one line fragment of a [`RichText`](crate::RichText).
    ///
    /// Handles stay valid while the fragment exists; a merge retires the
    /// handle of the fragment it consumes.
    pub struct FragmentId;
}

/// One visual line.
///
/// `text`, `metrics` and `breaks` are parallel and in visual order. The
/// logical order is recovered with [`Fragment::logical_order`].
#[derive(Clone, Debug)]
pub(crate) struct Fragment {
    pub(crate) paragraph: ParagraphId,
    /// Position within the paragraph.
    pub(crate) index: usize,
    /// Logical offset of the first character within the paragraph.
    pub(crate) first_char: usize,
    /// Top edge relative to the paragraph.
    pub(crate) y: u32,
    pub(crate) text: RichString,
    pub(crate) metrics: CharacterMetrics,
    pub(crate) breaks: Vec<BreakOpportunity>,
    /// Locations anchored to this fragment.
    pub(crate) locations: Vec<LocationId>,
    pub(crate) width: u32,
    pub(crate) minimum_width: u32,
    pub(crate) above_baseline: u32,
    pub(crate) below_baseline: u32,
}

impl Fragment {
    pub(crate) fn new(
        paragraph: ParagraphId,
        text: RichString,
        metrics: CharacterMetrics,
        breaks: Vec<BreakOpportunity>,
    ) -> Self {
        Self {
            paragraph,
            index: 0,
            first_char: 0,
            y: 0,
            text,
            metrics,
            breaks,
            locations: Vec::new(),
            width: 0,
            minimum_width: 0,
            above_baseline: 0,
            below_baseline: 0,
        }
    }

    /// Builds a fragment from logically ordered text and break classes.
    pub(crate) fn from_logical(
        fonts: &dyn FontMetrics,
        paragraph: ParagraphId,
        logical: &RichString,
        breaks: &[BreakOpportunity],
        base: Direction,
        default_font: FontId,
    ) -> Self {
        let order = bidi::visual_order(&logical.embeddings(), base);
        let text = logical.permuted(&order);
        let breaks = order
            .iter()
            .map(|&i| breaks.get(i).copied().unwrap_or_default())
            .collect();
        let metrics = CharacterMetrics::measure(fonts, &text);
        let mut fragment = Self::new(paragraph, text, metrics, breaks);
        fragment.refresh(fonts, base, default_font);
        fragment
    }

    pub(crate) fn len(&self) -> usize {
        self.text.len()
    }

    pub(crate) fn height(&self) -> u32 {
        self.above_baseline + self.below_baseline
    }

    pub(crate) fn rtl_flags(&self) -> Vec<bool> {
        self.text.rtl_flags()
    }

    pub(crate) fn embeddings(&self) -> Vec<Embedding> {
        self.text.embeddings()
    }

    pub(crate) fn run_direction(&self, base: Direction) -> RunDirection {
        RunDirection::of(&self.rtl_flags(), base)
    }

    /// The direction in which this fragment is split, merged and traversed.
    pub(crate) fn layout_direction(&self, base: Direction) -> Direction {
        self.run_direction(base).layout_direction(base)
    }

    /// The visual index of every logical character.
    pub(crate) fn logical_order(&self, base: Direction) -> Vec<usize> {
        bidi::logical_order(&self.embeddings(), base)
    }

    pub(crate) fn logical_text(&self, base: Direction) -> RichString {
        self.text.permuted(&self.logical_order(base))
    }

    /// The logical index of the character at visual `offset`. The end
    /// marker maps to the length.
    pub(crate) fn logical_index(&self, offset: usize, base: Direction) -> usize {
        if offset >= self.len() {
            return self.len();
        }
        self.logical_order(base)
            .iter()
            .position(|&v| v == offset)
            .unwrap_or(offset)
    }

    /// The visual offset of logical character `index`. The length maps to
    /// the end marker.
    pub(crate) fn visual_offset(&self, index: usize, base: Direction) -> usize {
        if index >= self.len() {
            return self.len();
        }
        self.logical_order(base)[index]
    }

    /// Returns `true` if the logically last character is a mandatory break.
    pub(crate) fn ends_with_mandatory_break(&self, base: Direction) -> bool {
        self.logical_order(base)
            .last()
            .and_then(|&v| self.text.char_at(v))
            .is_some_and(is_mandatory_break)
    }

    /// Returns `true` if the logically last character has the base direction.
    pub(crate) fn ends_at_base_level(&self, base: Direction) -> bool {
        let rtl = self.rtl_flags();
        self.logical_order(base)
            .last()
            .is_none_or(|&v| Direction::from_rtl(rtl[v]) == base)
    }

    /// For every visual position `0..=len`, whether the fragment may be split there.
    pub(crate) fn legal_cuts(&self, base: Direction, rule: SplitRule) -> Vec<bool> {
        let len = self.len();
        let embeddings = self.embeddings();
        let order = bidi::logical_order(&embeddings, base);
        let direction = self.layout_direction(base);
        (0..=len)
            .map(|v| {
                if !bidi::is_structural_cut(&embeddings, base, v) {
                    return false;
                }
                match rule {
                    SplitRule::Unconditional => true,
                    SplitRule::AtBreak => {
                        // The mapping between visual and logical cuts is its own inverse.
                        let logical_cut = bidi::logical_cut_to_visual(len, direction, v);
                        self.breaks[order[logical_cut]].is_break()
                    }
                }
            })
            .collect()
    }

    /// Recomputes the cached scalars from the metrics and break classes.
    pub(crate) fn refresh(&mut self, fonts: &dyn FontMetrics, base: Direction, default_font: FontId) {
        self.width = self.metrics.total();
        let cuts = self.legal_cuts(base, SplitRule::AtBreak);
        let mut start = 0;
        let mut minimum = 0;
        for v in 1..=self.len() {
            if v == self.len() || cuts[v] {
                minimum = minimum.max(self.metrics.range_width(start..v));
                start = v;
            }
        }
        self.minimum_width = minimum;
        let mut fonts_used: Vec<FontId> = self.text.runs().map(|(_, meta)| meta.font).collect();
        if fonts_used.is_empty() {
            fonts_used.push(default_font);
        }
        self.above_baseline = fonts_used.iter().map(|&f| fonts.ascender(f)).max().unwrap_or(0);
        self.below_baseline = fonts_used.iter().map(|&f| fonts.descender(f)).max().unwrap_or(0);
    }
}
