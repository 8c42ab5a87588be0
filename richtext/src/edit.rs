// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text editing: building, inserting, removing and replacing.
//!
//! Edits work on the logical text of the fragments they touch. Afterwards
//! the affected paragraph is reflowed: its fragments are joined, cut again
//! at every paragraph break, re-analysed and rewrapped. Locations are saved
//! as document positions before the edit and restored by position
//! arithmetic afterwards.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::iter;
use core::ops::Range;

use crate::analysis::{
    first_strong_direction, paragraph_breaks, paragraph_lengths, prepare, resolve,
    BreakOpportunity,
};
use crate::bidi::{self, logical_cut_to_visual};
use crate::error::{internal_fault, Result};
use crate::fragment::{Fragment, FragmentId};
use crate::location::LocationId;
use crate::metrics::CharacterMetrics;
use crate::model::RichText;
use crate::options::BaseDirection;
use crate::paragraph::{Paragraph, ParagraphId};
use crate::range::BidiRange;
use crate::string::{RichString, TextMeta};
use crate::wrap::{SplitKind, SplitRule};

/// Where a location at `q` ends up after `n` characters are inserted at `pos`.
fn shift_past_insertion(q: usize, pos: usize, n: usize, do_not_adjust: bool) -> usize {
    match q.cmp(&pos) {
        Ordering::Less => q,
        Ordering::Greater => q + n,
        Ordering::Equal if do_not_adjust => pos,
        Ordering::Equal => pos + n,
    }
}

impl RichText {
    /// Replaces the model contents with `text`.
    ///
    /// Runs inside a mutation scope; the caller takes care of locations.
    pub(crate) fn build(&mut self, text: &RichString) -> Result<()> {
        self.fragments.clear();
        self.paragraphs.clear();
        self.order.clear();

        let mut text = text.clone();
        if self.is_editor {
            let meta = text
                .len()
                .checked_sub(1)
                .and_then(|last| text.meta_at(last))
                .unwrap_or_else(|| TextMeta::new(self.default_font));
            text.push_str("\n", meta);
        }
        if self.requested_direction == BaseDirection::Auto {
            self.direction = first_strong_direction(text.chars()).unwrap_or_default();
        }
        let prepared = prepare(&text, self.direction);
        let mut start = 0;
        for (i, len) in paragraph_lengths(prepared.chars()).into_iter().enumerate() {
            // A trailing break does not open a paragraph of its own.
            if len == 0 && i > 0 {
                continue;
            }
            let logical = prepared.slice(start..start + len);
            start += len;
            let breaks = paragraph_breaks(logical.chars(), &logical.rtl_flags(), i == 0);
            let paragraph = self.paragraphs.insert(Paragraph::default());
            let fragment = Fragment::from_logical(
                &*self.fonts,
                paragraph,
                &logical,
                &breaks,
                self.direction,
                self.default_font,
            );
            let fragment = self.fragments.insert(fragment);
            self.paragraphs[paragraph].fragments.push(fragment);
            self.order.push(paragraph);
            self.mark_dirty(paragraph);
        }
        for paragraph in self.order.clone() {
            self.rewrap_paragraph(paragraph)?;
        }
        Ok(())
    }

    /// Replaces the whole text.
    ///
    /// Locations at the end of the old text move to the end of the new text;
    /// all others move to the start.
    pub fn set(&mut self, text: impl Into<RichString>) -> Result<()> {
        let text = text.into();
        log::debug!("set text of {} characters", text.len());
        let old_max = self.max_pos();
        let saved = self.detach_all();
        let result = self.with_mutation(|m| m.build(&text));
        let new_max = self.max_pos();
        let restored =
            self.restore_locations(saved, |pos, _| if pos == old_max { new_max } else { 0 });
        result.and(restored)
    }

    /// Inserts `text` before the character at `at`.
    ///
    /// Returns a new location at the end of the inserted text. Existing
    /// locations after the insertion point shift by the inserted length; those
    /// at the insertion point move past the text unless they were marked with
    /// [`RichText::set_do_not_adjust`].
    pub fn insert(&mut self, at: LocationId, text: impl Into<RichString>) -> Result<LocationId> {
        let text = text.into();
        let pos = self.pos(at)?;
        if self.is_editor
            && self.requested_direction == BaseDirection::Auto
            && self.num_chars <= 1
            && !text.is_empty()
        {
            // The first text typed into an empty editor decides its direction.
            let old_chars = self.num_chars;
            let saved = self.detach_all();
            let result = self.with_mutation(|m| m.build(&text));
            let n = self.num_chars.saturating_sub(old_chars);
            let restored = self.restore_locations(saved, |q, do_not_adjust| {
                shift_past_insertion(q, pos, n, do_not_adjust)
            });
            result.and(restored)?;
            return self.new_location(pos + n);
        }
        let prepared = prepare(&text, self.direction);
        if prepared.is_empty() {
            return self.new_location(pos);
        }
        let n = prepared.len();
        log::debug!("insert {n} characters at {pos}");
        let (target, _) = self.locate(pos)?;
        let paragraph = self.paragraphs[self.fragments[target].paragraph].index;
        let saved = self.detach(paragraph..paragraph + 1);
        let result = self.with_mutation(|m| {
            let (mut fragment, mut index) = m.locate(pos)?;
            let f = &m.fragments[fragment];
            if index == f.len() && f.ends_with_mandatory_break(m.direction) {
                fragment = m.push_empty_paragraph();
                index = 0;
            }
            m.insert_into_fragment(fragment, index, &prepared)?;
            let paragraph = m.fragments[fragment].paragraph;
            m.reflow(paragraph)
        });
        let restored = self.restore_locations(saved, |q, do_not_adjust| {
            shift_past_insertion(q, pos, n, do_not_adjust)
        });
        result.and(restored)?;
        self.new_location(pos + n)
    }

    /// Removes the text between two locations.
    ///
    /// The locations may be given in either order. Locations inside the
    /// removed text collapse to its start. The trailing newline of editable
    /// text is never removed.
    pub fn remove(&mut self, from: LocationId, to: LocationId) -> Result<()> {
        let range = BidiRange::new(self, from, to)?;
        self.remove_range(range)
    }

    /// Replaces the text between two locations with `text` and returns a
    /// location at the end of the new text.
    pub fn replace(
        &mut self,
        from: LocationId,
        to: LocationId,
        text: impl Into<RichString>,
    ) -> Result<LocationId> {
        let range = BidiRange::new(self, from, to)?;
        let text = text.into();
        if self.is_editor && range.start() == 0 && range.end() + 1 >= self.num_chars {
            self.set(text)?;
            return self.new_location(self.max_pos());
        }
        self.remove_range(range.clone())?;
        let at = self.new_location(range.start())?;
        let result = self.insert(at, text);
        self.release(at)?;
        result
    }

    pub(crate) fn remove_range(&mut self, range: BidiRange) -> Result<()> {
        let a = range.start();
        let mut b = range.end();
        if self.is_editor {
            b = b.min(self.num_chars.saturating_sub(1));
        }
        if a >= b {
            return Ok(());
        }
        log::debug!("remove {a}..{b}");
        let spans = BidiRange::from_positions(a, b).remove_info(self)?;
        let (first, _) = self.locate(a)?;
        let (last, _) = self.locate(b)?;
        let first_paragraph = self.paragraphs[self.fragments[first].paragraph].index;
        let last_paragraph = self.paragraphs[self.fragments[last].paragraph].index;
        let saved = self.detach(first_paragraph..last_paragraph + 1);
        let result = self.with_mutation(|m| {
            for span in &spans {
                if span.whole {
                    m.fragments.remove(span.fragment);
                    if let Some(paragraph) = m.paragraphs.get_mut(span.paragraph) {
                        paragraph.fragments.retain(|&f| f != span.fragment);
                    }
                    m.mark_dirty(span.paragraph);
                } else {
                    m.remove_from_fragment(span.fragment, span.logical.clone())?;
                }
            }
            for paragraph in m.order.clone() {
                if m.paragraphs[paragraph].fragments.is_empty() {
                    m.drop_paragraph(paragraph);
                }
            }
            if m.order.is_empty() {
                m.push_empty_paragraph();
            }
            let index = first_paragraph.min(m.order.len() - 1);
            let paragraph = m.order[index];
            m.join_following(paragraph)?;
            m.reflow(paragraph)
        });
        let removed = b - a;
        let restored = self.restore_locations(saved, |q, _| {
            if q < a {
                q
            } else if q < b {
                a
            } else {
                q - removed
            }
        });
        result.and(restored)
    }

    /// Pulls the following paragraphs into `paragraph` until it ends with a
    /// mandatory break again.
    fn join_following(&mut self, paragraph: ParagraphId) -> Result<()> {
        loop {
            let last = self.paragraphs[paragraph]
                .fragments
                .last()
                .copied()
                .ok_or_else(|| internal_fault!("paragraph without fragments"))?;
            if self.fragments[last].ends_with_mandatory_break(self.direction) {
                return Ok(());
            }
            let kind = self.junction_merge_kind(last);
            if !self.merge(last, kind)? {
                return Ok(());
            }
        }
    }

    /// Rewrites a fragment from new logical contents, reusing the metrics
    /// of characters that survive. `source[i]` is the visual index in the
    /// old fragment of logical character `i`, if it existed before.
    fn rebuild_fragment(
        &mut self,
        id: FragmentId,
        logical: RichString,
        mut breaks: Vec<BreakOpportunity>,
        source: Vec<Option<usize>>,
    ) {
        let base = self.direction;
        let visual = bidi::visual_order(&logical.embeddings(), base);
        let text = logical.permuted(&visual);
        let mapping: Vec<Option<usize>> = visual.iter().map(|&l| source[l]).collect();
        breaks.resize(logical.len(), BreakOpportunity::None);
        let fragment = &mut self.fragments[id];
        fragment.metrics = CharacterMetrics::remeasure(&*self.fonts, &text, &fragment.metrics, &mapping);
        fragment.breaks = visual.iter().map(|&l| breaks[l]).collect();
        fragment.text = text;
        fragment.refresh(&*self.fonts, base, self.default_font);
        let paragraph = fragment.paragraph;
        self.mark_dirty(paragraph);
    }

    /// The logical text, logical break classes and identity source map of a fragment.
    fn logical_parts(&self, id: FragmentId) -> (RichString, Vec<BreakOpportunity>, Vec<Option<usize>>) {
        let base = self.direction;
        let fragment = &self.fragments[id];
        let order = fragment.logical_order(base);
        (
            fragment.text.permuted(&order),
            order.iter().map(|&v| fragment.breaks[v]).collect(),
            order.iter().map(|&v| Some(v)).collect(),
        )
    }

    /// Inserts `text` before logical index `index` of a fragment.
    pub(crate) fn insert_into_fragment(
        &mut self,
        id: FragmentId,
        index: usize,
        text: &RichString,
    ) -> Result<()> {
        let (mut logical, mut breaks, mut source) = self.logical_parts(id);
        if index > logical.len() {
            return Err(internal_fault!(
                "insertion at {index} into a fragment of {} characters",
                logical.len()
            ));
        }
        let n = text.len();
        logical.insert(index, text);
        breaks.splice(index..index, iter::repeat_n(BreakOpportunity::None, n));
        source.splice(index..index, iter::repeat_n(None, n));
        self.rebuild_fragment(id, logical, breaks, source);
        Ok(())
    }

    /// Removes the logical range `range` from a fragment.
    pub(crate) fn remove_from_fragment(&mut self, id: FragmentId, range: Range<usize>) -> Result<()> {
        let (mut logical, mut breaks, mut source) = self.logical_parts(id);
        if range.end > logical.len() || range.start > range.end {
            return Err(internal_fault!(
                "removal of {range:?} from a fragment of {} characters",
                logical.len()
            ));
        }
        logical.remove(range.clone());
        breaks.drain(range.clone());
        source.drain(range);
        self.rebuild_fragment(id, logical, breaks, source);
        Ok(())
    }

    /// Re-establishes the layout of an edited paragraph: joins its
    /// fragments, re-resolves their directions, cuts the result at every
    /// embedded paragraph break and re-analyses and rewraps each resulting
    /// paragraph.
    pub(crate) fn reflow(&mut self, paragraph: ParagraphId) -> Result<()> {
        let paragraph = self.rejoin_crlf(paragraph)?;
        self.unwrap_paragraph(paragraph)?;
        let base = self.direction;
        let mut current = self.paragraphs[paragraph]
            .fragments
            .first()
            .copied()
            .ok_or_else(|| internal_fault!("paragraph without fragments"))?;
        self.resolve_directions(current);
        let mut affected = alloc::vec![paragraph];
        loop {
            let fragment = &self.fragments[current];
            let len = fragment.len();
            let logical = fragment.logical_text(base);
            let cut = paragraph_lengths(logical.chars())[0];
            if cut == 0 || cut >= len {
                break;
            }
            let visual = fragment.logical_order(base)[cut];
            self.fragments[current].breaks[visual] = BreakOpportunity::Mandatory;
            let position = logical_cut_to_visual(len, base, cut);
            current = self.split(
                current,
                position,
                SplitKind::from(base),
                SplitRule::Unconditional,
            )?;
            affected.push(self.fragments[current].paragraph);
        }
        for paragraph in affected {
            self.reanalyse(paragraph)?;
            self.rewrap_paragraph(paragraph)?;
        }
        Ok(())
    }

    /// Joins `paragraph` to the previous one when it starts with a line feed
    /// and the previous one ends with a carriage return: the pair is a
    /// single break. Returns the paragraph holding the text afterwards.
    fn rejoin_crlf(&mut self, paragraph: ParagraphId) -> Result<ParagraphId> {
        let base = self.direction;
        let index = self
            .paragraph_position(paragraph)
            .ok_or_else(|| internal_fault!("paragraph missing from the document"))?;
        let Some(previous) = index.checked_sub(1).map(|i| self.order[i]) else {
            return Ok(paragraph);
        };
        let (Some(&first), Some(&last)) = (
            self.paragraphs[paragraph].fragments.first(),
            self.paragraphs[previous].fragments.last(),
        ) else {
            return Err(internal_fault!("paragraph without fragments"));
        };
        let starts_with_lf = self.fragments[first].logical_text(base).char_at(0) == Some('\n');
        let ends_with_cr = {
            let logical = self.fragments[last].logical_text(base);
            logical.char_at(logical.len().wrapping_sub(1)) == Some('\r')
        };
        if !(starts_with_lf && ends_with_cr) {
            return Ok(paragraph);
        }
        let kind = self.junction_merge_kind(last);
        self.merge(last, kind)?;
        Ok(previous)
    }

    /// Re-resolves the character directions of a fragment from its logical
    /// text and puts it back into display order. Locations stay on their
    /// characters.
    fn resolve_directions(&mut self, id: FragmentId) {
        let base = self.direction;
        let fragment = &self.fragments[id];
        let order = fragment.logical_order(base);
        let logical = fragment.text.permuted(&order);
        let resolved = resolve(&logical, base);
        if resolved == logical {
            return;
        }
        let breaks = order.iter().map(|&v| fragment.breaks[v]).collect();
        let source = order.iter().map(|&v| Some(v)).collect();
        let to_logical = bidi::invert(&order);
        let anchored: Vec<(LocationId, usize)> = fragment
            .locations
            .iter()
            .filter_map(|&loc| {
                let offset = self.locations.get(loc)?.offset;
                Some((loc, to_logical.get(offset).copied().unwrap_or(order.len())))
            })
            .collect();
        self.rebuild_fragment(id, resolved, breaks, source);
        let order = self.fragments[id].logical_order(base);
        for (loc, index) in anchored {
            if let Some(location) = self.locations.get_mut(loc) {
                location.offset = order.get(index).copied().unwrap_or(order.len());
            }
        }
    }

    /// Recomputes the break classification of a paragraph from its logical text.
    pub(crate) fn reanalyse(&mut self, paragraph: ParagraphId) -> Result<()> {
        let base = self.direction;
        let first = self.order.first() == Some(&paragraph);
        let ids = self
            .paragraphs
            .get(paragraph)
            .ok_or_else(|| internal_fault!("re-analysis of a removed paragraph"))?
            .fragments
            .clone();
        let mut chars = Vec::new();
        let mut rtl = Vec::new();
        for &id in &ids {
            let logical = self.fragments[id].logical_text(base);
            chars.extend_from_slice(logical.chars());
            rtl.extend(logical.rtl_flags());
        }
        let breaks = paragraph_breaks(&chars, &rtl, first);
        let mut start = 0;
        for id in ids {
            let fragment = &mut self.fragments[id];
            let order = fragment.logical_order(base);
            for (i, &v) in order.iter().enumerate() {
                fragment.breaks[v] = breaks[start + i];
            }
            start += order.len();
            fragment.refresh(&*self.fonts, base, self.default_font);
        }
        self.mark_dirty(paragraph);
        Ok(())
    }
}
