// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ranges of text between two positions.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::analysis::word_at;
use crate::error::{internal_fault, Result, ValidationError};
use crate::fragment::FragmentId;
use crate::location::LocationId;
use crate::model::RichText;
use crate::paragraph::ParagraphId;
use crate::string::RichString;

/// A logical range of text, always ordered.
///
/// Because fragments store their text in visual order, a logical range maps
/// to a set of possibly discontiguous visual pieces. The range resolves them
/// fragment by fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidiRange {
    range: Range<usize>,
}

/// The part of one fragment covered by a range.
#[derive(Clone, Debug)]
pub(crate) struct FragmentSpan {
    pub(crate) fragment: FragmentId,
    pub(crate) paragraph: ParagraphId,
    /// Logical sub-range within the fragment.
    pub(crate) logical: Range<usize>,
    /// The visual index of each logical character of the fragment.
    pub(crate) order: Vec<usize>,
    /// The span covers the whole fragment.
    pub(crate) whole: bool,
}

impl BidiRange {
    /// The range between two document positions, in either order.
    pub fn from_positions(a: usize, b: usize) -> Self {
        Self {
            range: a.min(b)..a.max(b),
        }
    }

    /// The range between two locations, in either order.
    pub fn new(model: &RichText, a: LocationId, b: LocationId) -> Result<Self> {
        Ok(Self::from_positions(model.pos(a)?, model.pos(b)?))
    }

    /// The word around a location.
    pub fn select_word(model: &RichText, at: LocationId) -> Result<Self> {
        let pos = model.pos(at)?;
        let (fragment, _) = model.locate(pos)?;
        let paragraph = model.fragments[fragment].paragraph;
        let paragraph = model
            .paragraphs
            .get(paragraph)
            .ok_or_else(|| internal_fault!("fragment points to a removed paragraph"))?;
        let mut chars = Vec::with_capacity(paragraph.num_chars);
        for id in &paragraph.fragments {
            chars.extend_from_slice(model.fragments[*id].logical_text(model.direction).chars());
        }
        let word = word_at(&chars, pos - paragraph.first_char);
        Ok(Self::from_positions(
            paragraph.first_char + word.start,
            paragraph.first_char + word.end,
        ))
    }

    /// The first position.
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// The position past the last character.
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Returns `true` if the range holds no characters.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The range as document positions.
    pub fn as_range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Returns `true` if both ends lie in the same fragment.
    pub fn complete_line(&self, model: &RichText) -> Result<bool> {
        let (a, _) = model.locate(self.range.start)?;
        let (b, _) = model.locate(self.range.end)?;
        Ok(a == b)
    }

    /// Calls `f` for every fragment intersecting the range, in logical order.
    pub(crate) fn for_each_fragment(
        &self,
        model: &RichText,
        mut f: impl FnMut(FragmentSpan),
    ) -> Result<()> {
        if self.range.end > model.num_chars {
            return Err(ValidationError::PositionOutOfRange {
                pos: self.range.end,
                len: model.num_chars,
            }
            .into());
        }
        for &paragraph in &model.order {
            let p = &model.paragraphs[paragraph];
            if p.first_char + p.num_chars <= self.range.start {
                continue;
            }
            if p.first_char >= self.range.end {
                break;
            }
            for &id in &p.fragments {
                let fragment = &model.fragments[id];
                let first = p.first_char + fragment.first_char;
                let start = self.range.start.max(first);
                let end = self.range.end.min(first + fragment.len());
                if start >= end {
                    continue;
                }
                f(FragmentSpan {
                    fragment: id,
                    paragraph,
                    logical: start - first..end - first,
                    order: fragment.logical_order(model.direction),
                    whole: end - start == fragment.len(),
                });
            }
        }
        Ok(())
    }

    /// The text of the range in logical order, with its metadata.
    pub fn get(&self, model: &RichText) -> Result<RichString> {
        let mut out = RichString::default();
        self.for_each_fragment(model, |span| {
            let text = &model.fragments[span.fragment].text;
            let logical = text.permuted(&span.order[span.logical]);
            out.append(&logical);
        })?;
        Ok(out)
    }

    /// The text of the range in logical order.
    pub fn get_text(&self, model: &RichText) -> Result<String> {
        Ok(self.get(model)?.chars().iter().collect())
    }

    /// The per-fragment pieces a removal of this range touches.
    pub(crate) fn remove_info(&self, model: &RichText) -> Result<Vec<FragmentSpan>> {
        let mut spans = Vec::new();
        self.for_each_fragment(model, |span| spans.push(span))?;
        Ok(spans)
    }
}

impl RichText {
    /// The text between two locations, in logical order, with its metadata.
    pub fn get(&self, from: LocationId, to: LocationId) -> Result<RichString> {
        BidiRange::new(self, from, to)?.get(self)
    }

    /// The text between two locations, in logical order.
    pub fn get_text(&self, from: LocationId, to: LocationId) -> Result<String> {
        BidiRange::new(self, from, to)?.get_text(self)
    }

    /// The document positions of the word around a location.
    pub fn select_word(&self, at: LocationId) -> Result<Range<usize>> {
        Ok(BidiRange::select_word(self, at)?.as_range())
    }
}
