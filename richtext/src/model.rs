// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rich text model: paragraphs of wrapped fragments.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashSet;
use slotmap::SlotMap;

use crate::analysis::BreakOpportunity;
use crate::bidi::{Direction, RunDirection};
use crate::error::{internal_fault, Result, ValidationError};
use crate::font::{FontId, FontMetrics};
use crate::fragment::{Fragment, FragmentId};
use crate::location::{Location, LocationId};
use crate::options::{Alignment, BaseDirection, RichTextOptions};
use crate::paragraph::{Paragraph, ParagraphId};
use crate::string::RichString;

/// A mutable, wrapped, bidirectional rich text buffer.
///
/// The text is organised in paragraphs, each ending with a mandatory break
/// (or the end of the text), and every paragraph is wrapped into one or more
/// fragments, one per visual line. Cursor locations are handed out as
/// [`LocationId`] handles; they follow the character they sit on through
/// every edit.
#[derive(Debug)]
pub struct RichText {
    pub(crate) fonts: Arc<dyn FontMetrics>,
    pub(crate) fragments: SlotMap<FragmentId, Fragment>,
    pub(crate) paragraphs: SlotMap<ParagraphId, Paragraph>,
    /// Paragraphs in document order.
    pub(crate) order: Vec<ParagraphId>,
    pub(crate) locations: SlotMap<LocationId, Location>,
    pub(crate) num_chars: usize,
    pub(crate) num_fragments: usize,
    pub(crate) word_wrap_width: u32,
    pub(crate) alignment: Alignment,
    pub(crate) requested_direction: BaseDirection,
    /// The resolved base direction of every paragraph.
    pub(crate) direction: Direction,
    pub(crate) is_editor: bool,
    pub(crate) default_font: FontId,
    width: u32,
    height: u32,
    minimum_width: u32,
    /// Paragraphs whose aggregates are stale.
    dirty: HashSet<ParagraphId>,
    mutation_depth: usize,
}

impl RichText {
    /// Creates a model for `text`.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use richtext::testing::FixedFontMetrics;
    /// use richtext::{RichText, RichTextOptions};
    ///
    /// let fonts = Arc::new(FixedFontMetrics::new(10));
    /// let text = RichText::new(fonts, "Hello world", RichTextOptions::label().with_wrap_width(60))?;
    /// assert_eq!(text.num_fragments(), 2);
    /// # Ok::<(), richtext::Error>(())
    /// ```
    pub fn new(
        fonts: Arc<dyn FontMetrics>,
        text: impl Into<RichString>,
        options: RichTextOptions,
    ) -> Result<Self> {
        let text = text.into();
        let mut model = Self {
            fonts,
            fragments: SlotMap::with_key(),
            paragraphs: SlotMap::with_key(),
            order: Vec::new(),
            locations: SlotMap::with_key(),
            num_chars: 0,
            num_fragments: 0,
            word_wrap_width: options.wrap_width,
            alignment: options.alignment,
            requested_direction: options.direction,
            direction: options.direction.fixed().unwrap_or_default(),
            is_editor: options.is_editor,
            default_font: FontId::default(),
            width: 0,
            height: 0,
            minimum_width: 0,
            dirty: HashSet::new(),
            mutation_depth: 0,
        };
        log::debug!(
            "creating rich text of {} characters, wrap width {}",
            text.len(),
            options.wrap_width
        );
        model.with_mutation(|m| m.build(&text))?;
        Ok(model)
    }

    /// Runs a structural mutation.
    ///
    /// Numbering, prefix sums, vertical positions and sizes are recomputed
    /// once, when the outermost scope returns, whether it succeeded or not.
    pub(crate) fn with_mutation<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.mutation_depth += 1;
        let result = f(self);
        self.mutation_depth -= 1;
        if self.mutation_depth == 0 {
            self.recalculate();
        }
        result
    }

    pub(crate) fn mark_dirty(&mut self, paragraph: ParagraphId) {
        self.dirty.insert(paragraph);
    }

    fn recalculate(&mut self) {
        let Self {
            fragments,
            paragraphs,
            order,
            dirty,
            ..
        } = self;
        let mut first_char = 0;
        let mut first_fragment = 0;
        let mut y = 0;
        let mut width = 0;
        let mut minimum_width = 0;
        for (index, id) in order.iter().enumerate() {
            let Some(paragraph) = paragraphs.get_mut(*id) else {
                continue;
            };
            if dirty.contains(id) {
                paragraph.refresh(fragments);
            }
            paragraph.index = index;
            paragraph.first_char = first_char;
            paragraph.first_fragment = first_fragment;
            paragraph.y = y;
            first_char += paragraph.num_chars;
            first_fragment += paragraph.fragments.len();
            y += paragraph.height;
            width = width.max(paragraph.width);
            minimum_width = minimum_width.max(paragraph.minimum_width);
        }
        dirty.clear();
        self.num_chars = first_char;
        self.num_fragments = first_fragment;
        self.height = y;
        self.width = width;
        self.minimum_width = minimum_width;
    }

    /// Appends an empty paragraph to the document and returns its only fragment.
    pub(crate) fn push_empty_paragraph(&mut self) -> FragmentId {
        let paragraph = self.paragraphs.insert(Paragraph::default());
        let fragment = Fragment::from_logical(
            &*self.fonts,
            paragraph,
            &RichString::default(),
            &[],
            self.direction,
            self.default_font,
        );
        let fragment = self.fragments.insert(fragment);
        self.paragraphs[paragraph].fragments.push(fragment);
        self.order.push(paragraph);
        self.mark_dirty(paragraph);
        fragment
    }

    /// Removes a paragraph that no longer holds fragments.
    pub(crate) fn drop_paragraph(&mut self, paragraph: ParagraphId) {
        self.order.retain(|&p| p != paragraph);
        self.paragraphs.remove(paragraph);
        self.dirty.remove(&paragraph);
    }

    pub(crate) fn paragraph_position(&self, paragraph: ParagraphId) -> Option<usize> {
        self.order.iter().position(|&p| p == paragraph)
    }

    /// The paragraph of a fragment and the fragment's position in it.
    pub(crate) fn fragment_position(&self, fragment: FragmentId) -> Option<(ParagraphId, usize)> {
        let paragraph = self.fragments.get(fragment)?.paragraph;
        let index = self
            .paragraphs
            .get(paragraph)?
            .fragments
            .iter()
            .position(|&f| f == fragment)?;
        Some((paragraph, index))
    }

    pub(crate) fn next_in_paragraph(&self, fragment: FragmentId) -> Option<FragmentId> {
        let (paragraph, index) = self.fragment_position(fragment)?;
        self.paragraphs[paragraph].fragments.get(index + 1).copied()
    }

    /// The next fragment in document order.
    pub(crate) fn next_fragment(&self, fragment: FragmentId) -> Option<FragmentId> {
        if let Some(next) = self.next_in_paragraph(fragment) {
            return Some(next);
        }
        let paragraph = self.fragments.get(fragment)?.paragraph;
        let next = self.order.get(self.paragraph_position(paragraph)? + 1)?;
        self.paragraphs.get(*next)?.fragments.first().copied()
    }

    /// The previous fragment in document order.
    pub(crate) fn prev_fragment(&self, fragment: FragmentId) -> Option<FragmentId> {
        let (paragraph, index) = self.fragment_position(fragment)?;
        if index > 0 {
            return self.paragraphs[paragraph].fragments.get(index - 1).copied();
        }
        let prev = self.order.get(self.paragraph_position(paragraph)?.checked_sub(1)?)?;
        self.paragraphs.get(*prev)?.fragments.last().copied()
    }

    pub(crate) fn last_fragment(&self) -> Option<FragmentId> {
        let last = self.order.last()?;
        self.paragraphs.get(*last)?.fragments.last().copied()
    }

    /// The largest position a location can take.
    pub(crate) fn max_pos(&self) -> usize {
        if self.is_editor {
            self.num_chars.saturating_sub(1)
        } else {
            self.num_chars
        }
    }

    /// The fragment holding document position `pos`, with the logical index
    /// of `pos` within it.
    pub(crate) fn locate(&self, pos: usize) -> Result<(FragmentId, usize)> {
        let max = self.max_pos();
        if pos > max {
            return Err(ValidationError::PositionOutOfRange { pos, len: max }.into());
        }
        let index = self
            .order
            .partition_point(|p| self.paragraphs[*p].first_char <= pos)
            .saturating_sub(1);
        let paragraph = self
            .order
            .get(index)
            .and_then(|p| self.paragraphs.get(*p))
            .ok_or_else(|| internal_fault!("no paragraph holds position {pos}"))?;
        let local = pos - paragraph.first_char;
        let index = paragraph
            .fragments
            .partition_point(|f| self.fragments[*f].first_char <= local)
            .saturating_sub(1);
        let fragment = paragraph
            .fragments
            .get(index)
            .copied()
            .ok_or_else(|| internal_fault!("paragraph {} has no fragments", paragraph.index))?;
        Ok((fragment, local - self.fragments[fragment].first_char))
    }

    /// Low-level access: the fragment holding `pos` and the visual offset of
    /// `pos` within it.
    pub fn fragment_at(&self, pos: usize) -> Result<(FragmentId, usize)> {
        let (fragment, index) = self.locate(pos)?;
        Ok((
            fragment,
            self.fragments[fragment].visual_offset(index, self.direction),
        ))
    }

    /// The width available to a line.
    pub(crate) fn container_width(&self) -> u32 {
        if self.word_wrap_width > 0 {
            self.word_wrap_width
        } else {
            self.width
        }
    }

    pub(crate) fn fragment_x(&self, fragment: &Fragment) -> u32 {
        self.alignment
            .offset(self.direction, self.container_width(), fragment.width)
    }

    pub(crate) fn fragment_y(&self, fragment: &Fragment) -> u32 {
        self.paragraphs
            .get(fragment.paragraph)
            .map_or(0, |p| p.y)
            + fragment.y
    }

    /// The fragments in display order.
    pub fn fragments(&self) -> impl Iterator<Item = FragmentView<'_>> + '_ {
        self.order
            .iter()
            .filter_map(|p| self.paragraphs.get(*p))
            .flat_map(|p| p.fragments.iter())
            .filter_map(|&id| {
                Some(FragmentView {
                    model: self,
                    id,
                    fragment: self.fragments.get(id)?,
                })
            })
    }

    /// A view of a single fragment.
    pub fn fragment(&self, id: FragmentId) -> Option<FragmentView<'_>> {
        Some(FragmentView {
            model: self,
            id,
            fragment: self.fragments.get(id)?,
        })
    }

    /// The widest fragment.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The sum of the fragment heights.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The width of the widest piece of text that cannot be broken.
    pub fn minimum_width(&self) -> u32 {
        self.minimum_width
    }

    /// The number of characters, including the trailing newline of editable text.
    pub fn num_chars(&self) -> usize {
        self.num_chars
    }

    /// The number of paragraphs.
    pub fn num_paragraphs(&self) -> usize {
        self.order.len()
    }

    /// The number of fragments.
    pub fn num_fragments(&self) -> usize {
        self.num_fragments
    }

    /// The resolved base direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The line alignment.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Changes the line alignment. Only the horizontal origins of the
    /// fragments change.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// The current wrap width; `0` when unwrapped.
    pub fn word_wrap_width(&self) -> u32 {
        self.word_wrap_width
    }

    /// Returns `true` for editable text.
    pub fn is_editor(&self) -> bool {
        self.is_editor
    }

    /// The whole text in logical order.
    pub fn text(&self) -> RichString {
        let mut out = RichString::default();
        for id in self.order.iter().flat_map(|p| self.paragraphs[*p].fragments.iter()) {
            out.append(&self.fragments[*id].logical_text(self.direction));
        }
        out
    }

    /// The number of live locations.
    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }
}

/// A fragment as seen by a renderer.
#[derive(Copy, Clone, Debug)]
pub struct FragmentView<'a> {
    model: &'a RichText,
    id: FragmentId,
    fragment: &'a Fragment,
}

impl<'a> FragmentView<'a> {
    /// The fragment handle.
    pub fn id(&self) -> FragmentId {
        self.id
    }

    /// The characters in visual (left-to-right) order.
    pub fn text(&self) -> &'a RichString {
        &self.fragment.text
    }

    /// The characters in visual order, as a string.
    pub fn visual_text(&self) -> String {
        self.fragment.text.chars().iter().collect()
    }

    /// The characters in logical order.
    pub fn logical_text(&self) -> RichString {
        self.fragment.logical_text(self.model.direction)
    }

    /// Global fragment number.
    pub fn index(&self) -> usize {
        self.model
            .paragraphs
            .get(self.fragment.paragraph)
            .map_or(0, |p| p.first_fragment)
            + self.fragment.index
    }

    /// Number of the paragraph holding this fragment.
    pub fn paragraph_index(&self) -> usize {
        self.model
            .paragraphs
            .get(self.fragment.paragraph)
            .map_or(0, |p| p.index)
    }

    /// Document position of the logically first character.
    pub fn first_char(&self) -> usize {
        self.model
            .paragraphs
            .get(self.fragment.paragraph)
            .map_or(0, |p| p.first_char)
            + self.fragment.first_char
    }

    /// Horizontal origin, after alignment.
    pub fn x(&self) -> u32 {
        self.model.fragment_x(self.fragment)
    }

    /// Top edge.
    pub fn y(&self) -> u32 {
        self.model.fragment_y(self.fragment)
    }

    /// Baseline position.
    pub fn baseline(&self) -> u32 {
        self.y() + self.fragment.above_baseline
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.fragment.width
    }

    /// Width of the widest unbreakable piece.
    pub fn minimum_width(&self) -> u32 {
        self.fragment.minimum_width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.fragment.height()
    }

    /// Distance from the top edge to the baseline.
    pub fn above_baseline(&self) -> u32 {
        self.fragment.above_baseline
    }

    /// Distance from the baseline to the bottom edge.
    pub fn below_baseline(&self) -> u32 {
        self.fragment.below_baseline
    }

    /// Left edge of every character relative to [`FragmentView::x`],
    /// followed by the right edge of the last one.
    pub fn edges(&self) -> Vec<u32> {
        self.fragment.metrics.edges()
    }

    /// Per-character advances, including kerning.
    pub fn advances(&self) -> Vec<u32> {
        self.edges().windows(2).map(|w| w[1].saturating_sub(w[0])).collect()
    }

    /// Break class of the boundary logically before each visual character.
    pub fn breaks(&self) -> &'a [BreakOpportunity] {
        &self.fragment.breaks
    }

    /// The direction content.
    pub fn run_direction(&self) -> RunDirection {
        self.fragment.run_direction(self.model.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::RichText;
    use crate::options::RichTextOptions;
    use crate::testing::FixedFontMetrics;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    #[test]
    fn geometry_aggregates() {
        let fonts = Arc::new(FixedFontMetrics::new(10));
        let text = RichText::new(fonts, "ab\ncde", RichTextOptions::label()).unwrap();
        assert_eq!(text.num_paragraphs(), 2);
        assert_eq!(text.num_fragments(), 2);
        assert_eq!(text.num_chars(), 6);
        assert_eq!(text.width(), 30);
        assert_eq!(text.height(), 2 * (10 + 2));
        let ys: Vec<u32> = text.fragments().map(|f| f.y()).collect();
        assert_eq!(ys, [0, 12]);
        assert_eq!(text.fragments().nth(1).map(|f| f.first_char()), Some(3));
    }
}
