// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor locations and their movement.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::Range;

use crate::bidi::{self, Direction};
use crate::error::{internal_fault, Result, ValidationError};
use crate::fragment::FragmentId;
use crate::model::RichText;
use crate::string::LinkId;

slotmap::new_key_type! {
    /// Handle to a cursor location attached to a [`RichText`].
    ///
    /// A location sits on a character and keeps sitting on it through edits,
    /// wrapping and unwrapping. Release it with [`RichText::release`] when it
    /// is no longer needed.
    pub struct LocationId;
}

/// A position anchored to a fragment.
#[derive(Clone, Debug)]
pub(crate) struct Location {
    pub(crate) fragment: FragmentId,
    /// Visual index of the character the location sits on. The fragment
    /// length marks the end of the text.
    pub(crate) offset: usize,
    /// Stay before text inserted at this location instead of moving past it.
    pub(crate) do_not_adjust: bool,
    /// Remembered horizontal position for vertical movement.
    pub(crate) horizontal: Option<u32>,
}

impl RichText {
    fn location(&self, id: LocationId) -> Result<&Location> {
        Ok(self
            .locations
            .get(id)
            .ok_or(ValidationError::UnknownLocation)?)
    }

    /// Creates a location at document position `pos`.
    pub fn at(&mut self, pos: usize) -> Result<LocationId> {
        let (fragment, index) = self.locate(pos)?;
        let offset = self.fragments[fragment].visual_offset(index, self.direction);
        Ok(self.create_location(fragment, offset))
    }

    /// Creates a location at the start of the text.
    pub fn begin(&mut self) -> Result<LocationId> {
        self.at(0)
    }

    /// Creates a location at the end of the text. For editable text this is
    /// the trailing newline.
    pub fn end(&mut self) -> Result<LocationId> {
        self.at(self.max_pos())
    }

    /// Creates a second location at the same place as `id`.
    pub fn clone_location(&mut self, id: LocationId) -> Result<LocationId> {
        let location = self.location(id)?.clone();
        let clone = self.locations.insert(location.clone());
        if let Some(fragment) = self.fragments.get_mut(location.fragment) {
            fragment.locations.push(clone);
        }
        Ok(clone)
    }

    /// Detaches and forgets a location.
    pub fn release(&mut self, id: LocationId) -> Result<()> {
        let location = self
            .locations
            .remove(id)
            .ok_or(ValidationError::UnknownLocation)?;
        if let Some(fragment) = self.fragments.get_mut(location.fragment) {
            fragment.locations.retain(|&l| l != id);
        }
        Ok(())
    }

    /// Makes `id` stay in front of text inserted at its position.
    pub fn set_do_not_adjust(&mut self, id: LocationId, do_not_adjust: bool) -> Result<()> {
        self.locations
            .get_mut(id)
            .ok_or(ValidationError::UnknownLocation)?
            .do_not_adjust = do_not_adjust;
        Ok(())
    }

    /// The logical document position of a location.
    pub fn pos(&self, id: LocationId) -> Result<usize> {
        let location = self.location(id)?;
        let fragment = self
            .fragments
            .get(location.fragment)
            .ok_or_else(|| internal_fault!("location points to a removed fragment"))?;
        let paragraph = self
            .paragraphs
            .get(fragment.paragraph)
            .ok_or_else(|| internal_fault!("fragment points to a removed paragraph"))?;
        Ok(paragraph.first_char
            + fragment.first_char
            + fragment.logical_index(location.offset, self.direction))
    }

    /// Orders two locations by document position.
    pub fn compare(&self, a: LocationId, b: LocationId) -> Result<Ordering> {
        Ok(self.pos(a)?.cmp(&self.pos(b)?))
    }

    /// The hyperlink tag of the character under a location.
    pub fn link_at(&self, id: LocationId) -> Result<Option<LinkId>> {
        let location = self.location(id)?;
        Ok(self
            .fragments
            .get(location.fragment)
            .and_then(|f| f.text.meta_at(location.offset))
            .and_then(|meta| meta.link))
    }

    /// Horizontal pixel position of a location.
    pub fn x_position(&self, id: LocationId) -> Result<u32> {
        let location = self.location(id)?;
        let fragment = self
            .fragments
            .get(location.fragment)
            .ok_or_else(|| internal_fault!("location points to a removed fragment"))?;
        let edges = fragment.metrics.edges();
        let edge = edges.get(location.offset).or(edges.last()).copied().unwrap_or(0);
        Ok(self.fragment_x(fragment) + edge)
    }

    fn create_location(&mut self, fragment: FragmentId, offset: usize) -> LocationId {
        let id = self.locations.insert(Location {
            fragment,
            offset,
            do_not_adjust: false,
            horizontal: None,
        });
        self.fragments[fragment].locations.push(id);
        id
    }

    /// Creates a location at `pos`, clamped to the text.
    pub(crate) fn new_location(&mut self, pos: usize) -> Result<LocationId> {
        self.at(pos.min(self.max_pos()))
    }

    /// Moves a location to a fragment and visual offset.
    pub(crate) fn set_location(&mut self, id: LocationId, fragment: FragmentId, offset: usize) {
        let Some(location) = self.locations.get_mut(id) else {
            return;
        };
        let old = core::mem::replace(&mut location.fragment, fragment);
        location.offset = offset;
        if old != fragment {
            if let Some(f) = self.fragments.get_mut(old) {
                f.locations.retain(|&l| l != id);
            }
            if let Some(f) = self.fragments.get_mut(fragment) {
                f.locations.push(id);
            }
        }
    }

    /// Records the position of every location and detaches them all from
    /// their fragments.
    pub(crate) fn detach_all(&mut self) -> Vec<(LocationId, usize)> {
        self.detach(0..self.order.len())
    }

    /// Records the position of every location on the paragraphs at
    /// `paragraphs` (indices in document order) and detaches them.
    ///
    /// Locations elsewhere stay attached; their positions follow from the
    /// paragraph offsets once the edit is done.
    pub(crate) fn detach(&mut self, paragraphs: Range<usize>) -> Vec<(LocationId, usize)> {
        let base = self.direction;
        let ids: Vec<FragmentId> = self
            .order
            .get(paragraphs)
            .unwrap_or_default()
            .iter()
            .flat_map(|p| self.paragraphs[*p].fragments.iter().copied())
            .collect();
        let mut saved = Vec::new();
        for id in ids {
            let fragment = &mut self.fragments[id];
            if fragment.locations.is_empty() {
                continue;
            }
            let start = self.paragraphs[fragment.paragraph].first_char + fragment.first_char;
            let to_logical = bidi::invert(&fragment.logical_order(base));
            for loc in core::mem::take(&mut fragment.locations) {
                if let Some(location) = self.locations.get(loc) {
                    let index = to_logical
                        .get(location.offset)
                        .copied()
                        .unwrap_or(to_logical.len());
                    saved.push((loc, start + index));
                }
            }
        }
        saved
    }

    /// Re-attaches detached locations at new positions.
    pub(crate) fn restore_locations(
        &mut self,
        saved: Vec<(LocationId, usize)>,
        mut relocate: impl FnMut(usize, bool) -> usize,
    ) -> Result<()> {
        let max = self.max_pos();
        for (id, pos) in saved {
            let Some(location) = self.locations.get(id) else {
                continue;
            };
            let pos = relocate(pos, location.do_not_adjust).min(max);
            let (fragment, index) = self.locate(pos)?;
            let offset = self.fragments[fragment].visual_offset(index, self.direction);
            if let Some(location) = self.locations.get_mut(id) {
                location.fragment = fragment;
                location.offset = offset;
                location.horizontal = None;
            }
            self.fragments[fragment].locations.push(id);
        }
        Ok(())
    }

    /// The largest offset a location can take in `fragment`.
    fn max_offset(&self, fragment: FragmentId) -> usize {
        let len = self.fragments.get(fragment).map_or(0, |f| f.len());
        if !self.is_editor && self.last_fragment() == Some(fragment) {
            len
        } else {
            len.saturating_sub(1)
        }
    }

    /// The visual offset of the logically first (or last) character of a fragment.
    fn logical_edge(&self, fragment: FragmentId, last: bool) -> usize {
        self.fragments.get(fragment).map_or(0, |f| {
            let index = if last { f.len().saturating_sub(1) } else { 0 };
            f.visual_offset(index, self.direction)
        })
    }

    fn horizontal_move(&mut self, id: LocationId, rightwards: bool) -> Result<bool> {
        let location = self.location(id)?.clone();
        let fragment = location.fragment;
        let offset = location.offset;
        let f = self
            .fragments
            .get(fragment)
            .ok_or_else(|| internal_fault!("location points to a removed fragment"))?;
        let len = f.len();
        let direction = f.layout_direction(self.direction);
        let max = self.max_offset(fragment);
        // Right-to-left lines end on their left; the end of the text sits
        // past their leftmost character.
        let target = match (direction, rightwards) {
            (Direction::LeftToRight, true) if offset < max => Some((fragment, offset + 1)),
            (Direction::LeftToRight, true) => self
                .next_fragment(fragment)
                .map(|f| (f, self.logical_edge(f, false))),
            (Direction::LeftToRight, false) if offset > 0 => Some((fragment, offset - 1)),
            (Direction::LeftToRight, false) => self
                .prev_fragment(fragment)
                .map(|f| (f, self.logical_edge(f, true))),
            (Direction::RightToLeft, true) if offset >= len => (len > 0).then_some((fragment, 0)),
            (Direction::RightToLeft, true) if offset + 1 < len => Some((fragment, offset + 1)),
            (Direction::RightToLeft, true) => self
                .prev_fragment(fragment)
                .map(|f| (f, self.logical_edge(f, true))),
            (Direction::RightToLeft, false) if offset >= len => None,
            (Direction::RightToLeft, false) if offset > 0 => Some((fragment, offset - 1)),
            (Direction::RightToLeft, false) if max == len => Some((fragment, len)),
            (Direction::RightToLeft, false) => self
                .next_fragment(fragment)
                .map(|f| (f, self.logical_edge(f, false))),
        };
        if let Some(location) = self.locations.get_mut(id) {
            location.horizontal = None;
        }
        let Some((fragment, offset)) = target else {
            return Ok(false);
        };
        self.set_location(id, fragment, offset);
        Ok(true)
    }

    /// Moves one character to the left. Returns `false` at the edge of the text.
    pub fn left(&mut self, id: LocationId) -> Result<bool> {
        self.horizontal_move(id, false)
    }

    /// Moves one character to the right. Returns `false` at the edge of the text.
    pub fn right(&mut self, id: LocationId) -> Result<bool> {
        self.horizontal_move(id, true)
    }

    /// Moves `n` characters in logical order, clamped to the text.
    pub fn move_by(&mut self, id: LocationId, n: isize) -> Result<()> {
        let pos = self.pos(id)?;
        let target = pos.saturating_add_signed(n).min(self.max_pos());
        let (fragment, index) = self.locate(target)?;
        let offset = self.fragments[fragment].visual_offset(index, self.direction);
        self.set_location(id, fragment, offset);
        if let Some(location) = self.locations.get_mut(id) {
            location.horizontal = None;
        }
        Ok(())
    }

    /// The offset in `fragment` closest to horizontal position `x`.
    fn offset_at_x(&self, fragment: FragmentId, x: u32) -> usize {
        let Some(f) = self.fragments.get(fragment) else {
            return 0;
        };
        let local = x.saturating_sub(self.fragment_x(f));
        let max = match f.layout_direction(self.direction) {
            Direction::LeftToRight => self.max_offset(fragment),
            Direction::RightToLeft => f.len().saturating_sub(1),
        };
        f.metrics.index_at(local).min(max)
    }

    fn vertical_move(&mut self, id: LocationId, target: Option<FragmentId>) -> Result<bool> {
        let location = self.location(id)?;
        let x = match location.horizontal {
            Some(x) => x,
            None => self.x_position(id)?,
        };
        let Some(target) = target else {
            return Ok(false);
        };
        let offset = self.offset_at_x(target, x);
        self.set_location(id, target, offset);
        if let Some(location) = self.locations.get_mut(id) {
            location.horizontal = Some(x);
        }
        Ok(true)
    }

    /// Moves to the line above, keeping the horizontal position.
    pub fn up(&mut self, id: LocationId) -> Result<bool> {
        let target = self.prev_fragment(self.location(id)?.fragment);
        self.vertical_move(id, target)
    }

    /// Moves to the line below, keeping the horizontal position.
    pub fn down(&mut self, id: LocationId) -> Result<bool> {
        let target = self.next_fragment(self.location(id)?.fragment);
        self.vertical_move(id, target)
    }

    /// Moves up by `height` pixels.
    pub fn page_up(&mut self, id: LocationId, height: u32) -> Result<bool> {
        let fragment = self.location(id)?.fragment;
        let y = self.fragment_top(fragment).saturating_sub(height);
        let target = self.fragment_covering(fragment, y);
        self.vertical_move(id, Some(target).filter(|&t| t != fragment))
    }

    /// Moves down by `height` pixels.
    pub fn page_down(&mut self, id: LocationId, height: u32) -> Result<bool> {
        let fragment = self.location(id)?.fragment;
        let y = self.fragment_top(fragment).saturating_add(height);
        let target = self.fragment_covering(fragment, y);
        self.vertical_move(id, Some(target).filter(|&t| t != fragment))
    }

    /// Moves to the character closest to the point `(x, y)`.
    pub fn moveto(&mut self, id: LocationId, x: u32, y: u32) -> Result<()> {
        let fragment = self.fragment_covering(self.location(id)?.fragment, y);
        let offset = self.offset_at_x(fragment, x);
        self.set_location(id, fragment, offset);
        if let Some(location) = self.locations.get_mut(id) {
            location.horizontal = None;
        }
        Ok(())
    }

    fn fragment_top(&self, fragment: FragmentId) -> u32 {
        self.fragments
            .get(fragment)
            .map_or(0, |f| self.fragment_y(f))
    }

    /// Walks from `start` to the fragment covering `y`, clamping to the
    /// first and last fragment.
    fn fragment_covering(&self, start: FragmentId, y: u32) -> FragmentId {
        let mut current = start;
        while y < self.fragment_top(current) {
            match self.prev_fragment(current) {
                Some(prev) => current = prev,
                None => return current,
            }
        }
        loop {
            let bottom = self.fragment_top(current)
                + self.fragments.get(current).map_or(0, |f| f.height());
            if y < bottom {
                return current;
            }
            match self.next_fragment(current) {
                Some(next) => current = next,
                None => return current,
            }
        }
    }
}
