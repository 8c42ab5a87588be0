// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction options.

use crate::bidi::Direction;

/// Horizontal alignment of fragments within the wrap width.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Alignment {
    /// This is [`Alignment::Left`] for LTR text and [`Alignment::Right`] for RTL text.
    #[default]
    Start,
    /// This is [`Alignment::Right`] for LTR text and [`Alignment::Left`] for RTL text.
    End,
    /// Align content to the left edge.
    ///
    /// For alignment that should be aware of text direction, use [`Alignment::Start`] or
    /// [`Alignment::End`] instead.
    Left,
    /// Align each line centered within the container.
    Middle,
    /// Align content to the right edge.
    ///
    /// For alignment that should be aware of text direction, use [`Alignment::Start`] or
    /// [`Alignment::End`] instead.
    Right,
}

impl Alignment {
    /// Returns the horizontal offset of a line of `line_width` inside `container_width`.
    pub(crate) fn offset(self, direction: Direction, container_width: u32, line_width: u32) -> u32 {
        let free_space = container_width.saturating_sub(line_width);
        match (self, direction) {
            (Self::Left, _)
            | (Self::Start, Direction::LeftToRight)
            | (Self::End, Direction::RightToLeft) => 0,
            (Self::Right, _)
            | (Self::Start, Direction::RightToLeft)
            | (Self::End, Direction::LeftToRight) => free_space,
            (Self::Middle, _) => free_space / 2,
        }
    }
}

/// The requested base (paragraph embedding) direction.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum BaseDirection {
    /// Determine the direction from the first strong character of the text.
    #[default]
    Auto,
    /// Left-to-right paragraphs.
    LeftToRight,
    /// Right-to-left paragraphs.
    RightToLeft,
}

impl BaseDirection {
    pub(crate) fn fixed(self) -> Option<Direction> {
        match self {
            Self::Auto => None,
            Self::LeftToRight => Some(Direction::LeftToRight),
            Self::RightToLeft => Some(Direction::RightToLeft),
        }
    }
}

/// Options for [`RichText::new`](crate::RichText::new).
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct RichTextOptions {
    /// Alignment of each line.
    pub alignment: Alignment,
    /// Base direction of every paragraph.
    pub direction: BaseDirection,
    /// Wrap width in pixels. `0` leaves the text unwrapped.
    pub wrap_width: u32,
    /// Editable text keeps a synthetic trailing newline that the cursor can rest on.
    pub is_editor: bool,
}

impl RichTextOptions {
    /// Options for a read-only label.
    pub fn label() -> Self {
        Self::default()
    }

    /// Options for an editable text field.
    pub fn editor() -> Self {
        Self {
            is_editor: true,
            ..Self::default()
        }
    }

    /// Sets the alignment.
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the base direction.
    #[must_use]
    pub fn with_direction(mut self, direction: BaseDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the wrap width.
    #[must_use]
    pub fn with_wrap_width(mut self, wrap_width: u32) -> Self {
        self.wrap_width = wrap_width;
        self
    }
}
