// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrapped, editable, bidirectional rich text.
//!
//! A [`RichText`] holds styled text as paragraphs, and wraps every
//! paragraph into fragments, one per visual line. Each fragment keeps its
//! characters in display order together with their measured widths, so a
//! renderer can draw it directly. Edits, rewrapping and cursor movement keep
//! the fragments, the break classification and every attached
//! [`LocationId`] consistent.
//!
//! Glyph measurement is delegated to a [`FontMetrics`] provider.
//!
//! ```
//! use std::sync::Arc;
//! use richtext::testing::FixedFontMetrics;
//! use richtext::{RichText, RichTextOptions};
//!
//! let fonts = Arc::new(FixedFontMetrics::new(10));
//! let mut text = RichText::new(fonts, "Hello", RichTextOptions::editor())?;
//! let end = text.end()?;
//! text.insert(end, " world")?;
//! assert_eq!(text.text().to_string(), "Hello world\n");
//! text.rewrap(60)?;
//! assert_eq!(text.num_fragments(), 2);
//! # Ok::<(), richtext::Error>(())
//! ```

extern crate alloc;

mod analysis;
mod bidi;
mod edit;
mod error;
mod font;
mod fragment;
mod location;
mod metrics;
mod model;
mod options;
mod paragraph;
mod range;
mod shared;
mod string;
mod validate;
mod wrap;

pub mod testing;

pub use analysis::BreakOpportunity;
pub use bidi::{Direction, RunDirection};
pub use error::{Error, InternalFault, Result, ValidationError};
pub use font::{FontId, FontMetrics};
pub use fragment::FragmentId;
pub use location::LocationId;
pub use model::{FragmentView, RichText};
pub use options::{Alignment, BaseDirection, RichTextOptions};
pub use range::BidiRange;
pub use shared::{SharedRichText, UiThread};
pub use string::{LinkId, RichString, TextMeta};
pub use wrap::{MergeKind, SplitKind, SplitRule, WrapStep};

#[cfg(test)]
mod tests;
