// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use crate::testing::FixedFontMetrics;
use crate::{BaseDirection, RichText, RichTextOptions};

/// Builds models over one shared font provider.
pub(crate) struct TestEnv {
    fonts: Arc<FixedFontMetrics>,
}

impl TestEnv {
    /// Every character is 10 pixels wide; lines are 12 pixels high.
    pub(crate) fn new() -> Self {
        Self::with_fonts(FixedFontMetrics::new(10))
    }

    pub(crate) fn with_fonts(fonts: FixedFontMetrics) -> Self {
        Self {
            fonts: Arc::new(fonts),
        }
    }

    pub(crate) fn build(&self, text: &str, options: RichTextOptions) -> RichText {
        RichText::new(self.fonts.clone(), text, options)
            .unwrap_or_else(|e| panic!("failed to build {text:?}: {e}"))
    }

    pub(crate) fn label(&self, text: &str, wrap_width: u32) -> RichText {
        self.build(text, RichTextOptions::label().with_wrap_width(wrap_width))
    }

    pub(crate) fn rtl_label(&self, text: &str, wrap_width: u32) -> RichText {
        self.build(
            text,
            RichTextOptions::label()
                .with_direction(BaseDirection::RightToLeft)
                .with_wrap_width(wrap_width),
        )
    }

    pub(crate) fn editor(&self, text: &str, wrap_width: u32) -> RichText {
        self.build(text, RichTextOptions::editor().with_wrap_width(wrap_width))
    }
}
