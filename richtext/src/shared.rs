// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`RichText`] shared between a UI thread and its readers.

use core::marker::PhantomData;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, MutexGuard};

use crate::error::{Result, ValidationError};
use crate::model::RichText;

/// Proof of running on a particular thread.
///
/// The token cannot leave the thread that created it.
#[derive(Debug)]
pub struct UiThread {
    id: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl UiThread {
    /// A token for the calling thread.
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
            _not_send: PhantomData,
        }
    }
}

/// A [`RichText`] owned by one thread.
///
/// Mutation requires the owner's [`UiThread`] token. Any thread may take a
/// consistent read snapshot with [`SharedRichText::read`].
#[derive(Debug)]
pub struct SharedRichText {
    owner: ThreadId,
    inner: Mutex<RichText>,
}

impl SharedRichText {
    /// Wraps `text`, making the thread of `owner` its owner.
    pub fn new(text: RichText, owner: &UiThread) -> Self {
        Self {
            owner: owner.id,
            inner: Mutex::new(text),
        }
    }

    /// Locks the text for mutation.
    pub fn lock(&self, thread: &UiThread) -> Result<MutexGuard<'_, RichText>> {
        if thread.id != self.owner {
            log::warn!("rich text locked from a foreign thread");
            return Err(ValidationError::WrongThread.into());
        }
        Ok(self.inner.lock())
    }

    /// Runs `f` on the text under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&RichText) -> R) -> R {
        f(&self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::{SharedRichText, UiThread};
    use crate::error::ValidationError;
    use crate::testing::FixedFontMetrics;
    use crate::{RichText, RichTextOptions};
    use alloc::sync::Arc;

    fn shared() -> SharedRichText {
        let fonts = Arc::new(FixedFontMetrics::new(10));
        let text = RichText::new(fonts, "abc", RichTextOptions::editor()).unwrap();
        SharedRichText::new(text, &UiThread::current())
    }

    #[test]
    fn owner_can_mutate() {
        let shared = shared();
        let ui = UiThread::current();
        {
            let mut text = shared.lock(&ui).unwrap();
            let end = text.end().unwrap();
            text.insert(end, "d").unwrap();
        }
        assert_eq!(shared.read(|t| t.num_chars()), 5);
    }

    #[test]
    fn other_threads_only_read() {
        let shared = Arc::new(shared());
        let reader = Arc::clone(&shared);
        let (chars, error) = std::thread::spawn(move || {
            let err = reader.lock(&UiThread::current()).map(|_| ()).unwrap_err();
            (reader.read(|t| t.num_chars()), err)
        })
        .join()
        .unwrap();
        assert_eq!(chars, 4);
        assert_eq!(error.as_validation(), Some(&ValidationError::WrongThread));
    }
}
