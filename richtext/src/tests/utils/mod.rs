// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod asserts;
mod env;

pub(crate) use asserts::{assert_consistent, fragment_texts, logical_breaks};
pub(crate) use env::TestEnv;
