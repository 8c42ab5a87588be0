// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_edit;
mod test_scenarios;
mod test_wrap;
mod utils;
