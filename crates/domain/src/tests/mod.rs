// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod validation;

use crate::TicketNumber;

pub fn numbers(values: &[i64]) -> Vec<TicketNumber> {
    values
        .iter()
        .map(|v| TicketNumber::new(*v).expect("valid test number"))
        .collect()
}
