// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for parsing [Gherkin] sources into a [`Document`].
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

pub mod basic;

use derive_more::{Display, Error};

use crate::ast::Document;

#[doc(inline)]
pub use self::basic::Basic;

/// Parser of raw [Gherkin] text into a [`Document`].
///
/// Implementations must not panic on malformed input, returning an [`Error`]
/// instead.
///
/// [Gherkin]: https://cucumber.io/docs/gherkin/reference
pub trait Parser {
    /// Parses the `text` read from the given `uri`.
    ///
    /// # Errors
    ///
    /// If the `text` is not a valid [Gherkin] feature.
    ///
    /// [Gherkin]: https://cucumber.io/docs/gherkin/reference
    fn parse(&self, uri: &str, text: &str) -> Result<Document>;
}

/// Result of parsing [Gherkin] sources.
///
/// [Gherkin]: https://cucumber.io/docs/gherkin/reference
pub type Result<T> = std::result::Result<T, Error>;

/// [`Parser`] error.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum Error {
    /// The text was rejected by the grammar.
    #[display("Failed to parse feature: {reason}")]
    Rejected {
        /// Diagnostic of the underlying parser.
        reason: String,
    },
}
