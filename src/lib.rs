// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Correlation of parsed [Gherkin] features with the runtime events of a
//! [Cucumber] test engine, reported as a hierarchy of [ReportPortal] test
//! items.
//!
//! The engine runs flattened scenarios ("pickles") and only reports source
//! lines and names. This crate recovers the static nodes being executed
//! ([`FeatureIndex`]), follows each running scenario ([`ScenarioTracker`])
//! and renders the test items for a [`Backend`] ([`Reporter`]).
//!
//! [Cucumber]: https://cucumber.io
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference
//! [ReportPortal]: https://reportportal.io

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(nonstandard_style, rustdoc::all, trivial_casts, trivial_numeric_casts)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::as_conversions,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::missing_docs_in_private_items,
    clippy::str_to_string,
    clippy::unwrap_used,
    missing_docs
)]

pub mod ast;
pub mod backend;
pub mod cli;
pub mod error;
pub mod event;
pub mod format;
pub mod index;
pub mod metadata;
pub mod parser;
pub mod report;
pub mod reporter;
pub mod store;
pub mod tracker;

#[cfg(test)]
mod test_utils;

#[doc(inline)]
pub use self::{
    backend::Backend,
    cli::Cli,
    error::{Error, Result},
    event::Event,
    index::FeatureIndex,
    metadata::StepMetadata,
    parser::Parser,
    reporter::Reporter,
    store::{Features, Outlines, Sources},
    tracker::ScenarioTracker,
};
