// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of correlating runtime events with parsed features.
//!
//! Every variant carries enough context (URI, line, scenario name) to
//! diagnose a divergence between the runtime and the static views.

use derive_more::{Display, Error};

/// Error of correlating a runtime event with a parsed feature.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum Error {
    /// No source text was registered for the URI.
    #[display("No source text registered for feature `{uri}`")]
    UnreadableSource {
        /// URI of the feature.
        uri: String,
    },

    /// The registered source text was rejected by the parser.
    #[display("Feature `{uri}` cannot be parsed: {reason}")]
    InvalidSource {
        /// URI of the feature.
        uri: String,

        /// Parser diagnostic.
        reason: String,
    },

    /// No scenario of the feature matches the runtime line and name.
    #[display("No scenario `{name}` found at {uri}:{line}")]
    ScenarioNotFound {
        /// URI of the feature.
        uri: String,

        /// Line reported by the runtime.
        line: usize,

        /// Name reported by the runtime.
        name: String,
    },

    /// The runtime line is not a row of any `Examples` table of the outline.
    #[display("No outline iteration found for scenario `{name}` at {uri}:{line}")]
    OutlineIterationNotFound {
        /// URI of the feature.
        uri: String,

        /// Line reported by the runtime.
        line: usize,

        /// Name of the outline.
        name: String,
    },

    /// A step was reported for a line not belonging to the scenario or its
    /// background.
    #[display(
        "Trying to get step for unknown line {step_line} in scenario `{name}` \
         at {uri}:{line}"
    )]
    UnknownStepLine {
        /// URI of the feature.
        uri: String,

        /// Running line of the scenario.
        line: usize,

        /// Name of the scenario.
        name: String,

        /// Line reported for the step.
        step_line: usize,
    },

    /// An identifier was assigned twice to the same running scenario.
    #[display(
        "Attempting to re-set identifier of unfinished scenario `{name}` at \
         {uri}:{line}"
    )]
    IdentifierReassigned {
        /// URI of the feature.
        uri: String,

        /// Running line of the scenario.
        line: usize,

        /// Name of the scenario.
        name: String,
    },
}

impl Error {
    /// Indicates whether this [`Error`] concerns the whole feature document
    /// (it's missing or unparsable) rather than a single scenario.
    ///
    /// Scenarios of such documents can still be reported, just without their
    /// source structure.
    #[must_use]
    pub const fn is_document_error(&self) -> bool {
        matches!(
            self,
            Self::UnreadableSource { .. } | Self::InvalidSource { .. },
        )
    }
}

/// Result of correlating runtime events with parsed features.
pub type Result<T> = std::result::Result<T, Error>;
