// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI options of a [`Reporter`].
//!
//! [`Reporter`]: crate::Reporter

use smart_default::SmartDefault;

use crate::format::TABLE_INDENT;

/// CLI options of a [`Reporter`].
///
/// Meant to be [flatten]ed into the CLI options of a test binary.
///
/// [`Reporter`]: crate::Reporter
/// [flatten]: https://docs.rs/clap/latest/clap/_derive/index.html#flattening-hand-implemented-args-into-a-derived-application
#[derive(Clone, Copy, Debug, SmartDefault, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Indentation of data table rows in step descriptions, in spaces.
    #[arg(long, value_name = "N", default_value_t = TABLE_INDENT)]
    #[default(TABLE_INDENT)]
    pub rp_table_indent: usize,

    /// Don't prefix the names of background steps with the background
    /// keyword.
    #[arg(long)]
    pub rp_no_background_prefix: bool,

    /// Report steps as nested items not counted in statistics.
    #[arg(long)]
    pub rp_steps_without_stats: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Opts {
        #[command(flatten)]
        rp: Cli,
    }

    #[test]
    fn defaults_match_clap_defaults() {
        let parsed = Opts::try_parse_from(["test"]).expect("parsed").rp;
        let default = Cli::default();

        assert_eq!(parsed.rp_table_indent, TABLE_INDENT);
        assert_eq!(default.rp_table_indent, TABLE_INDENT);
        assert!(!parsed.rp_no_background_prefix);
        assert!(!default.rp_steps_without_stats);
    }

    #[test]
    fn parses_flags() {
        let cli = Opts::try_parse_from([
            "test",
            "--rp-table-indent",
            "2",
            "--rp-no-background-prefix",
            "--rp-steps-without-stats",
        ])
        .expect("parsed")
        .rp;

        assert_eq!(cli.rp_table_indent, 2);
        assert!(cli.rp_no_background_prefix);
        assert!(cli.rp_steps_without_stats);
    }

    #[test]
    fn rejects_invalid_indent() {
        assert!(Opts::try_parse_from(["test", "--rp-table-indent", "wide"])
            .is_err());
    }
}
