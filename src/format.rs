// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stateless rendering of step names, multiline arguments and parameters.

use std::fmt::Write as _;

use itertools::Itertools as _;
use lazy_regex::regex;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    ast::{Argument, Step},
    report::Parameter,
};

/// Separator between a keyword and a name.
pub const COLON_INFIX: &str = ": ";

/// Default indentation of data table rows, in spaces.
pub const TABLE_INDENT: usize = 10;

/// Line break used in multiline arguments.
const NEW_LINE: &str = "\r\n";

/// Delimiter surrounding doc strings.
const DOCSTRING_DECORATOR: &str = "\n\"\"\"\n";

/// Renders a name as `prefix + keyword + text + suffix`.
#[must_use]
pub fn render_name(
    prefix: Option<&str>,
    keyword: &str,
    text: &str,
    suffix: Option<&str>,
) -> String {
    [prefix.unwrap_or_default(), keyword, text, suffix.unwrap_or_default()]
        .concat()
}

/// Renders the multiline argument of the `step` with the default
/// [`TABLE_INDENT`].
#[must_use]
pub fn render_multiline_argument(step: &Step) -> String {
    multiline_argument(step.argument.as_ref(), TABLE_INDENT)
}

/// Renders the multiline `argument`, indenting data table rows with `indent`
/// spaces.
///
/// Empty if there is no `argument`.
#[must_use]
pub fn multiline_argument(argument: Option<&Argument>, indent: usize) -> String {
    let mut out = String::new();
    match argument {
        Some(Argument::DataTable(rows)) => {
            out.push_str(NEW_LINE);
            for row in rows {
                let cells = row.iter().map(|c| format!(" {c} |")).join("");
                _ = write!(out, "{:indent$}|{cells}{NEW_LINE}", "");
            }
        }
        Some(Argument::DocString(doc)) => {
            out.extend([DOCSTRING_DECORATOR, doc.as_str(), DOCSTRING_DECORATOR]);
        }
        None => {}
    }
    out
}

/// Extracts the named parameters of a step, pairing `<placeholder>`s of the
/// static `text` with the runtime `values` by position.
///
/// Names have no meaning beyond being reported: the `i`-th placeholder is
/// paired with the `i`-th value. Extra placeholders or values are dropped.
#[must_use]
pub fn extract_parameters<S: AsRef<str>>(
    text: &str,
    values: &[S],
) -> Vec<Parameter> {
    /// [`Regex`] matching a placeholder with no nested angle brackets.
    static PLACEHOLDER: &Lazy<Regex> = regex!(r"<[^<>]+>");

    PLACEHOLDER
        .find_iter(text)
        .map(|m| {
            let s = m.as_str();
            &s[1..s.len() - 1]
        })
        .zip(values.iter().map(|v| -> &str { v.as_ref() }))
        .map(|(key, value)| Parameter {
            key: key.to_owned(),
            value: value.to_owned(),
        })
        .collect()
}

/// Reference to the code of a scenario: its `uri` and `line`.
#[must_use]
pub fn code_ref(uri: &str, line: usize) -> String {
    format!("{uri}:{line}")
}

/// Derives a test case identifier from the `code_ref` and the step
/// `arguments`.
#[must_use]
pub fn test_case_id<S: AsRef<str>>(
    code_ref: Option<&str>,
    arguments: &[S],
) -> Option<String> {
    let code_ref = code_ref?;
    if arguments.is_empty() {
        return Some(code_ref.to_owned());
    }
    Some(format!(
        "{code_ref}[{}]",
        arguments.iter().map(|a| -> &str { a.as_ref() }).join(","),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(key: &str, value: &str) -> Parameter {
        Parameter { key: key.into(), value: value.into() }
    }

    #[test]
    fn renders_names() {
        assert_eq!(
            render_name(Some("[BG]: "), "Given ", "a precondition", Some("")),
            "[BG]: Given a precondition",
        );
        assert_eq!(render_name(None, "Then ", "done", None), "Then done");
        assert_eq!(
            render_name(None, "Scenario Outline: ", "eating", Some("[2]")),
            "Scenario Outline: eating[2]",
        );
    }

    #[test]
    fn renders_data_tables() {
        let table = Argument::DataTable(vec![
            vec!["kind".into(), "amount".into()],
            vec!["cucumber".into(), "3".into()],
        ]);

        assert_eq!(
            multiline_argument(Some(&table), 2),
            "\r\n  | kind | amount |\r\n  | cucumber | 3 |\r\n",
        );
        assert!(multiline_argument(Some(&table), TABLE_INDENT)
            .contains("\r\n          | kind | amount |\r\n"));
    }

    #[test]
    fn renders_doc_strings() {
        let step = Step {
            keyword: "Then ".into(),
            text: "I should see".into(),
            line: 12,
            argument: Some(Argument::DocString("9 left".into())),
        };

        assert_eq!(render_multiline_argument(&step), "\n\"\"\"\n9 left\n\"\"\"\n");
    }

    #[test]
    fn renders_nothing_without_argument() {
        assert_eq!(multiline_argument(None, TABLE_INDENT), "");
    }

    #[test]
    fn pairs_parameters_by_position() {
        assert_eq!(
            extract_parameters("I have <count> <item>s", &["3", "apples"]),
            [param("count", "3"), param("item", "apples")],
        );
        assert_eq!(
            extract_parameters("<b> before <a>", &["1", "2"]),
            [param("b", "1"), param("a", "2")],
        );
    }

    #[test]
    fn drops_unmatched_parameters() {
        assert!(extract_parameters("no placeholders here", &["ignored"])
            .is_empty());
        assert_eq!(
            extract_parameters("<a> <b> <c>", &["1"]),
            [param("a", "1")],
        );
        assert_eq!(
            extract_parameters("<a>", &["1", "2", "3"]),
            [param("a", "1")],
        );
        assert!(extract_parameters::<&str>("<a>", &[]).is_empty());
    }

    #[test]
    fn skips_nested_angle_brackets() {
        assert_eq!(
            extract_parameters("x <<inner>> <> <ok>", &["1", "2"]),
            [param("inner", "1"), param("ok", "2")],
        );
    }

    #[test]
    fn derives_references() {
        assert_eq!(code_ref("features/a.feature", 4), "features/a.feature:4");
        assert_eq!(test_case_id::<&str>(None, &[]), None);
        assert_eq!(
            test_case_id::<&str>(Some("steps::eat"), &[]).as_deref(),
            Some("steps::eat"),
        );
        assert_eq!(
            test_case_id(Some("steps::eat"), &["3", "apples"]).as_deref(),
            Some("steps::eat[3,apples]"),
        );
    }
}
