// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Parser`] implementation.

use std::borrow::Cow;

use crate::{
    ast::{
        Argument, Background, Child, Document, Examples, Node, Outline, Row,
        Scenario, ScenarioNode, Step,
    },
    parser::{Error, Parser, Result},
};

/// Default [`Parser`], delegating to the [`gherkin`] crate.
///
/// [`gherkin`] doesn't expose positions of [`Examples`] table rows, so they
/// are recovered by scanning the raw text below the `Examples` keyword.
///
/// Scenarios of [`gherkin::Rule`]s are placed among the feature scenarios in
/// document order, while [`gherkin::Rule`] backgrounds are not recognized.
#[derive(Clone, Copy, Debug, Default)]
pub struct Basic;

impl Parser for Basic {
    fn parse(&self, uri: &str, text: &str) -> Result<Document> {
        // `gherkin` expects the input to be terminated with a newline.
        let text = if text.ends_with('\n') {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(format!("{text}\n"))
        };

        let feature =
            gherkin::Feature::parse(&*text, gherkin::GherkinEnv::default())
                .map_err(|e| Error::Rejected { reason: e.to_string() })?;

        let lines = text.lines().collect::<Vec<_>>();
        Ok(document(uri, &feature, &lines))
    }
}

/// Converts the parsed [`gherkin::Feature`] into a [`Document`].
fn document(uri: &str, feature: &gherkin::Feature, lines: &[&str]) -> Document {
    let mut scenarios = feature
        .scenarios
        .iter()
        .chain(feature.rules.iter().flat_map(|r| &r.scenarios))
        .collect::<Vec<_>>();
    scenarios.sort_by_key(|sc| sc.position.line);

    let children = feature
        .background
        .iter()
        .map(|bg| {
            Child::Background(Node::new(Background {
                keyword: bg.keyword.clone(),
                line: bg.position.line,
                steps: steps(&bg.steps),
            }))
        })
        .chain(scenarios.into_iter().map(|sc| {
            Child::Scenario(Node::new(scenario_node(sc, lines)))
        }))
        .collect();

    Document {
        uri: uri.to_owned(),
        keyword: feature.keyword.clone(),
        name: feature.name.clone(),
        tags: tags(&feature.tags),
        children,
    }
}

/// Converts the [`gherkin::Scenario`] into a [`ScenarioNode`].
///
/// A [`gherkin::Scenario`] with [`gherkin::Examples`] is an [`Outline`].
fn scenario_node(sc: &gherkin::Scenario, lines: &[&str]) -> ScenarioNode {
    let scenario = Scenario {
        keyword: sc.keyword.clone(),
        name: sc.name.clone(),
        line: sc.position.line,
        tags: tags(&sc.tags),
        steps: steps(&sc.steps),
    };

    if sc.examples.is_empty() {
        return ScenarioNode::Scenario(scenario);
    }

    ScenarioNode::Outline(Outline {
        scenario,
        examples: sc
            .examples
            .iter()
            .filter_map(|ex| examples(ex, lines))
            .collect(),
    })
}

/// Converts the [`gherkin::Examples`] into [`Examples`], if it has a table.
fn examples(ex: &gherkin::Examples, lines: &[&str]) -> Option<Examples> {
    let (header, body) = ex.table.as_ref()?.rows.split_first()?;

    // Header row is the first one, so body rows start from the second.
    let found = table_row_lines(lines, ex.position.line);
    let rows = body
        .iter()
        .enumerate()
        .map(|(i, cells)| Row {
            line: found
                .get(i + 1)
                .copied()
                .unwrap_or(ex.position.line + i + 2),
            cells: cells.clone(),
        })
        .collect();

    Some(Examples { line: ex.position.line, header: header.clone(), rows })
}

/// Finds 1-based lines of the table rows written below the `Examples`
/// keyword on the given 1-based `keyword_line`.
///
/// Blank and comment lines inside the table are skipped, and the table ends
/// on the first other line after a row has been seen.
fn table_row_lines(lines: &[&str], keyword_line: usize) -> Vec<usize> {
    let mut found = vec![];
    for (idx, line) in lines.iter().enumerate().skip(keyword_line) {
        let line = line.trim_start();
        if line.starts_with('|') {
            found.push(idx + 1);
        } else if line.is_empty() || line.starts_with('#') {
            continue;
        } else if !found.is_empty() {
            break;
        }
    }
    found
}

/// Converts [`gherkin::Step`]s into [`Step`] [`Node`]s.
fn steps(steps: &[gherkin::Step]) -> Vec<Node<Step>> {
    steps
        .iter()
        .map(|st| {
            Node::new(Step {
                keyword: format!("{} ", st.keyword.trim_end()),
                text: st.value.clone(),
                line: st.position.line,
                argument: st
                    .docstring
                    .clone()
                    .map(Argument::DocString)
                    .or_else(|| {
                        st.table
                            .as_ref()
                            .map(|t| Argument::DataTable(t.rows.clone()))
                    }),
            })
        })
        .collect()
}

/// Normalizes tags to start with `@`.
fn tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| {
            if t.starts_with('@') {
                t.clone()
            } else {
                format!("@{t}")
            }
        })
        .collect()
}
