//! Common test utilities for the crate.
//!
//! This module provides reusable fixtures used across multiple test modules.

pub mod common {
    use crate::{
        ast::{Background, Child, Document, Node, Scenario, ScenarioNode, Step},
        index::FeatureIndex,
        parser::Basic,
        store::Sources,
    };

    /// URI the [`EATING`] feature is registered under.
    pub const EATING_URI: &str = "features/eating.feature";

    /// Feature with a background, plain scenarios and a two-block outline.
    ///
    /// Plain scenarios are on lines 8 and 33, the outline is on line 17 and
    /// its example rows are on lines 24, 25, 29, 30 and 31.
    pub const EATING: &str = "@smoke
Feature: Eating

  Background:
    Given there are cucumbers
    And a hungry person

  Scenario: plain eating
    When I eat cucumbers
      | kind     | amount |
      | cucumber | 3      |
    Then I should see
      \"\"\"
      9 cucumbers left
      \"\"\"

  Scenario Outline: eating <eat>
    Given there are <start> cucumbers
    When I eat <eat> cucumbers
    Then I should have <left> cucumbers

    Examples:
      | start | eat | left |
      | 12    | 5   | 7    |
      | 20    | 5   | 15   |

    Examples: more
      | start | eat | left |
      | 1     | 1   | 0    |
      | 2     | 1   | 1    |
      | 3     | 1   | 2    |

  Scenario: plain eating
    Then nothing happens
";

    /// Builds the [`FeatureIndex`] of the [`EATING`] feature.
    pub fn eating_index() -> FeatureIndex {
        let sources = Sources::new();
        _ = sources.register(EATING_URI, EATING);
        FeatureIndex::build(&sources, &Basic, EATING_URI)
            .expect("`EATING` feature should be indexed")
    }

    /// Creates a [`Step`] [`Node`] on the given `line`.
    pub fn step(keyword: &str, text: &str, line: usize) -> Node<Step> {
        Node::new(Step {
            keyword: keyword.to_owned(),
            text: text.to_owned(),
            line,
            argument: None,
        })
    }

    /// Builds a [`Document`] whose background step on line 3 collides with
    /// the scenario step on the same line.
    pub fn colliding_document() -> Document {
        Document {
            uri: "features/colliding.feature".into(),
            keyword: "Feature".into(),
            name: "Colliding".into(),
            tags: vec![],
            children: vec![
                Child::Background(Node::new(Background {
                    keyword: "Background".into(),
                    line: 2,
                    steps: vec![
                        step("Given ", "a background step", 3),
                        step("And ", "another background step", 4),
                    ],
                })),
                Child::Scenario(Node::new(ScenarioNode::Scenario(Scenario {
                    keyword: "Scenario".into(),
                    name: "colliding".into(),
                    line: 6,
                    tags: vec![],
                    steps: vec![
                        step("When ", "a scenario step", 3),
                        step("Then ", "a final step", 7),
                    ],
                }))),
            ],
        }
    }
}
