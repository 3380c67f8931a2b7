//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the rematch engine. A fixture is
//! one declarative pattern plus the cases it is checked against:
//!
//! ```yaml
//! name: pair_then_rest
//! description: first two elements fixed, remainder captured
//! pattern:
//!   type: array
//!   items:
//!     - { type: literal, value: 1 }
//!     - { type: rest }
//! cases:
//!   - name: captures tail
//!     input: [1, 2, 3]
//!     lazy: true
//!     expect: { matched: true, rest: [2, 3] }
//! ```

use rematch::{MatchResult, PatternConfig, Registry, RegistryBuilder, Value};
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub pattern: PatternConfig,
    /// When set, loading the pattern must fail with a message containing this text.
    #[serde(default)]
    pub load_error: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    /// Input as plain data. `null` here is `Value::Null`.
    #[serde(default)]
    pub input: serde_json::Value,
    /// Feed a top-level array as a one-pass sequence instead.
    #[serde(default)]
    pub lazy: bool,
    pub expect: Expectation,
}

/// What a case must produce. Unset fields are not checked.
#[derive(Debug, Default, Deserialize)]
pub struct Expectation {
    #[serde(default)]
    pub matched: Option<bool>,
    /// Bound value, as JSON.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    /// `rest` capture, as JSON.
    #[serde(default)]
    pub rest: Option<serde_json::Value>,
    /// Sorted unmatched keys of a failed record match.
    #[serde(default)]
    pub unmatched_keys: Option<Vec<String>>,
    /// `kind` of the top-level mismatch diagnostic.
    #[serde(default)]
    pub mismatch: Option<String>,
    /// Evaluation must fail with a message containing this text.
    #[serde(default)]
    pub error: Option<String>,
}

impl TestCase {
    /// Build the input value for this case.
    #[must_use]
    pub fn build_input(&self) -> Value {
        match (&self.input, self.lazy) {
            (serde_json::Value::Array(items), true) => {
                let values: Vec<Value> = items.iter().cloned().map(Value::from).collect();
                Value::sequence(values)
            }
            (input, _) => Value::from(input.clone()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    /// First failed check, if any.
    pub detail: Option<String>,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results.
    ///
    /// A load failure is reported as a single synthetic case named `<load>`.
    pub fn run(&self, registry: &Registry) -> Vec<CaseResult> {
        let loaded = registry.load_pattern(self.pattern.clone());

        let matcher = match (loaded, &self.load_error) {
            (Ok(_), Some(expected)) => {
                return vec![load_case(Some(format!(
                    "expected load error containing {expected:?}, but the pattern loaded"
                )))];
            }
            (Err(e), Some(expected)) => {
                let message = e.to_string();
                let detail = (!message.contains(expected.as_str()))
                    .then(|| format!("load error {message:?} does not contain {expected:?}"));
                return vec![load_case(detail)];
            }
            (Err(e), None) => return vec![load_case(Some(format!("load failed: {e}")))],
            (Ok(matcher), None) => matcher,
        };

        self.cases
            .iter()
            .map(|case| {
                let outcome = matcher.apply(&case.build_input());
                let detail = check(&case.expect, outcome);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: detail.is_none(),
                    detail,
                }
            })
            .collect()
    }

    /// Run all test cases against the test-domain registry and panic on
    /// first failure.
    pub fn run_and_assert(&self) {
        let registry = crate::register(RegistryBuilder::new()).build();
        for result in self.run(&registry) {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: {}",
                self.name,
                result.case_name,
                result.detail.unwrap_or_default()
            );
        }
    }
}

fn load_case(detail: Option<String>) -> CaseResult {
    CaseResult {
        case_name: "<load>".into(),
        passed: detail.is_none(),
        detail,
    }
}

fn check(
    expect: &Expectation,
    outcome: Result<MatchResult, rematch::MatcherError>,
) -> Option<String> {
    let result = match (outcome, &expect.error) {
        (Err(e), Some(expected)) => {
            let message = e.to_string();
            return (!message.contains(expected.as_str()))
                .then(|| format!("error {message:?} does not contain {expected:?}"));
        }
        (Err(e), None) => return Some(format!("unexpected error: {e}")),
        (Ok(result), Some(expected)) => {
            return Some(format!(
                "expected error containing {expected:?}, got {}",
                result.to_json()
            ));
        }
        (Ok(result), None) => result,
    };

    if let Some(matched) = expect.matched {
        if result.is_matched() != matched {
            return Some(format!("expected matched={matched}, got {}", result.to_json()));
        }
    }
    if let Some(value) = &expect.value {
        let actual = result.value().map(Value::to_json);
        if actual.as_ref() != Some(value) {
            return Some(format!("expected value {value}, got {actual:?}"));
        }
    }
    if let Some(rest) = &expect.rest {
        let actual = result
            .as_matched()
            .and_then(|m| m.rest.as_ref())
            .map(Value::to_json);
        if actual.as_ref() != Some(rest) {
            return Some(format!("expected rest {rest}, got {actual:?}"));
        }
    }
    if let Some(keys) = &expect.unmatched_keys {
        let actual = result.key_report().map(|r| &r.unmatched_keys);
        if actual != Some(keys) {
            return Some(format!("expected unmatched keys {keys:?}, got {actual:?}"));
        }
    }
    if let Some(kind) = &expect.mismatch {
        let rendered = result.to_json();
        let actual = rendered["mismatch"]["kind"].as_str();
        if actual != Some(kind.as_str()) {
            return Some(format!("expected mismatch {kind:?}, got {rendered}"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r"
name: literal_pair
description: exact two-element array
pattern:
  type: literal
  value: [1, 2]
cases:
  - name: exact
    input: [1, 2]
    expect: { matched: true, value: [1, 2] }
  - name: too long
    input: [1, 2, 3]
    lazy: true
    expect: { matched: false, mismatch: trailing }
";

    #[test]
    fn parses_and_runs_fixture() {
        let fixture = Fixture::from_yaml(FIXTURE).unwrap();
        assert_eq!(fixture.cases.len(), 2);
        assert!(fixture.cases[1].lazy);
        fixture.run_and_assert();
    }

    #[test]
    fn failing_expectation_is_reported() {
        let mut fixture = Fixture::from_yaml(FIXTURE).unwrap();
        fixture.cases[0].expect.matched = Some(false);
        let registry = crate::register(RegistryBuilder::new()).build();
        let results = fixture.run(&registry);
        assert!(!results[0].passed);
        assert!(results[0].detail.as_deref().unwrap().contains("expected matched=false"));
        assert!(results[1].passed);
    }

    #[test]
    fn lazy_input_is_a_sequence() {
        let case = TestCase {
            name: "lazy".into(),
            input: serde_json::json!([1]),
            lazy: true,
            expect: Expectation::default(),
        };
        assert!(matches!(case.build_input(), Value::Sequence(_)));
    }

    #[test]
    fn load_error_fixture() {
        let yaml = r#"
name: bad_regex
pattern: { type: regex, pattern: "(" }
load_error: invalid pattern
"#;
        let fixture = Fixture::from_yaml(yaml).unwrap();
        fixture.run_and_assert();
    }
}
