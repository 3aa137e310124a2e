//! Cost estimation and the operator confirmation gate.
//!
//! Translation is billed per character, so a run only proceeds after the
//! operator accepts the estimate for the pending keys.
use crate::catalog::{Catalog, Value};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Default billing rate in dollars per character.
pub const DEFAULT_COST_PER_CHAR: f64 = 0.000015;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub total_chars: usize,
    pub cost: f64,
}

/// Characters the backend receives for one value: the text itself for plain
/// values, the serialized segment object for structured ones.
pub fn billable_chars(value: &Value) -> usize {
    match value {
        Value::Plain(text) => text.chars().count(),
        Value::Structured(_) => value.to_json().to_string().chars().count(),
    }
}

pub fn estimate(missing: &Catalog, cost_per_char: f64) -> CostEstimate {
    let total_chars = missing.values().map(billable_chars).sum();
    CostEstimate {
        total_chars,
        cost: total_chars as f64 * cost_per_char,
    }
}

/// Blocks until the operator accepts or rejects an estimate.
pub trait Confirm {
    fn confirm(&mut self, locale: &str, estimate: &CostEstimate) -> Result<bool>;
}

/// Interactive prompt over any line reader and writer (stdin/stdout in the CLI).
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, locale: &str, estimate: &CostEstimate) -> Result<bool> {
        writeln!(
            self.output,
            "Translation to {locale} will cost approximately ${:.6} based on {} characters.",
            estimate.cost, estimate.total_chars
        )
        .context("write cost estimate")?;
        write!(self.output, "Do you wish to continue? (Y/N): ").context("write prompt")?;
        self.output.flush().context("flush prompt")?;

        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .context("read confirmation")?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn missing() -> Catalog {
        serde_json::from_value(json!({
            "greet": "Héllo",
            "cta": {"link_1": "/go"}
        }))
        .expect("parse catalog")
    }

    #[test]
    fn estimate_counts_characters_not_bytes() {
        let estimate = estimate(&missing(), DEFAULT_COST_PER_CHAR);
        let structured_chars = r#"{"link_1":"/go"}"#.len();
        assert_eq!(estimate.total_chars, 5 + structured_chars);
        let expected_cost = estimate.total_chars as f64 * DEFAULT_COST_PER_CHAR;
        assert!((estimate.cost - expected_cost).abs() < 1e-12);
    }

    #[test]
    fn estimate_of_nothing_is_free() {
        let estimate = estimate(&Catalog::new(), DEFAULT_COST_PER_CHAR);
        assert_eq!(estimate.total_chars, 0);
        assert_eq!(estimate.cost, 0.0);
    }

    #[test]
    fn prompt_accepts_only_yes() {
        let estimate = CostEstimate {
            total_chars: 10,
            cost: 0.00015,
        };
        let cases = [
            ("Y\n", true),
            (" y \n", true),
            ("N\n", false),
            ("yes\n", false),
            ("", false),
        ];
        for (answer, expected) in cases {
            let mut output = Vec::new();
            let mut prompt = PromptConfirm::new(answer.as_bytes(), &mut output);
            let accepted = prompt.confirm("fr", &estimate).expect("confirm");
            assert_eq!(accepted, expected, "answer {answer:?}");
            let shown = String::from_utf8(output).expect("utf8 prompt");
            assert!(shown.contains("$0.000150 based on 10 characters"));
        }
    }
}
