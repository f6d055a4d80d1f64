//! Colored output helpers for CLI
//!
//! Status lines go to stderr so stdout carries only the JSON report.

use crate::types::AnalysisReport;
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✓".green().bold(), message.green());
        } else {
            eprintln!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "•".blue(), message);
        } else {
            eprintln!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            eprintln!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            eprintln!("\n  {}", title.bright_white().bold().underline());
        } else {
            eprintln!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            eprintln!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            eprintln!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            eprintln!("    {} {}", "•".blue(), item);
        } else {
            eprintln!("    - {}", item);
        }
    }

    /// Print a one-screen digest of a finished analysis
    pub fn report_summary(&self, report: &AnalysisReport) {
        self.header("Analysis Summary");
        self.kv("drug", report.plan.drug().unwrap_or("unknown"));
        self.kv("indication", report.plan.indication().unwrap_or("unknown"));
        self.kv(
            "clinical signal",
            report.clinical.overall_signal().unwrap_or("unknown"),
        );
        self.kv(
            "freedom to operate",
            report.patent.freedom_to_operate().unwrap_or("unknown"),
        );
        self.kv(
            "hypothesis strength",
            &report
                .synthesis
                .score()
                .map(|score| score.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
        );

        let risks = report.synthesis.key_risks();
        if !risks.is_empty() {
            self.header("Key Risks");
            for risk in &risks {
                self.list_item(risk);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClinicalReport, Document, PatentReport, Plan, Synthesis};
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_output_new() {
        let output = Output::new();
        assert!(output.colored);
    }

    #[test]
    fn test_output_no_color() {
        let output = Output::no_color();
        assert!(!output.colored);
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::new(), Output::no_color()] {
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.header("Test Header");
            output.kv("key", "value");
            output.list_item("item");
        }
    }

    #[test]
    fn test_report_summary_handles_sparse_report() {
        let report = AnalysisReport {
            plan: Plan::from_document(Document::new()),
            clinical: ClinicalReport::from_document(Document::new()),
            patent: PatentReport::from_document(Document::new()),
            synthesis: Synthesis::from_document(doc(json!({
                "hypothesis_strength_score": {"value": 61},
                "key_risks": ["Small trials"]
            }))),
        };

        Output::no_color().report_summary(&report);
    }
}
