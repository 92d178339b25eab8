//! Compliance rule engines
//!
//! - technical: format, size, aspect ratio and color space rules over metadata
//! - background: edge/center whiteness statistics and product coverage
//! - content: interpretation of remote vision annotations

pub mod background;
pub mod content;
pub mod technical;

use aplus_core::Finding;

pub use background::BackgroundStats;

/// Issues and warnings produced by one rule engine, in evaluation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleFindings {
    pub issues: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl RuleFindings {
    /// Route a finding into the bucket matching its severity
    pub fn push(&mut self, finding: Finding) {
        if finding.is_issue() {
            self.issues.push(finding);
        } else {
            self.warnings.push(finding);
        }
    }

    /// Append another engine's findings after this one's
    pub fn extend(&mut self, other: RuleFindings) {
        self.issues.extend(other.issues);
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.warnings.is_empty()
    }
}

/// Ratio rendered as a one-decimal percentage, e.g. `0.8512` -> `"85.1%"`
pub(crate) fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
