//! Configuration findings.
//!
//! Rules inspect validated [`StackInputs`](crate::components::StackInputs) and
//! report settings that are legal but questionable. Findings never change what
//! gets declared.
//!
//! | Rule | Severity | Finding |
//! |---|---|---|
//! | `KV001` | error | key vault soft delete disabled while retention is set |
//! | `ST001` | warning (error on `prod`) | storage account accepts HTTP |
//! | `ST002` | warning | storage network rules allow `0.0.0.0/0` |
//! | `WAF001` | warning | WAF allow-list empty, everything blocked |
//! | `NM001` | hint | a compact name was truncated |

mod rules;
mod types;

pub use rules::{check_stack, StackChecker};
pub use types::{LintConfig, LintIssue, LintResult, RuleCategory, Severity};
