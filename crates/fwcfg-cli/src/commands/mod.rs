//! Command implementations for fwcfg-cli

pub mod check;
pub mod explain;
pub mod init;
pub mod list;
pub mod report;
pub mod resolve;

pub use check::run_check;
pub use explain::run_explain;
pub use init::run_init;
pub use list::run_list;
pub use report::run_report;
pub use resolve::run_resolve;

use colored::{ColoredString, Colorize};
use fwcfg_core::{Diagnostic, Severity};

fn severity_prefix(severity: Severity) -> ColoredString {
    match severity {
        Severity::Warning => "warn".yellow(),
        Severity::Fatal => "error".red(),
    }
}

/// One diagnostic as a colored line
fn format_diagnostic(d: &Diagnostic) -> String {
    let mut line = format!("  [{}] {}", severity_prefix(d.severity), d.message);
    if let Some(n) = d.line {
        line.push_str(&format!(" {}", format!("(line {})", n).dimmed()));
    }
    line
}
