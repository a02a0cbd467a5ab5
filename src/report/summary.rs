//! Markdown step summary.

use std::fmt::Write as _;

use crate::package::manifest::Manifest;

/// Heading line of the step summary.
pub const SUMMARY_HEADING: &str = "## 📦 Packaged Assets";

/// Render the summary block appended to the step summary file.
///
/// ```text
/// ## 📦 Packaged Assets
/// - **Total artifacts:** 2
///
/// ### Files:
/// - `README.md` (0.00 MB)
///   SHA256: `e3b0…`
/// ```
#[must_use]
pub fn render_summary(manifest: &Manifest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SUMMARY_HEADING}");
    let _ = writeln!(out, "- **Total artifacts:** {}", manifest.len());

    if !manifest.is_empty() {
        let _ = writeln!(out, "\n### Files:");
        for asset in manifest.assets() {
            let _ = writeln!(out, "- `{}` ({:.2} MB)", asset.filename, asset.size_mib());
            let _ = writeln!(out, "  SHA256: `{}`", asset.sha256);
        }
    }

    out
}
