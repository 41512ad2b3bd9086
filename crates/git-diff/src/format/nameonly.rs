//! --name-only and --name-status output formats.

use bstr::ByteSlice;

use crate::DiffResult;

/// Format as --name-only (just file paths).
pub fn format_name_only(result: &DiffResult) -> String {
    let mut out = String::new();
    for file in &result.files {
        out.push_str(&file.path().to_str_lossy());
        out.push('\n');
    }
    out
}

/// Format as --name-status (status letter + file path).
pub fn format_name_status(result: &DiffResult) -> String {
    let mut out = String::new();
    for file in &result.files {
        out.push(file.status.as_char());
        out.push('\t');
        out.push_str(&file.path().to_str_lossy());
        out.push('\n');
    }
    out
}
