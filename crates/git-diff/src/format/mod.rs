//! Diff output formatters.

pub mod nameonly;
pub mod unified;

use crate::{DiffOptions, DiffOutputFormat, DiffResult};

/// Format a DiffResult according to the specified output format.
pub fn format_diff(result: &DiffResult, options: &DiffOptions) -> String {
    match options.output_format {
        DiffOutputFormat::Unified => unified::format(result, options),
        DiffOutputFormat::NameOnly => nameonly::format_name_only(result),
        DiffOutputFormat::NameStatus => nameonly::format_name_status(result),
    }
}
