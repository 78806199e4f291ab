use std::time::Duration;

use draft_model::{BatchReport, FailureEntry, RenderResult};

pub fn success(row_index: usize, filename: &str, body: &str) -> RenderResult {
    RenderResult::Success {
        row_index,
        filename: filename.to_string(),
        bytes: body.as_bytes().to_vec(),
    }
}

pub fn failure(row_index: usize, label: &str, message: &str) -> RenderResult {
    RenderResult::Failure(FailureEntry {
        row_index,
        label: label.to_string(),
        message: message.to_string(),
    })
}

pub fn report(results: Vec<RenderResult>) -> BatchReport {
    BatchReport::from_results(results, Duration::ZERO)
}
