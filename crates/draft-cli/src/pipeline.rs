//! The generate pipeline: template and table in, archive and manifest out.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use draft_core::{BatchRunner, CancellationToken};
use draft_ingest::{ReadOptions, read_rows};
use draft_model::{BatchReport, Row};
use draft_output::{default_archive_name, write_archive_file, write_manifest_file};
use draft_render::DocxTemplate;
use tracing::{info, info_span, trace, warn};

use crate::config::DraftConfig;
use crate::logging::redact_value;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub template: PathBuf,
    pub table: PathBuf,
    /// Archive destination. Defaults to `contracts_<generated>.zip` in the
    /// working directory.
    pub output: Option<PathBuf>,
    /// Where to write the failure manifest, if anywhere.
    pub manifest: Option<PathBuf>,
    pub config: DraftConfig,
}

#[derive(Debug)]
pub struct GenerateOutcome {
    pub report: BatchReport,
    pub archive_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
}

/// Fail unless `path` ends in `.<expected>` (any case).
pub fn ensure_extension(path: &Path, expected: &str, what: &str) -> Result<()> {
    let matches = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));
    if !matches {
        bail!("{what} must be a .{expected} file: {}", path.display());
    }
    Ok(())
}

pub fn load_template(path: &Path) -> Result<DocxTemplate> {
    ensure_extension(path, "docx", "template")?;
    let bytes = fs::read(path).with_context(|| format!("read template {}", path.display()))?;
    DocxTemplate::from_bytes(&bytes).with_context(|| format!("load template {}", path.display()))
}

pub fn load_rows(path: &Path, options: ReadOptions) -> Result<Vec<Row>> {
    ensure_extension(path, "csv", "table")?;
    read_rows(path, options).with_context(|| format!("read table {}", path.display()))
}

/// Placeholders no column of `row` supplies.
pub fn unmatched_placeholders<'a>(template: &'a DocxTemplate, row: &Row) -> Vec<&'a str> {
    template
        .placeholders()
        .iter()
        .map(String::as_str)
        .filter(|name| !row.contains(name))
        .collect()
}

/// Run one batch end to end.
///
/// When every row fails and a manifest path was given, the manifest is still
/// written before the error is returned.
pub fn generate(request: &GenerateRequest, cancel: &CancellationToken) -> Result<GenerateOutcome> {
    let span = info_span!(
        "generate",
        template = %request.template.display(),
        table = %request.table.display()
    );
    let _guard = span.enter();

    let template = load_template(&request.template)?;
    let rows = load_rows(&request.table, request.config.table.read_options())?;
    info!(
        rows = rows.len(),
        placeholders = template.placeholders().len(),
        "inputs loaded"
    );
    if let Some(first) = rows.first() {
        let unmatched = unmatched_placeholders(&template, first);
        if !unmatched.is_empty() {
            warn!(placeholders = ?unmatched, "template placeholders with no matching column");
        }
    }

    let runner = BatchRunner::new(Arc::new(template), request.config.batch.clone())
        .with_cancellation(cancel.clone());
    let report = match runner.run(&rows) {
        Ok(report) => report,
        Err(error) => {
            if let (Some(path), Some(manifest)) = (&request.manifest, error.manifest()) {
                ensure_parent(path)?;
                write_manifest_file(manifest, path)
                    .with_context(|| format!("write manifest {}", path.display()))?;
            }
            return Err(error).context("generate documents");
        }
    };
    for failure in &report.manifest.failures {
        trace!(
            row = failure.row_number(),
            label = redact_value(&failure.label),
            "row skipped"
        );
    }

    let archive_path = request
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_archive_name(report.manifest.generated)));
    ensure_parent(&archive_path)?;
    let archive_path = write_archive_file(&report.archive, &archive_path)
        .with_context(|| format!("write archive {}", archive_path.display()))?;

    let manifest_path = match &request.manifest {
        Some(path) => {
            ensure_parent(path)?;
            Some(
                write_manifest_file(&report.manifest, path)
                    .with_context(|| format!("write manifest {}", path.display()))?,
            )
        }
        None => None,
    };

    Ok(GenerateOutcome {
        report,
        archive_path,
        manifest_path,
    })
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display())),
        _ => Ok(()),
    }
}
