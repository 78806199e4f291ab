//! End-to-end behavior of the batch runner with in-memory renderers.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use draft_core::{BatchError, BatchRunner, CancellationToken, run_batch};
use draft_model::{BatchOptions, RawValue, RenderContext, RenderError, Row, TemplateError};
use draft_render::DocumentRenderer;

fn contract(id: &str, party: &str) -> Row {
    Row::new()
        .with("contract_id", id)
        .with("party", party)
        .with("effective_date", "03/04/2024")
}

/// Renders "party|effective_date" and fails on a "bad" party.
fn echo(ctx: &RenderContext) -> Result<Vec<u8>, RenderError> {
    match ctx.get("party") {
        Some("bad") => Err(RenderError::MissingPlaceholder("party".to_string())),
        Some(party) => {
            let date = ctx.get("effective_date").unwrap_or_default();
            Ok(format!("{party}|{date}").into_bytes())
        }
        None => Err(RenderError::MissingPlaceholder("party".to_string())),
    }
}

struct BrokenTemplate;

impl DocumentRenderer for BrokenTemplate {
    fn validate(&self) -> Result<(), TemplateError> {
        Err(TemplateError::MissingPart {
            part: "word/document.xml".to_string(),
        })
    }

    fn render(&self, _: &RenderContext) -> Result<Vec<u8>, RenderError> {
        panic!("render must not run after a failed validation");
    }
}

#[test]
fn renders_every_row_in_order() {
    let rows = vec![contract("A-1", "Acme"), contract("B-2", "Globex")];
    let report = run_batch(&rows, echo, BatchOptions::default()).unwrap();

    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["A-1.docx", "B-2.docx"]);
    assert_eq!(report.archive.entries()[0].bytes, b"Acme|03 April 2024");
    assert_eq!(report.manifest.total_rows, 2);
    assert_eq!(report.manifest.generated, 2);
    assert!(report.manifest.is_clean());
}

#[test]
fn one_failing_row_does_not_abort_the_batch() {
    let rows = vec![
        contract("A-1", "Acme"),
        contract("B-2", "bad"),
        contract("C-3", "Initech"),
    ];
    let report = run_batch(&rows, echo, BatchOptions::default()).unwrap();

    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["A-1.docx", "C-3.docx"]);
    assert_eq!(report.manifest.failures.len(), 1);
    let failure = &report.manifest.failures[0];
    assert_eq!(failure.row_index, 1);
    assert_eq!(failure.row_number(), 2);
    assert_eq!(failure.label, "B-2");
    assert_eq!(failure.message, "missing value for placeholder 'party'");
}

#[test]
fn duplicate_identities_get_numeric_suffixes() {
    let rows = vec![
        contract("ACME", "Acme"),
        contract("acme", "Acme"),
        contract("ACME", "Acme"),
    ];
    let report = run_batch(&rows, echo, BatchOptions::default()).unwrap();
    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["ACME.docx", "acme_2.docx", "ACME_3.docx"]);
}

#[test]
fn failed_rows_do_not_claim_names() {
    let rows = vec![contract("acme", "bad"), contract("acme", "Acme")];
    let report = run_batch(&rows, echo, BatchOptions::default()).unwrap();
    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["acme.docx"]);
}

#[test]
fn missing_identity_column_uses_row_position() {
    let rows = vec![
        Row::new().with("party", "Acme"),
        Row::new().with("party", "Globex"),
    ];
    let report = run_batch(&rows, echo, BatchOptions::default()).unwrap();
    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["contract_1.docx", "contract_2.docx"]);
}

#[test]
fn blank_identity_falls_back_to_label() {
    let rows = vec![
        Row::new().with("contract_id", "   ").with("party", "Acme"),
        Row::new().with("contract_id", RawValue::Null).with("party", "Acme"),
    ];
    let report = run_batch(&rows, echo, BatchOptions::default()).unwrap();
    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["contract.docx", "contract_2.docx"]);
}

#[test]
fn unsafe_identities_are_sanitized() {
    let rows = vec![contract("../../etc/passwd", "Acme")];
    let report = run_batch(&rows, echo, BatchOptions::default()).unwrap();
    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["_etc_passwd.docx"]);
}

#[test]
fn custom_extension_and_identity_column() {
    let rows = vec![Row::new().with("ref", "X 1").with("party", "Acme")];
    let options = BatchOptions::default()
        .with_identity_column("ref")
        .with_extension("txt");
    let report = run_batch(&rows, echo, options).unwrap();
    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["X_1.txt"]);
}

#[test]
fn every_row_failing_is_a_batch_error() {
    let rows = vec![contract("A-1", "bad"), contract("B-2", "bad")];
    let err = run_batch(&rows, echo, BatchOptions::default()).unwrap_err();
    match err {
        BatchError::AllRowsFailed { manifest } => {
            assert_eq!(manifest.total_rows, 2);
            assert_eq!(manifest.generated, 0);
            assert_eq!(manifest.failures.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_input_is_rejected() {
    let err = run_batch(&[], echo, BatchOptions::default()).unwrap_err();
    assert!(matches!(err, BatchError::EmptyInput));
}

#[test]
fn template_errors_surface_before_any_row() {
    let rows = vec![contract("A-1", "Acme")];
    let err = run_batch(&rows, BrokenTemplate, BatchOptions::default()).unwrap_err();
    assert!(matches!(err, BatchError::Template(TemplateError::MissingPart { .. })));
    assert!(err.manifest().is_none());
}

#[test]
fn slow_rows_time_out_as_row_failures() {
    let renderer = |ctx: &RenderContext| {
        if ctx.get("party") == Some("slow") {
            thread::sleep(Duration::from_secs(2));
        }
        echo(ctx)
    };
    let rows = vec![contract("A-1", "slow"), contract("B-2", "Globex")];
    let options = BatchOptions::default().with_render_timeout(Some(Duration::from_millis(50)));
    let report = run_batch(&rows, renderer, options).unwrap();

    let names: Vec<_> = report.archive.filenames().collect();
    assert_eq!(names, ["B-2.docx"]);
    assert_eq!(report.manifest.failures[0].message, "render timed out after 50 ms");
}

#[test]
fn panicking_renderer_is_a_row_failure() {
    let renderer = |ctx: &RenderContext| {
        if ctx.get("party") == Some("boom") {
            panic!("template engine exploded");
        }
        echo(ctx)
    };
    let rows = vec![contract("A-1", "boom"), contract("B-2", "Globex")];
    let report = run_batch(&rows, renderer, BatchOptions::default()).unwrap();

    assert_eq!(report.archive.len(), 1);
    assert_eq!(
        report.manifest.failures[0].message,
        "renderer failed: renderer panicked: template engine exploded"
    );
}

#[test]
fn cancellation_stops_before_the_next_row() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let renderer = move |ctx: &RenderContext| {
        if ctx.get("contract_id") == Some("B-2") {
            trigger.cancel();
        }
        echo(ctx)
    };
    let rows = vec![
        contract("A-1", "Acme"),
        contract("B-2", "Globex"),
        contract("C-3", "Initech"),
        contract("D-4", "Umbrella"),
    ];
    let runner = BatchRunner::new(Arc::new(renderer), BatchOptions::default()).with_cancellation(token);
    let err = runner.run(&rows).unwrap_err();
    assert!(matches!(err, BatchError::Cancelled { processed: 2, total: 4 }));
}

#[test]
fn already_cancelled_batch_processes_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let runner = BatchRunner::new(Arc::new(echo), BatchOptions::default().with_workers(4))
        .with_cancellation(token);
    let err = runner.run(&[contract("A-1", "Acme"), contract("B-2", "Acme")]).unwrap_err();
    assert!(matches!(err, BatchError::Cancelled { processed: 0, total: 2 }));
}

#[test]
fn parallel_run_matches_sequential_run() {
    let rows: Vec<Row> = (0..40)
        .map(|i| {
            let party = if i % 7 == 3 { "bad".to_string() } else { format!("Party {i}") };
            contract(&format!("ID-{}", i % 5), &party)
        })
        .collect();

    let sequential = run_batch(&rows, echo, BatchOptions::default()).unwrap();
    let parallel = run_batch(&rows, echo, BatchOptions::default().with_workers(4)).unwrap();

    assert_eq!(sequential.archive, parallel.archive);
    assert_eq!(sequential.manifest, parallel.manifest);
}

#[test]
fn repeated_runs_are_identical() {
    let rows = vec![
        contract("A-1", "Acme"),
        contract("A-1", "bad"),
        contract("A-1", "Globex"),
    ];
    let runner = BatchRunner::new(Arc::new(echo), BatchOptions::default());
    let first = runner.run(&rows).unwrap();
    let second = runner.run(&rows).unwrap();
    assert_eq!(first.archive, second.archive);
    assert_eq!(first.manifest, second.manifest);
}
