use anyhow::Result;
use comfy_table::{Cell, Table};

use draft_cli::config::DraftConfig;
use draft_cli::pipeline::{GenerateOutcome, GenerateRequest, generate, load_template};
use draft_core::CancellationToken;
use tracing::warn;

use crate::cli::{GenerateArgs, PlaceholdersArgs};
use crate::summary::apply_table_style;

pub fn run_generate(args: &GenerateArgs) -> Result<GenerateOutcome> {
    let file = DraftConfig::load(args.config.as_deref())?;
    let request = GenerateRequest {
        template: args.template.clone(),
        table: args.table.clone(),
        output: args.output.clone(),
        manifest: args.manifest.clone(),
        config: args.overrides().apply(file),
    };
    generate(&request, &interrupt_token())
}

/// A token that Ctrl-C cancels. The batch stops before its next row and no
/// archive is written.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        warn!("received Ctrl+C, cancelling batch");
        handler_token.cancel();
    }) {
        warn!(%error, "could not install Ctrl+C handler");
    }
    token
}

pub fn run_placeholders(args: &PlaceholdersArgs) -> Result<()> {
    let template = load_template(&args.template)?;
    let mut table = Table::new();
    table.set_header(vec!["Placeholder"]);
    apply_table_style(&mut table);
    for name in template.placeholders() {
        table.add_row(vec![Cell::new(name)]);
    }
    println!("{table}");
    Ok(())
}
