//! Rendering one context into document bytes.
//!
//! [`DocumentRenderer`] is the seam the batch orchestrator drives. Any
//! `Fn(&RenderContext) -> Result<Vec<u8>, RenderError>` closure is a renderer,
//! and [`DocxTemplate`] renders `{{ placeholder }}` Word templates.

pub mod docx;
pub mod placeholder;

use draft_model::{RenderContext, RenderError, TemplateError};

pub use docx::DocxTemplate;

/// Renders one context into a document.
///
/// Implementations must be shareable across worker threads.
pub trait DocumentRenderer: Send + Sync {
    /// Check the template definition once, before any row is rendered.
    fn validate(&self) -> Result<(), TemplateError> {
        Ok(())
    }

    /// Render one row. Missing or invalid substitutions must be reported as
    /// errors, never silently rendered blank.
    fn render(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError>;
}

impl<F> DocumentRenderer for F
where
    F: Fn(&RenderContext) -> Result<Vec<u8>, RenderError> + Send + Sync,
{
    fn render(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        self(context)
    }
}
