//! Word (`.docx`) templates.

use std::collections::BTreeSet;
use std::io::{Cursor, Read, Write};

use draft_model::{RenderContext, RenderError, TemplateError};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::DocumentRenderer;
use crate::placeholder::{Segment, parse_segments, render_segments};

/// The main document part every template must contain.
pub const MAIN_PART: &str = "word/document.xml";

#[derive(Debug, Clone)]
enum PartBody {
    Directory,
    Raw(Vec<u8>),
    Template(Vec<Segment>),
}

#[derive(Debug, Clone)]
struct Part {
    name: String,
    body: PartBody,
}

/// A parsed `.docx` template.
///
/// Placeholders are located once at load time; rendering only substitutes
/// values and re-packs the container, so one template serves a whole batch
/// and can be shared between threads.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    parts: Vec<Part>,
    placeholders: BTreeSet<String>,
}

impl DocxTemplate {
    /// Parse a template from the raw container bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if the bytes are not a ZIP container, the
    /// main document part is missing, or any placeholder is malformed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TemplateError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| TemplateError::InvalidContainer(e.to_string()))?;

        let mut parts = Vec::with_capacity(archive.len());
        let mut placeholders = BTreeSet::new();
        for idx in 0..archive.len() {
            let mut file = archive
                .by_index(idx)
                .map_err(|e| TemplateError::InvalidContainer(e.to_string()))?;
            let name = file.name().to_string();
            if file.is_dir() {
                parts.push(Part {
                    name,
                    body: PartBody::Directory,
                });
                continue;
            }

            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| TemplateError::InvalidContainer(format!("{name}: {e}")))?;

            let body = if is_template_part(&name) {
                let xml = String::from_utf8(data)
                    .map_err(|_| TemplateError::InvalidEncoding { part: name.clone() })?;
                let segments = parse_segments(&name, &xml)?;
                for segment in &segments {
                    if let Segment::Placeholder { name, .. } = segment {
                        placeholders.insert(name.clone());
                    }
                }
                PartBody::Template(segments)
            } else {
                PartBody::Raw(data)
            };
            parts.push(Part { name, body });
        }

        let template = Self {
            parts,
            placeholders,
        };
        template.validate()?;
        tracing::debug!(
            parts = template.parts.len(),
            placeholders = template.placeholders.len(),
            "docx template parsed"
        );
        Ok(template)
    }

    /// Distinct placeholder names used anywhere in the template.
    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }

    /// Placeholders that `context` has no value for.
    pub fn missing_placeholders<'a>(&'a self, context: &RenderContext) -> Vec<&'a str> {
        self.placeholders
            .iter()
            .filter(|name| !context.contains_key(name))
            .map(String::as_str)
            .collect()
    }
}

impl DocumentRenderer for DocxTemplate {
    /// The main document part must be present and parsed for placeholders.
    fn validate(&self) -> Result<(), TemplateError> {
        let has_main = self
            .parts
            .iter()
            .any(|part| part.name == MAIN_PART && matches!(part.body, PartBody::Template(_)));
        if has_main {
            Ok(())
        } else {
            Err(TemplateError::MissingPart {
                part: MAIN_PART.to_string(),
            })
        }
    }

    fn render(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for part in &self.parts {
            match &part.body {
                PartBody::Directory => {
                    writer
                        .add_directory(part.name.as_str(), options)
                        .map_err(container_error)?;
                }
                PartBody::Raw(data) => {
                    writer
                        .start_file(part.name.as_str(), options)
                        .map_err(container_error)?;
                    writer.write_all(data).map_err(container_error)?;
                }
                PartBody::Template(segments) => {
                    let xml = render_segments(segments, context)?;
                    writer
                        .start_file(part.name.as_str(), options)
                        .map_err(container_error)?;
                    writer.write_all(xml.as_bytes()).map_err(container_error)?;
                }
            }
        }

        let cursor = writer.finish().map_err(container_error)?;
        Ok(cursor.into_inner())
    }
}

/// Body, header, footer, footnote and endnote parts carry placeholders.
fn is_template_part(name: &str) -> bool {
    if name == MAIN_PART {
        return true;
    }
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && file.ends_with(".xml")
        && ["header", "footer", "footnotes", "endnotes"]
            .iter()
            .any(|prefix| file.starts_with(prefix))
}

fn container_error(error: impl std::fmt::Display) -> RenderError {
    RenderError::Failed(format!("failed to write document container: {error}"))
}
