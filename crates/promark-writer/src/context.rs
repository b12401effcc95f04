/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Presentation resolution.
//!
//! The active rendering mode and its sub-language are threaded down the
//! recursion as an explicit [`RenderContext`] value, never ambient state. An
//! explicit attribute on a node always wins; otherwise the nearest enclosing
//! environment applies; the outermost implicit environment is
//! markup/markdown.

use crate::error::{Result, WriteError};
use crate::options::WriterOptions;
use promark_ir::{EnvAttrs, Meta, Presentation, Speaker, Syntax, WhiteSpace};
use promark_source_map::IrRange;

#[derive(Debug, Clone)]
pub struct RenderContext {
    pub syntax: Syntax,
    pub options: WriterOptions,
    /// Ancestor-scoped header level counter (1-based).
    pub header_level: usize,
    pub white_space: WhiteSpace,
    /// Speaker attributed to content with no explicit speaker tag.
    pub speaker: Speaker,
}

impl RenderContext {
    pub fn root(options: WriterOptions) -> RenderContext {
        let header_level = options.markdown_base_header_level;
        RenderContext {
            syntax: Syntax::Markdown,
            options,
            header_level,
            white_space: WhiteSpace::Filter,
            speaker: Speaker::Human,
        }
    }

    pub fn presentation(&self) -> Presentation {
        self.syntax.presentation()
    }

    /// The context for a nested `env` node. Markup wrappers deepen the
    /// header counter by one; the document's own root env does not (see
    /// [`RenderContext::enter_document`]).
    pub fn enter_env(&self, attrs: &EnvAttrs, meta: &Meta, range: Option<IrRange>) -> Result<RenderContext> {
        let mut next = self.enter_document(attrs, meta, range)?;
        if next.presentation() == Presentation::Markup {
            next.header_level = (next.header_level + 1).min(6);
        }
        Ok(next)
    }

    /// The context for the document's outermost environment.
    ///
    /// An environment whose resolved mode and sub-language match its parent's
    /// collapses to a pass-through (same syntax), but the caller still treats
    /// it as a source-range boundary.
    pub fn enter_document(&self, attrs: &EnvAttrs, meta: &Meta, range: Option<IrRange>) -> Result<RenderContext> {
        let mut next = self.clone();

        let presentation = match &attrs.presentation {
            Some(raw) => Some(Presentation::parse(raw).ok_or_else(|| {
                WriteError::validation(format!("Unknown presentation '{raw}'"), range)
            })?),
            None => None,
        };
        let syntax = match &attrs.syntax {
            Some(raw) => Some(Syntax::parse(raw).ok_or_else(|| {
                WriteError::validation(format!("Unknown syntax '{raw}'"), range)
            })?),
            None => None,
        };
        if let (Some(presentation), Some(syntax)) = (presentation, syntax)
            && syntax.presentation() != presentation
        {
            return Err(WriteError::validation(
                format!(
                    "Syntax '{}' does not belong to presentation '{}'",
                    syntax.as_str(),
                    presentation.as_str()
                ),
                range,
            ));
        }

        next.syntax = match (syntax, presentation) {
            (Some(syntax), _) => syntax,
            (None, Some(presentation)) => {
                // Keep the current sub-language when it already belongs to the
                // requested mode.
                if self.syntax.presentation() == presentation {
                    self.syntax
                } else {
                    presentation.default_syntax()
                }
            }
            (None, None) => self.syntax,
        };

        if let Some(patch) = &attrs.writer_options {
            next.options = next.options.merged_with(patch)?;
        }
        if let Some(mode) = meta.white_space {
            next.white_space = mode;
        } else if next.presentation() == Presentation::Free
            && self.presentation() != Presentation::Free
        {
            // Entering free text switches to verbatim whitespace.
            next.white_space = WhiteSpace::Pre;
        }
        if let Some(speaker) = meta.speaker {
            next.speaker = speaker;
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env_attrs(presentation: Option<&str>, syntax: Option<&str>) -> EnvAttrs {
        EnvAttrs {
            presentation: presentation.map(|s| s.to_string()),
            syntax: syntax.map(|s| s.to_string()),
            ..EnvAttrs::default()
        }
    }

    #[test]
    fn test_root_defaults_to_markup_markdown() {
        let ctx = RenderContext::root(WriterOptions::default());
        assert_eq!(ctx.syntax, Syntax::Markdown);
        assert_eq!(ctx.presentation(), Presentation::Markup);
        assert_eq!(ctx.header_level, 1);
    }

    #[test]
    fn test_explicit_syntax_wins() {
        let ctx = RenderContext::root(WriterOptions::default());
        let inner = ctx
            .enter_env(&env_attrs(None, Some("yaml")), &Meta::default(), None)
            .unwrap();
        assert_eq!(inner.syntax, Syntax::Yaml);
        assert_eq!(inner.presentation(), Presentation::Serialize);
    }

    #[test]
    fn test_presentation_keeps_matching_sublanguage() {
        let ctx = RenderContext::root(WriterOptions::default());
        let csv = ctx
            .enter_env(&env_attrs(None, Some("csv")), &Meta::default(), None)
            .unwrap();
        // presentation=markup within a csv subtree keeps csv
        let inner = csv
            .enter_env(&env_attrs(Some("markup"), None), &Meta::default(), None)
            .unwrap();
        assert_eq!(inner.syntax, Syntax::Csv);
        // presentation=serialize falls back to that mode's default
        let serialized = csv
            .enter_env(&env_attrs(Some("serialize"), None), &Meta::default(), None)
            .unwrap();
        assert_eq!(serialized.syntax, Syntax::Json);
    }

    #[test]
    fn test_unknown_values_are_validation_errors() {
        let ctx = RenderContext::root(WriterOptions::default());
        let range = Some(IrRange::new(4, 12));
        let err = ctx
            .enter_env(&env_attrs(Some("verbatim"), None), &Meta::default(), range)
            .unwrap_err();
        assert!(matches!(err, WriteError::Validation { .. }));
        assert_eq!(err.range(), range);

        let err = ctx
            .enter_env(&env_attrs(None, Some("html")), &Meta::default(), range)
            .unwrap_err();
        assert!(matches!(err, WriteError::Validation { .. }));
    }

    #[test]
    fn test_mismatched_presentation_and_syntax() {
        let ctx = RenderContext::root(WriterOptions::default());
        let err = ctx
            .enter_env(
                &env_attrs(Some("serialize"), Some("markdown")),
                &Meta::default(),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, WriteError::Validation { .. }));
    }

    #[test]
    fn test_nested_markup_env_increments_header_level() {
        let ctx = RenderContext::root(WriterOptions::default());
        let inner = ctx
            .enter_env(&EnvAttrs::default(), &Meta::default(), None)
            .unwrap();
        assert_eq!(inner.header_level, 2);
        let deeper = inner
            .enter_env(&EnvAttrs::default(), &Meta::default(), None)
            .unwrap();
        assert_eq!(deeper.header_level, 3);
    }

    #[test]
    fn test_writer_options_override() {
        let ctx = RenderContext::root(WriterOptions::default());
        let attrs = EnvAttrs {
            writer_options: Some(json!({"truncate-marker": "..."})),
            ..EnvAttrs::default()
        };
        let inner = ctx.enter_env(&attrs, &Meta::default(), None).unwrap();
        assert_eq!(inner.options.truncate_marker, "...");
        // parent untouched
        assert_eq!(ctx.options.truncate_marker, " (...truncated)");
    }
}
