//! Resolver diagnostics as miette reports.

use miette::{LabeledSpan, NamedSource, SourceCode};
use pathwise_core::Diagnostic;
use std::fmt;
use thiserror::Error;

/// A failed resolution, rendered with its package.json code frame when the
/// resolver attached one.
#[derive(Debug, Error)]
#[error("{}", .diagnostic.message)]
pub struct FailureReport {
    diagnostic: Diagnostic,
    frame: Option<NamedSource<String>>,
}

impl FailureReport {
    pub fn new(diagnostic: Diagnostic) -> Self {
        let frame = diagnostic
            .code_frame
            .as_ref()
            .map(|f| NamedSource::new(f.file_path.display().to_string(), f.code.clone()));
        Self { diagnostic, frame }
    }
}

impl miette::Diagnostic for FailureReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.diagnostic.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.diagnostic.hints.is_empty() {
            return None;
        }
        Some(Box::new(self.diagnostic.hints.join("\n")))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.frame.as_ref().map(|f| f as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let frame = self.diagnostic.code_frame.as_ref()?;
        Some(Box::new(frame.highlights.iter().map(|h| {
            LabeledSpan::new(h.message.clone(), h.start, h.end.saturating_sub(h.start))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic as _;
    use pathwise_core::resolver::{CodeFrame, CodeHighlight};
    use pathwise_core::DiagnosticKind;

    #[test]
    fn test_hints_become_help() {
        let diag = Diagnostic::new(DiagnosticKind::ModuleNotFound, "Cannot find module 'lodahs'")
            .with_hints(vec!["Did you mean 'lodash'?".into()]);
        let report = FailureReport::new(diag);

        assert_eq!(report.to_string(), "Cannot find module 'lodahs'");
        assert_eq!(
            report.help().map(|h| h.to_string()).as_deref(),
            Some("Did you mean 'lodash'?")
        );
        assert!(report.source_code().is_none());
        assert!(report.labels().is_none());
    }

    #[test]
    fn test_code_frame_becomes_labels() {
        let code = r#"{"main": "missing.js"}"#.to_string();
        let diag = Diagnostic::new(DiagnosticKind::PackageEntryInvalid, "bad entry")
            .with_code_frame(CodeFrame {
                file_path: "/proj/node_modules/pkg/package.json".into(),
                language: "json".into(),
                code,
                highlights: vec![CodeHighlight {
                    start: 9,
                    end: 21,
                    message: Some("'./missing.js' does not exist".into()),
                }],
            });
        let report = FailureReport::new(diag);

        assert!(report.help().is_none());
        assert!(report.source_code().is_some());
        let labels: Vec<_> = report.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 9);
        assert_eq!(labels[0].len(), 12);
        assert_eq!(labels[0].label(), Some("'./missing.js' does not exist"));
    }
}
