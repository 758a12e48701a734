use crate::span::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LowerError {
    #[error("Malformed function: {msg}")]
    Function { msg: String },

    #[error("Malformed instruction: {msg}")]
    Instruction { msg: String, span: Span },
}

impl LowerError {
    pub fn function(msg: impl Into<String>) -> Self {
        Self::Function { msg: msg.into() }
    }

    pub fn instruction(msg: impl Into<String>, span: Span) -> Self {
        Self::Instruction { msg: msg.into(), span }
    }
}

/// Render a LowerError with ariadne for nice terminal output.
pub fn render_error(source: &str, _filename: &str, err: &LowerError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        LowerError::Instruction { msg, span } => {
            Report::build(ReportKind::Error, (), span.start)
                .with_message("malformed IR")
                .with_label(
                    Label::new(span.start..span.end)
                        .with_message(msg),
                )
                .finish()
                .eprint(Source::from(source))
                .unwrap();
        }
        LowerError::Function { msg } => {
            eprintln!("error: {msg}");
        }
    }
}
