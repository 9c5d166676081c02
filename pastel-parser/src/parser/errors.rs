use thiserror::Error;

#[derive(Debug, Error)]
enum ParseErrorKind {
    #[error("could not parse remaining input \"{0}\"")]
    Incomplete(String),

    #[error("invalid formula syntax near \"{0}\"")]
    Syntax(String),
}

/// Error produced when a string is not a well-formed formula.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ParseError(ParseErrorKind);

impl ParseError {
    pub(crate) fn incomplete(rest: &str) -> Self {
        Self(ParseErrorKind::Incomplete(rest.to_string()))
    }

    /// Whether a formula was recognized but followed by unparsed input.
    pub fn is_incomplete(&self) -> bool {
        matches!(self.0, ParseErrorKind::Incomplete(_))
    }

    /// The input at which parsing stopped.
    pub fn remaining(&self) -> &str {
        match &self.0 {
            ParseErrorKind::Incomplete(rest) | ParseErrorKind::Syntax(rest) => rest,
        }
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for ParseError {
    fn from(err: nom::Err<nom::error::Error<&'a str>>) -> Self {
        match err {
            nom::Err::Error(err) | nom::Err::Failure(err) => Self(ParseErrorKind::Syntax(err.input.to_string())),
            nom::Err::Incomplete(_) => Self(ParseErrorKind::Syntax(String::new())),
        }
    }
}
