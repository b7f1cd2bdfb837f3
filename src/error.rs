/// Errors that are fatal to the fact being evaluated.
///
/// A fatal error aborts the remaining body execution of the current fact
/// and is reported in that fact's [`FactResult`](crate::FactResult); it is
/// never propagated past the evaluator boundary. Recoverable failures
/// (assertion failures, unsatisfied expectations) are plain report data,
/// not errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FatalError {
    /// A mocked function was invoked with arguments matching no declared
    /// provided clause.
    #[error("mocked function '{function}' was called with ({}) matching no provided clause", .args.join(", "))]
    UnexpectedCall {
        function: String,
        /// The offending call's arguments, rendered.
        args: Vec<String>,
    },

    /// A placeholder (or unknown) function was invoked with no active stub.
    #[error("function '{function}' has no implementation and no active provided clause")]
    UndefinedFunctionCalled { function: String },

    /// The fact's declarations were structurally invalid; nothing executed.
    #[error("malformed declaration: {reason}")]
    MalformedDeclaration { reason: String },

    /// The fact body returned an error that is not one of the above.
    #[error("fact body failed: {message}")]
    BodyFailed { message: String },
}

impl FatalError {
    /// Stable machine-readable tag for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FatalError::UnexpectedCall { .. } => "unexpected-call",
            FatalError::UndefinedFunctionCalled { .. } => "undefined-function-called",
            FatalError::MalformedDeclaration { .. } => "malformed-declaration",
            FatalError::BodyFailed { .. } => "body-failed",
        }
    }
}
