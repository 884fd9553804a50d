use thiserror::Error;

/// Errors produced while compiling a path or evaluating it against a
/// document.
///
/// Path-compile variants carry the byte offset into the query at which
/// parsing stopped. Evaluation variants carry no position: the engine skims
/// the document without tracking where inside it a lookup failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SliceError {
    // path compilation
    #[error("path is empty")]
    PathEmpty,
    #[error("path must start with $ (offset {0})")]
    PathRootExpected(usize),
    #[error("unexpected end of path (offset {0})")]
    PathUnexpectedEnd(usize),
    #[error("invalid path reference (offset {0})")]
    PathInvalidReference(usize),
    #[error("unknown function (offset {0})")]
    PathUnknownFunction(usize),
    #[error("array index bound missing (offset {0})")]
    PathIndexBoundMissing(usize),
    #[error("key list not terminated (offset {0})")]
    PathKeyListTerminated(usize),
    #[error("nonsensical array bounds (offset {0})")]
    PathIndexNonsense(usize),

    // filter compilation
    #[error("unexpected end of filter expression (offset {0})")]
    UnexpectedEOT(usize),
    #[error("unknown token in filter expression (offset {0})")]
    UnknownToken(usize),
    #[error("unterminated string or regex literal (offset {0})")]
    UnexpectedStringEnd(usize),
    #[error("invalid boolean literal (offset {0})")]
    InvalidBoolean(usize),
    #[error("empty filter expression (offset {0})")]
    EmptyFilter(usize),
    #[error("unknown operator (offset {0})")]
    UnknownOperator(usize),
    #[error("operator is missing an argument")]
    NotEnoughArguments,

    // evaluation
    #[error("array element not found")]
    ArrayElementNotFound,
    #[error("field not found")]
    FieldNotFound,
    #[error("array expected")]
    ArrayExpected,
    #[error("object expected")]
    ObjectExpected,
    #[error("object or array expected")]
    ObjectOrArrayExpected,
    #[error("colon expected after object key")]
    ColonExpected,
    #[error("unrecognized value")]
    UnrecognizedValue,
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("length() is only applicable to arrays and strings")]
    InvalidLengthUsage,

    // element extraction
    #[error("wildcards are not supported here")]
    WildcardsNotSupported,
    #[error("functions are not supported here")]
    FunctionsNotSupported,
    #[error("terminal node selects an element, not an array")]
    TerminalNodeArray,
    #[error("sub-slicing is only supported on the terminal node")]
    SubSlicingNotSupported,

    // filter evaluation
    #[error("arithmetic requires numeric operands")]
    InvalidArithmetic,
    #[error("invalid regular expression or match operands")]
    InvalidRegexp,
    #[error("operand types mismatch")]
    OperandTypesMismatch,
    #[error("operator is not applicable to strings")]
    OperatorNotApplicableToStrings,
}
