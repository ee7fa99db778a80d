#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    BadRequest,
    InternalServerError,
    // Operation preparation phases
    OperationParsingError,
    OperationValidationError,
    VariableError,
    // Analysis
    OperationTooDeep,
    Rejected,
    // Field execution
    FieldError,
    InvalidNull,
    InvalidValue,
    ArgumentError,
    TypeResolutionError,
    BatchLoadError,
    // Auth
    Unauthorized,
    // Timeouts
    Timeout,
}
