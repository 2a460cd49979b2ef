use thiserror::Error;

/// Failures of the by-name parameter binding used by control panels and the command line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter `{0}`")]
    UnknownParam(String),
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },
    #[error("expected `name=value`, got `{0}`")]
    Malformed(String),
}
