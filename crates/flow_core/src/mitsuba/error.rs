use thiserror::Error;

/// Errors that can occur while reading a Mitsuba XML scene.
#[derive(Error, Debug)]
pub enum MitsubaError {
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Root element is <{0}>, expected <scene>")]
    NotAScene(String),

    #[error("Line {line}: <{element}> is missing attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        line: u32,
    },

    #[error("Line {line}: reference '${name}' has no <default>")]
    UnknownReference { name: String, line: u32 },

    #[error("Line {line}: unknown BSDF id '{id}'")]
    UnknownBsdf { id: String, line: u32 },

    #[error("Line {line}: invalid value '{value}' for '{name}'")]
    InvalidValue {
        name: String,
        value: String,
        line: u32,
    },

    #[error("Line {line}: {message}")]
    Invalid { line: u32, message: String },
}

/// Result type for Mitsuba parsing.
pub type MitsubaResult<T> = Result<T, MitsubaError>;
