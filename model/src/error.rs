use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BomError {
    #[error("XML parse error: {message}")]
    Xml { message: String },

    #[error("No <bom> root element found")]
    MissingBomRoot,

    #[error("Invalid move: {message}")]
    InvalidMove { message: String },
}

impl BomError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    pub fn invalid_move(message: impl Into<String>) -> Self {
        Self::InvalidMove {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Xml { .. } => "XML_PARSE_ERROR",
            Self::MissingBomRoot => "MISSING_BOM_ROOT",
            Self::InvalidMove { .. } => "INVALID_MOVE",
        }
    }
}

pub type BomResult<T> = Result<T, BomError>;

// Conversion from the underlying XML library error
impl From<quick_xml::Error> for BomError {
    fn from(error: quick_xml::Error) -> Self {
        Self::xml(error.to_string())
    }
}
