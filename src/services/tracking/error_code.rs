use serde::{Serialize, Serializer};
use std::fmt;

pub const UNKNOWN_ERROR_TEXT: &str = "Unknown error";
pub const UNKNOWN_DIAGNOSTIC_TEXT: &str = "No diagnostic information available";

/// SCORM 1.2 runtime error codes. The numeric value is what crosses the
/// wire (as decimal text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum ErrorCode {
    #[default]
    NoError = 0,
    GeneralException = 101,
    InvalidArgument = 201,
    ElementCannotHaveChildren = 202,
    ElementNotAnArray = 203,
    NotInitialized = 301,
    NotImplemented = 401,
    InvalidSetKeyword = 402,
    ReadOnly = 403,
    WriteOnly = 404,
    IncorrectDataType = 405,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 11] = [
        ErrorCode::NoError,
        ErrorCode::GeneralException,
        ErrorCode::InvalidArgument,
        ErrorCode::ElementCannotHaveChildren,
        ErrorCode::ElementNotAnArray,
        ErrorCode::NotInitialized,
        ErrorCode::NotImplemented,
        ErrorCode::InvalidSetKeyword,
        ErrorCode::ReadOnly,
        ErrorCode::WriteOnly,
        ErrorCode::IncorrectDataType,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Parse a wire code such as `"201"`. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u16>().ok().and_then(Self::from_code)
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::NoError => "No error",
            ErrorCode::GeneralException => "General exception",
            ErrorCode::InvalidArgument => "Invalid argument error",
            ErrorCode::ElementCannotHaveChildren => "Element cannot have children",
            ErrorCode::ElementNotAnArray => "Element not an array - cannot have count",
            ErrorCode::NotInitialized => "Not initialized",
            ErrorCode::NotImplemented => "Not implemented error",
            ErrorCode::InvalidSetKeyword => "Invalid set value, element is a keyword",
            ErrorCode::ReadOnly => "Element is read only",
            ErrorCode::WriteOnly => "Element is write only",
            ErrorCode::IncorrectDataType => "Incorrect data type",
        }
    }

    /// Longer, LMS-specific explanation returned by `LMSGetDiagnostic`.
    pub fn diagnostic(self) -> &'static str {
        match self {
            ErrorCode::NoError => "No error",
            ErrorCode::GeneralException => {
                "General exception: the call is not allowed in the current session state"
            }
            ErrorCode::InvalidArgument => {
                "Invalid argument error: the element name is empty or a parameter was not empty"
            }
            ErrorCode::ElementCannotHaveChildren => {
                "Element cannot have children: _children was requested on a leaf element"
            }
            ErrorCode::ElementNotAnArray => {
                "Element not an array - cannot have count: _count was requested on a non-list element"
            }
            ErrorCode::NotInitialized => "Not initialized: LMSInitialize has not been called",
            ErrorCode::NotImplemented => {
                "Not implemented error: the element is not part of the SCORM 1.2 data model"
            }
            ErrorCode::InvalidSetKeyword => {
                "Invalid set value, element is a keyword: _children, _count and _version cannot be set"
            }
            ErrorCode::ReadOnly => "Element is read only: the LMS owns this value",
            ErrorCode::WriteOnly => "Element is write only: the value cannot be read back",
            ErrorCode::IncorrectDataType => {
                "Incorrect data type: the value does not match the element's format or range"
            }
        }
    }
}

/// `LMSGetErrorString` lookup for a raw wire code.
pub fn error_string(raw: &str) -> &'static str {
    ErrorCode::parse(raw).map_or(UNKNOWN_ERROR_TEXT, ErrorCode::message)
}

/// `LMSGetDiagnostic` lookup for a raw wire code.
pub fn diagnostic_string(raw: &str) -> &'static str {
    ErrorCode::parse(raw).map_or(UNKNOWN_DIAGNOSTIC_TEXT, ErrorCode::diagnostic)
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(self.code())
    }
}

#[cfg(test)]
#[path = "tests/error_code_tests.rs"]
mod tests;
