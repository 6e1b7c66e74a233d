use async_graphql::{Error, ErrorExtensions};

use crate::services::FileError;

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

impl ErrorExtensions for FileError {
    fn extend(&self) -> Error {
        let (message, code) = match self {
            FileError::NotFound(_) => (self.to_string(), NOT_FOUND),
            FileError::Validation(_) => (self.to_string(), BAD_USER_INPUT),
            FileError::Database(_) => ("Internal server error".to_string(), INTERNAL_SERVER_ERROR),
        };
        Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}
