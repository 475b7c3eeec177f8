use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Server error code for unique index violations (E11000).
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Whether a driver error is a unique index violation.
pub fn is_duplicate_key_error(error: &Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
