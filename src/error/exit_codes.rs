use crate::error::NopackageError;

pub fn get_exit_code(error: &NopackageError) -> i32 {
    match error {
        NopackageError::NameParse { .. }
        | NopackageError::VersionNotFound { .. }
        | NopackageError::ValidationError(_) => 2,

        NopackageError::ProgramNotFound(_) => 4,

        NopackageError::BinaryNotFound { .. } => 5,

        NopackageError::PermissionDenied(_) => 13,

        NopackageError::AlreadyExists(_) => 17,

        _ => 1,
    }
}
