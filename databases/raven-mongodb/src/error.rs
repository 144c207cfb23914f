use mongodb::error::ErrorKind;
use raven_target::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Wrapped errors
    #[error(transparent)]
    Bson(#[from] mongodb::bson::ser::Error),
    #[error(transparent)]
    MongoDb(#[from] mongodb::error::Error),
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        match &error {
            Error::MongoDb(inner) if is_transport(inner) => {
                StoreError::Transport(error.to_string())
            }
            _ => StoreError::Write(error.to_string()),
        }
    }
}

/// Failures of the connection itself, as opposed to rejected operations.
fn is_transport(error: &mongodb::error::Error) -> bool {
    matches!(
        &*error.kind,
        ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
    )
}
