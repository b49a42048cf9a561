//! Core module containing fundamental types shared by every layer

pub mod error;
pub mod events;
pub mod record;

pub use error::{
    AppError, AppResult, AuthError, RecordError, RequestError, StorageError, ValidationFailure,
};
pub use events::{ChangeEvent, EventBus, EventEnvelope};
pub use record::Record;
