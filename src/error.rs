use derive_more::Display;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Display)]
pub struct UnknownError(BoxedError);

impl std::error::Error for UnknownError {}

impl UnknownError {
    pub fn new(err: BoxedError) -> Self {
        Self(err)
    }
}

impl From<sqlx::error::Error> for UnknownError {
    fn from(err: sqlx::error::Error) -> Self {
        Self::new(err.into())
    }
}

pub mod app {
    use derive_more::Display;
    use salvo::{
        http::{ResBody, StatusCode},
        hyper::body::Bytes,
        prelude::StatusError,
        writer::Json,
        Piece,
    };
    use serde::Serialize;

    use super::{
        http::ErrorResponse,
        persistence::PersistenceError,
        resource::{ConflictError, NotFoundError, ValidationError},
    };

    #[derive(Debug, Display, Serialize)]
    pub enum ApplicationError {
        /// The username of a new record is already taken.
        DuplicateUsername(ValidationError),
        NotFound(NotFoundError),
        /// A unique field collided with another record at the storage level.
        Conflict(ConflictError),
        Validation(ValidationError),
        Persistence(PersistenceError),
    }

    impl std::error::Error for ApplicationError {}

    impl From<ValidationError> for ApplicationError {
        fn from(err: ValidationError) -> Self {
            Self::Validation(err)
        }
    }

    impl From<NotFoundError> for ApplicationError {
        fn from(err: NotFoundError) -> Self {
            Self::NotFound(err)
        }
    }

    impl From<ConflictError> for ApplicationError {
        fn from(err: ConflictError) -> Self {
            Self::Conflict(err)
        }
    }

    impl From<PersistenceError> for ApplicationError {
        fn from(err: PersistenceError) -> Self {
            tracing::error!("user storage failure: {err}");
            Self::Persistence(err)
        }
    }

    impl Piece for ApplicationError {
        fn render(self, res: &mut salvo::Response) {
            let status = match &self {
                // not found responses carry no body, an empty once body
                // keeps the service catcher from writing an error page
                ApplicationError::NotFound(_) => {
                    res.set_body(ResBody::Once(Bytes::new()));
                    res.set_status_code(StatusCode::NOT_FOUND);
                    return;
                }
                ApplicationError::Persistence(_) => StatusError::service_unavailable(),
                ApplicationError::DuplicateUsername(_) | ApplicationError::Validation(_) => {
                    StatusError::bad_request()
                }
                ApplicationError::Conflict(_) => StatusError::conflict(),
            };
            res.render(Json(ErrorResponse::from_status_error(&status, self)));
            res.set_status_error(status);
        }
    }
}

pub mod service {
    use derive_more::Display;

    use crate::error::UnknownError;

    #[derive(Debug, Display)]
    pub enum DispatchError {
        #[display(fmt = "Dispatched operation timed out in {_0:?}")]
        Timeout(Option<std::time::Duration>),
        #[display(fmt = "IO error dispatching {_0}")]
        IO(std::io::Error),
        #[display(fmt = "Unknown dispatch error {_0}")]
        Unknown(UnknownError),
    }

    impl std::error::Error for DispatchError {}
}

pub mod persistence {
    use std::io;

    use derive_more::Display;
    use serde::Serialize;

    use super::{service::DispatchError, UnknownError};

    pub type SqlState = String;

    const UNIQUE_VIOLATION: &str = "23505";

    /// Fields backed by a storage unique constraint.
    #[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    #[serde(rename_all = "lowercase")]
    pub enum UniqueField {
        #[display(fmt = "username")]
        Username,
        #[display(fmt = "mobile")]
        Mobile,
        #[display(fmt = "email")]
        Email,
    }

    impl UniqueField {
        /// Resolve the field from a postgres constraint name such as `users_mobile_key`.
        pub fn from_constraint(constraint: &str) -> Option<Self> {
            if constraint.contains("username") {
                Some(Self::Username)
            } else if constraint.contains("mobile") {
                Some(Self::Mobile)
            } else if constraint.contains("email") {
                Some(Self::Email)
            } else {
                None
            }
        }

        pub fn path(&self) -> &'static str {
            match self {
                UniqueField::Username => "/username",
                UniqueField::Mobile => "/mobile",
                UniqueField::Email => "/email",
            }
        }
    }

    #[derive(Debug, Display)]
    pub enum PersistenceError {
        #[display(fmt = "database persistence error: SQLSTATE {_0:?}")]
        Database(Option<SqlState>),
        #[display(fmt = "persistence layer connection error: {_0}")]
        Connection(DispatchError),
        #[display(fmt = "unique constraint violated on {_0:?}")]
        UniqueViolation(Option<UniqueField>),
        #[display(fmt = "PersistenceError data not found")]
        NotFound,
        #[display(fmt = "PersistenceError decoding data")]
        DecodeData,
        #[display(fmt = "unknown persistence error: {_0}")]
        Unknown(UnknownError),
    }

    impl std::error::Error for PersistenceError {}

    impl Serialize for PersistenceError {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_none()
        }
    }

    type SqlxError = sqlx::error::Error;

    impl From<SqlxError> for PersistenceError {
        fn from(err: SqlxError) -> Self {
            match err {
                SqlxError::Configuration(_) => {
                    Self::Connection(DispatchError::IO(io::ErrorKind::InvalidInput.into()))
                }
                SqlxError::Database(db) => match db.code() {
                    Some(code) if code == UNIQUE_VIOLATION => {
                        Self::UniqueViolation(db.constraint().and_then(UniqueField::from_constraint))
                    }
                    code => Self::Database(code.map(|code| code.into())),
                },
                SqlxError::Io(io) => Self::Connection(DispatchError::IO(io)),
                SqlxError::Tls(_) => {
                    Self::Connection(DispatchError::IO(io::ErrorKind::ConnectionRefused.into()))
                }
                SqlxError::Protocol(msg) => Self::Connection(DispatchError::IO(io::Error::new(
                    io::ErrorKind::InvalidData,
                    msg,
                ))),
                SqlxError::RowNotFound => Self::NotFound,
                SqlxError::TypeNotFound { .. } => Self::DecodeData,
                SqlxError::ColumnIndexOutOfBounds { .. } => Self::DecodeData,
                SqlxError::ColumnNotFound(_) => Self::DecodeData,
                SqlxError::ColumnDecode { .. } => Self::DecodeData,
                SqlxError::Decode(_) => Self::DecodeData,
                SqlxError::PoolTimedOut => Self::Connection(DispatchError::Timeout(None)),
                SqlxError::PoolClosed => {
                    Self::Connection(DispatchError::IO(io::ErrorKind::NotConnected.into()))
                }
                SqlxError::WorkerCrashed => {
                    tracing::error!("sqlx background worker error, {err}");
                    Self::Connection(DispatchError::Unknown(err.into()))
                }
                _ => PersistenceError::Unknown(err.into()),
            }
        }
    }

    #[cfg(test)]
    mod test {
        use pretty_assertions::assert_eq;

        use super::UniqueField;

        #[test]
        fn resolve_unique_field_from_constraint_name() {
            assert_eq!(
                UniqueField::from_constraint("users_username_key"),
                Some(UniqueField::Username)
            );
            assert_eq!(
                UniqueField::from_constraint("users_mobile_key"),
                Some(UniqueField::Mobile)
            );
            assert_eq!(
                UniqueField::from_constraint("users_email_key"),
                Some(UniqueField::Email)
            );
            assert_eq!(UniqueField::from_constraint("users_pkey"), None);
        }
    }
}

pub mod resource {
    use derive_more::{Display, Error};
    use serde::{Deserialize, Serialize};

    use crate::base::ResourceID;

    use super::persistence::UniqueField;

    #[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum ValidationErrorKind {
        /// When a required property is missing or blank.
        Required,
        /// Maximum inclusive string length.
        MaxLength(u64),
        /// Inclusive lower bound exceeded.
        Minimum(u64),
        /// Inclusive higher bound exceeded.
        Maximum(u64),
        /// The input value doesn't match any of specified options.
        UnknownVariant,
        /// The input value doesn't match one or multiple required types.
        InvalidType,
        /// Input value already exists.
        AlreadyExists,
    }

    impl std::error::Error for ValidationErrorKind {}

    #[derive(Debug, Error, Clone, PartialEq, Eq, Hash, Serialize)]
    pub struct ValidationError {
        /// Name of the resource
        pub resource_type: &'static str,
        /// Invalid resource fields
        pub fields: Vec<ValidationFieldError>,
    }

    impl ValidationError {
        pub fn from_resource<R>(fields: Vec<ValidationFieldError>) -> Self
        where
            R: ResourceID,
        {
            Self {
                resource_type: R::resource_id(),
                fields,
            }
        }
    }

    impl std::fmt::Display for ValidationError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!(
                "Invalid resource {}, fields {:?}",
                self.resource_type, self.fields
            ))
        }
    }

    #[derive(Debug, Display, Error, Clone, PartialEq, Eq, Hash, Serialize)]
    #[display(fmt = "{path}: {value:?}, {kinds:?}")]
    pub struct ValidationFieldError {
        /// Resource field path with invalid value
        pub path: String,
        /// Displayed invalid value
        pub value: String,
        /// Value type id
        pub type_id: &'static str,
        /// Kinds of validation errors
        pub kinds: Vec<ValidationErrorKind>,
    }

    impl ValidationFieldError {
        pub fn from_resource<T>(value: String, path: String, kinds: Vec<ValidationErrorKind>) -> Self
        where
            T: ResourceID,
        {
            Self {
                path,
                type_id: T::resource_id(),
                value,
                kinds,
            }
        }

        pub fn kinds(&self) -> &[ValidationErrorKind] {
            &self.kinds
        }
    }

    #[derive(Debug, Display, Clone, Error, PartialEq, Eq, Hash, Serialize)]
    #[display(fmt = "Resource {resource_type} of key {key} not found")]
    pub struct NotFoundError {
        /// Name of the resource
        pub resource_type: &'static str,
        /// Lookup key used to search the resource
        pub key: String,
    }

    impl NotFoundError {
        pub fn from_resource<R: ResourceID>(key: impl Into<String>) -> Self {
            Self {
                resource_type: R::resource_id(),
                key: key.into(),
            }
        }
    }

    #[derive(Debug, Display, Clone, Error, PartialEq, Eq, Hash, Serialize)]
    #[display(fmt = "Conflicting resource {resource_type} of key {key}")]
    pub struct ConflictError {
        /// Name of the resource
        pub resource_type: &'static str,
        /// Lookup key of the conflicting resource
        pub key: String,
        /// Unique field already held by another resource, when known
        pub field: Option<UniqueField>,
    }

    impl ConflictError {
        pub fn from_resource<R: ResourceID>(key: impl Into<String>, field: Option<UniqueField>) -> Self {
            Self {
                resource_type: R::resource_id(),
                key: key.into(),
                field,
            }
        }
    }
}

pub mod http {
    use derive_more::{Display, Error};
    use salvo::{http::ParseError, prelude::StatusError, writer::Json, Piece, Response};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Display, Clone, Error, Serialize, Deserialize)]
    pub enum BadRequest {
        #[display(fmt = "invalid_content")]
        InvalidContent,
        #[display(fmt = "missing_path_param")]
        MissingPathParam,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ErrorResponse<T> {
        pub title: String,
        pub message: String,
        pub error: T,
    }

    impl<T> ErrorResponse<T> {
        pub fn from_status_error(status: &StatusError, err: T) -> Self {
            Self {
                title: status.name.clone(),
                message: status
                    .summary
                    .clone()
                    .unwrap_or_else(|| status.name.clone()),
                error: err,
            }
        }
    }

    impl From<ParseError> for BadRequest {
        fn from(err: ParseError) -> Self {
            tracing::debug!("rejecting request body: {err}");
            BadRequest::InvalidContent
        }
    }

    impl Piece for BadRequest {
        fn render(self, res: &mut Response) {
            let status = StatusError::bad_request();
            res.render(Json(ErrorResponse::from_status_error(&status, self)));
            res.set_status_error(status);
        }
    }
}
