pub mod user {
    use crate::{
        app::resource::user::{AddUserDto, UpdateUserDto, UserDto},
        domain::{
            entity::{user::User, Entity},
            repository::{Pageable, PageableResult, UserRepository},
        },
        error::{
            app::ApplicationError,
            persistence::{PersistenceError, UniqueField},
            resource::{
                ConflictError, NotFoundError, ValidationError, ValidationErrorKind,
                ValidationFieldError,
            },
        },
    };

    mod validation {
        use super::*;

        pub const USERNAME_MAX_LENGTH: u64 = 50;
        pub const MOBILE_MAX_LENGTH: u64 = 11;
        pub const NAME_MAX_LENGTH: u64 = 50;
        pub const EMAIL_MAX_LENGTH: u64 = 255;

        fn check_text(
            errors: &mut Vec<ValidationFieldError>,
            path: &str,
            value: &str,
            required: bool,
            max_length: u64,
        ) {
            let mut kinds = Vec::new();
            if required && value.trim().is_empty() {
                kinds.push(ValidationErrorKind::Required);
            }
            if value.chars().count() as u64 > max_length {
                kinds.push(ValidationErrorKind::MaxLength(max_length));
            }
            if !kinds.is_empty() {
                errors.push(ValidationFieldError::from_resource::<String>(
                    value.into(),
                    path.into(),
                    kinds,
                ));
            }
        }

        pub fn add_user(dto: &AddUserDto) -> Result<(), ValidationError> {
            let mut errors = Vec::new();

            check_text(&mut errors, "/username", &dto.username, true, USERNAME_MAX_LENGTH);
            check_text(&mut errors, "/mobile", &dto.mobile, true, MOBILE_MAX_LENGTH);
            check_text(&mut errors, "/email", &dto.email, true, EMAIL_MAX_LENGTH);
            if let Some(name) = &dto.name {
                check_text(&mut errors, "/name", name, false, NAME_MAX_LENGTH);
            }

            if !errors.is_empty() {
                return Err(ValidationError::from_resource::<AddUserDto>(errors));
            }

            Ok(())
        }

        pub fn update_user(dto: &UpdateUserDto) -> Result<(), ValidationError> {
            let mut errors = Vec::new();

            check_text(&mut errors, "/mobile", &dto.mobile, true, MOBILE_MAX_LENGTH);
            check_text(&mut errors, "/email", &dto.email, true, EMAIL_MAX_LENGTH);
            if let Some(name) = &dto.name {
                check_text(&mut errors, "/name", name, false, NAME_MAX_LENGTH);
            }

            if !errors.is_empty() {
                return Err(ValidationError::from_resource::<UpdateUserDto>(errors));
            }

            Ok(())
        }
    }

    fn duplicate_username(username: &str) -> ApplicationError {
        ApplicationError::DuplicateUsername(ValidationError::from_resource::<AddUserDto>(vec![
            ValidationFieldError::from_resource::<String>(
                username.into(),
                UniqueField::Username.path().into(),
                vec![ValidationErrorKind::AlreadyExists],
            ),
        ]))
    }

    fn user_not_found(username: &str) -> ApplicationError {
        tracing::debug!(username, "user not found");
        NotFoundError::from_resource::<UserDto>(username).into()
    }

    /// API layer over a [`UserRepository`].
    ///
    /// Holds no state of its own besides the repository; every operation is a
    /// read followed by an optional write. The lookups made before a write only
    /// fail fast, uniqueness is guaranteed by the repository.
    pub struct UserResource<R> {
        repository: R,
    }

    impl<R: UserRepository> UserResource<R> {
        pub fn new(repository: R) -> Self {
            Self { repository }
        }

        pub fn repository(&self) -> &R {
            &self.repository
        }

        /// Unprojected page of stored users.
        pub async fn list(
            &self,
            pageable: &Pageable,
        ) -> Result<PageableResult<User>, ApplicationError> {
            Ok(self.repository.find_all(pageable).await?)
        }

        pub async fn get(&self, username: &str) -> Result<UserDto, ApplicationError> {
            self.repository
                .find_by_username(username)
                .await?
                .map(UserDto::from)
                .ok_or_else(|| user_not_found(username))
        }

        pub async fn create(&self, dto: AddUserDto) -> Result<UserDto, ApplicationError> {
            validation::add_user(&dto)?;

            if self
                .repository
                .find_by_username(&dto.username)
                .await?
                .is_some()
            {
                tracing::warn!(username = %dto.username, "username already taken");
                return Err(duplicate_username(&dto.username));
            }

            let username = dto.username.clone();
            let saved = self
                .repository
                .save(User::from(dto))
                .await
                .map_err(|err| match err {
                    PersistenceError::UniqueViolation(Some(UniqueField::Username)) => {
                        tracing::warn!(username = %username, "username taken by a concurrent write");
                        duplicate_username(&username)
                    }
                    PersistenceError::UniqueViolation(field) => {
                        ConflictError::from_resource::<AddUserDto>(username.as_str(), field).into()
                    }
                    err => err.into(),
                })?;

            tracing::info!(username = %saved.username(), id = ?saved.ident(), "user created");
            Ok(saved.into())
        }

        /// Replaces `mobile`, `name` and `email`; the username stays the lookup key.
        pub async fn update(
            &self,
            username: &str,
            dto: UpdateUserDto,
        ) -> Result<UserDto, ApplicationError> {
            validation::update_user(&dto)?;

            let user = self
                .repository
                .find_by_username(username)
                .await?
                .ok_or_else(|| user_not_found(username))?;

            let saved = self
                .repository
                .save(user.with_fields(dto.into()))
                .await
                .map_err(|err| match err {
                    // removed between lookup and write
                    PersistenceError::NotFound => user_not_found(username),
                    PersistenceError::UniqueViolation(field) => {
                        ConflictError::from_resource::<UpdateUserDto>(username, field).into()
                    }
                    err => err.into(),
                })?;

            tracing::info!(username, id = ?saved.ident(), "user updated");
            Ok(saved.into())
        }

        /// Removing an absent user succeeds without changes.
        pub async fn delete(&self, username: &str) -> Result<(), ApplicationError> {
            let id = self
                .repository
                .find_by_username(username)
                .await?
                .and_then(|user| user.ident());

            match id {
                Some(id) => {
                    self.repository.delete_by_id(id).await?;
                    tracing::info!(username, id, "user deleted");
                }
                None => tracing::debug!(username, "no user to delete"),
            }

            Ok(())
        }
    }

}
