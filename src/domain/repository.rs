use std::{cmp::Ordering, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    base::resource_id,
    error::{
        persistence::PersistenceError,
        resource::{ValidationError, ValidationErrorKind, ValidationFieldError},
    },
};

use super::entity::{user::User, UserId};

/// One page of results together with the count of every matching record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageableResult<T> {
    pub total: u64,
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = ValidationErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ValidationErrorKind::UnknownVariant),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Id,
    Username,
    Mobile,
    Email,
    Name,
    Enabled,
    Age,
}

impl UserSortField {
    pub fn column(&self) -> &'static str {
        match self {
            UserSortField::Id => "id",
            UserSortField::Username => "username",
            UserSortField::Mobile => "mobile",
            UserSortField::Email => "email",
            UserSortField::Name => "name",
            UserSortField::Enabled => "enabled",
            UserSortField::Age => "age",
        }
    }

    /// Ascending order of two users on this field, absent names first.
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        match self {
            UserSortField::Id => a.id.cmp(&b.id),
            UserSortField::Username => a.username().cmp(b.username()),
            UserSortField::Mobile => a.mobile().cmp(b.mobile()),
            UserSortField::Email => a.email().cmp(b.email()),
            UserSortField::Name => a.name().cmp(b.name()),
            UserSortField::Enabled => a.enabled().cmp(&b.enabled()),
            UserSortField::Age => a.age().cmp(&b.age()),
        }
    }
}

impl FromStr for UserSortField {
    type Err = ValidationErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "username" => Ok(Self::Username),
            "mobile" => Ok(Self::Mobile),
            "email" => Ok(Self::Email),
            "name" => Ok(Self::Name),
            "enabled" => Ok(Self::Enabled),
            "age" => Ok(Self::Age),
            _ => Err(ValidationErrorKind::UnknownVariant),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: UserSortField,
    pub direction: Direction,
}

impl SortOrder {
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        let ord = self.field.compare(a, b);
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationErrorKind;

    /// Parses `property[,asc|desc]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let field = parts.next().unwrap_or_default().parse()?;
        let direction = match parts.next() {
            Some(dir) => dir.parse()?,
            None => Direction::Asc,
        };
        if parts.next().is_some() {
            return Err(ValidationErrorKind::InvalidType);
        }

        Ok(Self { field, direction })
    }
}

/// Page index, page size and sort order selecting one slice of the users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    page: u32,
    size: u32,
    sort: Vec<SortOrder>,
}

resource_id!(Pageable, "base::pageable");

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: Self::DEFAULT_SIZE,
            sort: Vec::new(),
        }
    }
}

impl Pageable {
    pub const DEFAULT_SIZE: u32 = 20;
    pub const MAX_SIZE: u32 = 2000;

    pub fn new(page: u32, size: u32, sort: Vec<SortOrder>) -> Result<Self, ValidationError> {
        if size == 0 || size > Self::MAX_SIZE {
            let kind = if size == 0 {
                ValidationErrorKind::Minimum(1)
            } else {
                ValidationErrorKind::Maximum(Self::MAX_SIZE as u64)
            };
            return Err(ValidationError::from_resource::<Self>(vec![
                ValidationFieldError::from_resource::<Self>(
                    size.to_string(),
                    "/size".into(),
                    vec![kind],
                ),
            ]));
        }

        Ok(Self { page, size, sort })
    }

    /// Build from raw query values, collecting every invalid parameter.
    pub fn parse<S: AsRef<str>>(
        page: Option<&str>,
        size: Option<&str>,
        sort: &[S],
    ) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();

        let page = match page.map(str::parse::<u32>) {
            None => 0,
            Some(Ok(page)) => page,
            Some(Err(_)) => {
                errors.push(invalid_param("/page", page.unwrap_or_default(), ValidationErrorKind::InvalidType));
                0
            }
        };

        let size = match size.map(str::parse::<u32>) {
            None => Self::DEFAULT_SIZE,
            Some(Ok(size)) => size,
            Some(Err(_)) => {
                errors.push(invalid_param("/size", size.unwrap_or_default(), ValidationErrorKind::InvalidType));
                Self::DEFAULT_SIZE
            }
        };

        let mut orders = Vec::with_capacity(sort.len());
        for value in sort.iter().map(AsRef::as_ref) {
            match value.parse::<SortOrder>() {
                Ok(order) => orders.push(order),
                Err(kind) => errors.push(invalid_param("/sort", value, kind)),
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError::from_resource::<Self>(errors));
        }

        Self::new(page, size, orders)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &[SortOrder] {
        &self.sort
    }

    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }

    /// Total ordering of users for this page request, `id` breaks ties.
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        self.sort
            .iter()
            .map(|order| order.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| UserSortField::Id.compare(a, b))
    }
}

fn invalid_param(path: &str, value: &str, kind: ValidationErrorKind) -> ValidationFieldError {
    ValidationFieldError::from_resource::<Pageable>(value.into(), path.into(), vec![kind])
}

/// Storage of user records.
///
/// Implementations enforce uniqueness of `username`, `mobile` and `email`,
/// failing a write with [`PersistenceError::UniqueViolation`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// One page of users plus the count of every stored user.
    async fn find_all(&self, pageable: &Pageable) -> Result<PageableResult<User>, PersistenceError>;

    /// Exact, case-sensitive match on username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, PersistenceError>;

    /// Inserts a user without id, assigning one, or replaces the stored user of the same id.
    async fn save(&self, user: User) -> Result<User, PersistenceError>;

    /// Removes the user if present.
    async fn delete_by_id(&self, id: UserId) -> Result<(), PersistenceError>;
}
