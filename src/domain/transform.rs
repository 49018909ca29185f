use sqlx::{postgres::PgRow, Row};

use super::entity::user::{User, UserState};

impl TryFrom<&PgRow> for UserState {
    type Error = sqlx::Error;

    fn try_from(row: &PgRow) -> Result<Self, Self::Error> {
        Ok(Self {
            username: row.try_get("username")?,
            mobile: row.try_get("mobile")?,
            name: row.try_get("name")?,
            enabled: row.try_get("enabled")?,
            email: row.try_get("email")?,
            password_hash: row.try_get::<String, _>("password_hash")?.into(),
            age: row.try_get("age")?,
            roles: row.try_get("roles")?,
        })
    }
}

impl TryFrom<&PgRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &PgRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(row.try_get("id")?),
            state: row.try_into()?,
        })
    }
}
