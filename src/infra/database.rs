pub mod connection {
    use std::time::Duration;

    pub async fn create_sqlx_pool(database_url: &str) -> Result<sqlx::PgPool, sqlx::Error> {
        sqlx::postgres::PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .acquire_timeout(Duration::from_millis(1000))
            .idle_timeout(Duration::from_millis(1000 * 30))
            .max_lifetime(Duration::from_millis(1000 * 10))
            .connect(database_url)
            .await
    }
}

pub mod repository {
    use async_trait::async_trait;
    use futures::TryStreamExt;
    use sqlx::{
        postgres::PgArguments, query::Query, PgPool, Postgres, QueryBuilder,
    };

    use crate::{
        domain::{
            entity::{user::User, Entity, UserId},
            repository::{Direction, Pageable, PageableResult, UserRepository},
        },
        error::persistence::PersistenceError,
    };

    fn bind_user<'q>(
        query: Query<'q, Postgres, PgArguments>,
        user: &'q User,
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(user.username())
            .bind(user.mobile())
            .bind(user.name())
            .bind(user.enabled())
            .bind(user.email())
            .bind(user.password_hash().as_str())
            .bind(user.age())
            .bind(user.roles())
    }

    /// User storage backed by the `users` table of `dbschema.sql`.
    #[derive(Debug, Clone)]
    pub struct PgUserRepository {
        pool: PgPool,
    }

    impl PgUserRepository {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl UserRepository for PgUserRepository {
        async fn find_all(
            &self,
            pageable: &Pageable,
        ) -> Result<PageableResult<User>, PersistenceError> {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(&self.pool)
                .await?;

            let mut qb = QueryBuilder::<Postgres>::new(concat!(
                "SELECT id, username, mobile, name, enabled, email, password_hash, age, roles ",
                "FROM users ORDER BY ",
            ));
            for order in pageable.sort() {
                // column names come from a closed set, never from the request
                qb.push(order.field.column());
                qb.push(match order.direction {
                    Direction::Asc => " ASC NULLS FIRST, ",
                    Direction::Desc => " DESC NULLS LAST, ",
                });
            }
            qb.push("id ASC LIMIT ");
            qb.push_bind(pageable.size() as i64);
            qb.push(" OFFSET ");
            qb.push_bind(pageable.offset() as i64);

            let mut rows = qb.build().fetch(&self.pool);

            let mut data = Vec::with_capacity(pageable.size() as usize);
            while let Some(row) = rows.try_next().await? {
                data.push(User::try_from(&row)?);
            }

            Ok(PageableResult {
                total: total as u64,
                data,
            })
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, PersistenceError> {
            let row = sqlx::query(concat!(
                "SELECT id, username, mobile, name, enabled, email, password_hash, age, roles ",
                "FROM users WHERE username = $1",
            ))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

            match row {
                Some(row) => Ok(Some(User::try_from(&row)?)),
                None => Ok(None),
            }
        }

        async fn save(&self, user: User) -> Result<User, PersistenceError> {
            let row = match user.ident() {
                None => {
                    let query = sqlx::query(concat!(
                        "INSERT INTO users (username, mobile, name, enabled, email, password_hash, age, roles) ",
                        "VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ",
                        "RETURNING id, username, mobile, name, enabled, email, password_hash, age, roles",
                    ));
                    bind_user(query, &user).fetch_one(&self.pool).await?
                }
                Some(id) => {
                    let query = sqlx::query(concat!(
                        "UPDATE users SET username = $1, mobile = $2, name = $3, enabled = $4, ",
                        "email = $5, password_hash = $6, age = $7, roles = $8 WHERE id = $9 ",
                        "RETURNING id, username, mobile, name, enabled, email, password_hash, age, roles",
                    ));
                    // a missing row surfaces as `PersistenceError::NotFound`
                    bind_user(query, &user)
                        .bind(id)
                        .fetch_one(&self.pool)
                        .await?
                }
            };

            Ok(User::try_from(&row)?)
        }

        async fn delete_by_id(&self, id: UserId) -> Result<(), PersistenceError> {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

            Ok(())
        }
    }
}
