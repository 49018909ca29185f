use serde::Serialize;

use crate::domain::datatype::PasswordHash;

use super::{state_ref, state_with, Entity, UserId};

#[derive(Debug, Clone, Serialize)]
pub struct UserState {
    pub(in crate::domain) username: String,
    pub(in crate::domain) mobile: String,
    pub(in crate::domain) name: Option<String>,
    pub(in crate::domain) enabled: bool,
    pub(in crate::domain) email: String,
    #[serde(skip)]
    pub(in crate::domain) password_hash: PasswordHash,
    pub(in crate::domain) age: i32,
    pub(in crate::domain) roles: Vec<String>,
}

/// Persisted user record.
///
/// Values are never changed in place: the `with_*` methods derive a new
/// value which is then handed to the repository to replace the stored one.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub(in crate::domain) id: Option<UserId>,
    #[serde(flatten)]
    pub(in crate::domain) state: UserState,
}

/// Fields replaced by a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub mobile: String,
    pub name: Option<String>,
    pub email: String,
}

impl Entity for User {
    type Id = UserId;

    fn ident(&self) -> Option<UserId> {
        self.id
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl User {
    state_ref!(username, String);
    state_ref!(mobile, String);
    state_ref!(name, Option<String>);
    state_ref!(email, String);
    state_ref!(password_hash, PasswordHash);
    state_ref!(roles, Vec<String>);

    state_with!(with_mobile, mobile, String);
    state_with!(with_name, name, Option<String>);
    state_with!(with_email, email, String);
    state_with!(with_enabled, enabled, bool);
    state_with!(with_password_hash, password_hash, PasswordHash);
    state_with!(with_age, age, i32);
    state_with!(with_roles, roles, Vec<String>);

    /// New, not yet persisted, user. Enabled, no password, no roles.
    pub fn new(username: String, mobile: String, email: String, name: Option<String>) -> Self {
        Self {
            id: None,
            state: UserState {
                username,
                mobile,
                name,
                enabled: true,
                email,
                password_hash: PasswordHash::default(),
                age: 0,
                roles: Vec::new(),
            },
        }
    }

    pub fn enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn age(&self) -> i32 {
        self.state.age
    }

    pub fn with_fields(&self, changes: UserChanges) -> Self {
        self.with_mobile(changes.mobile)
            .with_name(changes.name)
            .with_email(changes.email)
    }

    /// Identity handed out by a store on insertion.
    ///
    /// An already assigned identity is kept.
    pub fn with_assigned_id(&self, id: UserId) -> Self {
        Self {
            id: self.id.or(Some(id)),
            state: self.state.clone(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User{{username='{}', mobile='{}', email='{}', name='{}'}}",
            self.state.username,
            self.state.mobile,
            self.state.email,
            self.state.name.as_deref().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn user() -> User {
        User::new(
            "zhangsan".into(),
            "13000000001".into(),
            "zhangsan@local.dev".into(),
            Some("Zhang San".into()),
        )
    }

    #[test]
    fn new_user_defaults() {
        let user = user();

        assert_eq!(user.ident(), None);
        assert!(user.enabled());
        assert_eq!(user.age(), 0);
        assert!(user.roles().is_empty());
        assert_eq!(user.password_hash(), &PasswordHash::default());
    }

    #[test]
    fn unsaved_users_are_never_equal() {
        let user = user();
        assert!(user != user.clone());
    }

    #[test]
    fn users_with_same_id_are_equal() {
        let saved = user().with_assigned_id(7);
        let other = User::new("lisi".into(), "1".into(), "lisi@local.dev".into(), None)
            .with_assigned_id(7);

        assert!(saved == other);
        assert!(saved != user().with_assigned_id(8));
        assert!(saved != user());
    }

    #[test]
    fn assigned_id_is_never_replaced() {
        let saved = user().with_assigned_id(1);
        assert_eq!(saved.with_assigned_id(2).ident(), Some(1));
    }

    #[test]
    fn with_fields_derives_a_new_value() {
        let original = user().with_assigned_id(3).with_age(30).with_enabled(false);
        let updated = original.with_fields(UserChanges {
            mobile: "13999999999".into(),
            name: None,
            email: "new@local.dev".into(),
        });

        assert_eq!(original.mobile(), "13000000001");
        assert_eq!(original.email(), "zhangsan@local.dev");
        assert_eq!(original.name().as_deref(), Some("Zhang San"));

        assert_eq!(updated.ident(), Some(3));
        assert_eq!(updated.username(), "zhangsan");
        assert_eq!(updated.mobile(), "13999999999");
        assert_eq!(updated.email(), "new@local.dev");
        assert_eq!(updated.name(), &None);
        assert_eq!(updated.age(), 30);
        assert!(!updated.enabled());
    }

    #[test]
    fn display_omits_password_hash() {
        let user = user().with_password_hash(PasswordHash::from("hash-value".to_string()));

        assert_eq!(
            user.to_string(),
            "User{username='zhangsan', mobile='13000000001', email='zhangsan@local.dev', name='Zhang San'}"
        );
        assert!(!format!("{user:?}").contains("hash-value"));
    }

    #[test]
    fn serialize_skips_password_hash() {
        let user = user()
            .with_assigned_id(1)
            .with_password_hash(PasswordHash::from("hash-value".to_string()))
            .with_roles(vec!["admin".into()]);

        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "username": "zhangsan",
                "mobile": "13000000001",
                "name": "Zhang San",
                "enabled": true,
                "email": "zhangsan@local.dev",
                "age": 0,
                "roles": ["admin"],
            })
        );
    }
}
