pub mod user {
    use serde::{Deserialize, Serialize};

    use crate::base::resource_id;

    /// Status token rendered for an enabled user.
    pub const ENABLED_ACTIVE: &str = "active";
    /// Status token rendered for a disabled user.
    pub const ENABLED_DISABLED: &str = "disabled";

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AddUserDto {
        pub username: String,
        pub mobile: String,
        #[serde(default)]
        pub name: Option<String>,
        pub email: String,
    }

    resource_id!(AddUserDto, "user::AddUser");

    /// Partial update input. Unknown fields such as `username` are ignored.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UpdateUserDto {
        pub mobile: String,
        #[serde(default)]
        pub name: Option<String>,
        pub email: String,
    }

    resource_id!(UpdateUserDto, "user::UpdateUser");

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserDto {
        pub username: String,
        pub mobile: String,
        pub name: Option<String>,
        pub enabled: String,
    }

    resource_id!(UserDto, "user::User");
}
