pub mod resource;
pub mod use_case;

pub mod transform {
    pub mod user {
        use crate::{
            app::resource::user::{
                AddUserDto, UpdateUserDto, UserDto, ENABLED_ACTIVE, ENABLED_DISABLED,
            },
            domain::entity::user::{User, UserChanges},
        };

        pub fn enabled_status(enabled: bool) -> &'static str {
            if enabled {
                ENABLED_ACTIVE
            } else {
                ENABLED_DISABLED
            }
        }

        impl From<AddUserDto> for User {
            fn from(dto: AddUserDto) -> Self {
                Self::new(dto.username, dto.mobile, dto.email, dto.name)
            }
        }

        impl From<UpdateUserDto> for UserChanges {
            fn from(dto: UpdateUserDto) -> Self {
                Self {
                    mobile: dto.mobile,
                    name: dto.name,
                    email: dto.email,
                }
            }
        }

        impl From<&User> for UserDto {
            fn from(user: &User) -> Self {
                Self {
                    username: user.username().clone(),
                    mobile: user.mobile().clone(),
                    name: user.name().clone(),
                    enabled: enabled_status(user.enabled()).into(),
                }
            }
        }

        impl From<User> for UserDto {
            fn from(user: User) -> Self {
                Self::from(&user)
            }
        }

    }
}
