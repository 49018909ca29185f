pub mod controller;
pub mod database;
pub mod memory;

pub mod router {
    use std::sync::Arc;

    use salvo::{logging::Logger, Router};

    use super::controller::*;
    use crate::{app::use_case::user::UserResource, domain::repository::UserRepository};

    pub fn app<R>(resource: Arc<UserResource<R>>) -> Router
    where
        R: UserRepository + 'static,
    {
        Router::new()
            .push(
                Router::with_path("api/users")
                    .get(ListUsersController::new(resource.clone()))
                    .post(CreateUserController::new(resource.clone()))
                    .push(
                        Router::with_path("<username>")
                            .get(GetUserController::new(resource.clone()))
                            .put(UpdateUserController::new(resource.clone()))
                            .delete(DeleteUserController::new(resource)),
                    ),
            )
            .hoop(Logger)
    }
}
