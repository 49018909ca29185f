use std::sync::Arc;

use async_trait::async_trait;
use salvo::{http::StatusCode, writer::Json, Depot, FlowCtrl, Handler, Request, Response};

use crate::{
    app::{
        resource::user::{AddUserDto, UpdateUserDto},
        use_case::user::UserResource,
    },
    domain::repository::{Pageable, UserRepository},
    error::{app::ApplicationError, http::BadRequest},
};

macro_rules! map_res_err {
    ($result:ident, $response:ident) => {
        match $result {
            Err(err) => {
                $response.render(err);
                return;
            }
            Ok(ok) => ok,
        }
    };
}

macro_rules! user_controller {
    ($name:ident) => {
        pub struct $name<R> {
            resource: Arc<UserResource<R>>,
        }

        impl<R> $name<R> {
            pub fn new(resource: Arc<UserResource<R>>) -> Self {
                Self { resource }
            }
        }
    };
}

user_controller!(ListUsersController);
user_controller!(GetUserController);
user_controller!(CreateUserController);
user_controller!(UpdateUserController);
user_controller!(DeleteUserController);

/// Extract the username path param of a request.
fn extract_username(req: &Request) -> Result<String, BadRequest> {
    req.params()
        .get("username")
        .cloned()
        .ok_or(BadRequest::MissingPathParam)
}

/// Extract the page request from the `page`, `size` and `sort` query params.
fn extract_pageable(req: &Request) -> Result<Pageable, ApplicationError> {
    let queries = req.queries();
    let sort: &[String] = queries.get_vec("sort").map(Vec::as_slice).unwrap_or_default();

    Ok(Pageable::parse(
        queries.get("page").map(String::as_str),
        queries.get("size").map(String::as_str),
        sort,
    )?)
}

#[async_trait]
impl<R: UserRepository + 'static> Handler for ListUsersController<R> {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let result = extract_pageable(req);
        let pageable = map_res_err!(result, res);

        let result = self.resource.list(&pageable).await;
        let page = map_res_err!(result, res);

        res.render(Json(page));
        res.set_status_code(StatusCode::OK);
    }
}

#[async_trait]
impl<R: UserRepository + 'static> Handler for GetUserController<R> {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let result = extract_username(req);
        let username = map_res_err!(result, res);

        let result = self.resource.get(&username).await;
        let user = map_res_err!(result, res);

        res.render(Json(user));
        res.set_status_code(StatusCode::OK);
    }
}

#[async_trait]
impl<R: UserRepository + 'static> Handler for CreateUserController<R> {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let result: Result<AddUserDto, _> = req.parse_body().await.map_err(BadRequest::from);
        let dto = map_res_err!(result, res);

        let result = self.resource.create(dto).await;
        let user = map_res_err!(result, res);

        res.render(Json(user));
        res.set_status_code(StatusCode::CREATED);
    }
}

#[async_trait]
impl<R: UserRepository + 'static> Handler for UpdateUserController<R> {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let result = extract_username(req);
        let username = map_res_err!(result, res);

        let result: Result<UpdateUserDto, _> = req.parse_body().await.map_err(BadRequest::from);
        let dto = map_res_err!(result, res);

        let result = self.resource.update(&username, dto).await;
        let user = map_res_err!(result, res);

        res.render(Json(user));
        res.set_status_code(StatusCode::OK);
    }
}

#[async_trait]
impl<R: UserRepository + 'static> Handler for DeleteUserController<R> {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let result = extract_username(req);
        let username = map_res_err!(result, res);

        let result = self.resource.delete(&username).await;
        map_res_err!(result, res);

        res.set_status_code(StatusCode::NO_CONTENT);
    }
}
