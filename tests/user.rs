use pretty_assertions::assert_eq;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serial_test::serial;

use crate::setup::setup_test;

mod setup;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddUserDto<'a> {
    pub username: &'a str,
    pub mobile: &'a str,
    pub name: Option<&'a str>,
    pub email: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub mobile: String,
    pub name: Option<String>,
    pub enabled: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    pub total: u64,
    pub data: Vec<Value>,
}

fn users_url(base: &Url) -> Url {
    base.join("/api/users").unwrap()
}

fn user_url(base: &Url, username: &str) -> Url {
    base.join(&format!("/api/users/{username}")).unwrap()
}

async fn create_user(client: &Client, base: &Url, dto: &AddUserDto<'_>) -> reqwest::Response {
    client
        .post(users_url(base))
        .json(dto)
        .send()
        .await
        .unwrap()
}

async fn list_users(client: &Client, base: &Url, query: &str) -> PageResponse {
    let res = client
        .get(format!("{}?{query}", users_url(base)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

fn zhangsan() -> AddUserDto<'static> {
    AddUserDto {
        username: "zhangsan",
        mobile: "13000000001",
        name: Some("Zhang San"),
        email: "zhangsan@local.dev",
    }
}

#[tokio::test]
#[serial]
async fn insert_user() {
    let (client, url) = setup_test().await;
    let dto = zhangsan();

    let res = create_user(&client, &url, &dto).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let created: UserResponse = res.json().await.unwrap();
    assert_eq!(
        created,
        UserResponse {
            username: dto.username.into(),
            mobile: dto.mobile.into(),
            name: dto.name.map(Into::into),
            enabled: "active".into(),
        }
    );

    let res = client.get(user_url(&url, "zhangsan")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: UserResponse = res.json().await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[serial]
async fn reject_duplicate_username() {
    let (client, url) = setup_test().await;
    create_user(&client, &url, &zhangsan()).await;

    let res = create_user(
        &client,
        &url,
        &AddUserDto {
            mobile: "13000000002",
            email: "other@local.dev",
            ..zhangsan()
        },
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["DuplicateUsername"]["fields"][0]["path"], "/username");

    assert_eq!(list_users(&client, &url, "").await.total, 1);
}

#[tokio::test]
#[serial]
async fn reject_taken_mobile() {
    let (client, url) = setup_test().await;
    create_user(&client, &url, &zhangsan()).await;

    let res = create_user(
        &client,
        &url,
        &AddUserDto {
            username: "lisi",
            email: "lisi@local.dev",
            ..zhangsan()
        },
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(list_users(&client, &url, "").await.total, 1);
}

#[tokio::test]
#[serial]
async fn reject_malformed_body() {
    let (client, url) = setup_test().await;

    let res = client
        .post(users_url(&url))
        .json(&json!({ "username": "nomobile" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(list_users(&client, &url, "").await.total, 0);
}

#[tokio::test]
#[serial]
async fn get_missing_user() {
    let (client, url) = setup_test().await;

    let res = client.get(user_url(&url, "nobody")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "");
}

#[tokio::test]
#[serial]
async fn update_user() {
    let (client, url) = setup_test().await;
    create_user(&client, &url, &zhangsan()).await;

    let res = client
        .put(user_url(&url, "zhangsan"))
        .json(&json!({
            "username": "renamed",
            "mobile": "13999999999",
            "name": "San Zhang",
            "email": "new@local.dev",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let updated: UserResponse = res.json().await.unwrap();
    assert_eq!(
        updated,
        UserResponse {
            username: "zhangsan".into(),
            mobile: "13999999999".into(),
            name: Some("San Zhang".into()),
            enabled: "active".into(),
        }
    );

    let res = client.get(user_url(&url, "renamed")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let page = list_users(&client, &url, "").await;
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0]["id"], 1);
    assert_eq!(page.data[0]["email"], "new@local.dev");
}

#[tokio::test]
#[serial]
async fn update_missing_user() {
    let (client, url) = setup_test().await;

    let res = client
        .put(user_url(&url, "nobody"))
        .json(&json!({ "mobile": "13999999999", "name": null, "email": "new@local.dev" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "");
    assert_eq!(list_users(&client, &url, "").await.total, 0);
}

#[tokio::test]
#[serial]
async fn delete_user_twice() {
    let (client, url) = setup_test().await;
    create_user(&client, &url, &zhangsan()).await;

    for _ in 0..2 {
        let res = client
            .delete(user_url(&url, "zhangsan"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let res = client.get(user_url(&url, "zhangsan")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(list_users(&client, &url, "").await.total, 0);
}

#[tokio::test]
#[serial]
async fn list_users_by_page() {
    let (client, url) = setup_test().await;
    for (username, mobile) in [("a", "13000000001"), ("b", "13000000002"), ("c", "13000000003")] {
        let email = format!("{username}@local.dev");
        let res = create_user(
            &client,
            &url,
            &AddUserDto {
                username,
                mobile,
                name: None,
                email: &email,
            },
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let page = list_users(&client, &url, "page=0&size=1").await;
    assert_eq!(page.total, 3);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0]["username"], "a");
    assert!(page.data[0].get("password_hash").is_none());
    assert!(page.data[0].get("passwordHash").is_none());

    let page = list_users(&client, &url, "size=2&sort=username,desc").await;
    let usernames: Vec<&str> = page
        .data
        .iter()
        .map(|user| user["username"].as_str().unwrap())
        .collect();
    assert_eq!(page.total, 3);
    assert_eq!(usernames, vec!["c", "b"]);
}

#[tokio::test]
#[serial]
async fn reject_unknown_sort_property() {
    let (client, url) = setup_test().await;

    let res = client
        .get(format!("{}?sort=password_hash", users_url(&url)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
