use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, StatusCode, header};
use serde_json::{Value, json};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

fn base_url() -> String {
    std::env::var("BLOG_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

fn client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client must build")
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect must carry a location")
        .to_string()
}

async fn register_and_login(client: &Client, username: &str) -> String {
    let base = base_url();
    let password = "password123";

    let response = client
        .post(format!("{base}/auth/registration/"))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": password,
        }))
        .send()
        .await
        .expect("register request must succeed");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/");

    let login: Value = client
        .post(format!("{base}/auth/login/"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("login request must succeed")
        .error_for_status()
        .expect("login must succeed")
        .json()
        .await
        .expect("login body must be json");
    assert_eq!(login["user"]["username"], username);
    login["access_token"]
        .as_str()
        .expect("token must be a string")
        .to_string()
}

/// Start the server with `STORAGE_BACKEND=memory` and
/// `MEMORY_FIXTURES=blogicum-server/fixtures/demo.json`, or against a database
/// that has a published `travel` category.
#[tokio::test]
#[ignore = "requires running HTTP server with a published `travel` category"]
async fn http_smoke_flow() {
    let base = base_url();
    let client = client();
    let suffix = unique_suffix();
    let author = format!("author_{suffix}");
    let reader = format!("reader_{suffix}");

    let author_token = register_and_login(&client, &author).await;
    let reader_token = register_and_login(&client, &reader).await;

    let category: Value = client
        .get(format!("{base}/category/travel/"))
        .send()
        .await
        .expect("category request must succeed")
        .error_for_status()
        .expect("travel category must be published")
        .json()
        .await
        .expect("category body must be json");
    let category_id = category["category"]["id"]
        .as_i64()
        .expect("category id must be a number");

    let response = client
        .post(format!("{base}/posts/create/"))
        .bearer_auth(&author_token)
        .json(&json!({
            "title": "smoke title",
            "text": "smoke text",
            "category": category_id,
        }))
        .send()
        .await
        .expect("create request must succeed");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/profile/{author}/"));

    let profile: Value = client
        .get(format!("{base}/profile/{author}/"))
        .send()
        .await
        .expect("profile request must succeed")
        .error_for_status()
        .expect("profile must exist")
        .json()
        .await
        .expect("profile body must be json");
    let post_id = profile["posts"][0]["id"]
        .as_i64()
        .expect("new post must be listed");

    let response = client
        .post(format!("{base}/posts/{post_id}/comment/"))
        .bearer_auth(&reader_token)
        .json(&json!({ "text": "nice post" }))
        .send()
        .await
        .expect("comment request must succeed");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let response = client
        .post(format!("{base}/posts/{post_id}/edit/"))
        .bearer_auth(&reader_token)
        .json(&json!({ "title": "hijacked", "text": "hijacked", "category": category_id }))
        .send()
        .await
        .expect("edit request must succeed");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let detail: Value = client
        .get(format!("{base}/posts/{post_id}/"))
        .send()
        .await
        .expect("detail request must succeed")
        .error_for_status()
        .expect("post must be public")
        .json()
        .await
        .expect("detail body must be json");
    assert_eq!(detail["post"]["title"], "smoke title");
    assert_eq!(detail["post"]["comment_count"], 1);
    assert_eq!(detail["comments"][0]["text"], "nice post");

    let response = client
        .post(format!("{base}/posts/{post_id}/delete/"))
        .bearer_auth(&author_token)
        .send()
        .await
        .expect("delete request must succeed");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = client
        .get(format!("{base}/posts/{post_id}/"))
        .send()
        .await
        .expect("detail request must succeed");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{base}/posts/create/"))
        .json(&json!({ "title": "anonymous", "text": "anonymous" }))
        .send()
        .await
        .expect("create request must succeed");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{base}/no/such/page/"))
        .send()
        .await
        .expect("request must succeed");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("404 body must be json");
    assert_eq!(body["error"], "not found");
}
