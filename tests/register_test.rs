//! Integration tests for the registration and read endpoints:
//! validation order, uniqueness conflicts, safe projection, ordering.

use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Helper: start the server on a random port and return the base URL.
async fn start_test_server() -> String {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    let db = roster_server::db::init_db(&data_dir).expect("Failed to init DB");
    let state = roster_server::state::AppState::new(db);
    let app = roster_server::routes::build_router(state, "*");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
        // Keep tmp_dir alive so the data directory isn't deleted
        let _keep = tmp_dir;
    });

    format!("http://{}", addr)
}

/// A registration body that passes every validation rule.
fn sample_user(email: &str, login_id: &str) -> serde_json::Value {
    json!({
        "firstName": "Asha",
        "lastName": "Rao",
        "mobileNo": "9876543210",
        "emailId": email,
        "address": {
            "street": "Gandhi Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "country": "India"
        },
        "loginId": login_id,
        "password": "Abcdef!"
    })
}

#[tokio::test]
async fn test_liveness_and_health() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(&base_url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "User registry API is running");

    let resp = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_register_success() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&sample_user("asha@example.com", "asha0001"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "User registered successfully!");
    assert!(!body["userId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_names_rejected_and_not_persisted() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let mut body = sample_user("asha@example.com", "asha0001");
    body.as_object_mut().unwrap().remove("firstName");
    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "First name is required");

    let mut body = sample_user("asha@example.com", "asha0001");
    body.as_object_mut().unwrap().remove("lastName");
    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "Last name is required");

    // Neither attempt persisted anything
    let resp = client
        .get(format!("{}/api/users", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let users: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(users.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_mobile_number_rules() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    for bad in ["987654321", "98765432100", "98765432a0", ""] {
        let mut body = sample_user("asha@example.com", "asha0001");
        body["mobileNo"] = json!(bad);
        let resp = client
            .post(format!("{}/api/register", base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "mobile {:?} should be rejected", bad);
        let err: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(err["message"], "Mobile number must be exactly 10 digits");
    }

    // Exactly 10 digits passes (other fields valid)
    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&sample_user("asha@example.com", "asha0001"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn test_password_rules() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let mut body = sample_user("asha@example.com", "asha0001");
    body["password"] = json!("abc");
    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // "Abcdef!" satisfies length, case, and symbol requirements
    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&sample_user("asha@example.com", "asha0001"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn test_duplicate_email_rejected_first_record_kept() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&sample_user("asha@example.com", "asha0001"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Same email, different login id
    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&sample_user("asha@example.com", "asha0002"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "Email ID already exists");

    // First record remains queryable
    let resp = client
        .get(format!("{}/api/users/asha@example.com", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let user: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(user["loginId"], "asha0001");
}

#[tokio::test]
async fn test_duplicate_login_id_rejected() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&sample_user("asha@example.com", "asha0001"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&sample_user("ravi@example.com", "asha0001"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "Login ID already exists");
}

#[tokio::test]
async fn test_get_unknown_email_returns_404() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/users/nobody@example.com", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let err: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "User not found");
}

#[tokio::test]
async fn test_round_trip_excludes_password() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&sample_user("asha@example.com", "asha0001"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .get(format!("{}/api/users/asha@example.com", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let user: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(user["firstName"], "Asha");
    assert_eq!(user["lastName"], "Rao");
    assert_eq!(user["mobileNo"], "9876543210");
    assert_eq!(user["emailId"], "asha@example.com");
    assert_eq!(user["loginId"], "asha0001");
    assert_eq!(user["address"]["street"], "Gandhi Road");
    assert_eq!(user["address"]["city"], "Bengaluru");
    assert_eq!(user["address"]["state"], "Karnataka");
    assert_eq!(user["address"]["country"], "India");
    assert!(!user["createdAt"].as_str().unwrap().is_empty());
    assert!(!user["updatedAt"].as_str().unwrap().is_empty());

    // Safe projection: no password field in any form
    let keys: Vec<&String> = user.as_object().unwrap().keys().collect();
    assert!(
        !keys
            .iter()
            .any(|k| k.to_lowercase().contains("password")),
        "password must not appear in responses, got keys {:?}",
        keys
    );
}

#[tokio::test]
async fn test_absent_address_normalized_to_empty_strings() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let mut body = sample_user("asha@example.com", "asha0001");
    body.as_object_mut().unwrap().remove("address");
    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .get(format!("{}/api/users/asha@example.com", base_url))
        .send()
        .await
        .unwrap();
    let user: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(user["address"]["street"], "");
    assert_eq!(user["address"]["city"], "");
    assert_eq!(user["address"]["state"], "");
    assert_eq!(user["address"]["country"], "");
}

#[tokio::test]
async fn test_list_users_newest_first() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    for (email, login_id) in [
        ("first@example.com", "login001"),
        ("second@example.com", "login002"),
        ("third@example.com", "login003"),
    ] {
        let resp = client
            .post(format!("{}/api/register", base_url))
            .json(&sample_user(email, login_id))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let resp = client
        .get(format!("{}/api/users", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let users: serde_json::Value = resp.json().await.unwrap();
    let emails: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["emailId"].as_str().unwrap())
        .collect();
    assert_eq!(
        emails,
        vec!["third@example.com", "second@example.com", "first@example.com"]
    );
}

#[tokio::test]
async fn test_address_field_charset_checked_when_present() {
    let base_url = start_test_server().await;
    let client = reqwest::Client::new();

    let mut body = sample_user("asha@example.com", "asha0001");
    body["address"]["city"] = json!("Bengaluru 560001");
    let resp = client
        .post(format!("{}/api/register", base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "City must contain only letters");
}
