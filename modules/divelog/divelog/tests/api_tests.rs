#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Router-level tests against an in-memory database.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, test_app};
use serde_json::{Value, json};

fn dive_body(max_depth: Value) -> Value {
    json!({
        "site_name": "Blue Hole",
        "dived_at": "2024-05-01T09:30:00Z",
        "bottom_time_min": 42,
        "max_depth": max_depth,
    })
}

async fn set_imperial(app: &TestApp, cookie: &str) {
    let res = app
        .send(
            Method::PATCH,
            "/divelog/v1/preferences",
            Some(cookie),
            Some(json!({"depth": "ft", "temperature": "f", "pressure": "psi"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}

#[tokio::test]
async fn register_sets_cookie_and_account_is_readable() {
    let app = test_app().await;
    let cookie = app.register("Diver@Example.com").await;
    assert!(cookie.starts_with("divelog.session-token="));

    let res = app.get("/divelog/v1/account", &cookie).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["email"], "diver@example.com");
    assert_eq!(res.data()["display_name"], "Test Diver");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    app.register("dup@example.com").await;

    let res = app
        .send(
            Method::POST,
            "/divelog/v1/auth/register",
            None,
            Some(json!({
                "email": "dup@example.com",
                "display_name": "Again",
                "password": "another-password",
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["status"], 409);
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let app = test_app().await;

    let res = app.send(Method::GET, "/divelog/v1/dives", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["status"], 401);
    assert!(res.set_cookie.is_none());

    let res = app
        .get("/divelog/v1/dives", "divelog.session-token=not-a-token")
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.clears_cookie());
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = test_app().await;
    app.register("login@example.com").await;

    let res = app
        .send(
            Method::POST,
            "/divelog/v1/auth/login",
            None,
            Some(json!({"email": "login@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .send(
            Method::POST,
            "/divelog/v1/auth/login",
            None,
            Some(json!({"email": "login@example.com", "password": "correct-horse-battery"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.cookie_pair().starts_with("divelog.session-token="));
}

#[tokio::test]
async fn password_change_invalidates_older_sessions() {
    let app = test_app().await;
    let old_cookie = app.register("rotate@example.com").await;

    let res = app
        .post(
            "/divelog/v1/account/password",
            &old_cookie,
            json!({
                "current_password": "correct-horse-battery",
                "new_password": "brand-new-password",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let new_cookie = res.cookie_pair();

    let res = app.get("/divelog/v1/account", &old_cookie).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.clears_cookie());

    let res = app.get("/divelog/v1/account", &new_cookie).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_password_changes_from_one_session_let_only_one_through() {
    let app = test_app().await;
    let cookie = app.register("race@example.com").await;
    let (app_ref, cookie) = (&app, cookie.as_str());
    let change = move |new_password: &'static str| {
        app_ref.post(
            "/divelog/v1/account/password",
            cookie,
            json!({
                "current_password": "correct-horse-battery",
                "new_password": new_password,
            }),
        )
    };

    let (a, b) = tokio::join!(change("first-new-password"), change("second-new-password"));
    let (winner, loser, winning_password) = match (a.status, b.status) {
        (StatusCode::OK, StatusCode::UNAUTHORIZED) => (a, b, "first-new-password"),
        (StatusCode::UNAUTHORIZED, StatusCode::OK) => (b, a, "second-new-password"),
        other => panic!("expected exactly one success, got {other:?}"),
    };
    assert!(loser.clears_cookie());

    let res = app.get("/divelog/v1/account", &winner.cookie_pair()).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .send(
            Method::POST,
            "/divelog/v1/auth/login",
            None,
            Some(json!({"email": "race@example.com", "password": winning_password})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = test_app().await;
    let res = app
        .send(Method::POST, "/divelog/v1/auth/logout", None, None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.clears_cookie());
}

#[tokio::test]
async fn preferences_default_to_metric_and_patch_one_axis() {
    let app = test_app().await;
    let cookie = app.register("prefs@example.com").await;

    let res = app.get("/divelog/v1/preferences", &cookie).await;
    assert_eq!(
        res.data(),
        &json!({"depth": "m", "temperature": "c", "pressure": "bar", "weight": "kg"})
    );

    let res = app
        .send(
            Method::PATCH,
            "/divelog/v1/preferences",
            Some(&cookie),
            Some(json!({"depth": "ft"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["depth"], "ft");
    assert_eq!(res.data()["pressure"], "bar");

    let res = app
        .send(
            Method::PATCH,
            "/divelog/v1/preferences",
            Some(&cookie),
            Some(json!({"weight": "stone"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "weight");
}

#[tokio::test]
async fn dives_are_stored_canonical_and_shown_in_preferred_units() {
    let app = test_app().await;
    let cookie = app.register("dives@example.com").await;
    set_imperial(&app, &cookie).await;

    let res = app
        .post("/divelog/v1/dives", &cookie, dive_body(json!({"value": 100})))
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.data()["max_depth_cm"], 3048);
    assert_eq!(res.data()["display"]["max_depth"]["unit"], "ft");
    assert_eq!(res.data()["display"]["water_temp"]["value"], Value::Null);
    let id = res.data()["id"].as_str().unwrap().to_owned();

    let res = app.get(&format!("/divelog/v1/dives/{id}"), &cookie).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["site_name"], "Blue Hole");

    let res = app
        .send(
            Method::PUT,
            &format!("/divelog/v1/dives/{id}"),
            Some(&cookie),
            Some(dive_body(json!({"value": 20, "unit": "m"}))),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.data()["max_depth_cm"], 2000);

    let res = app.get("/divelog/v1/dives", &cookie).await;
    assert_eq!(res.data().as_array().unwrap().len(), 1);

    let res = app
        .send(
            Method::DELETE,
            &format!("/divelog/v1/dives/{id}"),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(&format!("/divelog/v1/dives/{id}"), &cookie).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dive_with_mismatched_unit_is_rejected_per_field() {
    let app = test_app().await;
    let cookie = app.register("units@example.com").await;

    let res = app
        .post(
            "/divelog/v1/dives",
            &cookie,
            dive_body(json!({"value": 30, "unit": "psi"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "max_depth");
}

#[tokio::test]
async fn malformed_json_gets_the_error_envelope() {
    let app = test_app().await;
    let cookie = app.register("json@example.com").await;

    let res = app
        .post("/divelog/v1/dives", &cookie, json!({"site_name": 12}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["status"], 400);
    assert!(res.body["error"].is_string());
}

#[tokio::test]
async fn records_are_scoped_to_their_owner() {
    let app = test_app().await;
    let alice = app.register("alice@example.com").await;
    let bob = app.register("bob@example.com").await;

    let res = app
        .post("/divelog/v1/dives", &alice, dive_body(json!({"value": 18})))
        .await;
    let id = res.data()["id"].as_str().unwrap().to_owned();

    let res = app.get(&format!("/divelog/v1/dives/{id}"), &bob).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.get("/divelog/v1/dives", &bob).await;
    assert!(res.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn plans_use_preferred_depth_unit() {
    let app = test_app().await;
    let cookie = app.register("plans@example.com").await;
    set_imperial(&app, &cookie).await;

    let res = app
        .post(
            "/divelog/v1/plans",
            &cookie,
            json!({
                "site_name": "Shark Point",
                "planned_at": "2024-06-01T08:00:00Z",
                "planned_max_depth": {"value": 98},
                "gas_mix": "EAN32",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.data()["planned_max_depth_cm"], 2987);
    assert_eq!(res.data()["display"]["planned_max_depth"]["unit"], "ft");
}

#[tokio::test]
async fn certification_definitions_are_public_and_core_first() {
    let app = test_app().await;

    let res = app
        .send(
            Method::GET,
            "/divelog/v1/certification-definitions",
            None,
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let defs = res.data().as_array().unwrap();
    assert!(!defs.is_empty());
    assert_eq!(defs[0]["category"], "core");

    let first_non_core = defs.iter().position(|d| d["category"] != "core").unwrap();
    assert!(defs[first_non_core..].iter().all(|d| d["category"] != "core"));
}

#[tokio::test]
async fn certification_can_be_held_once() {
    let app = test_app().await;
    let cookie = app.register("certs@example.com").await;

    let defs = app
        .send(
            Method::GET,
            "/divelog/v1/certification-definitions",
            None,
            None,
        )
        .await;
    let definition_id = defs.data()[0]["id"].as_str().unwrap().to_owned();

    let body = json!({"definition_id": definition_id, "card_number": "A-123"});
    let res = app.post("/divelog/v1/certifications", &cookie, body.clone()).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.data()["definition"]["id"], definition_id.as_str());
    let id = res.data()["id"].as_str().unwrap().to_owned();

    let res = app.post("/divelog/v1/certifications", &cookie, body).await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app
        .send(
            Method::DELETE,
            &format!("/divelog/v1/certifications/{id}"),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get("/divelog/v1/certifications", &cookie).await;
    assert!(res.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn gear_kits_only_take_owned_items() {
    let app = test_app().await;
    let alice = app.register("gear-a@example.com").await;
    let bob = app.register("gear-b@example.com").await;

    let reg = app
        .post(
            "/divelog/v1/gear",
            &alice,
            json!({"name": "Primary reg", "kind": "regulator"}),
        )
        .await;
    assert_eq!(reg.status, StatusCode::CREATED, "{}", reg.body);
    let reg_id = reg.data()["id"].as_str().unwrap().to_owned();

    let fins = app
        .post("/divelog/v1/gear", &bob, json!({"name": "Fins", "kind": "fins"}))
        .await;
    let fins_id = fins.data()["id"].as_str().unwrap().to_owned();

    let res = app
        .post(
            "/divelog/v1/gear-kits",
            &alice,
            json!({"name": "Warm water", "item_ids": [reg_id, fins_id]}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "item_ids");

    let res = app
        .post(
            "/divelog/v1/gear-kits",
            &alice,
            json!({"name": "Warm water", "item_ids": [reg_id, reg_id]}),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.data()["item_ids"], json!([reg_id]));
    let kit_id = res.data()["id"].as_str().unwrap().to_owned();

    let res = app
        .send(
            Method::DELETE,
            &format!("/divelog/v1/gear/{reg_id}"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(&format!("/divelog/v1/gear-kits/{kit_id}"), &alice).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["item_ids"], json!([]));
}

#[tokio::test]
async fn unknown_gear_kind_is_a_validation_error() {
    let app = test_app().await;
    let cookie = app.register("kind@example.com").await;

    let res = app
        .post(
            "/divelog/v1/gear",
            &cookie,
            json!({"name": "Torch", "kind": "flashlight"}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "kind");
}

#[tokio::test]
async fn deleting_the_account_requires_the_password() {
    let app = test_app().await;
    let cookie = app.register("leave@example.com").await;
    app.post("/divelog/v1/dives", &cookie, dive_body(json!({"value": 12})))
        .await;

    let res = app
        .send(
            Method::DELETE,
            "/divelog/v1/account",
            Some(&cookie),
            Some(json!({"password": "not-it"})),
        )
        .await;
    assert_ne!(res.status, StatusCode::NO_CONTENT);

    let res = app
        .send(
            Method::DELETE,
            "/divelog/v1/account",
            Some(&cookie),
            Some(json!({"password": "correct-horse-battery"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.clears_cookie());

    let res = app.get("/divelog/v1/account", &cookie).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn openapi_document_lists_routes_and_cookie_scheme() {
    let app = test_app().await;

    let res = app
        .send(Method::GET, "/divelog/v1/openapi.json", None, None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let paths = res.body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/divelog/v1/dives/{id}"));
    assert!(paths["/divelog/v1/dives/{id}"]["put"].is_object());
    assert!(paths["/divelog/v1/dives/{id}"]["delete"].is_object());
    assert_eq!(
        res.body["components"]["securitySchemes"]["sessionCookie"]["name"],
        "divelog.session-token"
    );
}
