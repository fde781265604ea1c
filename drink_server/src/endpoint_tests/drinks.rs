use actix_web::{http::StatusCode, test::TestRequest};
use drink_engine::{db_types::Drink, traits::DrinkApiError};
use serde_json::json;

use super::{
    helpers::{
        auth_config,
        bearer,
        error_body,
        issue_token,
        latte,
        offline_auth_config,
        send_request,
        start_jwks_server,
        water,
    },
    mocks::MockDrinkManager,
};

const ALL_PERMISSIONS: [&str; 4] = ["get:drinks-detail", "post:drinks", "patch:drinks", "delete:drinks"];

fn water_json() -> serde_json::Value {
    json!({"title": "Water", "recipe": [{"name": "H2O", "color": "clear", "parts": 1}]})
}

//----------------------------------------------   GET /drinks  ----------------------------------------------------
#[actix_web::test]
async fn empty_menu_is_not_found() {
    let _ = env_logger::try_init();
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drinks().returning(|| Ok(vec![]));
    let req = TestRequest::get().uri("/drinks");
    let (status, body) = send_request(req, manager, offline_auth_config()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, error_body(status, "Not found"));
}

#[actix_web::test]
async fn public_menu_hides_ingredient_names() {
    let _ = env_logger::try_init();
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drinks().returning(|| Ok(vec![water(), latte()]));
    let req = TestRequest::get().uri("/drinks");
    let (status, body) = send_request(req, manager, offline_auth_config()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"success":true,"drinks":[{"id":1,"title":"Water","recipe":[{"color":"clear","parts":1}]},{"id":2,"title":"Latte","recipe":[{"color":"brown","parts":1},{"color":"white","parts":3}]}]}"#
    );
}

#[actix_web::test]
async fn database_failure_is_an_internal_error() {
    let _ = env_logger::try_init();
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drinks().returning(|| Err(DrinkApiError::DatabaseError("database is locked".into())));
    let req = TestRequest::get().uri("/drinks");
    let (status, body) = send_request(req, manager, offline_auth_config()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, error_body(status, "Internal server error"));
}

//----------------------------------------------   GET /drinks-detail  ----------------------------------------------
#[actix_web::test]
async fn detailed_menu_includes_ingredient_names() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drinks().returning(|| Ok(vec![latte()]));
    let token = issue_token(&["get:drinks-detail"]);
    let req = TestRequest::get().uri("/drinks-detail").insert_header(bearer(&token));
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"success":true,"drinks":[{"id":2,"title":"Latte","recipe":[{"name":"Espresso","color":"brown","parts":1},{"name":"Milk","color":"white","parts":3}]}]}"#
    );
}

#[actix_web::test]
async fn empty_detailed_menu_is_not_found() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drinks().returning(|| Ok(vec![]));
    let token = issue_token(&["get:drinks-detail"]);
    let req = TestRequest::get().uri("/drinks-detail").insert_header(bearer(&token));
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, error_body(status, "Not found"));
}

//----------------------------------------------   POST /drinks  ----------------------------------------------------
#[actix_web::test]
async fn create_drink() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager
        .expect_insert_drink()
        .withf(|drink| drink.title == "Water" && drink.recipe.ingredients()[0].name == "H2O")
        .times(1)
        .returning(|drink| Ok(Drink { id: 42, title: drink.title, recipe: drink.recipe }));
    let token = issue_token(&["post:drinks"]);
    let req = TestRequest::post().uri("/drinks").insert_header(bearer(&token)).set_json(water_json());
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"success":true,"drinks":[{"id":42,"title":"Water","recipe":[{"name":"H2O","color":"clear","parts":1}]}]}"#
    );
}

#[actix_web::test]
async fn create_drink_with_fractional_parts() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager
        .expect_insert_drink()
        .withf(|drink| drink.recipe.ingredients()[0].parts.as_f64() == Some(0.5))
        .times(1)
        .returning(|drink| Ok(Drink { id: 7, title: drink.title, recipe: drink.recipe }));
    let token = issue_token(&["post:drinks"]);
    let body = json!({"title": "Half", "recipe": [{"name": "Milk", "color": "white", "parts": 0.5}]});
    let req = TestRequest::post().uri("/drinks").insert_header(bearer(&token)).set_json(body);
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"success":true,"drinks":[{"id":7,"title":"Half","recipe":[{"name":"Milk","color":"white","parts":0.5}]}]}"#
    );
}

#[actix_web::test]
async fn create_drink_without_a_token() {
    let _ = env_logger::try_init();
    let req = TestRequest::post().uri("/drinks").set_json(water_json());
    let (status, body) = send_request(req, MockDrinkManager::new(), offline_auth_config()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, error_body(status, "authorization_header_missing"));
}

#[actix_web::test]
async fn create_drink_without_a_recipe() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let token = issue_token(&["post:drinks"]);
    let req = TestRequest::post().uri("/drinks").insert_header(bearer(&token)).set_json(json!({"title": "Water"}));
    let (status, body) = send_request(req, MockDrinkManager::new(), auth_config(&server)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error_body(status, "Bad request"));
}

#[actix_web::test]
async fn create_drink_with_a_malformed_recipe() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let token = issue_token(&["post:drinks"]);
    let body = json!({"title": "Water", "recipe": {"name": "H2O", "color": "clear", "parts": 1}});
    let req = TestRequest::post().uri("/drinks").insert_header(bearer(&token)).set_json(body);
    let (status, body) = send_request(req, MockDrinkManager::new(), auth_config(&server)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error_body(status, "Bad request"));
}

#[actix_web::test]
async fn create_drink_with_an_empty_title() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let token = issue_token(&["post:drinks"]);
    let body = json!({"title": "", "recipe": []});
    let req = TestRequest::post().uri("/drinks").insert_header(bearer(&token)).set_json(body);
    let (status, body) = send_request(req, MockDrinkManager::new(), auth_config(&server)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error_body(status, "Bad request"));
}

#[actix_web::test]
async fn create_drink_with_a_duplicate_title() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_insert_drink().returning(|drink| Err(DrinkApiError::DuplicateTitle(drink.title)));
    let token = issue_token(&["post:drinks"]);
    let req = TestRequest::post().uri("/drinks").insert_header(bearer(&token)).set_json(water_json());
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, error_body(status, "Unprocessable"));
}

//----------------------------------------------   PATCH /drinks/{id}  ----------------------------------------------
#[actix_web::test]
async fn update_drink() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drink().withf(|id| *id == 1).times(1).returning(|_| Ok(Some(water())));
    manager
        .expect_update_drink()
        .withf(|id, drink| *id == 1 && drink.title == "Sparkling water")
        .times(1)
        .returning(|id, drink| Ok(Some(Drink { id, title: drink.title, recipe: drink.recipe })));
    let token = issue_token(&ALL_PERMISSIONS);
    let body = json!({
        "title": "Sparkling water",
        "recipe": [{"name": "H2O", "color": "clear", "parts": 1}, {"name": "CO2", "color": "clear", "parts": 1}]
    });
    let req = TestRequest::patch().uri("/drinks/1").insert_header(bearer(&token)).set_json(body);
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["success"], true);
    assert_eq!(response["drinks"][0]["id"], 1);
    assert_eq!(response["drinks"][0]["title"], "Sparkling water");
    assert_eq!(response["drinks"][0]["recipe"][1]["name"], "CO2");
}

#[actix_web::test]
async fn update_missing_drink() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drink().returning(|_| Ok(None));
    let token = issue_token(&["patch:drinks"]);
    let req = TestRequest::patch().uri("/drinks/999999").insert_header(bearer(&token)).set_json(water_json());
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, error_body(status, "Not found"));
}

#[actix_web::test]
async fn update_missing_drink_with_an_empty_title() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drink().withf(|id| *id == 999_999).times(1).returning(|_| Ok(None));
    let token = issue_token(&["patch:drinks"]);
    let body = json!({"title": "", "recipe": []});
    let req = TestRequest::patch().uri("/drinks/999999").insert_header(bearer(&token)).set_json(body);
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, error_body(status, "Not found"));
}

#[actix_web::test]
async fn update_with_an_empty_title() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drink().returning(|_| Ok(Some(water())));
    let token = issue_token(&["patch:drinks"]);
    let body = json!({"title": " ", "recipe": []});
    let req = TestRequest::patch().uri("/drinks/1").insert_header(bearer(&token)).set_json(body);
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error_body(status, "Bad request"));
}

#[actix_web::test]
async fn update_into_a_duplicate_title() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_fetch_drink().returning(|_| Ok(Some(latte())));
    manager.expect_update_drink().returning(|_, drink| Err(DrinkApiError::DuplicateTitle(drink.title)));
    let token = issue_token(&["patch:drinks"]);
    let req = TestRequest::patch().uri("/drinks/2").insert_header(bearer(&token)).set_json(water_json());
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, error_body(status, "Unprocessable"));
}

#[actix_web::test]
async fn update_needs_patch_permission() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let token = issue_token(&["post:drinks", "delete:drinks"]);
    let req = TestRequest::patch().uri("/drinks/1").insert_header(bearer(&token)).set_json(water_json());
    let (status, body) = send_request(req, MockDrinkManager::new(), auth_config(&server)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, error_body(status, "unauthorized"));
}

//----------------------------------------------   DELETE /drinks/{id}  ---------------------------------------------
#[actix_web::test]
async fn delete_drink() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_delete_drink().withf(|id| *id == 3).times(1).returning(|id| Ok(Some(id)));
    let token = issue_token(&["delete:drinks"]);
    let req = TestRequest::delete().uri("/drinks/3").insert_header(bearer(&token));
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"delete":3}"#);
}

#[actix_web::test]
async fn delete_missing_drink() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let mut manager = MockDrinkManager::new();
    manager.expect_delete_drink().returning(|_| Ok(None));
    let token = issue_token(&["delete:drinks"]);
    let req = TestRequest::delete().uri("/drinks/3").insert_header(bearer(&token));
    let (status, body) = send_request(req, manager, auth_config(&server)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, error_body(status, "Not found"));
}

#[actix_web::test]
async fn delete_with_a_non_numeric_id() {
    let _ = env_logger::try_init();
    let server = start_jwks_server().await;
    let token = issue_token(&["delete:drinks"]);
    let req = TestRequest::delete().uri("/drinks/espresso").insert_header(bearer(&token));
    let (status, body) = send_request(req, MockDrinkManager::new(), auth_config(&server)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, error_body(status, "Not found"));
}

//----------------------------------------------   Fallbacks  ----------------------------------------------------
#[actix_web::test]
async fn unsupported_method() {
    let _ = env_logger::try_init();
    let req = TestRequest::put().uri("/drinks").set_json(water_json());
    let (status, body) = send_request(req, MockDrinkManager::new(), offline_auth_config()).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, error_body(status, "Method not allowed"));
}

#[actix_web::test]
async fn unknown_route() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/cocktails");
    let (status, body) = send_request(req, MockDrinkManager::new(), offline_auth_config()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, error_body(status, "Not found"));
}
