use actix_web::{App, http::StatusCode, test, web};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use stadium_booking::middleware::RequestIdMiddleware;
use stadium_booking::routes;

mod common;
use common::{AuthHelper, MockData, TestEnv, match_day};

macro_rules! test_app {
    ($env:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($env.state.clone()))
                .app_data(web::Data::new(MockData::config()))
                .wrap(RequestIdMiddleware)
                .configure(routes::configure),
        )
        .await
    };
}

fn room_body(branch_id: Uuid, start: &str, end: &str, total_slots: i32) -> Value {
    json!({
        "branchId": branch_id,
        "scheduledDate": match_day().format("%Y-%m-%d").to_string(),
        "startTime": start,
        "endTime": end,
        "totalSlots": total_slots,
    })
}

#[actix_web::test]
async fn test_create_room_requires_a_token() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/api/v1/rooms/individual")
        .set_json(room_body(branch.id, "09:00", "10:00", 4))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/rooms/individual")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .set_json(room_body(branch.id, "09:00", "10:00", 4))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_room_lifecycle_over_http() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let owner = env.user().await;
    let guest = env.user().await;
    let late = env.user().await;
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/api/v1/rooms/individual")
        .insert_header(AuthHelper::auth_header(owner))
        .set_json(room_body(branch.id, "09:00", "10:00", 2))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Room created successfully");
    assert_eq!(body["data"]["status"], "OPEN");
    assert_eq!(body["data"]["filledSlots"], 1);
    let room_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/rooms/individual/{}/join", room_id))
        .insert_header(AuthHelper::auth_header(guest))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "FULL");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/rooms/individual/{}/join", room_id))
        .insert_header(AuthHelper::auth_header(late))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Room is already full");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/rooms/individual/{}", room_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["participants"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/bookings/my-bookings")
        .insert_header(AuthHelper::auth_header(guest))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let bookings = body["data"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["bookingType"], "INDIVIDUAL");
}

#[actix_web::test]
async fn test_unknown_room_is_not_found() {
    let env = TestEnv::new();
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/rooms/individual/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Room not found");
}

#[actix_web::test]
async fn test_invalid_status_filter_is_a_bad_request() {
    let env = TestEnv::new();
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri("/api/v1/rooms/individual?status=bogus")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid status: bogus");

    let req = test::TestRequest::get()
        .uri("/api/v1/rooms/individual?status=open&page=0&size=5")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["size"], 5);
}

#[actix_web::test]
async fn test_team_created_over_http_lists_the_captain() {
    let env = TestEnv::new();
    let captain = env.user().await;
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/api/v1/teams")
        .insert_header(AuthHelper::auth_header(captain))
        .set_json(json!({ "name": "Sunday League", "rosterSize": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["captainId"], captain.to_string());
    assert_eq!(body["data"]["memberCount"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/teams/my-teams/captain")
        .insert_header(AuthHelper::auth_header(captain))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_responses_carry_a_correlation_id() {
    let env = TestEnv::new();
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri("/api/v1/branches")
        .insert_header(("X-Correlation-ID", "trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-correlation-id").unwrap(),
        "trace-42"
    );
}

#[actix_web::test]
async fn test_token_for_unknown_user_is_not_found() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/api/v1/rooms/individual")
        .insert_header(AuthHelper::auth_header(Uuid::new_v4()))
        .set_json(room_body(branch.id, "09:00", "10:00", 4))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User not found");
}

#[actix_web::test]
async fn test_search_over_http() {
    let env = TestEnv::new();
    env.branch_named("Meridian Bowl", "8 Compass Road").await;
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri("/api/v1/search?query=meridian&type=branches")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["totalResults"], 1);
    assert_eq!(body["data"]["branches"][0]["name"], "Meridian Bowl");
    assert_eq!(body["data"]["teamRooms"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::get()
        .uri("/api/v1/search?query=meridian&type=players")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid search type: players");
}
