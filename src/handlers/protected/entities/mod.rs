// handlers/protected/entities - generic CRUD surface, one route set per entity
//
// Route Prefix: /api/v1/entities/{entity}
// Every handler receives the entity's `EntityService` as router state and the
// caller's `AuthUser` from the JWT middleware.

pub mod batch;
pub mod collection;
pub mod record;

use axum::{
    extract::{rejection::PathRejection, Path},
    routing::{get, post},
    Router,
};

use crate::error::ApiError;
use crate::services::EntityService;

/// Routes for one entity. Static segments (`/all`, `/batch`) take priority
/// over `/:id`.
pub fn routes(service: EntityService) -> Router {
    let base = format!("/api/v1/entities/{}", service.entity().name);

    Router::new()
        .route(&base, get(collection::list).post(collection::create))
        .route(&format!("{}/all", base), get(collection::list_all))
        .route(
            &format!("{}/batch", base),
            post(batch::create).put(batch::update).delete(batch::delete),
        )
        .route(
            &format!("{}/:id", base),
            get(record::get).put(record::update).delete(record::delete),
        )
        .with_state(service)
}

pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::testing::{request, send, test_app};

    const PRICES: &str = "/api/v1/entities/price_data";

    fn price(anno: i64, classe: &str, prezzo: f64) -> serde_json::Value {
        json!({ "anno": anno, "classe_materiale": classe, "prezzo_euro_m3": prezzo })
    }

    #[tokio::test]
    async fn rows_are_private_to_their_owner() {
        let (app, _) = test_app();

        let (status, created) = send(&app, request("POST", PRICES, Some("u1"), Some(price(2024, "A", 12.5)))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 1);
        assert_eq!(created["user_id"], "u1");

        let (status, body) = send(&app, request("GET", &format!("{}/1", PRICES), Some("u2"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "Price_data not found" }));

        let (_, listed) = send(&app, request("GET", PRICES, Some("u2"), None)).await;
        assert_eq!(listed["total"], 0);
        assert_eq!(listed["items"], json!([]));

        let (status, _) = send(&app, request("PUT", &format!("{}/1", PRICES), Some("u2"), Some(json!({ "prezzo_euro_m3": 1.5 })))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, request("DELETE", &format!("{}/1", PRICES), Some("u2"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, updated) = send(&app, request("PUT", &format!("{}/1", PRICES), Some("u1"), Some(json!({ "prezzo_euro_m3": 13.5 })))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["prezzo_euro_m3"], 13.5);
        assert_eq!(updated["classe_materiale"], "A");

        let (status, body) = send(&app, request("DELETE", &format!("{}/1", PRICES), Some("u1"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Price_data deleted successfully", "id": 1 }));

        let (status, _) = send(&app, request("DELETE", &format!("{}/1", PRICES), Some("u1"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let (app, _) = test_app();
        for (anno, classe) in [(2023, "A"), (2024, "B"), (2024, "C")] {
            send(&app, request("POST", PRICES, Some("u1"), Some(price(anno, classe, 10.0)))).await;
        }

        let uri = format!("{}?query=%7B%22anno%22%3A2024%7D&sort=classe_materiale&limit=1", PRICES);
        let (status, body) = send(&app, request("GET", &uri, Some("u1"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["limit"], 1);
        assert_eq!(body["items"][0]["classe_materiale"], "B");

        let (_, body) = send(&app, request("GET", PRICES, Some("u1"), None)).await;
        let ids: Vec<_> = body["items"].as_array().unwrap().iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(3), json!(2), json!(1)]);
    }

    #[tokio::test]
    async fn malformed_requests_are_rejected() {
        let (app, _) = test_app();

        let (status, body) = send(&app, request("GET", &format!("{}?query=%7Banno", PRICES), Some("u1"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid query JSON format");

        let (status, _) = send(&app, request("GET", &format!("{}?limit=0", PRICES), Some("u1"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, request("GET", &format!("{}/abc", PRICES), Some("u1"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, request("POST", PRICES, Some("u1"), Some(json!({ "anno": 2024 })))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["field_errors"].is_object());
    }

    #[tokio::test]
    async fn all_spans_every_owner() {
        let (app, _) = test_app();
        send(&app, request("POST", PRICES, Some("u1"), Some(price(2024, "A", 1.5)))).await;
        send(&app, request("POST", PRICES, Some("u2"), Some(price(2024, "B", 2.5)))).await;

        let (status, body) = send(&app, request("GET", &format!("{}/all", PRICES), Some("u1"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn batch_create_skips_invalid_items() {
        let (app, store) = test_app();
        let items = json!({ "items": [price(2024, "A", 1.5), { "anno": 2024 }, price(2024, "B", 2.5)] });

        let (status, body) = send(&app, request("POST", &format!("{}/batch", PRICES), Some("u1"), Some(items))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.as_array().map(Vec::len), Some(2));
        assert_eq!(store.row_count("price_data"), 2);
    }

    #[tokio::test]
    async fn batch_create_aborts_on_store_failure() {
        let (app, store) = test_app();
        store.fail_inserts_after(1);
        let items = json!({ "items": [price(2024, "A", 1.5), price(2024, "B", 2.5), price(2024, "C", 3.5)] });

        let (status, body) = send(&app, request("POST", &format!("{}/batch", PRICES), Some("u1"), Some(items))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "Batch create failed" }));
        assert_eq!(store.row_count("price_data"), 1);
    }

    #[tokio::test]
    async fn batch_update_and_delete_touch_only_owned_rows() {
        let (app, store) = test_app();
        send(&app, request("POST", PRICES, Some("u1"), Some(price(2024, "A", 1.5)))).await;
        send(&app, request("POST", PRICES, Some("u2"), Some(price(2024, "B", 2.5)))).await;

        let updates = json!({ "items": [
            { "id": 1, "updates": { "prezzo_euro_m3": 9.5 } },
            { "id": 2, "updates": { "prezzo_euro_m3": 9.5 } },
        ] });
        let (status, body) = send(&app, request("PUT", &format!("{}/batch", PRICES), Some("u1"), Some(updates))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["id"], 1);

        let ids = json!({ "ids": [1, 2, 99] });
        let (status, body) = send(&app, request("DELETE", &format!("{}/batch", PRICES), Some("u1"), Some(ids))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted_count"], 1);
        assert_eq!(body["message"], "Successfully deleted 1 price_datas");
        assert_eq!(store.row_count("price_data"), 1);
    }

    #[tokio::test]
    async fn ids_beyond_int4_are_not_found() {
        let (app, _) = test_app();
        send(&app, request("POST", PRICES, Some("u1"), Some(price(2024, "A", 1.5)))).await;
        let uri = format!("{}/3000000000", PRICES);

        let (status, _) = send(&app, request("GET", &uri, Some("u1"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, request("PUT", &uri, Some("u1"), Some(json!({ "prezzo_euro_m3": 2.5 })))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, request("DELETE", &uri, Some("u1"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let ids = json!({ "ids": [3000000000_i64, 1] });
        let (status, body) = send(&app, request("DELETE", &format!("{}/batch", PRICES), Some("u1"), Some(ids))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted_count"], 1);
    }

    #[tokio::test]
    async fn integers_beyond_int4_are_bad_requests() {
        let (app, store) = test_app();

        let (status, body) = send(&app, request("POST", PRICES, Some("u1"), Some(price(3_000_000_000, "A", 1.5)))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field_errors"]["anno"], "Must be an integer");

        let uri = format!("{}?query=%7B%22anno%22%3A3000000000%7D", PRICES);
        let (status, _) = send(&app, request("GET", &uri, Some("u1"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let items = json!({ "items": [price(2024, "A", 1.5), price(3_000_000_000, "B", 2.5), price(2024, "C", 3.5)] });
        let (status, body) = send(&app, request("POST", &format!("{}/batch", PRICES), Some("u1"), Some(items))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.as_array().map(Vec::len), Some(2));
        assert_eq!(store.row_count("price_data"), 2);
    }
}
