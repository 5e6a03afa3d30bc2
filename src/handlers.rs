use actix_web::http::header::{ContentDisposition, ContentType, DispositionParam, DispositionType};
use actix_web::error::InternalError;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;
use crate::AppState;
use crate::export::{csv_file_name, to_csv, ExportFormat};
use crate::manager_records::errors::RecordError;
use crate::manager_records::models::{CreateRequest, SearchRequest, UpdateRequest};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Registers all routes
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error!("invalid request body: {}", err);
        InternalError::from_response(err, bad_request("Invalid request body")).into()
    }))
        .service(index)
        .service(search_weather)
        .service(create_record)
        .service(list_records)
        .service(get_record)
        .service(update_record)
        .service(delete_record)
        .service(export_record);
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().content_type(ContentType::html()).body(INDEX_HTML)
}

#[post("/api/weather/search")]
async fn search_weather(params: web::Json<SearchRequest>, data: web::Data<AppState>) -> impl Responder {
    info!("{:?}", params);

    match data.records.search(&params).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(e, "Internal server error"),
    }
}

#[post("/api/records")]
async fn create_record(params: web::Json<CreateRequest>, data: web::Data<AppState>) -> impl Responder {
    info!("{:?}", params);

    match data.records.create(&params).await {
        Ok(record) => HttpResponse::Created().json(json!({ "success": true, "record": record })),
        Err(e) => error_response(e, "Failed to create record"),
    }
}

#[get("/api/records")]
async fn list_records(data: web::Data<AppState>) -> impl Responder {
    match data.records.list().await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => error_response(e, "Failed to fetch records"),
    }
}

#[get("/api/records/{id}")]
async fn get_record(id: web::Path<i64>, data: web::Data<AppState>) -> impl Responder {
    match data.records.get(id.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => error_response(e, "Failed to fetch record"),
    }
}

#[put("/api/records/{id}")]
async fn update_record(id: web::Path<i64>, params: web::Json<UpdateRequest>, data: web::Data<AppState>) -> impl Responder {
    let id = id.into_inner();
    info!("record {}: {:?}", id, params);

    match data.records.update(id, &params).await {
        Ok(record) => HttpResponse::Ok().json(json!({ "success": true, "record": record })),
        Err(e) => error_response(e, "Failed to update record"),
    }
}

#[delete("/api/records/{id}")]
async fn delete_record(id: web::Path<i64>, data: web::Data<AppState>) -> impl Responder {
    match data.records.delete(id.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(e) => error_response(e, "Failed to delete record"),
    }
}

#[get("/api/records/{id}/export/{format}")]
async fn export_record(path: web::Path<(i64, String)>, data: web::Data<AppState>) -> impl Responder {
    let (id, format) = path.into_inner();
    info!("export of record {} as {}", id, format);

    let Ok(format) = format.parse::<ExportFormat>() else {
        return bad_request("Unsupported format");
    };

    let record = match data.records.get(id).await {
        Ok(record) => record,
        Err(e) => return error_response(e, "Failed to export record"),
    };

    match format {
        ExportFormat::Json => HttpResponse::Ok().json(record),
        ExportFormat::Csv => match to_csv(&record) {
            Ok(csv) => HttpResponse::Ok()
                .content_type("text/csv")
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(csv_file_name(id))],
                })
                .body(csv),
            Err(e) => {
                error!("failed to export record {}: {}", id, e);
                internal_error("Failed to export record")
            }
        },
    }
}

/// Maps a record error to a response, persistence details are logged but not returned
///
/// # Arguments
///
/// * 'e' - the error
/// * 'failure' - message returned for persistence errors
fn error_response(e: RecordError, failure: &str) -> HttpResponse {
    match e {
        RecordError::Validation(msg) => bad_request(&msg),
        RecordError::NotFound(msg) => HttpResponse::NotFound().json(json!({ "error": msg })),
        RecordError::Upstream(msg) => {
            error!("upstream failure: {}", msg);
            internal_error(&msg)
        },
        RecordError::Persistence(e) => {
            error!("{}: {}", failure, e);
            internal_error(failure)
        },
    }
}

fn bad_request(msg: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": msg }))
}

fn internal_error(msg: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "error": msg }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::Value;
    use wiremock::MockServer;
    use rusqlite::Connection;
    use crate::manager_records::tests::{manager_for, manager_with_db, mount_paris};

    macro_rules! app {
        ($server:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState { records: manager_for($server) }))
                    .configure(routes),
            ).await
        };
    }

    fn create_body() -> Value {
        json!({ "location": "Paris, FR", "start_date": "2024-01-01", "end_date": "2024-01-05" })
    }

    #[actix_web::test]
    async fn test_index() {
        let mock_server = MockServer::start().await;
        let app = app!(&mock_server);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap().starts_with("text/html"));
    }

    #[actix_web::test]
    async fn test_search_returns_no_videos_without_key() {
        let mock_server = MockServer::start().await;
        mount_paris(&mock_server).await;
        let app = app!(&mock_server);

        let req = test::TestRequest::post()
            .uri("/api/weather/search")
            .set_json(json!({ "location": "Paris, FR" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["location"]["name"], "Paris, FR");
        assert_eq!(body["videos"], json!([]));
    }

    #[actix_web::test]
    async fn test_search_empty_location() {
        let mock_server = MockServer::start().await;
        let app = app!(&mock_server);

        let req = test::TestRequest::post()
            .uri("/api/weather/search")
            .set_json(json!({ "location": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Location is required");
    }

    #[actix_web::test]
    async fn test_malformed_body_is_json_error() {
        let mock_server = MockServer::start().await;
        let app = app!(&mock_server);

        let req = test::TestRequest::post()
            .uri("/api/records")
            .set_json(json!({ "location": 5, "start_date": "2024-01-01", "end_date": "2024-01-05" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid request body" }));

        let req = test::TestRequest::post()
            .uri("/api/weather/search")
            .set_payload("{\"location\": \"Paris\"}")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid request body" }));

        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_persistence_failure_is_generic_and_rolled_back() {
        let mock_server = MockServer::start().await;
        mount_paris(&mock_server).await;
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("weather_data.db");
        let db_path = db_path.to_str().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState { records: manager_with_db(&mock_server, db_path) }))
                .configure(routes),
        ).await;

        let req = test::TestRequest::post().uri("/api/records").set_json(create_body()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["record"]["id"].as_i64().unwrap();

        // writes fail from here on, reads keep working
        let conn = Connection::open(db_path).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER no_insert BEFORE INSERT ON weather_records BEGIN SELECT RAISE(ABORT, 'disk full'); END;
             CREATE TRIGGER no_update BEFORE UPDATE ON weather_records BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        ).unwrap();

        let req = test::TestRequest::post().uri("/api/records").set_json(create_body()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert_eq!(serde_json::from_str::<Value>(body).unwrap(), json!({ "error": "Failed to create record" }));
        assert!(!body.contains("DBError") && !body.contains("disk full"));

        let req = test::TestRequest::put()
            .uri(&format!("/api/records/{}", id))
            .set_json(json!({ "end_date": "2024-01-03" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert_eq!(serde_json::from_str::<Value>(body).unwrap(), json!({ "error": "Failed to update record" }));
        assert!(!body.contains("DBError") && !body.contains("disk full"));

        let req = test::TestRequest::get().uri("/api/records").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["end_date"], "2024-01-05");
    }

    #[actix_web::test]
    async fn test_record_lifecycle() {
        let mock_server = MockServer::start().await;
        mount_paris(&mock_server).await;
        let app = app!(&mock_server);

        let req = test::TestRequest::post().uri("/api/records").set_json(create_body()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        let id = body["record"]["id"].as_i64().unwrap();
        assert_eq!(body["record"]["location_name"], "Paris, FR");
        assert!(body["record"]["weather_data"].as_array().unwrap().len() <= 8);

        let req = test::TestRequest::get().uri(&format!("/api/records/{}", id)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["start_date"], "2024-01-01");

        let req = test::TestRequest::put()
            .uri(&format!("/api/records/{}", id))
            .set_json(json!({ "end_date": "2024-01-03" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["record"]["end_date"], "2024-01-03");

        let req = test::TestRequest::get().uri("/api/records").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let req = test::TestRequest::delete().uri(&format!("/api/records/{}", id)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true }));

        let req = test::TestRequest::get().uri(&format!("/api/records/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_create_validation_and_not_found() {
        let mock_server = MockServer::start().await;
        let app = app!(&mock_server);

        let req = test::TestRequest::post()
            .uri("/api/records")
            .set_json(json!({ "location": "Paris", "start_date": "2024-01-05", "end_date": "2024-01-01" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // no geocoding mock mounted, wiremock answers 404
        let req = test::TestRequest::post().uri("/api/records").set_json(create_body()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_unknown_record() {
        let mock_server = MockServer::start().await;
        let app = app!(&mock_server);

        let req = test::TestRequest::delete().uri("/api/records/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/records").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn test_export() {
        let mock_server = MockServer::start().await;
        mount_paris(&mock_server).await;
        let app = app!(&mock_server);

        let req = test::TestRequest::post().uri("/api/records").set_json(create_body()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["record"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get().uri(&format!("/api/records/{}/export/csv", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/csv");
        assert_eq!(
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            &format!("attachment; filename=\"weather_{}.csv\"", id),
        );
        let csv = test::read_body(resp).await;
        assert_eq!(std::str::from_utf8(&csv).unwrap().lines().count(), 9);

        let req = test::TestRequest::get().uri(&format!("/api/records/{}/export/json", id)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], id);

        let req = test::TestRequest::get().uri(&format!("/api/records/{}/export/xml", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unsupported format");

        let req = test::TestRequest::get().uri("/api/records/999/export/csv").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
