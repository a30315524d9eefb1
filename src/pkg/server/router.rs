use axum::middleware::from_fn_with_state;
use axum::routing::{post, put};
use axum::{Router, routing::get};

use super::handlers::health::{healthz, livez};
use super::handlers::{applications, auth, jobs, professionals, system};
use super::middlewares::authn;
use super::state::AppState;

pub fn build_routes(state: AppState, base_path: &str) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/jobs", get(jobs::search))
        .route("/jobs/{id}", get(jobs::get))
        .route("/system/regions", get(system::regions))
        .route("/system/specialties", get(system::specialties))
        .route("/system/hospitals", get(system::hospitals));

    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/jobs", post(jobs::create))
        .route("/jobs/{id}", put(jobs::update).delete(jobs::delete))
        .route("/jobs/{id}/close", post(jobs::close))
        .route(
            "/applications",
            get(applications::list).post(applications::create),
        )
        .route(
            "/applications/{id}",
            get(applications::get).delete(applications::cancel),
        )
        .route("/applications/{id}/review", post(applications::review))
        .route(
            "/professionals/profile",
            get(professionals::get_profile).put(professionals::update_profile),
        )
        .route(
            "/professionals/availability",
            post(professionals::set_availability),
        )
        .route_layer(from_fn_with_state(state.clone(), authn::authenticate));

    let api = public.merge(protected);
    let app = if base_path.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(base_path, api)
    };
    app.route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::testing::{PASSWORD, memory_state};

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(app: &Router, email: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[traced_test]
    #[tokio::test]
    async fn test_apply_and_approve_over_http() {
        let (state, _) = memory_state().await;
        let app = build_routes(state, "/api/v1");

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "doc@example.com",
                "password": PASSWORD,
                "userType": "healthcare_professional",
                "name": "王大明",
                "phone": "0912345678",
                "idNumber": "A123456789",
                "professionalType": "doctor",
                "licenseNumber": "醫字第123456號"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["success"], true);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "admin@example.com",
                "password": PASSWORD,
                "userType": "hospital_admin",
                "name": "林院長",
                "phone": "0898765432",
                "hospitalCode": "HOSP001"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let admin = login(&app, "admin@example.com").await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/jobs",
            Some(&admin),
            Some(json!({
                "county": "屏東縣",
                "township": "屏東市",
                "professionalType": "doctor",
                "numberOfPositions": 1,
                "serviceDays": ["monday", "thursday"],
                "serviceStartDate": "2026-11-02",
                "serviceEndDate": "2026-11-30",
                "salary": { "amount": 8000, "unit": "per_day" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let job_id = body["data"]["jobId"].as_str().unwrap().to_string();

        let doctor = login(&app, "doc@example.com").await;
        let (status, body) = call(
            &app,
            Method::GET,
            "/api/v1/jobs?county=%E5%B1%8F%E6%9D%B1%E7%B8%A3",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["totalItems"], 1);
        assert_eq!(body["data"][0]["jobId"], job_id.as_str());

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/applications",
            Some(&doctor),
            Some(json!({ "jobId": job_id, "coverLetter": "可支援週一與週四" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let application_id = body["data"]["applicationId"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/applications/{}/review", application_id),
            Some(&admin),
            Some(json!({ "status": "approved", "reviewNote": "歡迎加入" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let (_, body) = call(
            &app,
            Method::GET,
            &format!("/api/v1/applications/{}", application_id),
            Some(&doctor),
            None,
        )
        .await;
        assert_eq!(body["data"]["status"], "approved");

        let (_, body) = call(
            &app,
            Method::GET,
            &format!("/api/v1/jobs/{}", job_id),
            None,
            None,
        )
        .await;
        assert_eq!(body["data"]["applicationsCount"], 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_protected_routes_need_a_bearer_token() {
        let (state, _) = memory_state().await;
        let app = build_routes(state, "/api/v1");

        let (status, body) = call(&app, Method::GET, "/api/v1/applications", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = call(
            &app,
            Method::GET,
            "/api/v1/applications",
            Some("not-a-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(&app, Method::GET, "/api/v1/system/regions", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["county"], "屏東縣");

        let (status, _) = call(&app, Method::GET, "/healthz", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_oversized_page_is_rejected() {
        let (state, _) = memory_state().await;
        let app = build_routes(state, "");
        let (status, body) = call(&app, Method::GET, "/jobs?limit=51", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "limit must be between 1 and 50");
    }

    #[traced_test]
    #[tokio::test]
    async fn test_malformed_requests_use_the_error_body() {
        let (state, _) = memory_state().await;
        let app = build_routes(state, "/api/v1");

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "a@b.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

        let (status, body) = call(&app, Method::GET, "/api/v1/jobs/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());

        let (status, body) = call(
            &app,
            Method::GET,
            "/api/v1/jobs?publicFundedOnly=yes",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }
}
