// Common test utilities

pub mod harness;

pub use harness::*;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use lastbite_core::common::{AuthUser, UserId};
use lastbite_core::domains::profiles::models::{NewProfile, Profile, ProfileUpdate, Role};
use lastbite_core::kernel::{BaseProfileStore, TestDependencies};
use lastbite_core::server::build_app;
use tower::ServiceExt;

/// Router wired to in-memory collaborators.
pub struct TestApp {
    pub deps: TestDependencies,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(TestDependencies::new())
    }

    pub fn with(deps: TestDependencies) -> Self {
        init_tracing();
        let router = build_app(deps.server_deps(), &[]);
        Self { deps, router }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, path: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Cookie header for a freshly signed-in user.
    pub fn session_cookie(&self, user: &AuthUser) -> String {
        let session = self.deps.auth.session_for(user);
        format!(
            "lb-access-token={}; lb-refresh-token={}",
            session.tokens.access_token, session.tokens.refresh_token
        )
    }

    /// New signed-in user with no profile.
    pub fn sign_in_new_user(&self) -> (AuthUser, String) {
        let user = AuthUser::new(UserId::new()).with_email("user@example.com");
        let cookie = self.session_cookie(&user);
        (user, cookie)
    }

    pub async fn seed_profile(&self, user_id: UserId, role: Role) -> Profile {
        self.deps
            .profiles
            .insert_profile(NewProfile::for_role(user_id, role))
            .await
            .unwrap()
    }

    pub async fn seed_seller(
        &self,
        user_id: UserId,
        is_verified: bool,
        business_name: Option<&str>,
    ) -> Profile {
        self.seed_profile(user_id, Role::Seller).await;
        self.deps
            .profiles
            .update_profile(
                user_id,
                ProfileUpdate {
                    business_name: business_name.map(str::to_string),
                    is_verified: Some(is_verified),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Assert a redirect and return its target.
pub fn assert_redirect(response: &Response<Body>, status: StatusCode, target: &str) {
    assert_eq!(response.status(), status, "unexpected status");
    assert_eq!(location(response), target, "unexpected redirect target");
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value of a cookie set by the response, if any.
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).into_iter().find_map(|cookie| {
        cookie
            .strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or("").to_string())
    })
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
