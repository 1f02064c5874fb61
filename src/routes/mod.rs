use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, auth, public, user, vendor};
use crate::middleware::auth::{auth_middleware, require_admin, require_user, require_vendor};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Create role-specific governor layers
    let vendor_governor = create_role_governor(RateLimitedRole::Vendor);
    let user_governor = create_role_governor(RateLimitedRole::User);
    // Create IP-based governor for public routes
    let public_governor = create_public_governor();

    // Public routes (IP-based rate limiting)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    // Public catalog routes (published resources only)
    let public_routes = Router::new()
        .route("/services", get(public::list_services))
        .route("/services/{id}", get(public::get_service))
        .route("/cards", get(public::list_cards))
        .route("/cards/{id}", get(public::get_card))
        .layer(public_governor);

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        // Moderation
        .route("/services/pending", get(admin::pending_services))
        .route("/services/{id}/status", put(admin::moderate_service))
        .route("/cards/pending", get(admin::pending_cards))
        .route("/cards/{id}/status", put(admin::moderate_card))
        // User management
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::update_user_role))
        // Booking oversight
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings/{id}/cancel", post(admin::cancel_booking))
        // Review takedown
        .route("/reviews/{id}", delete(admin::remove_review))
        // No second rate limiter for admin; the IP-based one covers it
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Vendor routes (requires auth + vendor role)
    // Rate limit: 500 requests per minute (5x base)
    let vendor_routes = Router::new()
        .route("/services", post(vendor::create_service))
        .route("/services", get(vendor::my_services))
        .route("/services/{id}", put(vendor::update_service))
        .route("/services/{id}/slots", post(vendor::add_slots))
        .route("/cards", post(vendor::create_card))
        .route("/cards", get(vendor::my_cards))
        .route("/cards/{id}", put(vendor::update_card))
        .route("/bookings", get(vendor::vendor_bookings))
        .route("/bookings/{id}/status", put(vendor::update_booking_status))
        .layer(vendor_governor)
        .layer(middleware::from_fn(require_vendor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Customer routes (requires auth + user role)
    // Rate limit: 100 requests per minute (1x base)
    let user_routes = Router::new()
        .route("/estimations", post(user::create_estimation))
        .route("/estimations", get(user::my_estimations))
        .route("/estimations/{id}", delete(user::remove_estimation))
        .route("/estimations/{id}/convert", post(user::convert_estimation))
        .route("/bookings", post(user::create_booking))
        .route("/bookings", get(user::my_bookings))
        .route("/bookings/{id}/cancel", post(user::cancel_booking))
        .route("/reviews", post(user::submit_review))
        .route("/reviews", get(user::my_reviews))
        .layer(user_governor)
        .layer(middleware::from_fn(require_user))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/vendor", vendor_routes)
        .nest("/api", user_routes)
        .with_state(state)
}
