/*
 * Responsibility
 * - the URL structure: static method+path table
 * - which routes sit behind the bearer guard is decided here, by
 *   building a guarded sub-router and merging it with the public one
 */
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};

use crate::api::handlers::{bids, health, products, token, users};
use crate::middleware::auth::require_bearer;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(health::liveness))
        .route("/users", post(users::create_user))
        .route("/products", get(products::list_products))
        .route("/latest-products", get(products::latest_products))
        .route(
            "/products/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route("/getToken", post(token::issue_token))
        .route("/bids", post(bids::create_bid))
        .route("/bids/{id}", delete(bids::delete_bid));

    let protected = Router::new()
        .route("/products", post(products::create_product))
        .route("/bids", get(bids::list_bids))
        .route("/products/bids/{product_id}", get(bids::list_bids_for_product))
        .route_layer(from_fn_with_state(state.clone(), require_bearer));

    public.merge(protected).with_state(state)
}
