/*
 * Responsibility
 * - v1 URL layout
 * - who may call what is decided by the policy table, not here
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::authenticate,
    countries::list_countries,
    health::health,
    travellers::{
        add_countries, deactivate_traveller, delete_traveller, get_traveller, list_travellers,
        list_travellers_paginated, register_traveller, remove_country, restore_traveller,
        total_travelled_countries, total_untravelled_countries,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/authenticate", post(authenticate))
        .route("/countries", get(list_countries))
        .route("/travellers", get(list_travellers))
        .route("/travellers/save", post(register_traveller))
        .route("/travellers/all/paginated", post(list_travellers_paginated))
        .route("/travellers/{traveller_id}", get(get_traveller))
        .route("/travellers/{traveller_id}/add", post(add_countries))
        .route(
            "/travellers/{traveller_id}/remove-country/{country_id}",
            patch(remove_country),
        )
        .route(
            "/travellers/{traveller_id}/total-travelled-countries",
            get(total_travelled_countries),
        )
        .route(
            "/travellers/{traveller_id}/total-untravelled-countries",
            get(total_untravelled_countries),
        )
        .route("/travellers/{traveller_id}/deactivate", patch(deactivate_traveller))
        .route("/travellers/{traveller_id}/restore", patch(restore_traveller))
        .route("/travellers/{traveller_id}/delete", delete(delete_traveller))
}
