use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::{
    club::{register_club, show_club, show_club_list},
    invitation::create_invitation,
};

pub fn build_club_routers() -> Router<AppRegistry> {
    let clubs_routers = Router::new()
        .route("/", post(register_club))
        .route("/", get(show_club_list))
        .route("/:club_id", get(show_club))
        .route("/:club_id/invitations", post(create_invitation));

    Router::new().nest("/clubs", clubs_routers)
}
