use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::invitation::{assign_invite, register_from_invite, show_invitation};

pub fn build_invitation_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/:token", get(show_invitation))
        .route("/:token/register", post(register_from_invite))
        .route("/:token/assign", post(assign_invite));

    Router::new().nest("/invitations", routers)
}
