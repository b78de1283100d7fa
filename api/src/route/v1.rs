use axum::Router;
use registry::AppRegistry;

use super::{
    auth::build_auth_routers, club::build_club_routers,
    invitation::build_invitation_routers, user::build_user_routers,
};

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_auth_routers())
        .merge(build_club_routers())
        .merge(build_invitation_routers())
        .merge(build_user_routers());
    Router::new().nest("/api/v1", router)
}
