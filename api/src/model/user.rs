use kernel::model::{
    id::{ClubId, UserId},
    role::Role,
    user::User,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    Admin,
    SuperAdmin,
}

impl From<Role> for RoleName {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => Self::Admin,
            Role::SuperAdmin => Self::SuperAdmin,
        }
    }
}

impl From<RoleName> for Role {
    fn from(value: RoleName) -> Self {
        match value {
            RoleName::Admin => Self::Admin,
            RoleName::SuperAdmin => Self::SuperAdmin,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: RoleName,
    pub leadership_club_ids: Vec<ClubId>,
}

impl UserResponse {
    pub fn new(user: User, leadership_club_ids: Vec<ClubId>) -> Self {
        let User {
            user_id,
            user_name,
            email,
            role,
        } = user;
        Self {
            user_id,
            user_name,
            email,
            role: RoleName::from(role),
            leadership_club_ids,
        }
    }
}
