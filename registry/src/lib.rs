use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::mailer::HttpMailer;
use adapter::redis::RedisClient;
use adapter::repository::auth::AuthRepositoryImpl;
use adapter::repository::club::ClubRepositoryImpl;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::invitation::InvitationRepositoryImpl;
use adapter::repository::membership::MembershipRepositoryImpl;
use adapter::repository::user::UserRepositoryImpl;
use chrono::Duration;
use kernel::notifier::InviteNotifier;
use kernel::repository::auth::AuthRepository;
use kernel::repository::club::ClubRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::invitation::InvitationRepository;
use kernel::repository::membership::MembershipRepository;
use kernel::repository::user::UserRepository;
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    club_repository: Arc<dyn ClubRepository>,
    invitation_repository: Arc<dyn InvitationRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    user_repository: Arc<dyn UserRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    invite_notifier: Arc<dyn InviteNotifier>,
    invitation_ttl: Duration,
}

impl AppRegistry {
    pub fn new(
        pool: ConnectionPool,
        redis_client: Arc<RedisClient>,
        app_config: AppConfig,
    ) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let club_repository = Arc::new(ClubRepositoryImpl::new(pool.clone()));
        let invitation_repository = Arc::new(InvitationRepositoryImpl::new(pool.clone()));
        let membership_repository = Arc::new(MembershipRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let auth_repository = Arc::new(AuthRepositoryImpl::new(
            pool.clone(),
            redis_client.clone(),
            app_config.auth.ttl,
        ));
        let invite_notifier = Arc::new(HttpMailer::new(
            &app_config.mailer,
            &app_config.invitation,
        ));
        Self {
            health_check_repository,
            club_repository,
            invitation_repository,
            membership_repository,
            user_repository,
            auth_repository,
            invite_notifier,
            invitation_ttl: Duration::days(app_config.invitation.ttl_days),
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn club_repository(&self) -> Arc<dyn ClubRepository> {
        self.club_repository.clone()
    }

    pub fn invitation_repository(&self) -> Arc<dyn InvitationRepository> {
        self.invitation_repository.clone()
    }

    pub fn membership_repository(&self) -> Arc<dyn MembershipRepository> {
        self.membership_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    pub fn invite_notifier(&self) -> Arc<dyn InviteNotifier> {
        self.invite_notifier.clone()
    }

    pub fn invitation_ttl(&self) -> Duration {
        self.invitation_ttl
    }
}
