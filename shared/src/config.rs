use anyhow::Result;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub invitation: InvitationConfig,
    pub mailer: MailerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?.parse()?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let redis = RedisConfig {
            host: std::env::var("REDIS_HOST")?,
            port: std::env::var("REDIS_PORT")?.parse()?,
        };
        let auth = AuthConfig {
            ttl: std::env::var("AUTH_TOKEN_TTL")
                .unwrap_or_else(|_| "86400".into())
                .parse()?,
        };
        let invitation = InvitationConfig {
            // 招待の有効期間（デフォルト 7 日）
            ttl_days: std::env::var("INVITATION_TTL_DAYS")
                .unwrap_or_else(|_| "7".into())
                .parse()?,
            base_url: std::env::var("INVITATION_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
        };
        let mailer = MailerConfig {
            endpoint: std::env::var("MAILER_ENDPOINT")?,
            api_key: std::env::var("MAILER_API_KEY")?,
            sender: std::env::var("MAILER_SENDER")?,
        };
        Ok(Self {
            database,
            redis,
            auth,
            invitation,
            mailer,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

pub struct AuthConfig {
    pub ttl: u64,
}

pub struct InvitationConfig {
    pub ttl_days: i64,
    pub base_url: String,
}

pub struct MailerConfig {
    pub endpoint: String,
    pub api_key: String,
    pub sender: String,
}
