use async_trait::async_trait;
use kernel::notifier::{InviteMail, InviteNotifier};
use reqwest::Client;
use shared::{
    config::{InvitationConfig, MailerConfig},
    error::{AppError, AppResult},
};

/// HTTP の メール配送 API に招待メールを渡す
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    sender: String,
    base_url: String,
}

impl HttpMailer {
    pub fn new(mailer: &MailerConfig, invitation: &InvitationConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: mailer.endpoint.clone(),
            api_key: mailer.api_key.clone(),
            sender: mailer.sender.clone(),
            base_url: invitation.base_url.clone(),
        }
    }
}

#[async_trait]
impl InviteNotifier for HttpMailer {
    async fn notify(&self, mail: InviteMail) -> AppResult<()> {
        let join_url = format!("{}/join-club/{}", self.base_url, mail.token);
        let subject = format!("{}のリーダーに招待されました", mail.club_name);
        let html_body = format!(
            "<p>{}のリーダー（{}）として招待されています。</p>\
             <p><a href=\"{}\">こちらのリンク</a>から登録またはログインしてください。</p>",
            mail.club_name,
            mail.role.as_ref(),
            join_url,
        );

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "from": self.sender,
                "recipients": [mail.to],
                "subject": subject,
                "htmlBody": html_body,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("mailer error: {e}")))?;

        if !res.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "mailer returned status {}",
                res.status()
            )));
        }

        Ok(())
    }
}
