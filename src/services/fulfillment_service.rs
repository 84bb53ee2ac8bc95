//! Webhook-driven delivery: once a checkout completes, find the draft saved
//! for that session and email the customer a link plus a QR code to it.

use crate::config::FulfillmentConfig;
use crate::database::PageStore;
use crate::error::{AppError, AppResult};
use crate::external::stripe_webhook::CHECKOUT_SESSION_COMPLETED;
use crate::external::{CompletedCheckoutSession, InlineImage, Mailer, OutgoingEmail, WebhookEvent};
use crate::models::DraftPage;
use crate::utils::render_qr_png;
use askama::Template;
use std::sync::Arc;
use std::time::Duration;

pub const EMAIL_SUBJECT: &str = "Sua Página Personalizada Está Pronta!";
pub const QR_CONTENT_ID: &str = "qrcode";

#[derive(Template)]
#[template(path = "email/page_ready.html")]
struct PageReadyHtml<'a> {
    link: &'a str,
    qr_cid: &'a str,
}

#[derive(Template)]
#[template(path = "email/page_ready.txt")]
struct PageReadyText<'a> {
    link: &'a str,
}

#[derive(Clone)]
pub struct FulfillmentService {
    pages: Arc<dyn PageStore>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
    lookup_attempts: u32,
    lookup_interval: Duration,
}

impl FulfillmentService {
    pub fn new(
        pages: Arc<dyn PageStore>,
        mailer: Arc<dyn Mailer>,
        base_url: impl Into<String>,
        config: &FulfillmentConfig,
    ) -> Self {
        Self {
            pages,
            mailer,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            lookup_attempts: config.lookup_attempts.max(1),
            lookup_interval: Duration::from_millis(config.lookup_interval_ms),
        }
    }

    pub fn page_link(&self, session_id: &str) -> String {
        format!("{}/pagina-criada/{session_id}", self.base_url)
    }

    /// Only `checkout.session.completed` does anything
    pub async fn handle_event(&self, event: &WebhookEvent) -> AppResult<()> {
        if event.event_type != CHECKOUT_SESSION_COMPLETED {
            log::info!("Ignoring webhook event {} ({})", event.event_type, event.id);
            return Ok(());
        }
        let session = event.checkout_session()?;
        self.fulfill(&session).await
    }

    pub async fn fulfill(&self, session: &CompletedCheckoutSession) -> AppResult<()> {
        let email = session.payer_email().ok_or_else(|| {
            AppError::ValidationError(format!("No customer email on session {}", session.id))
        })?;

        let draft = self.wait_for_draft(&session.id).await?;
        let link = self.page_link(&draft.session_id);
        let qr_png = render_qr_png(&link)?;

        let html = PageReadyHtml {
            link: &link,
            qr_cid: QR_CONTENT_ID,
        }
        .render()?;
        let text = PageReadyText { link: &link }.render()?;

        self.mailer
            .send(OutgoingEmail {
                to: email.to_string(),
                subject: EMAIL_SUBJECT.to_string(),
                text,
                html,
                inline_image: Some(InlineImage {
                    cid: QR_CONTENT_ID.to_string(),
                    content_type: "image/png".to_string(),
                    bytes: qr_png,
                }),
            })
            .await?;

        log::info!("Page link for session {} sent to {email}", session.id);
        Ok(())
    }

    /// The draft may land slightly after the payment completes, so poll a bounded number of times
    async fn wait_for_draft(&self, session_id: &str) -> AppResult<DraftPage> {
        for attempt in 1..=self.lookup_attempts {
            if let Some(draft) = self.pages.find_by_session_id(session_id).await? {
                return Ok(draft);
            }
            log::warn!(
                "Draft for session {session_id} not found (attempt {attempt}/{})",
                self.lookup_attempts
            );
            if attempt < self.lookup_attempts {
                tokio::time::sleep(self.lookup_interval).await;
            }
        }
        Err(AppError::NotFound(format!(
            "Page for session {session_id} not found after {} attempts",
            self.lookup_attempts
        )))
    }
}
