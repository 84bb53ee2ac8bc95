use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// Image shipped inside the message and referenced from the HTML as `cid:{cid}`
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub cid: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub inline_image: Option<InlineImage>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let from = config
            .sender()
            .parse::<Mailbox>()
            .map_err(|e| AppError::ConfigError(format!("Invalid sender address: {e}")))?;

        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { transport, from })
    }

    /// 创建并按配置检查 SMTP，凭据无效时启动失败
    pub async fn connect(config: &EmailConfig) -> AppResult<Self> {
        let mailer = Self::new(config)?;
        if config.verify_on_startup {
            mailer.verify().await?;
            log::info!("SMTP server ready to send messages");
        }
        Ok(mailer)
    }

    /// 启动时检查 SMTP 连接与认证
    pub async fn verify(&self) -> AppResult<()> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(AppError::EmailError("SMTP server refused the connection".into()))
        }
    }

    fn build_message(&self, email: OutgoingEmail) -> AppResult<Message> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|_| AppError::ValidationError(format!("Invalid recipient: {}", email.to)))?;

        let text = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(email.text);
        let html = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(email.html);

        let body = match email.inline_image {
            Some(image) => {
                let content_type = ContentType::parse(&image.content_type).map_err(|e| {
                    AppError::InternalError(format!("Invalid attachment content type: {e}"))
                })?;
                let inline = Attachment::new_inline(image.cid).body(image.bytes, content_type);
                MultiPart::alternative().singlepart(text).multipart(
                    MultiPart::related().singlepart(html).singlepart(inline),
                )
            }
            None => MultiPart::alternative().singlepart(text).singlepart(html),
        };

        Ok(Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .multipart(body)?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        let to = email.to.clone();
        let message = self.build_message(email)?;
        self.transport.send(message).await?;
        log::info!("Email sent to {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            username: "pages@example.com".into(),
            password: "secret".into(),
            from_address: String::new(),
            verify_on_startup: false,
        }
    }

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "payer@example.com".into(),
            subject: "A vossa página está pronta".into(),
            text: "link".into(),
            html: "<img src=\"cid:qrcode\">".into(),
            inline_image: Some(InlineImage {
                cid: "qrcode".into(),
                content_type: "image/png".into(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            }),
        }
    }

    #[tokio::test]
    async fn test_message_contains_inline_qr() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let raw = String::from_utf8(mailer.build_message(email()).unwrap().formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("multipart/related"));
        assert!(raw.contains("Content-ID: <qrcode>"));
        assert!(raw.contains("image/png"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let mut bad = email();
        bad.to = "not-an-address".into();
        assert!(matches!(
            mailer.build_message(bad),
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_fails_when_smtp_unreachable() {
        let mut cfg = config();
        cfg.smtp_host = "127.0.0.1".into();
        cfg.smtp_port = 1;
        cfg.verify_on_startup = true;
        assert!(SmtpMailer::connect(&cfg).await.is_err());

        cfg.verify_on_startup = false;
        assert!(SmtpMailer::connect(&cfg).await.is_ok());
    }

    #[test]
    fn test_invalid_sender_rejected() {
        let mut cfg = config();
        cfg.username = "nobody".into();
        assert!(SmtpMailer::new(&cfg).is_err());
    }
}
