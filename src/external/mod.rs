pub mod mailer;
pub mod stripe;
pub mod stripe_webhook;

pub use mailer::{InlineImage, Mailer, OutgoingEmail, SmtpMailer};
pub use stripe::{
    CheckoutSessionRequest, CreatedCheckoutSession, NewCoupon, PaymentGateway, StripeService,
};
pub use stripe_webhook::{CompletedCheckoutSession, WebhookEvent, WebhookVerifier};
