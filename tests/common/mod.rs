#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use lovepage_backend::config::FulfillmentConfig;
use lovepage_backend::database::{DiscountStore, PageStore};
use lovepage_backend::entities::Theme;
use lovepage_backend::external::{
    CheckoutSessionRequest, CreatedCheckoutSession, Mailer, NewCoupon, OutgoingEmail,
    PaymentGateway, WebhookVerifier,
};
use lovepage_backend::models::{DiscountCode, DraftPage, NewDiscountCode, PageData};
use lovepage_backend::services::{
    CheckoutService, DiscountCodeService, FulfillmentService, PageService,
};
use lovepage_backend::{AppError, AppResult, AppServices};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://pages.example.com";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const ADMIN_KEY: &str = "admin-secret";
pub const JSON_LIMIT: usize = 50 * 1024 * 1024;

#[derive(Default)]
pub struct FakeGateway {
    pub sessions: Mutex<Vec<CheckoutSessionRequest>>,
    pub coupons: Mutex<Vec<NewCoupon>>,
    pub deleted_coupons: Mutex<Vec<String>>,
    pub fail_checkout: bool,
    counter: AtomicUsize,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail_checkout: true,
            ..Default::default()
        }
    }

    pub fn sessions(&self) -> Vec<CheckoutSessionRequest> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> AppResult<CreatedCheckoutSession> {
        if self.fail_checkout {
            return Err(AppError::ExternalApiError("stripe is down".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.sessions.lock().unwrap().push(request);
        let id = format!("cs_test_{n}");
        Ok(CreatedCheckoutSession {
            url: format!("https://checkout.stripe.com/c/pay/{id}"),
            id,
        })
    }

    async fn create_coupon(&self, coupon: NewCoupon) -> AppResult<String> {
        let id = coupon.id.clone();
        self.coupons.lock().unwrap().push(coupon);
        Ok(id)
    }

    async fn delete_coupon(&self, coupon_id: &str) -> AppResult<()> {
        self.deleted_coupons
            .lock()
            .unwrap()
            .push(coupon_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPageStore {
    pub pages: Mutex<HashMap<String, DraftPage>>,
    pub lookups: AtomicUsize,
    /// Lookups that report "not found" before the stored draft becomes visible
    pub hidden_lookups: AtomicUsize,
}

impl MemoryPageStore {
    pub fn get(&self, session_id: &str) -> Option<DraftPage> {
        self.pages.lock().unwrap().get(session_id).cloned()
    }

    pub fn insert_raw(&self, page: DraftPage) {
        self.pages
            .lock()
            .unwrap()
            .insert(page.session_id.clone(), page);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn upsert(&self, session_id: &str, page: &PageData) -> AppResult<()> {
        let now = Utc::now();
        let mut pages = self.pages.lock().unwrap();
        let created_at = pages.get(session_id).map_or(now, |p| p.created_at);
        pages.insert(
            session_id.to_string(),
            DraftPage {
                session_id: session_id.to_string(),
                couple_names: page.couple_names.clone(),
                message: page.message.clone(),
                start_date: page.start_date.clone(),
                theme: page.theme.unwrap_or_default(),
                images: serde_json::to_value(&page.images)?,
                video_url: page.video_url.clone(),
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn find_by_session_id(&self, session_id: &str) -> AppResult<Option<DraftPage>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let hidden = self.hidden_lookups.load(Ordering::SeqCst);
        if hidden > 0 {
            self.hidden_lookups.store(hidden - 1, Ordering::SeqCst);
            return Ok(None);
        }
        Ok(self.get(session_id))
    }
}

#[derive(Default)]
pub struct MemoryDiscountStore {
    pub codes: Mutex<HashMap<String, DiscountCode>>,
    pub fail_insert: bool,
}

impl MemoryDiscountStore {
    pub fn failing_insert() -> Self {
        Self {
            fail_insert: true,
            ..Default::default()
        }
    }

    pub fn add(&self, code: &str, percent_off: u8, active: bool, expires_at: DateTime<Utc>) {
        self.codes.lock().unwrap().insert(
            code.to_string(),
            DiscountCode {
                code: code.to_string(),
                percent_off,
                active,
                expires_at,
                stripe_coupon_id: format!("coupon_{code}"),
                created_at: Utc::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.codes.lock().unwrap().len()
    }
}

#[async_trait]
impl DiscountStore for MemoryDiscountStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<DiscountCode>> {
        Ok(self.codes.lock().unwrap().get(code).cloned())
    }

    async fn insert(&self, code: NewDiscountCode) -> AppResult<DiscountCode> {
        if self.fail_insert {
            return Err(AppError::DatabaseError(sea_orm::DbErr::Custom(
                "connection reset".into(),
            )));
        }
        let stored = DiscountCode {
            code: code.code.clone(),
            percent_off: code.percent_off,
            active: true,
            expires_at: code.expires_at,
            stripe_coupon_id: code.stripe_coupon_id,
            created_at: Utc::now(),
        };
        self.codes
            .lock()
            .unwrap()
            .insert(code.code, stored.clone());
        Ok(stored)
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

impl FakeMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        if self.fail {
            return Err(AppError::EmailError("535 authentication failed".into()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Fakes wired into a full set of services
pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub pages: Arc<MemoryPageStore>,
    pub discounts: Arc<MemoryDiscountStore>,
    pub mailer: Arc<FakeMailer>,
    pub lookup_attempts: u32,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            gateway: Arc::new(FakeGateway::default()),
            pages: Arc::new(MemoryPageStore::default()),
            discounts: Arc::new(MemoryDiscountStore::default()),
            mailer: Arc::new(FakeMailer::default()),
            lookup_attempts: 3,
        }
    }
}

impl Harness {
    pub fn services(&self) -> AppServices {
        let discounts = DiscountCodeService::new(self.discounts.clone(), self.gateway.clone());
        AppServices {
            checkout: CheckoutService::new(
                self.pages.clone(),
                self.gateway.clone(),
                discounts.clone(),
                BASE_URL,
            ),
            pages: PageService::new(self.pages.clone()),
            discounts,
            fulfillment: FulfillmentService::new(
                self.pages.clone(),
                self.mailer.clone(),
                BASE_URL,
                &FulfillmentConfig {
                    lookup_attempts: self.lookup_attempts,
                    lookup_interval_ms: 0,
                },
            ),
            webhook_verifier: WebhookVerifier::new(WEBHOOK_SECRET, 300),
        }
    }
}

pub fn draft(session_id: &str) -> DraftPage {
    let now = Utc::now();
    DraftPage {
        session_id: session_id.to_string(),
        couple_names: Some("Ana & Rui".into()),
        message: Some("Para sempre".into()),
        start_date: Some("2021-06-12T18:00".into()),
        theme: Theme::Light,
        images: serde_json::json!(["data:image/png;base64,AAAA"]),
        video_url: None,
        created_at: now,
        updated_at: now,
    }
}

/// `Stripe-Signature` header value for `payload`, signed now
pub fn sign_payload(secret: &str, payload: &str) -> String {
    let timestamp = Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

pub fn checkout_completed_event(session_id: &str, email: Option<&str>) -> String {
    serde_json::json!({
        "id": "evt_test_1",
        "object": "event",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "customer_details": { "email": email },
                "customer_email": null,
                "payment_status": "paid"
            }
        }
    })
    .to_string()
}
