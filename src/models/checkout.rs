use crate::models::PageData;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Premium,
}

impl Plan {
    /// Price in euro cents
    pub fn price_cents(self) -> i64 {
        match self {
            Plan::Basic => 499,
            Plan::Premium => 999,
        }
    }

    pub fn product_name(self) -> &'static str {
        match self {
            Plan::Basic => "Plano Basic",
            Plan::Premium => "Plano Premium",
        }
    }

    pub fn max_images(self) -> usize {
        match self {
            Plan::Basic => 5,
            Plan::Premium => 10,
        }
    }

    pub fn allows_video(self) -> bool {
        matches!(self, Plan::Premium)
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Basic => write!(f, "basic"),
            Plan::Premium => write!(f, "premium"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub plan: Plan,
    pub page_data: Option<PageData>,
    #[serde(default)]
    pub discount_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCheckoutResponse {
    /// Checkout session id, also the draft key
    pub id: String,
    /// Hosted checkout page to redirect to
    pub url: String,
}
