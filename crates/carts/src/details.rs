use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use cartview_core::{ClientId, DomainError, ShoppingCartId};
use cartview_events::StreamRevision;

/// Shopping cart status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ShoppingCartStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl ShoppingCartStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Canceled => "Canceled",
        }
    }
}

impl FromStr for ShoppingCartStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Canceled" => Ok(Self::Canceled),
            other => Err(DomainError::validation(format!("unknown shopping cart status '{other}'"))),
        }
    }
}

/// Product line with the price captured when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedProductItem {
    pub product_id: String,
    pub quantity: u32,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
}

impl PricedProductItem {
    pub fn total_price(&self) -> u64 {
        u64::from(self.quantity).saturating_mul(self.unit_price)
    }
}

/// Queryable cart details, as of `revision` of the cart's stream.
///
/// Serializes with a derived `totalAmount`; the field is ignored on input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingCartDetails {
    pub id: ShoppingCartId,
    pub client_id: ClientId,
    pub status: ShoppingCartStatus,
    pub product_items: Vec<PricedProductItem>,
    pub opened_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub revision: StreamRevision,
}

impl ShoppingCartDetails {
    /// Details right after the cart's first event.
    pub fn opened(id: ShoppingCartId, client_id: ClientId, opened_at: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id,
            status: ShoppingCartStatus::Pending,
            product_items: Vec::new(),
            opened_at,
            confirmed_at: None,
            canceled_at: None,
            revision: StreamRevision::START,
        }
    }

    pub fn total_amount(&self) -> u64 {
        self.product_items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.total_price()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailsBody<'a> {
    id: &'a ShoppingCartId,
    client_id: &'a ClientId,
    status: ShoppingCartStatus,
    product_items: &'a [PricedProductItem],
    total_amount: u64,
    opened_at: &'a DateTime<Utc>,
    confirmed_at: Option<&'a DateTime<Utc>>,
    canceled_at: Option<&'a DateTime<Utc>>,
    revision: StreamRevision,
}

impl Serialize for ShoppingCartDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DetailsBody {
            id: &self.id,
            client_id: &self.client_id,
            status: self.status,
            product_items: &self.product_items,
            total_amount: self.total_amount(),
            opened_at: &self.opened_at,
            confirmed_at: self.confirmed_at.as_ref(),
            canceled_at: self.canceled_at.as_ref(),
            revision: self.revision,
        }
        .serialize(serializer)
    }
}
