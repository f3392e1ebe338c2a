use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Represents a positive monetary amount for a payment.
///
/// Serialized as a JSON number; decoding accepts a number or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::invalid("Amount must be positive"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Amount::try_from(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Course,
    Material,
    Book,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Course => "course",
            ProductType::Material => "material",
            ProductType::Book => "book",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "course" => Ok(ProductType::Course),
            "material" => Ok(ProductType::Material),
            "book" => Ok(ProductType::Book),
            other => Err(PaymentError::invalid(format!(
                "Invalid product type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    Expired,
}

impl FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(PaymentStatus::Pending),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "rejected" => Ok(PaymentStatus::Rejected),
            "expired" => Ok(PaymentStatus::Expired),
            other => Err(PaymentError::invalid(format!("Invalid status: {other}"))),
        }
    }
}

/// The tuple under which at most one pending payment may exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaymentKey {
    pub user_id: String,
    pub product_id: String,
    pub product_type: ProductType,
}

impl PaymentKey {
    /// Builds a key from raw request parameters.
    ///
    /// Every field must be present and non-blank, and the product type must be
    /// one of the known kinds.
    pub fn parse(
        user_id: Option<&str>,
        product_id: Option<&str>,
        product_type: Option<&str>,
    ) -> Result<Self, PaymentError> {
        fn field(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        match (field(user_id), field(product_id), field(product_type)) {
            (Some(user_id), Some(product_id), Some(product_type)) => Ok(Self {
                user_id: user_id.to_string(),
                product_id: product_id.to_string(),
                product_type: product_type.parse()?,
            }),
            _ => Err(PaymentError::invalid("Missing required parameters")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_title: Option<String>,
    pub amount: Amount,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl Payment {
    pub fn key(&self) -> PaymentKey {
        PaymentKey {
            user_id: self.user_id.clone(),
            product_id: self.product_id.clone(),
            product_type: self.product_type,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    /// Ordering used for every tie-break: creation time, then id.
    pub fn age_order(&self, other: &Self) -> std::cmp::Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A record to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub user_id: String,
    pub product_id: String,
    pub product_type: ProductType,
    pub product_title: Option<String>,
    pub amount: Amount,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl NewPayment {
    pub fn pending(key: PaymentKey, amount: Amount, currency: impl Into<String>) -> Self {
        Self {
            user_id: key.user_id,
            product_id: key.product_id,
            product_type: key.product_type,
            product_title: None,
            amount,
            currency: currency.into(),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.product_title = Some(title.into());
        self
    }

    pub fn into_payment(self, id: String) -> Payment {
        Payment {
            id,
            user_id: self.user_id,
            product_id: self.product_id,
            product_type: self.product_type,
            product_title: self.product_title,
            amount: self.amount,
            currency: self.currency,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.created_at,
            transaction_id: None,
            admin_notes: None,
        }
    }
}
