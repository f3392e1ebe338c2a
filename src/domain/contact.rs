use super::payment::Payment;
use crate::error::{PaymentError, Result};
use serde::Serialize;
use url::Url;

/// Builds the WhatsApp deep link a buyer follows to confirm a pending payment.
#[derive(Debug, Clone)]
pub struct ContactLinks {
    base: Url,
}

impl ContactLinks {
    /// `phone` is the academy's number in international format, digits only.
    pub fn new(phone: &str) -> Result<Self> {
        let phone = phone.trim().trim_start_matches('+');
        if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::invalid(format!(
                "Contact phone must be digits only, got {phone:?}"
            )));
        }
        let base = Url::parse(&format!("https://wa.me/{phone}"))
            .map_err(|e| PaymentError::invalid(format!("Invalid contact phone: {e}")))?;
        Ok(Self { base })
    }

    pub fn link_for(&self, payment: &Payment) -> String {
        let title = payment
            .product_title
            .as_deref()
            .unwrap_or(&payment.product_id);
        let text = format!(
            "Hello, I would like to confirm my payment {} for \"{}\".",
            payment.id, title
        );

        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("text", &text);
        url.into()
    }

    pub fn attach(&self, payment: Payment) -> PaymentWithContact {
        let contact_link = self.link_for(&payment);
        PaymentWithContact {
            payment,
            contact_link,
        }
    }
}

/// A payment as returned to callers, with its contact link.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithContact {
    #[serde(flatten)]
    pub payment: Payment,
    pub contact_link: String,
}
