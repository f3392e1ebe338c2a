use crate::domain::payment::{Amount, NewPayment, PaymentStatus, ProductType};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One CSV row. `status` defaults to pending and `createdAt` to the import time.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRow {
    user_id: String,
    product_id: String,
    product_type: ProductType,
    amount: Decimal,
    currency: String,
    #[serde(default)]
    status: Option<PaymentStatus>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    product_title: Option<String>,
}

impl TryFrom<PaymentRow> for NewPayment {
    type Error = PaymentError;

    fn try_from(row: PaymentRow) -> Result<Self> {
        if row.user_id.is_empty() || row.product_id.is_empty() || row.currency.is_empty() {
            return Err(PaymentError::invalid("Missing required column value"));
        }
        Ok(NewPayment {
            user_id: row.user_id,
            product_id: row.product_id,
            product_type: row.product_type,
            product_title: row.product_title.filter(|t| !t.is_empty()),
            amount: Amount::new(row.amount)?,
            currency: row.currency.to_uppercase(),
            status: row.status.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_else(Utc::now),
        })
    }
}

/// Reads payment records from a CSV source.
///
/// Header names are the camelCase JSON field names. Whitespace is trimmed and
/// trailing optional columns may be omitted.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one result per data row; a bad row does not end the stream.
    pub fn payments(self) -> impl Iterator<Item = Result<NewPayment>> {
        self.reader
            .into_deserialize::<PaymentRow>()
            .map(|result| result.map_err(PaymentError::from).and_then(NewPayment::try_from))
    }
}
