//! HTTP request/response shapes. Validation of user input happens here,
//! before anything reaches the store.

use serde::{Deserialize, Deserializer};

mod invoice;
mod rm;

pub use invoice::{
    CreateInvoiceRequest, InvoiceListQuery, InvoiceResponse, OverdueQuery, PaymentResponse,
    ReassignInvoiceRequest, RecordPaymentRequest, UpdateInvoiceRequest,
};
pub use rm::{CreateRmRequest, UpdateRmRequest};

/// Patch field helper: an absent field stays `None` (via `#[serde(default)]`)
/// while an explicit `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
