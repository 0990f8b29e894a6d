// Typed booking document posted to /xml/booking.aspx
//
// Field names follow the provider's booking schema exactly (mixed casing is
// theirs). Optional fields that are `None` produce no element.
use crate::error::GoldenTourError;
use crate::xml_serializer::serialize_object;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOOKING_ROOT: &str = "Booking";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
}

impl From<bool> for YesNo {
    fn from(flag: bool) -> Self {
        if flag {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Y",
            YesNo::No => "N",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "C")]
    CreditCard,
    #[serde(rename = "A")]
    OnAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    // Mr., Miss., Dr. ...
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    pub post_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(
        rename = "flagnewsLetter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flag_news_letter: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_email: Option<YesNo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaxUnit {
    // Price unit id (Adult, Child, ...) from productdetails.aspx
    pub unit_id: String,
    pub pax_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaxInfo {
    #[serde(rename = "unit", default)]
    pub units: Vec<PaxUnit>,
}

// Required when the product is a transfer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInfo {
    pub airline_name: String,
    pub flight_number: String,
    // HH:MM AM/PM for shuttle transfers
    pub transfer_time: String,
    pub hotel_name: String,
    pub hotel_address: String,
    pub post_code: String,
    pub mobile: String,
    pub origin: String,
    pub destination: String,
    pub greeting_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_ref_number: Option<String>,
    // dd/MM/yyyy; not needed for add-ons without dates or open dated tickets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_date: Option<String>,
    pub product_id: String,
    pub schedule_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickuptime_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub droppoint_id: Option<String>,
    // Token returned by paxreservation.aspx
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paxtoken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_requirement: Option<String>,
    // Hotel products only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotional_code: Option<String>,
    pub pax_info: PaxInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_info: Option<TransferInfo>,
}

#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayment {
    pub name_on_card: String,
    pub card_number: String,
    pub card_type: String,
    // mm/yyyy
    pub expiry_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<String>,
    pub card_verification_number: String,
    #[serde(rename = "enabled3DSecure", default, skip_serializing_if = "Option::is_none")]
    pub enabled_3d_secure: Option<YesNo>,
    #[serde(rename = "response3DURL", default, skip_serializing_if = "Option::is_none")]
    pub response_3d_url: Option<String>,
}

impl fmt::Debug for CardPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardPayment")
            .field("name_on_card", &self.name_on_card)
            .field("card_number", &"[REDACTED]")
            .field("card_type", &self.card_type)
            .field("expiry_date", &self.expiry_date)
            .field("card_verification_number", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub customer: Customer,
    #[serde(rename = "productInfo")]
    pub product_info: ProductInfo,
    #[serde(rename = "currencycode")]
    pub currency_code: String,
    #[serde(rename = "paymentMode")]
    pub payment_mode: PaymentMode,
    #[serde(rename = "cardPayment", default, skip_serializing_if = "Option::is_none")]
    pub card_payment: Option<CardPayment>,
    #[serde(rename = "securitykeymethod")]
    pub security_key_method: String,
    #[serde(rename = "flagPriceDisplay")]
    pub flag_price_display: YesNo,
    #[serde(rename = "flagCreditCardEncrypted")]
    pub flag_credit_card_encrypted: YesNo,
}

impl BookingRequest {
    // Build a request from a loosely structured JSON mapping using the
    // provider's field names (`customer.firstName`, `productInfo.paxInfo.unit`...).
    pub fn from_json(value: serde_json::Value) -> Result<Self, GoldenTourError> {
        serde_json::from_value(value).map_err(|e| GoldenTourError::Serialization(e.to_string()))
    }

    // Presence checks only; the provider validates formats
    pub fn validate(&self) -> Result<(), GoldenTourError> {
        let required = [
            ("customer.title", &self.customer.title),
            ("customer.firstName", &self.customer.first_name),
            ("customer.lastName", &self.customer.last_name),
            ("customer.email", &self.customer.email),
            ("customer.address1", &self.customer.address1),
            ("customer.city", &self.customer.city),
            ("customer.postCode", &self.customer.post_code),
            ("productInfo.productId", &self.product_info.product_id),
            ("currencycode", &self.currency_code),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(GoldenTourError::MissingParameter(name.to_string()));
            }
        }

        if self.product_info.pax_info.units.is_empty() {
            return Err(GoldenTourError::MissingParameter(
                "productInfo.paxInfo.unit".to_string(),
            ));
        }
        if self.payment_mode == PaymentMode::CreditCard && self.card_payment.is_none() {
            return Err(GoldenTourError::MissingParameter("cardPayment".to_string()));
        }
        Ok(())
    }
}

// <Booking> as posted: credentials first, then the caller's request
#[derive(Serialize)]
struct BookingDocument<'a> {
    agentid: &'a str,
    key: &'a str,
    #[serde(flatten)]
    request: &'a BookingRequest,
}

pub(crate) fn booking_xml(
    agent_id: &str,
    api_key: &str,
    request: &BookingRequest,
) -> Result<String, GoldenTourError> {
    request.validate()?;
    serialize_object(
        BOOKING_ROOT,
        &BookingDocument {
            agentid: agent_id,
            key: api_key,
            request,
        },
    )
}
