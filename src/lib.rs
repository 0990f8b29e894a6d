// Client library for the Golden Tours XML/HTTP reservation API

pub mod booking;
pub mod client;
pub mod envelope;
pub mod error;
pub mod languages;
pub mod transport;
pub mod xml_response;
pub mod xml_serializer;

// Re-export key types for convenience
pub use booking::{
    BookingRequest, CardPayment, Customer, PaxInfo, PaxUnit, PaymentMode, ProductInfo,
    TransferInfo, YesNo,
};
pub use client::{ClientConfig, Credentials, DateStatus, Endpoint, GoldenToursClient};
pub use envelope::{normalize, Envelope, ResponseFormat, Status};
pub use error::{ClientError, GoldenTourError, TransportError};
pub use transport::{HttpTransport, Params, PostBody, RawResponse, Transport};
pub use xml_response::{parse_document, XmlElement};
pub use xml_serializer::{serialize_mapping, serialize_object, XmlMap, XmlValue};
