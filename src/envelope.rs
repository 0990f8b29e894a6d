// Uniform `{status, content}` result shared by every client operation
use crate::error::GoldenTourError;
use crate::transport::RawResponse;
use crate::xml_response::{parse_document, XmlElement};
use serde::Serialize;
use tracing::warn;

// Result of every client operation. Serializes as
// `{"status": "success", "content": <document>}` or
// `{"status": "error", "content": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "content", rename_all = "lowercase")]
pub enum Envelope {
    Success(XmlElement),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
        }
    }
}

impl Envelope {
    pub fn status(&self) -> Status {
        match self {
            Envelope::Success(_) => Status::Success,
            Envelope::Error(_) => Status::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Success
    }

    pub fn document(&self) -> Option<&XmlElement> {
        match self {
            Envelope::Success(document) => Some(document),
            Envelope::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Error(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<XmlElement, String> {
        match self {
            Envelope::Success(document) => Ok(document),
            Envelope::Error(message) => Err(message),
        }
    }
}

// Response body formats the provider answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResponseFormat {
    Xml,
}

// Terminal step of every call path: never fails, always yields an envelope.
pub fn normalize(
    outcome: Result<RawResponse, GoldenTourError>,
    format: ResponseFormat,
) -> Envelope {
    let parsed = outcome.and_then(|raw| match format {
        ResponseFormat::Xml => parse_document(&raw.body),
    });

    match parsed {
        Ok(document) => Envelope::Success(document),
        Err(error) => {
            warn!(kind = error.kind(), %error, "request failed");
            Envelope::Error(error.to_string())
        }
    }
}
