// Golden Tours XML API client: one method per remote operation
//
// Every method builds its request, sends exactly one HTTP call and hands the
// outcome to `normalize`, so callers always receive an `Envelope` and never an
// `Err`.
use crate::booking::{booking_xml, BookingRequest, YesNo};
use crate::envelope::{normalize, Envelope, ResponseFormat};
use crate::error::{ClientError, GoldenTourError};
use crate::languages;
use crate::transport::{HttpTransport, Params, PostBody, RawResponse, Transport};
use crate::xml_serializer::{serialize_mapping, XmlMap};
use chrono::Utc;
use std::fmt;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "http://www.goldentourscoachtours.co.uk/";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_VOUCHER_API_VERSION: &str = "1.0.0";

const VALIDATE_TICKET_COMMAND: &str = "ValidateTicket";
const REDEEM_VOUCHER_COMMAND: &str = "RedeemVoucher";
// Voucher request timestamps, e.g. 2025-01-31 14:05:09 (UTC)
pub const VOUCHER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub agent_id: String,
    pub terminal_id: String,
    pub timeout_ms: u64,
    pub voucher_api_version: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            agent_id: agent_id.into(),
            terminal_id: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            voucher_api_version: DEFAULT_VOUCHER_API_VERSION.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_terminal_id(mut self, terminal_id: impl Into<String>) -> Self {
        self.terminal_id = terminal_id.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_voucher_api_version(mut self, version: impl Into<String>) -> Self {
        self.voucher_api_version = version.into();
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.api_key.trim().is_empty() {
            return Err(ClientError::ConfigError("api_key must not be empty".to_string()));
        }
        if self.agent_id.trim().is_empty() {
            return Err(ClientError::ConfigError("agent_id must not be empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::ConfigError(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::ConfigError(format!("invalid base_url: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::ConfigError(format!(
                "unsupported base_url scheme: {}",
                url.scheme()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("agent_id", &self.agent_id)
            .field("terminal_id", &self.terminal_id)
            .field("timeout_ms", &self.timeout_ms)
            .field("voucher_api_version", &self.voucher_api_version)
            .finish()
    }
}

// Fixed for the lifetime of a client
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    agent_id: String,
    terminal_id: String,
}

impl Credentials {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn terminal_id(&self) -> &str {
        &self.terminal_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("agent_id", &self.agent_id)
            .field("terminal_id", &self.terminal_id)
            .finish()
    }
}

// Remote operations and their paths relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Cities,
    Categories,
    ProductList,
    ProductDetails,
    Availability,
    Search,
    PaxReservation,
    Booking,
    ProductDates,
    BookingDates,
    ProductIdList,
    ProductReviews,
    BlockPickupPoint,
    DatatraxVoucher,
    Languages,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::Cities => "/xml/cities.aspx",
            Endpoint::Categories => "/xml/categories.aspx",
            Endpoint::ProductList => "/xml/productlist.aspx",
            Endpoint::ProductDetails => "/xml/productdetails.aspx",
            Endpoint::Availability => "/xml/availability.aspx",
            Endpoint::Search => "/xml/search.aspx",
            Endpoint::PaxReservation => "/xml/paxreservation.aspx",
            Endpoint::Booking => "/xml/booking.aspx",
            Endpoint::ProductDates => "/xml/getproductdates.aspx",
            Endpoint::BookingDates => "/xml/getbookingdates.aspx",
            Endpoint::ProductIdList => "/xml/productidlist.aspx",
            Endpoint::ProductReviews => "/xml/getproductreviews.aspx",
            Endpoint::BlockPickupPoint => "/xml/blockpickuppoint.aspx",
            Endpoint::DatatraxVoucher => "/process/datatraxvoucher.aspx",
            Endpoint::Languages => "/xml/languages.aspx",
        }
    }
}

// Which dates getproductdates/getbookingdates should list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStatus {
    Open,
    Close,
}

impl DateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateStatus::Open => "OPEN",
            DateStatus::Close => "CLOSE",
        }
    }
}

// GET with a query string, or POST with a form / XML body
enum Request {
    Query(Params),
    Post(PostBody),
}

pub struct GoldenToursClient<T = HttpTransport> {
    credentials: Credentials,
    voucher_api_version: String,
    transport: T,
}

impl GoldenToursClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = HttpTransport::new(&config.base_url, config.timeout_ms)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> GoldenToursClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self {
            credentials: Credentials {
                api_key: config.api_key,
                agent_id: config.agent_id,
                terminal_id: config.terminal_id,
            },
            voucher_api_version: config.voucher_api_version,
            transport,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // All cities served by the provider.
    pub async fn get_cities(&self, language: Option<&str>) -> Envelope {
        self.execute(Endpoint::Cities, || {
            Ok(Request::Query(
                self.keyed().push("languageid", languages::resolve(language)?),
            ))
        })
        .await
    }

    // Categories in a city (`cityid` comes from the cities listing).
    pub async fn get_categories_in_city(&self, city_id: &str, language: Option<&str>) -> Envelope {
        self.execute(Endpoint::Categories, || {
            Ok(Request::Query(
                Params::new()
                    .push("cityid", required("cityid", city_id)?)
                    .push("key", self.credentials.api_key())
                    .push("languageid", languages::resolve(language)?),
            ))
        })
        .await
    }

    // Products of a category priced in `currency_code` between `from` and `to`.
    pub async fn get_products_in_category(
        &self,
        category_id: &str,
        currency_code: &str,
        from: &str,
        to: &str,
        language: Option<&str>,
    ) -> Envelope {
        self.execute(Endpoint::ProductList, || {
            Ok(Request::Query(
                Params::new()
                    .push("category_id", required("category_id", category_id)?)
                    .push("key", self.credentials.api_key())
                    .push("currencycode", required("currencycode", currency_code)?)
                    .push("fromdt", required("fromdt", from)?)
                    .push("todt", required("todt", to)?)
                    .push("languageid", languages::resolve(language)?),
            ))
        })
        .await
    }

    pub async fn get_product_details(
        &self,
        product_id: &str,
        currency_code: &str,
        language: Option<&str>,
    ) -> Envelope {
        self.execute(Endpoint::ProductDetails, || {
            Ok(Request::Query(
                Params::new()
                    .push("productid", required("productid", product_id)?)
                    .push("key", self.credentials.api_key())
                    .push("currencycode", required("currencycode", currency_code)?)
                    .push("languageid", languages::resolve(language)?),
            ))
        })
        .await
    }

    // Tickets available for a product on a day. `pick_time_id` applies to
    // shuttle products only.
    pub async fn get_availability(
        &self,
        product_id: &str,
        day: &str,
        month: &str,
        year: &str,
        schedule_id: Option<&str>,
        pick_time_id: Option<&str>,
    ) -> Envelope {
        self.execute(Endpoint::Availability, || {
            Ok(Request::Query(
                Params::new()
                    .push("productid", required("productid", product_id)?)
                    .push("key", self.credentials.api_key())
                    .push("day", required("day", day)?)
                    .push("month", required("month", month)?)
                    .push("year", required("year", year)?)
                    .push_opt("scheduleid", schedule_id)
                    .push_opt("picktimeid", pick_time_id),
            ))
        })
        .await
    }

    pub async fn search_products(
        &self,
        search_text: &str,
        city_id: &str,
        currency_code: &str,
        language: Option<&str>,
    ) -> Envelope {
        self.execute(Endpoint::Search, || {
            Ok(Request::Query(
                Params::new()
                    .push("cityid", required("cityid", city_id)?)
                    .push("key", self.credentials.api_key())
                    .push("currencycode", required("currencycode", currency_code)?)
                    .push("searchtext", required("searchtext", search_text)?)
                    .push("languageid", languages::resolve(language)?),
            ))
        })
        .await
    }

    // Hold `lock_pax` places; the answer carries the pax token used when booking.
    pub async fn pax_reservation(
        &self,
        product_id: &str,
        travel_date: Option<&str>,
        schedule_id: &str,
        lock_pax: u32,
    ) -> Envelope {
        self.execute(Endpoint::PaxReservation, || {
            let form = Params::new()
                .push("productid", required("productid", product_id)?)
                .push("key", self.credentials.api_key())
                .push("agentid", self.credentials.agent_id())
                .push_opt("traveldate", travel_date)
                .push("scheduleid", required("scheduleid", schedule_id)?)
                .push("lockpax", lock_pax);
            Ok(Request::Post(PostBody::Form(form)))
        })
        .await
    }

    pub async fn make_booking(&self, booking: &BookingRequest) -> Envelope {
        self.execute(Endpoint::Booking, || {
            let xml = booking_xml(
                self.credentials.agent_id(),
                self.credentials.api_key(),
                booking,
            )?;
            Ok(Request::Post(PostBody::Xml(xml)))
        })
        .await
    }

    // Open (or closed) dates of a product between `from` and `to` (dd/MM/yyyy).
    pub async fn get_product_dates(
        &self,
        product_id: &str,
        status: DateStatus,
        from: &str,
        to: &str,
    ) -> Envelope {
        self.execute(Endpoint::ProductDates, || {
            Ok(Request::Query(self.dates_params(product_id, status, from, to)?))
        })
        .await
    }

    // Like `get_product_dates`, with schedules and availability per date.
    pub async fn get_booking_dates(
        &self,
        product_id: &str,
        status: DateStatus,
        from: &str,
        to: &str,
    ) -> Envelope {
        self.execute(Endpoint::BookingDates, || {
            Ok(Request::Query(self.dates_params(product_id, status, from, to)?))
        })
        .await
    }

    // Products enabled for this API key; `show_all` includes sub-products.
    pub async fn get_product_ids(&self, show_all: bool, language: Option<&str>) -> Envelope {
        self.execute(Endpoint::ProductIdList, || {
            Ok(Request::Query(
                Params::new()
                    .push("showallproduct", YesNo::from(show_all).as_str())
                    .push("key", self.credentials.api_key())
                    .push("languageid", languages::resolve(language)?),
            ))
        })
        .await
    }

    pub async fn get_product_reviews(&self, product_id: &str) -> Envelope {
        self.execute(Endpoint::ProductReviews, || {
            Ok(Request::Query(self.product_params(product_id)?))
        })
        .await
    }

    // Available and blocked pickup points of a product.
    pub async fn get_pickup_points(&self, product_id: &str) -> Envelope {
        self.execute(Endpoint::BlockPickupPoint, || {
            Ok(Request::Query(self.product_params(product_id)?))
        })
        .await
    }

    // Check a voucher (ticket reference number) through the datatrax endpoint.
    pub async fn validate_ticket(
        &self,
        ticket_number: &str,
        command_parameters: Option<XmlMap>,
    ) -> Envelope {
        self.execute(Endpoint::DatatraxVoucher, || {
            let request = self
                .voucher_request(VALIDATE_TICKET_COMMAND)
                .with("ticket_number", required("ticket_number", ticket_number)?)
                .with_opt("command_parameters", command_parameters);
            let xml = serialize_mapping(&XmlMap::new().with("request", request))?;
            Ok(Request::Post(PostBody::Xml(xml)))
        })
        .await
    }

    pub async fn redeem_vouchers<S: AsRef<str>>(
        &self,
        voucher_numbers: &[S],
        comment: Option<&str>,
        selected_bus: Option<u32>,
    ) -> Envelope {
        self.execute(Endpoint::DatatraxVoucher, || {
            if voucher_numbers.is_empty() {
                return Err(GoldenTourError::MissingParameter(
                    "voucher_numbers".to_string(),
                ));
            }
            let numbers: Vec<&str> = voucher_numbers.iter().map(|number| number.as_ref()).collect();
            let request = self
                .voucher_request(REDEEM_VOUCHER_COMMAND)
                .with_opt("comment", comment)
                .with_opt("selectedbus", selected_bus)
                .with(
                    "command_parameters",
                    XmlMap::new().with(
                        "voucher_numbers",
                        XmlMap::new().with("voucher_number", numbers),
                    ),
                );
            let xml = serialize_mapping(&XmlMap::new().with("request", request))?;
            Ok(Request::Post(PostBody::Xml(xml)))
        })
        .await
    }

    pub async fn get_languages(&self) -> Envelope {
        self.execute(Endpoint::Languages, || Ok(Request::Query(self.keyed())))
            .await
    }

    #[instrument(level = "debug", skip(self, build))]
    async fn execute<F>(&self, endpoint: Endpoint, build: F) -> Envelope
    where
        F: FnOnce() -> Result<Request, GoldenTourError>,
    {
        let outcome = match build() {
            Ok(request) => self.dispatch(endpoint, request).await,
            Err(error) => Err(error),
        };
        normalize(outcome, ResponseFormat::Xml)
    }

    async fn dispatch(
        &self,
        endpoint: Endpoint,
        request: Request,
    ) -> Result<RawResponse, GoldenTourError> {
        let response = match request {
            Request::Query(query) => self.transport.get(endpoint.path(), &query).await?,
            Request::Post(body) => self.transport.post(endpoint.path(), &body).await?,
        };
        Ok(response)
    }

    fn keyed(&self) -> Params {
        Params::new().push("key", self.credentials.api_key())
    }

    fn product_params(&self, product_id: &str) -> Result<Params, GoldenTourError> {
        Ok(Params::new()
            .push("productid", required("productid", product_id)?)
            .push("key", self.credentials.api_key()))
    }

    fn dates_params(
        &self,
        product_id: &str,
        status: DateStatus,
        from: &str,
        to: &str,
    ) -> Result<Params, GoldenTourError> {
        Ok(self
            .product_params(product_id)?
            .push("status", status.as_str())
            .push("fromdt", required("fromdt", from)?)
            .push("todt", required("todt", to)?))
    }

    // Header shared by both datatrax voucher commands
    fn voucher_request(&self, command: &str) -> XmlMap {
        XmlMap::new()
            .with("version", self.voucher_api_version.as_str())
            .with("key", self.credentials.api_key())
            .with("account_id", self.credentials.agent_id())
            .with("terminal_id", self.credentials.terminal_id())
            .with(
                "timestamp",
                Utc::now().format(VOUCHER_TIMESTAMP_FORMAT).to_string(),
            )
            .with("command", command)
    }
}

impl<T> fmt::Debug for GoldenToursClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoldenToursClient")
            .field("credentials", &self.credentials)
            .field("voucher_api_version", &self.voucher_api_version)
            .finish_non_exhaustive()
    }
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, GoldenTourError> {
    if value.trim().is_empty() {
        Err(GoldenTourError::MissingParameter(name.to_string()))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::fixtures::sample_booking;
    use crate::error::TransportError;
    use crate::xml_response::parse_document;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::sync::Mutex;
    use test_case::test_case;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Get { path: String, query: Params },
        Post { path: String, body: PostBody },
    }

    // Records every request and answers with a canned outcome
    struct StubTransport {
        reply: Result<String, TransportError>,
        calls: Mutex<Vec<Call>>,
    }

    impl StubTransport {
        fn replying(body: &str) -> Self {
            Self {
                reply: Ok(body.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: TransportError) -> Self {
            Self {
                reply: Err(error),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self) -> Result<RawResponse, TransportError> {
            self.reply.clone().map(|body| RawResponse { status: 200, body })
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, path: &str, query: &Params) -> Result<RawResponse, TransportError> {
            self.calls.lock().unwrap().push(Call::Get {
                path: path.to_string(),
                query: query.clone(),
            });
            self.answer()
        }

        async fn post(&self, path: &str, body: &PostBody) -> Result<RawResponse, TransportError> {
            self.calls.lock().unwrap().push(Call::Post {
                path: path.to_string(),
                body: body.clone(),
            });
            self.answer()
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("API-KEY", "AGENT-7").with_terminal_id("TERM-3")
    }

    fn client(transport: StubTransport) -> GoldenToursClient<StubTransport> {
        GoldenToursClient::with_transport(config(), transport).unwrap()
    }

    fn single_get(client: &GoldenToursClient<StubTransport>) -> (String, Params) {
        match client.transport().calls().as_slice() {
            [Call::Get { path, query }] => (path.clone(), query.clone()),
            other => panic!("expected one GET, got {:?}", other),
        }
    }

    fn single_xml_post(client: &GoldenToursClient<StubTransport>) -> (String, String) {
        match client.transport().calls().as_slice() {
            [Call::Post {
                path,
                body: PostBody::Xml(xml),
            }] => (path.clone(), xml.clone()),
            other => panic!("expected one XML POST, got {:?}", other),
        }
    }

    // One call of every operation with valid arguments
    async fn call_every_operation(client: &GoldenToursClient<StubTransport>) -> Vec<Envelope> {
        vec![
            client.get_cities(None).await,
            client.get_categories_in_city("1", None).await,
            client
                .get_products_in_category("10", "GBP", "01/01/2025", "31/01/2025", None)
                .await,
            client.get_product_details("P1", "GBP", Some("French")).await,
            client.get_availability("P1", "1", "1", "2025", None, None).await,
            client.search_products("bus", "1", "GBP", None).await,
            client.pax_reservation("P1", Some("01/01/2025"), "S1", 2).await,
            client.make_booking(&sample_booking()).await,
            client
                .get_product_dates("P1", DateStatus::Open, "01/01/2025", "31/01/2025")
                .await,
            client
                .get_booking_dates("P1", DateStatus::Close, "01/01/2025", "31/01/2025")
                .await,
            client.get_product_ids(true, None).await,
            client.get_product_reviews("P1").await,
            client.get_pickup_points("P1").await,
            client.validate_ticket("GT-0001", None).await,
            client.redeem_vouchers(&["GT-0001"], None, None).await,
            client.get_languages().await,
        ]
    }

    #[tokio::test]
    async fn test_get_cities_scenario() {
        let client = client(StubTransport::replying("<cities><city>Paris</city></cities>"));

        let envelope = client.get_cities(Some("English")).await;

        let (path, query) = single_get(&client);
        assert_eq!(path, "/xml/cities.aspx");
        assert_eq!(
            query.get("languageid"),
            Some(languages::lookup("English").unwrap().to_string().as_str())
        );
        assert_eq!(query.get("key"), Some("API-KEY"));

        let document = envelope.document().unwrap();
        assert_eq!(document.name, "cities");
        let cities: Vec<&str> = document
            .children_named("city")
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(cities, vec!["Paris"]);
    }

    #[tokio::test]
    async fn test_unknown_language_skips_transport() {
        let client = client(StubTransport::replying("<cities/>"));

        let envelope = client.get_cities(Some("Klingon")).await;

        assert_eq!(
            envelope,
            Envelope::Error("unknown language: Klingon".to_string())
        );
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_pax_reservation_scenario() {
        let client = client(StubTransport::replying("<paxreservation/>"));

        let envelope = client
            .pax_reservation("P1", Some("01/01/2025"), "S1", 2)
            .await;
        assert!(envelope.is_success());

        let calls = client.transport().calls();
        let Call::Post {
            path,
            body: PostBody::Form(form),
        } = &calls[0]
        else {
            panic!("expected a form POST, got {:?}", calls);
        };
        assert_eq!(path, "/xml/paxreservation.aspx");
        assert_eq!(form.get("productid"), Some("P1"));
        assert_eq!(form.get("traveldate"), Some("01/01/2025"));
        assert_eq!(form.get("scheduleid"), Some("S1"));
        assert_eq!(form.get("lockpax"), Some("2"));
        assert_eq!(form.get("agentid"), Some("AGENT-7"));
        assert_eq!(form.get("key"), Some("API-KEY"));
    }

    #[tokio::test]
    async fn test_transport_failure_never_escapes() {
        let client = client(StubTransport::failing(TransportError::Connection(
            "connection refused".to_string(),
        )));

        let envelopes = call_every_operation(&client).await;

        assert_eq!(envelopes.len(), 16);
        assert_eq!(client.transport().calls().len(), 16);
        for envelope in envelopes {
            let message = envelope.error_message().expect("error envelope");
            assert!(message.contains("connection refused"), "{}", message);
        }
    }

    #[tokio::test]
    async fn test_well_formed_body_is_returned_for_every_operation() {
        let client = client(StubTransport::replying(
            r#"<response><result code="0">OK</result></response>"#,
        ));

        for envelope in call_every_operation(&client).await {
            let document = envelope.into_result().unwrap();
            assert_eq!(document.name, "response");
            let result = document.child("result").unwrap();
            assert_eq!(result.attribute("code"), Some("0"));
            assert_eq!(result.text, "OK");
        }
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_error() {
        let client = client(StubTransport::replying("<html><body>Server Error"));

        let envelope = client.get_languages().await;

        assert!(envelope
            .error_message()
            .unwrap()
            .starts_with("malformed response body"));
    }

    #[test_case(Endpoint::Cities, "/xml/cities.aspx")]
    #[test_case(Endpoint::Categories, "/xml/categories.aspx")]
    #[test_case(Endpoint::ProductList, "/xml/productlist.aspx")]
    #[test_case(Endpoint::ProductDetails, "/xml/productdetails.aspx")]
    #[test_case(Endpoint::Availability, "/xml/availability.aspx")]
    #[test_case(Endpoint::Search, "/xml/search.aspx")]
    #[test_case(Endpoint::PaxReservation, "/xml/paxreservation.aspx")]
    #[test_case(Endpoint::Booking, "/xml/booking.aspx")]
    #[test_case(Endpoint::ProductDates, "/xml/getproductdates.aspx")]
    #[test_case(Endpoint::BookingDates, "/xml/getbookingdates.aspx")]
    #[test_case(Endpoint::ProductIdList, "/xml/productidlist.aspx")]
    #[test_case(Endpoint::ProductReviews, "/xml/getproductreviews.aspx")]
    #[test_case(Endpoint::BlockPickupPoint, "/xml/blockpickuppoint.aspx")]
    #[test_case(Endpoint::DatatraxVoucher, "/process/datatraxvoucher.aspx")]
    #[test_case(Endpoint::Languages, "/xml/languages.aspx")]
    fn test_endpoint_paths(endpoint: Endpoint, expected: &str) {
        assert_eq!(endpoint.path(), expected);
    }

    #[tokio::test]
    async fn test_products_in_category_params() {
        let client = client(StubTransport::replying("<products/>"));

        client
            .get_products_in_category("10", "EUR", "01/02/2025", "28/02/2025", Some("German"))
            .await;

        let (path, query) = single_get(&client);
        assert_eq!(path, "/xml/productlist.aspx");
        let names: Vec<&str> = query.as_pairs().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["category_id", "key", "currencycode", "fromdt", "todt", "languageid"]
        );
        assert_eq!(query.get("currencycode"), Some("EUR"));
        assert_eq!(query.get("languageid"), Some("4"));
    }

    #[tokio::test]
    async fn test_availability_omits_absent_optionals() {
        let client = client(StubTransport::replying("<availability/>"));

        client
            .get_availability("P1", "15", "6", "2025", None, Some("PT2"))
            .await;

        let (_, query) = single_get(&client);
        assert_eq!(query.get("day"), Some("15"));
        assert_eq!(query.get("scheduleid"), None);
        assert_eq!(query.get("picktimeid"), Some("PT2"));
    }

    #[tokio::test]
    async fn test_dates_and_product_ids_flags() {
        let client = client(StubTransport::replying("<dates/>"));
        client
            .get_booking_dates("P1", DateStatus::Close, "01/01/2025", "31/01/2025")
            .await;
        let (path, query) = single_get(&client);
        assert_eq!(path, "/xml/getbookingdates.aspx");
        assert_eq!(query.get("status"), Some("CLOSE"));

        let client = self::client(StubTransport::replying("<products/>"));
        client.get_product_ids(false, None).await;
        let (_, query) = single_get(&client);
        assert_eq!(query.get("showallproduct"), Some("N"));
        assert_eq!(query.get("languageid"), Some("1"));
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "blank")]
    #[tokio::test]
    async fn test_missing_product_id_is_reported(product_id: &str) {
        let client = client(StubTransport::replying("<reviews/>"));

        let envelope = client.get_product_reviews(product_id).await;

        assert_eq!(
            envelope,
            Envelope::Error("missing required parameter: productid".to_string())
        );
        assert!(client.transport().calls().is_empty());
    }

    #[test_case("category_from", "fromdt"; "category listing without start date")]
    #[test_case("category_to", "todt"; "category listing without end date")]
    #[test_case("product_dates", "fromdt"; "product dates without start date")]
    #[test_case("booking_dates", "todt"; "booking dates without end date")]
    #[test_case("search", "searchtext"; "search without text")]
    #[tokio::test]
    async fn test_blank_required_fields_are_reported(operation: &str, field: &str) {
        let client = client(StubTransport::replying("<ok/>"));

        let envelope = match operation {
            "category_from" => {
                client
                    .get_products_in_category("10", "GBP", "", "31/01/2025", None)
                    .await
            }
            "category_to" => {
                client
                    .get_products_in_category("10", "GBP", "01/01/2025", " ", None)
                    .await
            }
            "product_dates" => {
                client
                    .get_product_dates("P1", DateStatus::Open, "", "")
                    .await
            }
            "booking_dates" => {
                client
                    .get_booking_dates("P1", DateStatus::Close, "01/01/2025", "")
                    .await
            }
            "search" => client.search_products("  ", "1", "GBP", None).await,
            other => panic!("unknown operation {}", other),
        };

        assert_eq!(
            envelope,
            Envelope::Error(format!("missing required parameter: {}", field))
        );
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_make_booking_posts_xml_document() {
        let client = client(StubTransport::replying("<booking><status>OK</status></booking>"));

        let envelope = client.make_booking(&sample_booking()).await;
        assert!(envelope.is_success());

        let (path, xml) = single_xml_post(&client);
        assert_eq!(path, "/xml/booking.aspx");
        let booking = parse_document(&xml).unwrap();
        assert_eq!(booking.name, "Booking");
        assert_eq!(booking.child("agentid").unwrap().text, "AGENT-7");
        assert_eq!(booking.child("key").unwrap().text, "API-KEY");
        let unit = booking
            .child("productInfo")
            .and_then(|p| p.child("paxInfo"))
            .and_then(|p| p.child("unit"))
            .unwrap();
        assert_eq!(unit.child("unitId").unwrap().text, "ADULT");
    }

    #[tokio::test]
    async fn test_invalid_booking_is_not_sent() {
        let client = client(StubTransport::replying("<booking/>"));
        let mut booking = sample_booking();
        booking.customer.last_name.clear();

        let envelope = client.make_booking(&booking).await;

        assert!(envelope.error_message().unwrap().contains("customer.lastName"));
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_validate_ticket_document() {
        let client = client(StubTransport::replying("<response/>"));
        let parameters = XmlMap::new().with("location", "Victoria");

        client.validate_ticket("GT-0001", Some(parameters)).await;

        let (path, xml) = single_xml_post(&client);
        assert_eq!(path, "/process/datatraxvoucher.aspx");
        let request = parse_document(&xml).unwrap();
        let fields: Vec<&str> = request.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "version",
                "key",
                "account_id",
                "terminal_id",
                "timestamp",
                "command",
                "ticket_number",
                "command_parameters"
            ]
        );
        assert_eq!(request.child("version").unwrap().text, "1.0.0");
        assert_eq!(request.child("account_id").unwrap().text, "AGENT-7");
        assert_eq!(request.child("terminal_id").unwrap().text, "TERM-3");
        assert_eq!(request.child("command").unwrap().text, "ValidateTicket");
        assert_eq!(
            request
                .child("command_parameters")
                .and_then(|p| p.child("location"))
                .unwrap()
                .text,
            "Victoria"
        );
    }

    #[tokio::test]
    async fn test_redeem_vouchers_document() {
        let client = client(StubTransport::replying("<response/>"));
        let vouchers = vec!["GT-0001".to_string(), "GT-0002".to_string()];

        client
            .redeem_vouchers(&vouchers, Some("Front desk"), Some(12))
            .await;

        let (_, xml) = single_xml_post(&client);
        let request = parse_document(&xml).unwrap();
        assert_eq!(request.child("command").unwrap().text, "RedeemVoucher");
        assert_eq!(request.child("comment").unwrap().text, "Front desk");
        assert_eq!(request.child("selectedbus").unwrap().text, "12");

        let timestamp = &request.child("timestamp").unwrap().text;
        assert!(NaiveDateTime::parse_from_str(timestamp, VOUCHER_TIMESTAMP_FORMAT).is_ok());

        let numbers: Vec<&str> = request
            .child("command_parameters")
            .and_then(|p| p.child("voucher_numbers"))
            .unwrap()
            .children_named("voucher_number")
            .map(|n| n.text.as_str())
            .collect();
        assert_eq!(numbers, vec!["GT-0001", "GT-0002"]);
    }

    #[tokio::test]
    async fn test_redeem_without_vouchers_is_rejected() {
        let client = client(StubTransport::replying("<response/>"));

        let envelope = client.redeem_vouchers::<&str>(&[], None, None).await;

        assert_eq!(
            envelope.error_message(),
            Some("missing required parameter: voucher_numbers")
        );
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_voucher_api_version_is_configurable() {
        let config = config().with_voucher_api_version("2.1.0");
        let client =
            GoldenToursClient::with_transport(config, StubTransport::replying("<r/>")).unwrap();

        client.validate_ticket("GT-0001", None).await;

        let (_, xml) = single_xml_post(&client);
        let request = parse_document(&xml).unwrap();
        assert_eq!(request.child("version").unwrap().text, "2.1.0");
        assert!(request.child("command_parameters").is_none());
    }

    #[test_case(ClientConfig::new("", "AGENT"); "missing api key")]
    #[test_case(ClientConfig::new("KEY", " "); "missing agent")]
    #[test_case(ClientConfig::new("KEY", "AGENT").with_timeout_ms(0); "zero timeout")]
    #[test_case(ClientConfig::new("KEY", "AGENT").with_base_url("not a url"); "bad url")]
    #[test_case(ClientConfig::new("KEY", "AGENT").with_base_url("ftp://example.com"); "bad scheme")]
    fn test_invalid_config_is_rejected(config: ClientConfig) {
        assert!(matches!(
            GoldenToursClient::new(config),
            Err(ClientError::ConfigError(_))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("KEY", "AGENT");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.terminal_id, "");
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.voucher_api_version, DEFAULT_VOUCHER_API_VERSION);
        assert!(GoldenToursClient::new(config).is_ok());
    }

    #[test]
    fn test_debug_output_hides_api_key() {
        let client = client(StubTransport::replying("<r/>"));
        let printed = format!("{:?} {:?}", config(), client);
        assert!(!printed.contains("API-KEY"));
        assert!(printed.contains("AGENT-7"));
    }
}
