//! Response handling strategies.
//!
//! Every call site picks one [`ResponseStrategy`] up front. The strategy
//! decides how the body is split into values before each value goes through
//! the converter.

use schema::{Converter, Model, Typed};
use serde_json::Value;
use transport::{ApiRequest, RawResponse, TransportError};

use crate::{ClientError, Result};

/// Where the items and the cursor live in a paginated body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    /// Key holding the array of items
    pub items_key: String,
    /// Key holding the cursor of the next page; `null` or missing ends the listing
    pub next_cursor_key: String,
    /// Query parameter the cursor is sent back under
    pub cursor_param: String,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            items_key: "items".to_string(),
            next_cursor_key: "next_cursor".to_string(),
            cursor_param: "cursor".to_string(),
        }
    }
}

impl PageSpec {
    /// Custom key names.
    pub fn new(
        items_key: impl Into<String>,
        next_cursor_key: impl Into<String>,
        cursor_param: impl Into<String>,
    ) -> Self {
        Self {
            items_key: items_key.into(),
            next_cursor_key: next_cursor_key.into(),
            cursor_param: cursor_param.into(),
        }
    }
}

/// How a response body turns into typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStrategy {
    /// A single value
    Model,
    /// A JSON array, every element decoded on its own
    List,
    /// One page of a cursor-paginated listing
    Page(PageSpec),
    /// Newline-delimited JSON, decoded line by line
    Stream,
}

/// Converter, strategy and envelope for one endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Converter applied to each value
    pub converter: &'static Converter,
    /// How the body is split into values
    pub strategy: ResponseStrategy,
    /// Keys unwrapped from the body before decoding, outermost first
    pub envelope: Vec<String>,
}

impl Endpoint {
    /// An endpoint without envelope.
    pub fn new(converter: &'static Converter, strategy: ResponseStrategy) -> Self {
        Self { converter, strategy, envelope: Vec::new() }
    }

    /// A single `M`.
    pub fn model<M: Model>() -> Self { Self::new(M::converter(), ResponseStrategy::Model) }

    /// A list of `M`.
    pub fn list<M: Model>() -> Self { Self::new(M::converter(), ResponseStrategy::List) }

    /// Pages of `M`.
    pub fn page<M: Model>(spec: PageSpec) -> Self {
        Self::new(M::converter(), ResponseStrategy::Page(spec))
    }

    /// A newline-delimited stream of `M`.
    pub fn stream<M: Model>() -> Self { Self::new(M::converter(), ResponseStrategy::Stream) }

    /// Unwrap `path` (e.g. `["data"]`) before decoding.
    pub fn with_envelope<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.envelope = path.into_iter().map(Into::into).collect();
        self
    }

    /// Decode a response according to the strategy.
    pub fn handle(&self, request: &ApiRequest, response: RawResponse) -> Result<Decoded> {
        match &self.strategy {
            ResponseStrategy::Model => {
                let body = response.json()?;
                let value = unwrap_envelope(&body, self.envelope.as_slice())?;
                Ok(Decoded::Model(convert::decode(self.converter, value)))
            }
            ResponseStrategy::List => {
                let body = response.json()?;
                let value = unwrap_envelope(&body, self.envelope.as_slice())?;
                Ok(Decoded::List(decode_list(self.converter, value)?))
            }
            ResponseStrategy::Page(spec) => {
                let body = response.json()?;
                let value = unwrap_envelope(&body, self.envelope.as_slice())?;
                let items = unwrap_envelope(value, std::slice::from_ref(&spec.items_key))?;
                let page = Page {
                    items: decode_list(self.converter, items)?,
                    next_cursor: cursor_of(value.get(&spec.next_cursor_key)),
                    request: request.clone(),
                    endpoint: self.clone(),
                };
                Ok(Decoded::Page(page))
            }
            ResponseStrategy::Stream =>
                Ok(Decoded::Stream(NdjsonStream::new(response.body, self.converter))),
        }
    }
}

/// Follow `path` into `body`.
///
/// A missing key is an error: the server answered with a shape this
/// endpoint does not describe.
pub fn unwrap_envelope<'a, S: AsRef<str>>(body: &'a Value, path: &[S]) -> Result<&'a Value> {
    path.iter().try_fold(body, |value, key| {
        let key = key.as_ref();
        value.get(key).ok_or_else(|| {
            ClientError::Transport(TransportError::InvalidFormat(format!(
                "missing envelope key '{}' in {} body",
                key,
                convert::json_kind(value)
            )))
        })
    })
}

fn decode_list(converter: &Converter, value: &Value) -> Result<Vec<Typed>> {
    let Value::Array(items) = value else {
        return Err(ClientError::Transport(TransportError::InvalidFormat(format!(
            "expected an array, got {}",
            convert::json_kind(value)
        ))));
    };
    Ok(items.iter().map(|item| convert::decode(converter, item)).collect())
}

fn cursor_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(cursor) if !cursor.is_empty() => Some(cursor.clone()),
        Value::Number(cursor) => Some(cursor.to_string()),
        _ => None,
    }
}

/// Result of [`Endpoint::handle`], one variant per strategy.
#[derive(Debug)]
pub enum Decoded {
    /// Decoded single value
    Model(Typed),
    /// Decoded elements
    List(Vec<Typed>),
    /// Decoded page
    Page(Page),
    /// Lazily decoded stream
    Stream(NdjsonStream),
}

impl Decoded {
    /// The single value, if this came from [`ResponseStrategy::Model`].
    pub fn into_model(self) -> Result<Typed> {
        match self {
            Decoded::Model(value) => Ok(value),
            other => Err(other.mismatch("a single value")),
        }
    }

    /// The elements, if this came from [`ResponseStrategy::List`].
    pub fn into_list(self) -> Result<Vec<Typed>> {
        match self {
            Decoded::List(items) => Ok(items),
            other => Err(other.mismatch("a list")),
        }
    }

    /// The page, if this came from [`ResponseStrategy::Page`].
    pub fn into_page(self) -> Result<Page> {
        match self {
            Decoded::Page(page) => Ok(page),
            other => Err(other.mismatch("a page")),
        }
    }

    /// The stream, if this came from [`ResponseStrategy::Stream`].
    pub fn into_stream(self) -> Result<NdjsonStream> {
        match self {
            Decoded::Stream(stream) => Ok(stream),
            other => Err(other.mismatch("a stream")),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Decoded::Model(_) => "a single value",
            Decoded::List(_) => "a list",
            Decoded::Page(_) => "a page",
            Decoded::Stream(_) => "a stream",
        }
    }

    fn mismatch(&self, expected: &str) -> ClientError {
        ClientError::Strategy(format!("expected {}, endpoint produced {}", expected, self.kind()))
    }
}

/// One page of a cursor-paginated listing.
///
/// Keeps the request that produced it so the next page can be requested
/// with only the cursor changed.
#[derive(Debug, Clone)]
pub struct Page {
    /// Decoded items of this page
    pub items: Vec<Typed>,
    /// Cursor of the following page, `None` on the last page
    pub next_cursor: Option<String>,
    pub(crate) request: ApiRequest,
    pub(crate) endpoint: Endpoint,
}

impl Page {
    /// Whether another page follows.
    pub fn has_next(&self) -> bool { self.next_cursor.is_some() }

    /// Request for the following page, if any.
    pub fn next_request(&self) -> Option<ApiRequest> {
        let cursor = self.next_cursor.as_ref()?;
        let ResponseStrategy::Page(spec) = &self.endpoint.strategy else {
            return None;
        };
        Some(self.request.clone().set_query(&spec.cursor_param, cursor))
    }

    /// The items as typed views of `M`.
    pub fn models<M: Model>(&self) -> Result<Vec<M>> { typed_views(&self.items) }
}

/// Read decoded values through the typed view `M`.
pub(crate) fn typed_views<M: Model>(items: &[Typed]) -> Result<Vec<M>> {
    items.iter().map(typed_view::<M>).collect()
}

pub(crate) fn typed_view<M: Model>(value: &Typed) -> Result<M> {
    match value {
        Typed::Model(instance) if instance.name() == registry::model_schema::<M>().name => {
            Ok(M::from_instance(instance))
        }
        other => Ok(convert::decode_model::<M>(&other.to_wire())?),
    }
}

/// Newline-delimited JSON body, decoded one line per `next()`.
///
/// Blank lines are skipped. A line that is not valid JSON yields an error
/// and iteration continues with the following line.
#[derive(Debug)]
pub struct NdjsonStream {
    body: String,
    offset: usize,
    converter: &'static Converter,
}

impl NdjsonStream {
    /// Stream over `body`.
    pub fn new(body: String, converter: &'static Converter) -> Self {
        Self { body, offset: 0, converter }
    }

    /// Read every remaining line through the typed view `M`.
    pub fn models<M: Model>(self) -> impl Iterator<Item = Result<M>> {
        self.map(|item| item.and_then(|value| typed_view::<M>(&value)))
    }

    fn next_line(&mut self) -> Option<&str> {
        loop {
            if self.offset >= self.body.len() {
                return None;
            }
            let rest = &self.body[self.offset..];
            let end = rest.find('\n').unwrap_or(rest.len());
            let start = self.offset;
            self.offset += (end + 1).min(rest.len());
            let line = self.body[start..start + end].trim();
            if !line.is_empty() {
                return Some(line);
            }
        }
    }
}

impl Iterator for NdjsonStream {
    type Item = Result<Typed>;

    fn next(&mut self) -> Option<Self::Item> {
        let converter = self.converter;
        let line = self.next_line()?;
        let decoded = serde_json::from_str::<Value>(line)
            .map(|value| convert::decode(converter, &value))
            .map_err(|e| ClientError::Transport(TransportError::from(e)));
        Some(decoded)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Rates;

    fn rates() -> &'static Converter {
        registry::memoize::<Rates>(|| Converter::map_of(Converter::float()))
    }

    #[test]
    fn test_unwrap_envelope() {
        let body = json!({"data": {"result": [1, 2]}});
        assert_eq!(unwrap_envelope(&body, &["data", "result"]).expect("present"), &json!([1, 2]));
        assert_eq!(unwrap_envelope::<&str>(&body, &[]).expect("empty path"), &body);

        let err = unwrap_envelope(&body, &["payload"]).expect_err("missing key");
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::InvalidFormat(msg)) if msg.contains("payload")
        ));
    }

    #[test]
    fn test_list_strategy_requires_array() {
        let endpoint = Endpoint::new(rates(), ResponseStrategy::List);
        let request = ApiRequest::get("/rates");
        let decoded = endpoint
            .handle(&request, RawResponse::new(200, r#"[{"eur": 1}, {"usd": "1.1"}]"#))
            .and_then(Decoded::into_list)
            .expect("list decodes");
        assert_eq!(decoded.len(), 2);

        let err =
            endpoint.handle(&request, RawResponse::new(200, r#"{"eur": 1}"#)).expect_err("object");
        assert!(matches!(err, ClientError::Transport(TransportError::InvalidFormat(_))));
    }

    #[test]
    fn test_page_strategy_reads_cursor() {
        let spec = PageSpec::new("results", "next", "after");
        let endpoint = Endpoint::new(rates(), ResponseStrategy::Page(spec)).with_envelope(["data"]);
        let request = ApiRequest::get("/rates").query("limit", 2);
        let body = r#"{"data": {"results": [{}, {}], "next": 40}}"#;
        let page = endpoint
            .handle(&request, RawResponse::new(200, body))
            .and_then(Decoded::into_page)
            .expect("page decodes");

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("40"));
        let next = page.next_request().expect("next request");
        assert_eq!(next.query_value("after"), Some("40"));
        assert_eq!(next.query_value("limit"), Some("2"));

        let last = r#"{"data": {"results": [], "next": null}}"#;
        let page = endpoint
            .handle(&request, RawResponse::new(200, last))
            .and_then(Decoded::into_page)
            .expect("page decodes");
        assert!(!page.has_next());
        assert!(page.next_request().is_none());
    }

    #[test]
    fn test_stream_skips_blank_lines_and_reports_bad_ones() {
        let body = "{\"a\": 1}\n\n  \nnot json\n{\"b\": 2.5}".to_string();
        let mut stream = NdjsonStream::new(body, rates());

        assert!(matches!(stream.next(), Some(Ok(Typed::Map(_)))));
        assert!(matches!(
            stream.next(),
            Some(Err(ClientError::Transport(TransportError::Serialization(_))))
        ));
        assert!(matches!(stream.next(), Some(Ok(Typed::Map(_)))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_decoded_accessor_mismatch() {
        let err = Decoded::List(Vec::new()).into_model().expect_err("not a model");
        assert_eq!(
            err.to_string(),
            "Unexpected response strategy: expected a single value, endpoint produced a list"
        );
    }
}
