//! Picks the payload representation a client asked for.

use http::HeaderMap;
use http::header::ACCEPT;
use mime::Mime;

/// The two payload flavours the status handlers can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Representation {
    #[default]
    Json,
    Xml,
}

impl Representation {
    /// Reads the `Accept` header, falling back to JSON when it is absent or unusable.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers.get(ACCEPT).and_then(|value| value.to_str().ok()).map(Self::negotiate).unwrap_or_default()
    }

    /// The first media range naming `text/xml` or `application/json` decides.
    pub fn negotiate(accept: &str) -> Self {
        accept
            .split(',')
            .filter_map(|range| range.trim().parse::<Mime>().ok())
            .find_map(|range| match range.essence_str() {
                "text/xml" => Some(Representation::Xml),
                "application/json" => Some(Representation::Json),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn negotiate() {
        assert_eq!(Representation::negotiate("text/xml"), Representation::Xml);
        assert_eq!(Representation::negotiate("application/json"), Representation::Json);
        assert_eq!(Representation::negotiate("text/html, text/xml;q=0.9, */*"), Representation::Xml);
        assert_eq!(Representation::negotiate("application/json, text/xml"), Representation::Json);
        assert_eq!(Representation::negotiate("text/html"), Representation::Json);
        assert_eq!(Representation::negotiate(""), Representation::Json);
    }

    #[test]
    fn missing_accept_is_json() {
        let mut headers = HeaderMap::new();
        assert_eq!(Representation::from_headers(&headers), Representation::Json);

        headers.insert(ACCEPT, HeaderValue::from_static("text/xml; charset=utf-8"));
        assert_eq!(Representation::from_headers(&headers), Representation::Xml);
    }
}
