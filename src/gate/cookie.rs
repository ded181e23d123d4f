//! Structured `Set-Cookie` handling.
//!
//! Resolver-produced cookies are parsed into an explicit attribute struct and
//! re-emitted, rather than copied as opaque strings, so that a malformed
//! directive fails loudly at the merge boundary instead of reaching clients.

use crate::error::{Result, TollgateError};
use axum::http::HeaderValue;
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, Expiration, SameSite};

/// The recognized attributes of a single `Set-Cookie` directive.
///
/// Attribute names are case-insensitive on parse; `Expires` is parsed into a
/// calendar date, not carried as a string.
#[derive(Clone, Debug, PartialEq)]
pub struct CookieSetterParams {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<OffsetDateTime>,
    pub max_age: Option<Duration>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl CookieSetterParams {
    /// Parse a raw `Set-Cookie` directive string.
    ///
    /// A string that does not parse as `name=value` is a contract violation
    /// of whatever produced it and returns
    /// [`TollgateError::MalformedCookie`].
    pub fn parse(raw: &str) -> Result<Self> {
        let cookie = Cookie::parse(raw.to_string())
            .map_err(|e| TollgateError::malformed_cookie(format!("{}: {}", raw, e)))?;

        if cookie.name().is_empty() {
            return Err(TollgateError::malformed_cookie(format!(
                "{}: empty cookie name",
                raw
            )));
        }

        let expires = match cookie.expires() {
            Some(Expiration::DateTime(datetime)) => Some(datetime),
            // "Expires=Session" or no Expires attribute
            Some(Expiration::Session) | None => None,
        };

        Ok(Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain: cookie.domain().map(str::to_string),
            path: cookie.path().map(str::to_string),
            expires,
            max_age: cookie.max_age(),
            secure: cookie.secure().unwrap_or(false),
            http_only: cookie.http_only().unwrap_or(false),
            same_site: cookie.same_site(),
        })
    }

    /// Rebuild the directive as a `cookie::Cookie`.
    pub fn to_cookie(&self) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), self.value.clone()))
            .secure(self.secure)
            .http_only(self.http_only);

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        if let Some(expires) = self.expires {
            builder = builder.expires(expires);
        }
        if let Some(max_age) = self.max_age {
            builder = builder.max_age(max_age);
        }
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site);
        }

        builder.build()
    }

    /// Serialize for an additive `Set-Cookie` header append.
    pub fn to_header_value(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.to_cookie().to_string()).map_err(|e| {
            TollgateError::malformed_cookie(format!("{}: not a valid header value: {}", self.name, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_directive() {
        let params = CookieSetterParams::parse("a=1").unwrap();

        assert_eq!(params.name, "a");
        assert_eq!(params.value, "1");
        assert_eq!(params.domain, None);
        assert_eq!(params.path, None);
        assert_eq!(params.expires, None);
        assert!(!params.secure);
        assert!(!params.http_only);
    }

    #[test]
    fn test_parse_full_directive() {
        let params = CookieSetterParams::parse(
            "__session=tok_abc; Domain=example.com; Path=/; Secure; HttpOnly; SameSite=Lax; Max-Age=3600",
        )
        .unwrap();

        assert_eq!(params.name, "__session");
        assert_eq!(params.value, "tok_abc");
        assert_eq!(params.domain.as_deref(), Some("example.com"));
        assert_eq!(params.path.as_deref(), Some("/"));
        assert!(params.secure);
        assert!(params.http_only);
        assert_eq!(params.same_site, Some(SameSite::Lax));
        assert_eq!(params.max_age, Some(Duration::seconds(3600)));
    }

    #[test]
    fn test_expires_parsed_to_calendar_date() {
        let params =
            CookieSetterParams::parse("b=2; Expires=Wed, 09 Jun 2021 10:18:14 GMT").unwrap();

        // Wed, 09 Jun 2021 10:18:14 GMT
        let expected = OffsetDateTime::from_unix_timestamp(1_623_233_894).unwrap();
        assert_eq!(params.expires, Some(expected));
    }

    #[test]
    fn test_attribute_names_case_insensitive() {
        let params = CookieSetterParams::parse("c=3; secure; HTTPONLY; samesite=strict").unwrap();

        assert!(params.secure);
        assert!(params.http_only);
        assert_eq!(params.same_site, Some(SameSite::Strict));
    }

    #[test]
    fn test_malformed_directive_fails_loudly() {
        let err = CookieSetterParams::parse("no-equals-sign").unwrap_err();
        assert!(matches!(err, TollgateError::MalformedCookie(_)));

        let err = CookieSetterParams::parse("=value-without-name").unwrap_err();
        assert!(matches!(err, TollgateError::MalformedCookie(_)));
    }

    #[test]
    fn test_reconstruction_round_trips() {
        let raw = "b=2; Path=/app; Secure; HttpOnly; Expires=Wed, 09 Jun 2021 10:18:14 GMT";
        let params = CookieSetterParams::parse(raw).unwrap();

        let emitted = params.to_cookie().to_string();
        let reparsed = CookieSetterParams::parse(&emitted).unwrap();
        assert_eq!(params, reparsed);
    }

    #[test]
    fn test_to_header_value() {
        let params = CookieSetterParams::parse("a=1; Path=/").unwrap();
        let value = params.to_header_value().unwrap();
        let text = value.to_str().unwrap();

        assert!(text.starts_with("a=1"));
        assert!(text.contains("Path=/"));
    }
}
