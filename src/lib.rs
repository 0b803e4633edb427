//! This crate builds client-side HTTP authentication credentials as specified by
//! IETF RFCs 2069 and 2617: `Basic` from a username and password, and `Digest`
//! as an answer to a server challenge (`WWW-Authenticate` or `Proxy-Authenticate`).
//!
//! It is meant for proxy clients and redirectors that talk to an upstream HTTP proxy.
//! Only the MD5 algorithm and the `auth` quality of protection are supported; the
//! nonce count is kept by the caller.
//!
//! # Examples
//!
//! Basic usage:
//!
//! ```
//! // Value of the Proxy-Authenticate header from a 407 response
//! let challenge = r#"Digest realm="testrealm@host.com", qop="auth", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;
//!
//! // The client nonce is normally random; the nonce count starts at 1 for a fresh server nonce.
//! let answer = http_auth::encode_digest(
//!     challenge,
//!     "Mufasa",
//!     "Circle Of Life",
//!     "GET",
//!     "/dir/index.html",
//!     1,
//!     "0a4f113b",
//! )
//! .unwrap();
//!
//! assert_eq!(answer, r#"Digest username="Mufasa", realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", uri="/dir/index.html", response="6629fae49393a05397450978507c4ef1", qop=auth, nc=00000001, cnonce="0a4f113b", opaque="5ccc069c403ebaf9f0171e9517f40e41""#);
//!
//! // Basic needs no challenge
//! assert_eq!(http_auth::encode_basic("Aladdin", "open sesame").unwrap(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
//! ```
//!
//! The parsed challenge can also be kept and answered again for subsequent requests,
//! as long as the server accepts the nonce:
//!
//! ```
//! use http_auth::{AuthContext, HttpMethod};
//!
//! let prompt = http_auth::parse(r#"realm="proxy", nonce="abc", qop="auth""#).unwrap();
//! let context = AuthContext::new_with_method("user", "secret", "example.com:443", HttpMethod::CONNECT);
//!
//! // a random cnonce is generated since none was set on the context
//! let first = prompt.respond(&context, 1).unwrap();
//! let second = prompt.respond(&context, 2).unwrap();
//! assert_ne!(first.response, second.response);
//! assert!(second.to_string().contains("nc=00000002"));
//! ```

mod basic;
mod digest;
mod enums;
mod error;
mod param;
mod utils;

pub use error::{Error, Result};

pub use crate::basic::encode_basic;
pub use crate::digest::{compute_response, encode_digest, AuthContext, AuthorizationHeader, Challenge};
pub use crate::enums::*;
pub use crate::param::{Param, ParamParser, Span};
pub use crate::utils::{cmp_ignore_case, eq_ignore_case};

/// Parse the challenge header value.
/// It's just a convenience method to call [`Challenge::parse()`](struct.Challenge.html#method.parse).
pub fn parse(challenge: &str) -> Result<Challenge> {
    Challenge::parse(challenge)
}

/// Wrap a credential produced by this crate as an `http` header value
#[cfg(feature = "http")]
pub fn header_value(credential: &str) -> Result<http::HeaderValue> {
    Ok(http::HeaderValue::from_str(credential)?)
}

#[test]
fn test_parse_respond() {
    let src = r#"
    Digest
       realm="http-auth@example.org",
       qop="auth",
       algorithm=MD5,
       nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
       opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS"
    "#;

    let mut context = AuthContext::new("Mufasa", "Circle of Life", "/dir/index.html");
    context.set_custom_cnonce("f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ");

    let prompt = crate::parse(src).unwrap();
    let answer = prompt.respond(&context, 1).unwrap();

    let str = answer.to_string().replace(", ", ",\n  ");

    assert_eq!(
        str,
        r#"
Digest username="Mufasa",
  realm="http-auth@example.org",
  nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
  uri="/dir/index.html",
  response="8ca523f5e9506fed4657c9700eebdbec",
  qop=auth,
  nc=00000001,
  cnonce="f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ",
  opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS"
"#
        .trim()
    );
}

#[cfg(feature = "http")]
#[test]
fn test_header_value() {
    let basic = encode_basic("user", "pass").unwrap();
    assert_eq!(header_value(&basic).unwrap(), "Basic dXNlcjpwYXNz");
    assert_eq!(header_value("bad\nvalue"), Err(Error::InvalidHeaderValue));
}
