use crate::enums::{HttpMethod, Qop};
use crate::param::ParamParser;
use crate::utils::{eq_ignore_case, QuoteForDigest};
use crate::{Error, Error::*, Result};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use digest::Digest;
use log::{debug, trace};
use md5::Md5;
use rand::Rng;

/// Hash `parts` joined with `:` and hex-encode the result (lowercase, 32 chars)
fn md5_hex(parts: &[&str]) -> String {
    let mut ctx = Md5::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            ctx.update(b":");
        }
        ctx.update(part.as_bytes());
    }
    hex::encode(ctx.finalize())
}

fn generate_cnonce() -> String {
    let mut rng = rand::thread_rng();
    let nonce_bytes: [u8; 16] = rng.gen();
    hex::encode(nonce_bytes)
}

/// Compute the `response` field of a Digest credential.
///
/// With `qop` this is the RFC 2617 `auth` variant, which mixes in the nonce count
/// (as 8 hex digits) and the client nonce; without it, the RFC 2069 variant.
///
/// # Errors
/// `auth-int` is not supported.
#[allow(clippy::too_many_arguments)]
pub fn compute_response(
    username: &str,
    password: &str,
    realm: &str,
    method: &str,
    uri: &str,
    nonce: &str,
    nc: u32,
    cnonce: &str,
    qop: Option<Qop>,
) -> Result<String> {
    let ha1 = md5_hex(&[username, realm, password]);
    let ha2 = md5_hex(&[method, uri]);

    match qop {
        None => Ok(md5_hex(&[&ha1, nonce, &ha2])),
        Some(Qop::AUTH) => {
            let nc = format!("{:08x}", nc);
            Ok(md5_hex(&[&ha1, nonce, &nc, cnonce, "auth", &ha2]))
        }
        Some(q) => Err(UnsupportedQop(q.to_string())),
    }
}

/// Login attempt context
///
/// All fields are borrowed; the struct is meant to live for one request only.
#[derive(Debug, Clone)]
pub struct AuthContext<'a> {
    /// Login username
    pub username: &'a str,
    /// Login password (plain)
    pub password: &'a str,
    /// Requested URI (for a proxy CONNECT this is the `host:port` authority)
    pub uri: &'a str,
    /// HTTP method used (defaults to GET)
    pub method: HttpMethod<'a>,
    /// Fixed client nonce; a random one is generated when this is None
    pub cnonce: Option<&'a str>,
}

impl<'a> AuthContext<'a> {
    /// Construct a new context with the GET verb
    pub fn new(username: &'a str, password: &'a str, uri: &'a str) -> Self {
        Self::new_with_method(username, password, uri, HttpMethod::GET)
    }

    /// Construct a new context with an arbitrary verb
    pub fn new_with_method(
        username: &'a str,
        password: &'a str,
        uri: &'a str,
        method: HttpMethod<'a>,
    ) -> Self {
        Self {
            username,
            password,
            uri,
            method,
            cnonce: None,
        }
    }

    pub fn set_custom_cnonce(&mut self, cnonce: &'a str) {
        self.cnonce = Some(cnonce);
    }

    fn check(&self) -> Result<()> {
        let required = [
            ("user", self.username),
            ("password", self.password),
            ("method", self.method.as_str()),
            ("uri", self.uri),
        ];
        for &(what, value) in required.iter() {
            if value.is_empty() {
                return Err(MissingArgument(what));
            }
        }
        Ok(())
    }
}

/// The parameters of a `WWW-Authenticate` / `Proxy-Authenticate` Digest challenge
/// that take part in the response computation.
#[derive(Debug, PartialEq, Clone)]
pub struct Challenge {
    /// Authorization realm
    pub realm: String,
    /// Server nonce
    pub nonce: String,
    /// Server opaque string, echoed back unchanged
    pub opaque: Option<String>,
    /// Quality of protection requested by the server, None in legacy mode (RFC 2069)
    pub qop: Option<Qop>,
}

/// Skip a leading `Digest` scheme token, if any
fn strip_scheme(input: &str) -> &str {
    let trimmed = input.trim_start();
    let end = trimmed
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or_else(|| trimmed.len());

    if eq_ignore_case(&trimmed[..end], "Digest") {
        &trimmed[end..]
    } else {
        input
    }
}

impl Challenge {
    /// Parse the challenge header value, with or without the `Digest` scheme prefix.
    ///
    /// Parameter names are matched case-insensitively, unknown ones are skipped.
    /// If a parameter repeats, the last occurrence wins.
    ///
    /// # Errors
    /// Malformed syntax anywhere in the list, a missing `realm` or `nonce`,
    /// or a `qop` that is neither `auth` nor `auth-int`.
    pub fn parse(input: &str) -> Result<Self> {
        let mut realm = None;
        let mut nonce = None;
        let mut opaque = None;
        let mut qop = None;

        for param in ParamParser::new(strip_scheme(input)) {
            let (name, value) = param.map_err(|e| {
                debug!("malformed digest challenge: {}", e);
                e
            })?;

            let slot = if eq_ignore_case(name, "realm") {
                &mut realm
            } else if eq_ignore_case(name, "nonce") {
                &mut nonce
            } else if eq_ignore_case(name, "opaque") {
                &mut opaque
            } else if eq_ignore_case(name, "qop") {
                &mut qop
            } else {
                trace!("ignoring challenge parameter {}", name);
                continue;
            };

            trace!("challenge parameter {}", name);
            *slot = Some(value);
        }

        let realm = realm.ok_or_else(|| {
            debug!("digest challenge without realm");
            MissingRequired("realm")
        })?;
        let nonce = nonce.ok_or_else(|| {
            debug!("digest challenge without nonce");
            MissingRequired("nonce")
        })?;
        let qop = match qop {
            Some(q) => Some(Qop::from_str(q).map_err(|e| {
                debug!("digest challenge with unusable qop: {}", e);
                e
            })?),
            None => None,
        };

        Ok(Challenge {
            realm: realm.to_owned(),
            nonce: nonce.to_owned(),
            opaque: opaque.map(str::to_owned),
            qop,
        })
    }

    /// Build the credential answering this challenge.
    ///
    /// `nc` is the number of requests (this one included) sent with the same server
    /// nonce; keeping track of it is up to the caller.
    ///
    /// # Errors
    /// An empty username, password, method or uri, or a challenge asking for `auth-int`.
    pub fn respond(&self, context: &AuthContext<'_>, nc: u32) -> Result<AuthorizationHeader> {
        context.check().map_err(|e| {
            debug!("cannot answer digest challenge: {}", e);
            e
        })?;

        let cnonce = match (self.qop, context.cnonce) {
            (None, _) => None,
            (Some(_), Some(cnonce)) => Some(cnonce.to_owned()),
            (Some(_), None) => Some(generate_cnonce()),
        };

        let response = compute_response(
            context.username,
            context.password,
            &self.realm,
            context.method.as_str(),
            context.uri,
            &self.nonce,
            nc,
            cnonce.as_deref().unwrap_or_default(),
            self.qop,
        )
        .map_err(|e| {
            debug!("cannot answer digest challenge: {}", e);
            e
        })?;

        Ok(AuthorizationHeader {
            username: context.username.to_owned(),
            realm: self.realm.clone(),
            nonce: self.nonce.clone(),
            uri: context.uri.to_owned(),
            response,
            qop: self.qop,
            nc,
            cnonce,
            opaque: self.opaque.clone(),
        })
    }
}

impl FromStr for Challenge {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}

/// Digest credential sent back to the server, including the computed hash.
///
/// Obtained from [`Challenge::respond()`](struct.Challenge.html#method.respond);
/// the `Display` impl renders the `Authorization` header value.
#[derive(Debug, PartialEq, Clone)]
pub struct AuthorizationHeader {
    pub username: String,
    pub realm: String,
    pub nonce: String,
    pub uri: String,
    /// Computed digest, 32 lowercase hex characters
    pub response: String,
    /// None in legacy compat mode (RFC 2069)
    pub qop: Option<Qop>,
    /// Not sent in legacy compat mode (RFC 2069)
    pub nc: u32,
    /// None in legacy compat mode (RFC 2069)
    pub cnonce: Option<String>,
    pub opaque: Option<String>,
}

impl AuthorizationHeader {
    /// Produce a header string (also accessible through the Display trait)
    pub fn to_header_string(&self) -> String {
        self.to_string()
    }

    #[cfg(feature = "http")]
    pub fn to_header_value(&self) -> Result<http::HeaderValue> {
        crate::header_value(&self.to_header_string())
    }
}

impl Display for AuthorizationHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // realm, nonce and opaque are echoed exactly as the server sent them
        write!(
            f,
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"",
            self.username.quote_for_digest(),
            self.realm,
            self.nonce,
            self.uri.quote_for_digest(),
            self.response
        )?;

        if let (Some(qop), Some(cnonce)) = (&self.qop, &self.cnonce) {
            write!(
                f,
                ", qop={}, nc={:08x}, cnonce=\"{}\"",
                qop,
                self.nc,
                cnonce.quote_for_digest()
            )?;
        }

        if let Some(opaque) = &self.opaque {
            write!(f, ", opaque=\"{}\"", opaque)?;
        }

        Ok(())
    }
}

/// Answer a Digest challenge in one go.
///
/// `challenge` is the `WWW-Authenticate` (or `Proxy-Authenticate`) value, with or
/// without the leading `Digest`. The result is a complete `Authorization` header value.
pub fn encode_digest(
    challenge: &str,
    user: &str,
    password: &str,
    method: &str,
    uri: &str,
    nc: u32,
    cnonce: &str,
) -> Result<String> {
    let challenge = Challenge::parse(challenge)?;

    let mut context = AuthContext::new_with_method(user, password, uri, HttpMethod::from(method));
    context.set_custom_cnonce(cnonce);

    Ok(challenge.respond(&context, nc)?.to_header_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RFC2617_NONCE: &str = "dcd98b7102dd2f0e8b11d0f600bfb0c093";
    const RFC2617_OPAQUE: &str = "5ccc069c403ebaf9f0171e9517f40e41";

    #[test]
    fn test_md5_hex() {
        assert_eq!(md5_hex(&[]), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            md5_hex(&["Mufasa", "testrealm@host.com", "Circle Of Life"]),
            "939e7578ed9e3c518a452acee763bce9"
        );
        assert_eq!(
            md5_hex(&["GET", "/dir/index.html"]),
            "39aff3a2bab6126f332b942af96d3366"
        );
    }

    #[test]
    fn test_compute_response_rfc2617() {
        let response = compute_response(
            "Mufasa",
            "Circle Of Life",
            "testrealm@host.com",
            "GET",
            "/dir/index.html",
            RFC2617_NONCE,
            1,
            "0a4f113b",
            Some(Qop::AUTH),
        )
        .unwrap();
        assert_eq!(response, "6629fae49393a05397450978507c4ef1");
    }

    #[test]
    fn test_compute_response_rejects_auth_int() {
        let res = compute_response("u", "p", "r", "GET", "/", "n", 1, "c", Some(Qop::AUTH_INT));
        assert_eq!(res, Err(UnsupportedQop("auth-int".into())));
    }

    #[test]
    fn test_single_field_changes_response() {
        let base = [
            "Mufasa",
            "Circle Of Life",
            "testrealm@host.com",
            "GET",
            "/dir/index.html",
            RFC2617_NONCE,
            "0a4f113b",
        ];
        let run = |f: [&str; 7], nc: u32, qop: Option<Qop>| {
            compute_response(f[0], f[1], f[2], f[3], f[4], f[5], nc, f[6], qop).unwrap()
        };
        let reference = run(base, 1, Some(Qop::AUTH));

        for i in 0..base.len() {
            let mut changed = base;
            let mutated = format!("{}x", base[i]);
            changed[i] = &mutated;
            assert_ne!(run(changed, 1, Some(Qop::AUTH)), reference, "field {}", i);
        }
        assert_ne!(run(base, 2, Some(Qop::AUTH)), reference);
        assert_ne!(run(base, 1, None), reference);
    }

    #[test]
    fn test_challenge_parse() {
        let parsed = Challenge::parse(r#"realm="x", nonce="y", qop="auth", opaque="z""#).unwrap();
        assert_eq!(
            parsed,
            Challenge {
                realm: "x".into(),
                nonce: "y".into(),
                opaque: Some("z".into()),
                qop: Some(Qop::AUTH),
            }
        );

        // scheme prefix, any order, odd case, unknown and repeated parameters
        let parsed = Challenge::from_str(
            r#"
            digest
               NONCE=first,
               algorithm=MD5,
               stale,
               Realm="a realm, with comma",
               nonce="second"
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            Challenge {
                realm: "a realm, with comma".into(),
                nonce: "second".into(),
                opaque: None,
                qop: None,
            }
        );
    }

    #[test]
    fn test_challenge_errors() {
        assert_eq!(
            Challenge::parse(r#"realm="r""#),
            Err(MissingRequired("nonce"))
        );
        assert_eq!(
            Challenge::parse(r#"nonce="n""#),
            Err(MissingRequired("realm"))
        );
        // a truncated name is not "realm"
        assert_eq!(
            Challenge::parse(r#"real="r", nonce="n""#),
            Err(MissingRequired("realm"))
        );
        assert_eq!(
            Challenge::parse(r#"realm="r", nonce="n", qop="auth-token""#),
            Err(UnsupportedQop("auth-token".into()))
        );
        // a parse error after the mandatory fields still fails
        assert!(matches!(
            Challenge::parse(r#"realm="r", nonce="n", foo=bar""#),
            Err(InvalidHeaderSyntax { .. })
        ));
    }

    #[test]
    fn test_rfc2069() {
        let src = format!(
            r#"Digest realm="testrealm@host.com", nonce="{}", opaque="{}""#,
            RFC2617_NONCE, RFC2617_OPAQUE
        );
        let context = AuthContext::new("Mufasa", "CircleOfLife", "/dir/index.html");

        let answer = Challenge::parse(&src).unwrap().respond(&context, 1).unwrap();
        assert_eq!(answer.cnonce, None);

        // The RFC has a wrong hash in the example, see errata
        let str = answer.to_string().replace(", ", ",\n  ");
        assert_eq!(
            str,
            r#"
Digest username="Mufasa",
  realm="testrealm@host.com",
  nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093",
  uri="/dir/index.html",
  response="1949323746fe6a43ef61f9606e7febea",
  opaque="5ccc069c403ebaf9f0171e9517f40e41"
"#
            .trim()
        );
    }

    #[test]
    fn test_rfc2617() {
        let src = format!(
            r#"realm="testrealm@host.com", qop="auth", nonce="{}", opaque="{}""#,
            RFC2617_NONCE, RFC2617_OPAQUE
        );
        let mut context = AuthContext::new("Mufasa", "Circle Of Life", "/dir/index.html");
        context.set_custom_cnonce("0a4f113b");

        let answer = Challenge::parse(&src).unwrap().respond(&context, 1).unwrap();

        let str = answer.to_string().replace(", ", ",\n  ");
        assert_eq!(
            str,
            r#"
Digest username="Mufasa",
  realm="testrealm@host.com",
  nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093",
  uri="/dir/index.html",
  response="6629fae49393a05397450978507c4ef1",
  qop=auth,
  nc=00000001,
  cnonce="0a4f113b",
  opaque="5ccc069c403ebaf9f0171e9517f40e41"
"#
            .trim()
        );
    }

    #[test]
    fn test_rfc7616_md5() {
        let answer = encode_digest(
            r#"realm="http-auth@example.org", qop=AUTH, algorithm=MD5, nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v""#,
            "Mufasa",
            "Circle of Life",
            "GET",
            "/dir/index.html",
            1,
            "f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ",
        )
        .unwrap();

        assert_eq!(
            answer,
            r#"Digest username="Mufasa", realm="http-auth@example.org", nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v", uri="/dir/index.html", response="8ca523f5e9506fed4657c9700eebdbec", qop=auth, nc=00000001, cnonce="f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ""#
        );
    }

    #[test]
    fn test_nc_formatting() {
        let challenge = Challenge::parse(r#"realm="r", nonce="n", qop="auth""#).unwrap();
        let mut context = AuthContext::new_with_method("u", "p", "example.com:443", HttpMethod::CONNECT);
        context.set_custom_cnonce("c");

        let answer = challenge.respond(&context, 0x1a2b).unwrap();
        assert!(answer.to_string().contains(", nc=00001a2b, "));
        let answer = challenge.respond(&context, u32::MAX).unwrap();
        assert!(answer.to_string().contains(", nc=ffffffff, "));
    }

    #[test]
    fn test_generated_cnonce() {
        let challenge = Challenge::parse(r#"realm="r", nonce="n", qop="auth""#).unwrap();
        let context = AuthContext::new("u", "p", "/");

        let a = challenge.respond(&context, 1).unwrap();
        let b = challenge.respond(&context, 1).unwrap();
        let cnonce = a.cnonce.clone().unwrap();
        assert_eq!(cnonce.len(), 32);
        assert_ne!(a.cnonce, b.cnonce);
        assert_ne!(a.response, b.response);
    }

    #[test]
    fn test_quoting() {
        let challenge = Challenge::parse(r#"realm="r", nonce="n""#).unwrap();
        let context = AuthContext::new(r#"we"ird\user"#, "p", "/");
        let answer = challenge.respond(&context, 1).unwrap().to_string();
        assert!(answer.starts_with(r#"Digest username="we\"ird\\user", "#));
    }

    #[test]
    fn test_encode_digest_failures() {
        let ok = r#"realm="r", nonce="n", qop="auth""#;
        assert_eq!(
            encode_digest(ok, "", "p", "GET", "/", 1, "c"),
            Err(MissingArgument("user"))
        );
        assert_eq!(
            encode_digest(ok, "u", "", "GET", "/", 1, "c"),
            Err(MissingArgument("password"))
        );
        assert_eq!(
            encode_digest(ok, "u", "p", "", "/", 1, "c"),
            Err(MissingArgument("method"))
        );
        assert_eq!(
            encode_digest(ok, "u", "p", "GET", "", 1, "c"),
            Err(MissingArgument("uri"))
        );
        assert_eq!(
            encode_digest(r#"realm="r", nonce="n", qop="auth-int""#, "u", "p", "GET", "/", 1, "c"),
            Err(UnsupportedQop("auth-int".into()))
        );
        assert_eq!(
            encode_digest(r#"realm="r""#, "u", "p", "GET", "/", 1, "c"),
            Err(MissingRequired("nonce"))
        );
        assert!(encode_digest(r#"foo=bar""#, "u", "p", "GET", "/", 1, "c").is_err());
    }

    proptest! {
        #[test]
        fn response_is_deterministic(
            user in "[a-zA-Z0-9]{1,12}",
            password in "[ -~]{1,16}",
            nc in any::<u32>(),
            cnonce in "[a-f0-9]{8,16}",
        ) {
            let challenge = r#"realm="r", nonce="n", qop="auth""#;
            let a = encode_digest(challenge, &user, &password, "GET", "/", nc, &cnonce).unwrap();
            let b = encode_digest(challenge, &user, &password, "GET", "/", nc, &cnonce).unwrap();
            prop_assert_eq!(&a, &b);

            let response = compute_response(&user, &password, "r", "GET", "/", "n", nc, &cnonce, Some(Qop::AUTH)).unwrap();
            prop_assert_eq!(response.len(), 32);
            prop_assert!(response.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')));
        }
    }
}
