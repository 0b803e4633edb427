use crate::utils::eq_ignore_case;
use crate::{Error, Error::*, Result};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// QOP field values
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum Qop {
    AUTH,
    AUTH_INT,
}

impl FromStr for Qop {
    type Err = Error;

    /// Parse from "auth" or "auth-int" as used in HTTP headers, ignoring case
    fn from_str(s: &str) -> Result<Self> {
        if eq_ignore_case(s, "auth") {
            Ok(Qop::AUTH)
        } else if eq_ignore_case(s, "auth-int") {
            Ok(Qop::AUTH_INT)
        } else {
            Err(UnsupportedQop(s.into()))
        }
    }
}

impl Display for Qop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Qop::AUTH => "auth",
            Qop::AUTH_INT => "auth-int",
        })
    }
}

/// HTTP method (part of the A2 hash input)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpMethod<'a> {
    GET,
    POST,
    HEAD,
    CONNECT,
    OTHER(&'a str),
}

impl<'a> Default for HttpMethod<'a> {
    fn default() -> Self {
        HttpMethod::GET
    }
}

impl<'a> From<&'a str> for HttpMethod<'a> {
    /// Known verbs are recognized by their exact (uppercase) spelling, anything else is kept as is
    fn from(s: &'a str) -> Self {
        match s {
            "GET" => HttpMethod::GET,
            "POST" => HttpMethod::POST,
            "HEAD" => HttpMethod::HEAD,
            "CONNECT" => HttpMethod::CONNECT,
            _ => HttpMethod::OTHER(s),
        }
    }
}

impl<'a> HttpMethod<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::CONNECT => "CONNECT",
            HttpMethod::OTHER(s) => *s,
        }
    }
}

impl<'a> Display for HttpMethod<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
