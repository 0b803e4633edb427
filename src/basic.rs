use crate::{Error::*, Result};

use base64::prelude::*;
use log::debug;

const BASIC_PREFIX: &str = "Basic ";

/// Build a `Basic` credential: the prefix followed by the padded, single-line
/// base64 of `user:password`.
///
/// # Errors
/// Fails only if the encoded length does not fit in memory.
pub fn encode_basic(user: &str, password: &str) -> Result<String> {
    let pair_len = user.len() + 1 + password.len();
    let encoded_len = base64::encoded_len(pair_len, true).ok_or_else(|| {
        debug!("basic credential too long: {} bytes", pair_len);
        EncodedLength(pair_len)
    })?;

    let mut pair = String::with_capacity(pair_len);
    pair.push_str(user);
    pair.push(':');
    pair.push_str(password);

    let mut credential = String::with_capacity(BASIC_PREFIX.len() + encoded_len);
    credential.push_str(BASIC_PREFIX);
    BASE64_STANDARD.encode_string(pair, &mut credential);
    Ok(credential)
}
