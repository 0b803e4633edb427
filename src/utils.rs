use std::cmp::Ordering;
use std::string::ToString;

/// Compare up to `n` characters of two optional strings, ignoring ASCII case.
///
/// Two absent strings are equal, an absent string sorts before a present one.
/// The end of a slice or an embedded NUL terminates a string; if one string
/// terminates before the other within `n` characters, the shorter one is `Less`
/// even when every character compared so far matched.
pub fn cmp_ignore_case(a: Option<&str>, b: Option<&str>, n: usize) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a.as_bytes(), b.as_bytes()),
    };

    for i in 0..n {
        let ca = a.get(i).copied().filter(|&c| c != 0);
        let cb = b.get(i).copied().filter(|&c| c != 0);

        match (ca, cb) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => {
                let ord = ca.to_ascii_lowercase().cmp(&cb.to_ascii_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }

    Ordering::Equal
}

/// Whole-string case-insensitive equality
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    cmp_ignore_case(Some(a), Some(b), a.len().max(b.len())) == Ordering::Equal
}

/// slash quoting for digest strings
pub trait QuoteForDigest {
    fn quote_for_digest(&self) -> String;
}

impl QuoteForDigest for &str {
    fn quote_for_digest(&self) -> String {
        self.to_string().quote_for_digest()
    }
}

impl QuoteForDigest for String {
    fn quote_for_digest(&self) -> String {
        self.replace('\\', "\\\\").replace('"', "\\\"")
    }
}
