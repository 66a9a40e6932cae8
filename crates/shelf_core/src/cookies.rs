//! Minimal cookie store for the shelf origin.

use std::collections::HashMap;

/// Cookies captured from one origin, browser-tab style: later captures
/// overwrite earlier ones and lookups never invent a value.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    values: HashMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one `Set-Cookie` header value. Only the leading name=value
    /// pair matters here; attributes such as Path and SameSite are dropped.
    pub fn absorb_set_cookie(&mut self, header: &str) {
        let pair = header.split(';').next().unwrap_or("");
        if let Some((name, value)) = pair.split_once('=') {
            let name = name.trim();
            if name.is_empty() {
                return;
            }
            self.values.insert(name.to_string(), value.trim().to_string());
        }
    }

    /// Exact-name lookup, percent-decoded. An absent cookie is `None`,
    /// never a default.
    pub fn get(&self, name: &str) -> Option<String> {
        let raw = self.values.get(name)?;
        match urlencoding::decode(raw) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(_) => Some(raw.clone()),
        }
    }

    /// `Cookie:` header value sending everything back, `name=value` pairs
    /// in stable order.
    pub fn header_value(&self) -> Option<String> {
        if self.values.is_empty() {
            return None;
        }
        let mut pairs: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        pairs.sort();
        Some(pairs.join("; "))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_leading_pair_and_drops_attributes() {
        let mut jar = CookieJar::new();
        jar.absorb_set_cookie("csrftoken=abc123; Path=/; SameSite=Lax; Max-Age=31449600");
        assert_eq!(jar.get("csrftoken").as_deref(), Some("abc123"));
        assert_eq!(jar.get("Path"), None);
    }

    #[test]
    fn later_captures_overwrite_earlier_ones() {
        let mut jar = CookieJar::new();
        jar.absorb_set_cookie("csrftoken=old");
        jar.absorb_set_cookie("csrftoken=new; Path=/");
        assert_eq!(jar.get("csrftoken").as_deref(), Some("new"));
    }

    #[test]
    fn values_are_percent_decoded_on_lookup() {
        let mut jar = CookieJar::new();
        jar.absorb_set_cookie("message=two%20words");
        assert_eq!(jar.get("message").as_deref(), Some("two words"));
    }

    #[test]
    fn missing_cookie_is_none() {
        let jar = CookieJar::new();
        assert_eq!(jar.get("csrftoken"), None);
        assert!(jar.is_empty());
    }

    #[test]
    fn header_value_joins_pairs_in_stable_order() {
        let mut jar = CookieJar::new();
        jar.absorb_set_cookie("sessionid=s1");
        jar.absorb_set_cookie("csrftoken=c1");
        assert_eq!(
            jar.header_value().as_deref(),
            Some("csrftoken=c1; sessionid=s1")
        );
        assert_eq!(CookieJar::new().header_value(), None);
    }

    #[test]
    fn malformed_header_without_equals_is_ignored() {
        let mut jar = CookieJar::new();
        jar.absorb_set_cookie("not-a-cookie");
        assert!(jar.is_empty());
    }
}
