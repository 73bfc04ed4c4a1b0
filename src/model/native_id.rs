//! Native id parsing.
//!
//! Native ids are whitespace separated `key=value` pairs such as
//! `controllerType=0 controllerNumber=1 scan=17`.

/// Value of `key` in a native id, if present.
pub fn value<'a>(id: &'a str, key: &str) -> Option<&'a str> {
    id.split_whitespace()
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_lookup() {
        let id = "controllerType=0 controllerNumber=1 scan=17";
        assert_eq!(value(id, "scan"), Some("17"));
        assert_eq!(value(id, "controllerType"), Some("0"));
        assert_eq!(value(id, "frame"), None);
    }

    #[test]
    fn test_value_ignores_malformed_pairs() {
        assert_eq!(value("index=4 junk scan=", "scan"), Some(""));
        assert_eq!(value("junk", "junk"), None);
        assert_eq!(value("", "scan"), None);
    }
}
