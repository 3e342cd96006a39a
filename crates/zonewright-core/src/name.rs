//! DNS name normalization
//!
//! The provider always answers with fully qualified names, so every name is
//! normalized before it is compared or used in a lookup.

/// Root label separator
pub const ROOT: char = '.';

/// Append the root `.` unless the name already ends with one
///
/// Idempotent: `normalize_name(&normalize_name(x)) == normalize_name(x)`.
pub fn normalize_name(name: &str) -> String {
    if name.ends_with(ROOT) {
        name.to_string()
    } else {
        format!("{name}{ROOT}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_root() {
        assert_eq!(normalize_name("crossplane.io"), "crossplane.io.");
        assert_eq!(normalize_name(""), ".");
    }

    #[test]
    fn test_fqdn_unchanged() {
        assert_eq!(normalize_name("crossplane.io."), "crossplane.io.");
    }

    #[test]
    fn test_idempotent() {
        for name in ["example.com", "example.com.", "a.b.c", ".", ""] {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once);
        }
        assert_eq!(normalize_name("example.com"), normalize_name("example.com."));
    }
}
