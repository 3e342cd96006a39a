//! Late-initialization helpers
//!
//! Fields the provider fills in implicitly would otherwise show up as drift
//! on every pass. These helpers copy an observed value into a desired field
//! only when the user left that field unset.

/// Fill `field` from `observed` when `field` is `None`
///
/// Returns true if the field was filled.
pub fn late_init_option<T: Clone>(field: &mut Option<T>, observed: Option<&T>) -> bool {
    match (field.as_ref(), observed) {
        (None, Some(value)) => {
            *field = Some(value.clone());
            true
        }
        _ => false,
    }
}

/// Fill an empty `field` from a non-empty `observed` list
pub fn late_init_vec<T: Clone>(field: &mut Vec<T>, observed: &[T]) -> bool {
    if field.is_empty() && !observed.is_empty() {
        *field = observed.to_vec();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_filled_only_when_unset() {
        let mut unset: Option<i64> = None;
        assert!(late_init_option(&mut unset, Some(&300)));
        assert_eq!(unset, Some(300));

        let mut set = Some(60);
        assert!(!late_init_option(&mut set, Some(&300)));
        assert_eq!(set, Some(60));

        let mut still_unset: Option<i64> = None;
        assert!(!late_init_option(&mut still_unset, None));
        assert_eq!(still_unset, None);
    }

    #[test]
    fn test_vec_filled_only_when_empty() {
        let mut empty: Vec<String> = vec![];
        assert!(late_init_vec(&mut empty, &["a".to_string()]));
        assert_eq!(empty, vec!["a".to_string()]);

        let mut set = vec!["b".to_string()];
        assert!(!late_init_vec(&mut set, &["a".to_string()]));
        assert_eq!(set, vec!["b".to_string()]);
    }
}
