/// Mint a fresh record id: 128 random bits as a 32-char lowercase hex
/// string. No uniqueness check against existing ids; at this data scale the
/// collision probability is negligible. Ids are generated once at creation
/// and never regenerated or reused.
pub fn new_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_new_id_distinct_across_many_calls() {
        let mut seen = HashSet::new();
        for _ in 0..100_000 {
            assert!(seen.insert(new_id()));
        }
    }
}
