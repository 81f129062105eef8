use rand::Rng;

/// Default span id: 8 lowercase hex characters. Consumers treat ids as
/// opaque strings, so uniqueness-in-practice is all this needs.
pub(crate) fn random_span_id() -> String {
    format!("{:08x}", rand::thread_rng().gen::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_shape() {
        for _ in 0..100 {
            let id = random_span_id();
            assert_eq!(id.len(), 8);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}
