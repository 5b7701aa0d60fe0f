//! Product ID generation and validation.

use uuid::Uuid;

/// Generate a fresh product ID (UUID v4).
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whether a caller-supplied ID is usable: non-blank with no interior
/// NUL bytes.
pub fn is_valid_product_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_valid() {
        let a = generate_product_id();
        let b = generate_product_id();
        assert_ne!(a, b);
        assert!(is_valid_product_id(&a));
    }

    #[test]
    fn test_blank_and_nul_ids_rejected() {
        assert!(!is_valid_product_id(""));
        assert!(!is_valid_product_id("   "));
        assert!(!is_valid_product_id("ab\0c"));
        assert!(is_valid_product_id("sku-123"));
    }
}
