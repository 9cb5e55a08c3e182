//! Server-side re-pricing of an untrusted cart.
//!
//! Line ids are either `<uuid>`, `<uuid>-<variant>` or free-form strings for
//! made-to-order items. Only the leading canonical UUID is looked up in the
//! catalog; anything that does not resolve keeps the client-declared price.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use uuid::Uuid;

use super::cart::{CartLineItem, CatalogPrice, PriceSource, PricedCart, PricedLine};
use super::errors::DomainError;

const UUID_TEXT_LEN: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

const MAX_PRICE_TEXT_LEN: usize = 40;
const MAX_PRICE_SCALE: i64 = 10;
const MAX_PRICE_INTEGER_DIGITS: i64 = 12;
/// i64 holds 18 full decimal digits; two of them are cents.
const MAX_TOTAL_INTEGER_DIGITS: i64 = 16;

/// Digits left of the decimal point (at least one).
fn integer_digits(value: &BigDecimal) -> i64 {
    let (_, scale) = value.as_bigint_and_exponent();
    (value.digits() as i64).saturating_sub(scale).max(1)
}

/// Parse a client-declared unit price.
///
/// `BigDecimal` accepts arbitrary exponents, so the text and the resulting
/// magnitude are bounded before the value is used in any arithmetic.
pub fn parse_price(text: &str) -> Result<BigDecimal, DomainError> {
    let text = text.trim();
    if text.is_empty() || text.len() > MAX_PRICE_TEXT_LEN {
        return Err(DomainError::InvalidInput(format!(
            "price must be a decimal of at most {MAX_PRICE_TEXT_LEN} characters"
        )));
    }

    let price = BigDecimal::from_str(text)
        .map_err(|e| DomainError::InvalidInput(format!("invalid price '{text}': {e}")))?
        .normalized();

    let (_, scale) = price.as_bigint_and_exponent();
    if scale > MAX_PRICE_SCALE {
        return Err(DomainError::InvalidInput(format!(
            "price '{text}' has more than {MAX_PRICE_SCALE} decimal places"
        )));
    }
    if integer_digits(&price) > MAX_PRICE_INTEGER_DIGITS {
        return Err(DomainError::InvalidInput(format!(
            "price '{text}' is out of range"
        )));
    }
    Ok(price)
}

/// Extract the catalog product id from a cart line id.
///
/// Returns `None` unless the id starts with a hyphenated 8-4-4-4-12 hex UUID
/// that is either the whole id or followed by `-`.
pub fn extract_product_id(item_id: &str) -> Option<Uuid> {
    let bytes = item_id.as_bytes();
    if bytes.len() < UUID_TEXT_LEN {
        return None;
    }
    if bytes.len() > UUID_TEXT_LEN && bytes[UUID_TEXT_LEN] != b'-' {
        return None;
    }

    let token = &bytes[..UUID_TEXT_LEN];
    let canonical = token.iter().enumerate().all(|(i, b)| {
        if HYPHEN_POSITIONS.contains(&i) {
            *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    });
    if !canonical {
        return None;
    }

    // The token is pure ASCII at this point, so slicing the str is safe.
    Uuid::parse_str(&item_id[..UUID_TEXT_LEN]).ok()
}

/// The de-duplicated set of product ids worth asking the catalog about.
pub fn lookup_ids(items: &[CartLineItem]) -> Vec<Uuid> {
    items
        .iter()
        .filter_map(|item| extract_product_id(&item.id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn price_cart(items: &[CartLineItem], catalog: &[CatalogPrice]) -> PricedCart {
    let by_id: HashMap<Uuid, &CatalogPrice> = catalog.iter().map(|p| (p.id, p)).collect();

    let lines: Vec<PricedLine> = items
        .iter()
        .map(|item| {
            let product_id = extract_product_id(&item.id);
            match product_id.and_then(|id| by_id.get(&id)) {
                Some(record) => PricedLine {
                    item_id: item.id.clone(),
                    product_id,
                    unit_price: record.base_price.clone(),
                    quantity: item.quantity,
                    source: PriceSource::Catalog,
                },
                None => PricedLine {
                    item_id: item.id.clone(),
                    product_id,
                    unit_price: item.price.clone(),
                    quantity: item.quantity,
                    source: PriceSource::ClientDeclared,
                },
            }
        })
        .collect();

    let total = lines
        .iter()
        .fold(BigDecimal::zero(), |acc, line| acc + line.line_total());

    PricedCart { lines, total }
}

/// Convert a major-unit total to minor units, rounding half-up exactly once.
pub fn to_minor_units(total: &BigDecimal) -> Option<i64> {
    if integer_digits(total) > MAX_TOTAL_INTEGER_DIGITS {
        return None;
    }
    (total * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    const CHOC_CAKE: &str = "11111111-1111-1111-1111-111111111111";

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn item(id: &str, price: &str, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: id.to_string(),
            name: format!("item {id}"),
            price: dec(price),
            quantity,
        }
    }

    fn catalog_price(id: &str, base_price: &str) -> CatalogPrice {
        CatalogPrice {
            id: Uuid::parse_str(id).expect("valid uuid"),
            name: "Chocolate cake".to_string(),
            base_price: dec(base_price),
        }
    }

    #[test]
    fn extracts_plain_uuid() {
        assert_eq!(
            extract_product_id(CHOC_CAKE),
            Some(Uuid::parse_str(CHOC_CAKE).expect("valid uuid"))
        );
    }

    #[test]
    fn extracts_uuid_before_variant_suffix() {
        let id = format!("{CHOC_CAKE}-choc-large");
        assert_eq!(
            extract_product_id(&id),
            Some(Uuid::parse_str(CHOC_CAKE).expect("valid uuid"))
        );
    }

    #[test]
    fn extraction_is_case_insensitive() {
        let upper = "ABCDEF01-2345-6789-ABCD-EF0123456789-vanilla";
        let lower = "abcdef01-2345-6789-abcd-ef0123456789";
        assert_eq!(
            extract_product_id(upper),
            Some(Uuid::parse_str(lower).expect("valid uuid"))
        );
    }

    #[test]
    fn custom_ids_have_no_product_id() {
        assert_eq!(extract_product_id("custom-cake-1"), None);
        assert_eq!(extract_product_id(""), None);
    }

    #[test]
    fn non_canonical_uuid_spellings_are_rejected() {
        assert_eq!(extract_product_id("11111111111111111111111111111111"), None);
        assert_eq!(
            extract_product_id("{11111111-1111-1111-1111-111111111111}"),
            None
        );
        assert_eq!(
            extract_product_id("11111111-1111-1111-1111-111111111111x"),
            None
        );
        assert_eq!(
            extract_product_id("1111111g-1111-1111-1111-111111111111"),
            None
        );
    }

    #[test]
    fn multibyte_ids_do_not_panic() {
        assert_eq!(extract_product_id("gâteau-personnalisé-très-grand-xxxxxx"), None);
    }

    #[test]
    fn lookup_ids_deduplicates_and_skips_custom_items() {
        let items = vec![
            item(&format!("{CHOC_CAKE}-choc"), "20", 1),
            item(CHOC_CAKE, "20", 1),
            item("custom-cake-1", "50", 1),
        ];

        assert_eq!(
            lookup_ids(&items),
            vec![Uuid::parse_str(CHOC_CAKE).expect("valid uuid")]
        );
    }

    #[test]
    fn catalog_price_overrides_client_price() {
        let items = vec![item(&format!("{CHOC_CAKE}-choc"), "20", 2)];
        let priced = price_cart(&items, &[catalog_price(CHOC_CAKE, "25")]);

        assert_eq!(priced.lines[0].source, PriceSource::Catalog);
        assert_eq!(priced.lines[0].unit_price, dec("25"));
        assert_eq!(to_minor_units(&priced.total), Some(5000));
    }

    #[test]
    fn unresolved_items_keep_client_price() {
        let unknown = "22222222-2222-2222-2222-222222222222";
        let items = vec![item("custom-cake-1", "50", 1), item(unknown, "3.50", 2)];
        let priced = price_cart(&items, &[catalog_price(CHOC_CAKE, "25")]);

        assert!(priced
            .lines
            .iter()
            .all(|l| l.source == PriceSource::ClientDeclared));
        assert_eq!(priced.fallback_lines().count(), 2);
        assert_eq!(priced.lines[0].product_id, None);
        assert_eq!(
            priced.lines[1].product_id,
            Some(Uuid::parse_str(unknown).expect("valid uuid"))
        );
        assert_eq!(to_minor_units(&priced.total), Some(5700));
    }

    #[test]
    fn mixed_cart_sums_both_sources() {
        let items = vec![
            item(&format!("{CHOC_CAKE}-choc"), "20", 2),
            item("custom-cake-1", "50", 1),
        ];
        let priced = price_cart(&items, &[catalog_price(CHOC_CAKE, "25")]);

        assert_eq!(priced.total, dec("100"));
        assert_eq!(to_minor_units(&priced.total), Some(10_000));
    }

    #[test]
    fn empty_cart_totals_zero() {
        let priced = price_cart(&[], &[]);
        assert!(priced.lines.is_empty());
        assert_eq!(to_minor_units(&priced.total), Some(0));
    }

    #[test]
    fn rounds_once_on_the_total() {
        // Rounding each line to cents would give 0 for every one of these.
        let items: Vec<CartLineItem> = (0..1000)
            .map(|i| item(&format!("sprinkle-{i}"), "0.001", 1))
            .collect();
        let priced = price_cart(&items, &[]);
        assert_eq!(to_minor_units(&priced.total), Some(100));

        let thirds = vec![item("a", "0.333", 1), item("b", "0.333", 1), item("c", "0.333", 1)];
        assert_eq!(to_minor_units(&price_cart(&thirds, &[]).total), Some(100));
    }

    #[test]
    fn minor_units_round_half_up() {
        assert_eq!(to_minor_units(&dec("0.125")), Some(13));
        assert_eq!(to_minor_units(&dec("0.124")), Some(12));
        assert_eq!(to_minor_units(&dec("19.995")), Some(2000));
    }

    #[test]
    fn parse_price_accepts_ordinary_prices() {
        assert_eq!(parse_price("19.99").expect("valid"), dec("19.99"));
        assert_eq!(parse_price(" 4.50 ").expect("valid"), dec("4.5"));
        assert_eq!(parse_price("2.5e1").expect("valid"), dec("25"));
        assert_eq!(parse_price("0").expect("valid"), dec("0"));
    }

    #[test]
    fn parse_price_rejects_huge_exponents_promptly() {
        let started = Instant::now();
        for text in ["1e99999999", "1e9999999", "9e13", "1e-99999999"] {
            let err = parse_price(text).expect_err("price should be rejected");
            assert!(matches!(err, DomainError::InvalidInput(_)), "{text}");
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn parse_price_rejects_long_or_empty_text() {
        assert!(parse_price("").is_err());
        assert!(parse_price(&"9".repeat(41)).is_err());
        assert!(parse_price("0.00000000001").is_err());
        assert!(parse_price("abc").is_err());
    }

    #[test]
    fn minor_units_refuse_totals_beyond_i64() {
        let started = Instant::now();
        let huge = BigDecimal::new(1.into(), -99_999_999);
        assert_eq!(to_minor_units(&huge), None);
        assert_eq!(to_minor_units(&dec("100000000000000000")), None);
        assert!(started.elapsed() < Duration::from_secs(1));

        assert_eq!(
            to_minor_units(&dec("9999999999999999.99")),
            Some(999_999_999_999_999_999)
        );
    }
}
