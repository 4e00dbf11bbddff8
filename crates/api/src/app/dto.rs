// -------------------------
// Request DTOs
// -------------------------

/// Decoded query-string pairs, in request order.
///
/// Handlers extract these instead of a typed struct so a repeated or odd key
/// never turns into a rejection.
pub type QueryPairs = Vec<(String, String)>;

/// `GET /products/:slug/quote?quantity=N`. Quantity is parsed permissively.
#[derive(Debug, Default)]
pub struct QuoteQuery {
    pub quantity: Option<String>,
}

impl QuoteQuery {
    /// First `quantity` value wins.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            quantity: pairs
                .iter()
                .find(|(key, _)| key == "quantity")
                .map(|(_, value)| value.clone()),
        }
    }

    /// Requested quantity, at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
            .as_deref()
            .and_then(|q| q.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_defaults_to_one() {
        let q = |s: Option<&str>| QuoteQuery { quantity: s.map(str::to_string) }.quantity();
        assert_eq!(q(None), 1);
        assert_eq!(q(Some("0")), 1);
        assert_eq!(q(Some("-4")), 1);
        assert_eq!(q(Some("lots")), 1);
        assert_eq!(q(Some(" 25 ")), 25);
    }

    #[test]
    fn repeated_quantity_keeps_the_first() {
        let pairs: QueryPairs = vec![
            ("quantity".into(), "12".into()),
            ("quantity".into(), "3".into()),
        ];
        assert_eq!(QuoteQuery::from_pairs(&pairs).quantity(), 12);
        assert_eq!(QuoteQuery::from_pairs(&[]).quantity(), 1);
    }
}
