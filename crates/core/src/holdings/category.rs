//! Keyword rules mapping a scheme name to a coarse category.

use super::holdings_model::Category;

/// Ordered rule table; the first rule with a matching keyword wins.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Equity,
        &[
            "equity",
            "elss",
            "tax saver",
            "large cap",
            "mid cap",
            "small cap",
            "flexi cap",
            "multi cap",
            "bluechip",
        ],
    ),
    (
        Category::Debt,
        &["debt", "bond", "gilt", "credit risk", "fixed income"],
    ),
    (
        Category::Hybrid,
        &["hybrid", "balanced", "asset allocation", "multi asset"],
    ),
    (
        Category::Liquid,
        &["liquid", "money market", "overnight"],
    ),
];

/// Classifies a scheme by case-insensitive keyword containment. Never fails.
pub fn classify(scheme_name: &str) -> Category {
    let name = scheme_name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_map_to_categories() {
        assert_eq!(classify("ABC Equity Fund"), Category::Equity);
        assert_eq!(classify("XYZ ELSS Tax Saver - Growth"), Category::Equity);
        assert_eq!(classify("Corporate Bond Fund"), Category::Debt);
        assert_eq!(classify("Aggressive HYBRID fund"), Category::Hybrid);
        assert_eq!(classify("Balanced Advantage Fund"), Category::Hybrid);
        assert_eq!(classify("Overnight Fund"), Category::Liquid);
        assert_eq!(classify("Money Market Plan"), Category::Liquid);
        assert_eq!(classify("Gold Savings Fund"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Equity is checked before Hybrid and Debt.
        assert_eq!(classify("Equity Hybrid Fund"), Category::Equity);
        assert_eq!(classify("Hybrid Debt Fund"), Category::Debt);
        assert_eq!(classify("Liquid Bond Fund"), Category::Debt);
    }
}
