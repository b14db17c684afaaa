//! Shopping list aggregation and rendering
//!
//! Everything in the user's cart is flattened to ingredient lines, summed
//! per (name, measurement unit) pair, and rendered as a plain-text report.

use std::collections::BTreeMap;

use crate::error::ApiResult;
use crate::models::ingredient::CartLine;
use crate::models::user::User;
use crate::repositories::RecipeListRepository;

/// One aggregated report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedLine {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Sum cart lines per (name, measurement unit) pair
///
/// The BTreeMap key gives the report its order: byte-wise on the name,
/// then on the unit. Totals are widened to i64 so summing many lines
/// cannot overflow.
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<AggregatedLine> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0) += i64::from(line.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| AggregatedLine {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

/// Render the report, one line per aggregated ingredient
pub fn render(lines: &[AggregatedLine]) -> String {
    let rendered: Vec<String> = lines
        .iter()
        .map(|line| {
            format!(
                "{} ({}) — {}",
                line.name, line.measurement_unit, line.total
            )
        })
        .collect();

    rendered.join("\n")
}

/// Suggested attachment name for a user's report
pub fn filename(username: &str) -> String {
    format!("{}_shopping_cart.txt", username)
}

/// Shopping list service
#[derive(Clone)]
pub struct ShoppingListService {
    lists: RecipeListRepository,
}

impl ShoppingListService {
    /// Create a new shopping list service
    pub fn new(lists: RecipeListRepository) -> Self {
        Self { lists }
    }

    /// Build the report for everything currently in the user's cart
    ///
    /// Returns the suggested file name and the report body. An empty cart
    /// yields an empty report, not an error.
    pub async fn build(&self, user: &User) -> ApiResult<(String, String)> {
        let lines = self.lists.cart_lines(user.id).await?;
        let report = render(&aggregate(lines));

        Ok((filename(&user.username), report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i32) -> CartLine {
        CartLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_aggregate_sums_shared_ingredients() {
        let lines = vec![line("flour", "g", 200), line("flour", "g", 300)];

        let aggregated = aggregate(lines);
        assert_eq!(
            aggregated,
            vec![AggregatedLine {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                total: 500,
            }]
        );
    }

    #[test]
    fn test_aggregate_keeps_units_apart() {
        let lines = vec![line("milk", "ml", 250), line("milk", "tbsp", 2)];

        let aggregated = aggregate(lines);
        assert_eq!(aggregated.len(), 2);
        assert_eq!(aggregated[0].measurement_unit, "ml");
        assert_eq!(aggregated[1].measurement_unit, "tbsp");
    }

    #[test]
    fn test_aggregate_orders_by_bytes() {
        // Byte order puts every uppercase name ahead of the lowercase ones.
        let lines = vec![
            line("salt", "g", 5),
            line("Ziti", "g", 400),
            line("anise", "pcs", 2),
        ];

        let names: Vec<String> = aggregate(lines).into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Ziti", "anise", "salt"]);
    }

    #[test]
    fn test_render_line_format() {
        let lines = vec![AggregatedLine {
            name: "flour".to_string(),
            measurement_unit: "g".to_string(),
            total: 500,
        }];

        assert_eq!(render(&lines), "flour (g) — 500");
    }

    #[test]
    fn test_render_joins_without_trailing_newline() {
        let lines = aggregate(vec![line("flour", "g", 100), line("salt", "g", 5)]);

        let report = render(&lines);
        assert_eq!(report, "flour (g) — 100\nsalt (g) — 5");
        assert!(!report.ends_with('\n'));
    }

    #[test]
    fn test_empty_cart_renders_empty_report() {
        assert_eq!(render(&aggregate(Vec::new())), "");
    }

    #[test]
    fn test_filename_uses_username() {
        assert_eq!(filename("chef"), "chef_shopping_cart.txt");
    }
}
