use std::fmt::Write;

use crate::db::ShoppingListItem;

/// Render aggregated cart lines as `"{name}: {amount} {unit}\n"`, keeping
/// the order they were aggregated in.
#[must_use]
pub fn render(items: &[ShoppingListItem]) -> String {
    items.iter().fold(String::new(), |mut out, item| {
        let _ = writeln!(out, "{}: {} {}", item.name, item.total_amount, item.unit);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, unit: &str, total_amount: i64) -> ShoppingListItem {
        ShoppingListItem {
            name: name.to_string(),
            unit: unit.to_string(),
            total_amount,
        }
    }

    #[test]
    fn test_render_lines() {
        let text = render(&[item("flour", "g", 700), item("eggs", "pcs", 3)]);
        assert_eq!(text, "flour: 700 g\neggs: 3 pcs\n");
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render(&[]), "");
    }
}
