use crate::report::GroupInsights;
use crate::types::InsightEntry;
use tabled::{settings::Style, Table};

/// Render insight entries as a markdown table, or `(no rows)`.
pub fn markdown_table(rows: &[InsightEntry], max_rows: usize) -> String {
    let slice: Vec<InsightEntry> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

/// Console preview of every group's insight tables.
pub fn preview_insights(groups: &[GroupInsights], max_rows: usize) {
    for g in groups {
        println!("\n{}", g.role);
        for t in &g.tables {
            println!("\n{}\n", t.name);
            println!("{}", markdown_table(&t.entries, max_rows));
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_preview_truncates() {
        let rows = vec![
            InsightEntry { value: "Food".into(), count: 3 },
            InsightEntry { value: "Music".into(), count: 1 },
        ];
        let out = markdown_table(&rows, 1);
        assert!(out.contains("| Value | Count |"));
        assert!(out.contains("Food"));
        assert!(!out.contains("Music"));
        assert_eq!(markdown_table(&[], 5), "(no rows)");
    }
}
