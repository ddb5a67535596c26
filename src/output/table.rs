//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct TestRow {
        #[tabled(rename = "KEY")]
        key: String,
        #[tabled(rename = "RESULT")]
        result: String,
    }

    #[test]
    fn empty_input_renders_placeholder() {
        let items: Vec<TestRow> = vec![];
        assert_eq!(format_table(&items), "No results found.");
    }

    #[test]
    fn rows_and_headers_render() {
        let items = vec![TestRow {
            key: "2024-03-04 08:00:00".to_string(),
            result: "ok".to_string(),
        }];

        let result = format_table(&items);
        assert!(result.contains("KEY"));
        assert!(result.contains("RESULT"));
        assert!(result.contains("2024-03-04 08:00:00"));
    }
}
