use super::*;

#[test]
fn empty_table_renders_nothing() {
    let table = Table::plain(vec![Column::left("ID")]);
    let mut out = Vec::new();
    table.render(&mut out);
    assert!(out.is_empty());
}

#[test]
fn columns_are_padded_to_the_widest_cell() {
    let mut table = Table::plain(vec![Column::left("ID"), Column::right("STATUS")]);
    table.row(vec!["sp-1".to_string(), "running".to_string()]);
    table.row(vec!["sp-22".to_string(), "complete".to_string()]);

    let mut out = Vec::new();
    table.render(&mut out);
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID   "));
    assert!(lines[1].contains("sp-1 "));
}
