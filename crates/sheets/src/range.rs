//! Sheet-qualified A1 ranges.

/// Quote a sheet name for use in a range: `Sales` → `'Sales'`, `Q'1` → `'Q''1'`.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// `'<sheet>'!<anchor>`
pub fn sheet_range(sheet_name: &str, anchor: &str) -> String {
    format!("{}!{anchor}", quote_sheet_name(sheet_name))
}
