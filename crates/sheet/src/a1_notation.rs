use crate::error::{Result, SheetError};

/// Parse A1-style cell notation (e.g., "A1", "Z99", "AA1")
/// Returns (row, column) as 0-based indices
pub fn parse_a1(notation: &str) -> Result<(usize, usize)> {
    if notation.is_empty() {
        return Err(SheetError::InvalidCellNotation(notation.to_string()));
    }

    let notation = notation.to_uppercase();
    let split_pos = notation
        .bytes()
        .position(|b| b.is_ascii_digit())
        .unwrap_or(0);

    if split_pos == 0 {
        return Err(SheetError::InvalidCellNotation(notation));
    }

    // Parse column letters (A=0, B=1, ... Z=25, AA=26, AB=27, ...)
    let (col_part, row_part) = notation.split_at(split_pos);

    let col = parse_column_letters(col_part)?;
    let row = row_part
        .parse::<usize>()
        .map_err(|_| SheetError::InvalidCellNotation(notation.clone()))?;

    // Convert to 0-based indexing (A1 = 0,0)
    if row == 0 {
        return Err(SheetError::InvalidCellNotation(notation));
    }

    Ok((row - 1, col))
}

/// Check a write anchor: a single cell ("C5") or a range ("A1:D10").
pub fn validate_anchor(notation: &str) -> Result<()> {
    match notation.split_once(':') {
        Some((start, end)) => {
            parse_a1(start)?;
            parse_a1(end)?;
        }
        None => {
            parse_a1(notation)?;
        }
    }
    Ok(())
}

/// Convert column letters to 0-based column index
fn parse_column_letters(col_str: &str) -> Result<usize> {
    let mut col = 0;

    for b in col_str.bytes() {
        if !b.is_ascii_uppercase() {
            return Err(SheetError::InvalidCellNotation(col_str.to_string()));
        }
        col = col * 26 + (b - b'A') as usize + 1;
    }

    Ok(col - 1) // Convert to 0-based
}

/// Convert 0-based column index to column letters
/// 0=A, 1=B, ... 25=Z, 26=AA, 27=AB, ...
pub fn column_index_to_letters(mut col: usize) -> String {
    let mut result = String::new();
    col += 1; // Convert to 1-based for calculation

    while col > 0 {
        col -= 1;
        result.insert(0, ((col % 26) as u8 + b'A') as char);
        col /= 26;
    }

    result
}
