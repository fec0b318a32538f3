//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
///
/// Rows and columns are 0-based internally. `$` markers are accepted when
/// parsing and dropped, since comparison keys never distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use duke_diff_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("b7").unwrap();
    /// assert_eq!(addr.row, 6);
    /// assert_eq!(addr.col, 1);
    /// assert_eq!(addr.to_string(), "B7");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[col_start..pos])?;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = row - 1;
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self { row, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(col - 1, MAX_COLS - 1));
            }
        }

        Ok((col - 1) as u16)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }

    /// Normalize an address string to the canonical uppercase A1 form.
    ///
    /// Strings that do not parse as an address are upper-cased as-is so
    /// that case-insensitive keying still holds for them.
    pub fn normalize(s: &str) -> String {
        match Self::parse(s) {
            Ok(addr) => addr.to_a1_string(),
            Err(_) => s.trim().to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalized so start is top-left
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellAddress::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some((left, right)) = s.split_once(':') {
            let start = CellAddress::parse(left)
                .map_err(|_| Error::InvalidRange(format!("bad start in '{}'", s)))?;
            let end = CellAddress::parse(right)
                .map_err(|_| Error::InvalidRange(format!("bad end in '{}'", s)))?;
            Ok(Self::new(start, end))
        } else {
            let addr = CellAddress::parse(s)?;
            Ok(Self {
                start: addr,
                end: addr,
            })
        }
    }

    /// The used-range rectangle anchored at A1 that covers every address.
    ///
    /// Returns `None` for an empty iterator.
    pub fn covering_from_origin<I>(addresses: I) -> Option<Self>
    where
        I: IntoIterator<Item = CellAddress>,
    {
        let mut max: Option<(u32, u16)> = None;
        for addr in addresses {
            max = Some(match max {
                Some((row, col)) => (row.max(addr.row), col.max(addr.col)),
                None => (addr.row, addr.col),
            });
        }

        max.map(|(row, col)| Self {
            start: CellAddress::new(0, 0),
            end: CellAddress::new(row, col),
        })
    }

    /// Format as A1:B10 string. Ranges are always rendered with both
    /// corners, including single-cell ones.
    pub fn to_a1_string(&self) -> String {
        format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("AB").unwrap(), 27);
        assert_eq!(CellAddress::letters_to_column("XFD").unwrap(), 16383);
        assert_eq!(CellAddress::letters_to_column("aa").unwrap(), 26);
        assert!(CellAddress::letters_to_column("XFE").is_err());
        assert!(CellAddress::letters_to_column("ZZZZZZZZ").is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!((addr.row, addr.col), (0, 0));

        let addr = CellAddress::parse("$C$12").unwrap();
        assert_eq!((addr.row, addr.col), (11, 2));

        let addr = CellAddress::parse("XFD1048576").unwrap();
        assert_eq!((addr.row, addr.col), (1048575, 16383));
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1048577").is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(CellAddress::normalize("b7"), "B7");
        assert_eq!(CellAddress::normalize("$b$7"), "B7");
        assert_eq!(CellAddress::normalize("not-a-cell"), "NOT-A-CELL");
    }

    #[test]
    fn test_cell_range_parse() {
        let range = CellRange::parse("B2:A1").unwrap();
        assert_eq!(range.start, CellAddress::new(0, 0));
        assert_eq!(range.end, CellAddress::new(1, 1));

        let range = CellRange::parse("C3").unwrap();
        assert_eq!(range.start, range.end);
        assert!(CellRange::parse("A1:").is_err());
    }

    #[test]
    fn test_covering_from_origin() {
        let addrs = ["C2", "A9", "B1"]
            .iter()
            .map(|s| CellAddress::parse(s).unwrap());
        let range = CellRange::covering_from_origin(addrs).unwrap();
        assert_eq!(range.to_a1_string(), "A1:C9");

        assert!(CellRange::covering_from_origin(std::iter::empty()).is_none());

        let single = CellRange::covering_from_origin([CellAddress::new(0, 0)]).unwrap();
        assert_eq!(single.to_string(), "A1:A1");
    }
}
