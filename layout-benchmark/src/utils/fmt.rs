/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::fmt::{Display, Formatter};

/// Right-aligned columns under a header and a rule of `=`.
///
/// Cells are rendered when a row is pushed, so a row may mix value types.
#[derive(Debug, Clone)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    const SEP: &'static str = ",   ";

    pub fn new<I>(header: I) -> Self
    where
        I: IntoIterator<Item: Display>,
    {
        Self {
            header: header.into_iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn ncols(&self) -> usize {
        self.header.len()
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Append a row. Missing trailing cells are left blank.
    ///
    /// # Panics
    ///
    /// Panics if the row has more cells than the header.
    pub fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item: Display>,
    {
        let row: Vec<String> = cells.into_iter().map(|c| c.to_string()).collect();
        if row.len() > self.ncols() {
            panic!(
                "row has {} cells but the table has {} columns",
                row.len(),
                self.ncols()
            );
        }
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(String::len).collect();
        for row in &self.rows {
            for (width, cell) in std::iter::zip(widths.iter_mut(), row) {
                *width = (*width).max(cell.len());
            }
        }
        widths
    }

    fn write_line(f: &mut Formatter<'_>, widths: &[usize], cells: &[String]) -> std::fmt::Result {
        for (col, width) in widths.iter().enumerate() {
            if col != 0 {
                f.write_str(Self::SEP)?;
            }
            let cell = cells.get(col).map_or("", String::as_str);
            write!(f, "{:>width$}", cell)?;
        }
        writeln!(f)
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let widths = self.widths();
        let rule = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * Self::SEP.len();

        Self::write_line(f, &widths, &self.header)?;
        writeln!(f, "{:=>rule$}", "")?;
        for row in &self.rows {
            Self::write_line(f, &widths, row)?;
        }
        Ok(())
    }
}

////////////
// Banner //
////////////

/// A message framed by `#` characters.
pub struct Banner<'a>(&'a str);

impl<'a> Banner<'a> {
    pub fn new(message: &'a str) -> Self {
        Self(message)
    }
}

impl Display for Banner<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let framed = format!("# {} #", self.0);
        let len = framed.len();
        writeln!(f, "{:#>len$}", "")?;
        writeln!(f, "{}", framed)?;
        writeln!(f, "{:#>len$}", "")
    }
}

///////////
// Tests //
///////////
