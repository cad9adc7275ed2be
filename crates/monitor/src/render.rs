//! Tabular memory views: range dumps and focus-centered context.
//!
//! Bound addresses are always read through `peek`, so opening a view never
//! consumes device state.

use std::fmt;

use minicomp_core::{to_domain, AddressSpace};

use crate::errors::RenderError;

/// Cells per table row.
pub const ROW_WIDTH: usize = 8;
/// Cells before the focus address in a context view.
pub const CONTEXT_BEFORE: i64 = 8;
/// Cells after the focus address in a context view.
pub const CONTEXT_AFTER: i64 = 15;

/// Cell for an address outside `[0, 0xFFFF]`.
pub const OUT_OF_RANGE_CELL: &str = "--";
/// Label for a row starting outside `[0, 0xFFFF]`.
pub const OUT_OF_RANGE_LABEL: &str = "----";
/// Cell for an in-domain address with nothing behind it.
pub const NOT_MAPPED_CELL: &str = "NA";

/// Cell glyph style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellFormat {
    /// Two lowercase hex digits.
    #[default]
    Hex,
    /// Printable characters and escapes, hex otherwise.
    Ascii,
}

impl CellFormat {
    /// ASCII only for the exact modifier pair `as ascii`; anything else is hex.
    #[must_use]
    pub fn from_modifiers(first: &str, second: &str) -> Self {
        if first == "as" && second == "ascii" {
            Self::Ascii
        } else {
            Self::Hex
        }
    }

    /// Two-character glyph of `value`.
    #[must_use]
    pub fn glyph(self, value: u8) -> String {
        match (self, value) {
            (Self::Ascii, 33..=126) => format!("{:>2}", char::from(value)),
            (Self::Ascii, b'\t') => "\\t".to_owned(),
            (Self::Ascii, b'\n') => "\\n".to_owned(),
            (Self::Ascii, b'\r') => "\\r".to_owned(),
            _ => format!("{value:02x}"),
        }
    }
}

/// One rendered cell; emphasis marks memory-mapped I/O.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderCell {
    /// One or two character glyph.
    pub text: String,
    /// Set for cells served by a device binding.
    pub emphasis: bool,
}

impl RenderCell {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            emphasis: false,
        }
    }
}

/// Row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowLabel {
    /// First address of the row.
    Address(u16),
    /// The row starts outside the address space.
    OutOfRange,
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr:04x}"),
            Self::OutOfRange => f.write_str(OUT_OF_RANGE_LABEL),
        }
    }
}

/// One labeled row of up to [`ROW_WIDTH`] cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryRow {
    /// Row label.
    pub label: RowLabel,
    /// Cells in address order.
    pub cells: Vec<RenderCell>,
}

impl fmt::Display for MemoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.label)?;
        for cell in &self.cells {
            write!(f, " {}", cell.text)?;
        }
        Ok(())
    }
}

/// Rendered table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MemoryTable {
    /// Rows top to bottom.
    pub rows: Vec<MemoryRow>,
}

impl MemoryTable {
    /// Returns `true` when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for MemoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Renders the cell at an in-domain address.
#[must_use]
pub fn render_cell(space: &AddressSpace, addr: u16, format: CellFormat) -> RenderCell {
    let emphasis = space.has_binding(addr);
    let text = space
        .peek(addr)
        .map_or_else(|_| NOT_MAPPED_CELL.to_owned(), |value| format.glyph(value));
    RenderCell { text, emphasis }
}

/// Dumps `[lo, hi)`, eight cells per row, each row labeled with its first address.
///
/// # Errors
///
/// [`RenderError::InvertedRange`] when `lo > hi`.
pub fn dump(
    space: &AddressSpace,
    lo: u16,
    hi: u16,
    format: CellFormat,
) -> Result<MemoryTable, RenderError> {
    if lo > hi {
        return Err(RenderError::InvertedRange { lo, hi });
    }
    let cells = (lo..hi)
        .map(|addr| render_cell(space, addr, format))
        .collect::<Vec<_>>();
    Ok(tabulate(&cells, i64::from(lo)))
}

/// Renders the fixed window `[addr - 8, addr + 15]` as three rows.
///
/// Cells outside the address space become [`OUT_OF_RANGE_CELL`]. A row is
/// labeled [`OUT_OF_RANGE_LABEL`] as soon as any of its cells is outside the
/// space, at either end; only rows wholly inside it carry an address.
#[must_use]
pub fn context(space: &AddressSpace, addr: u16, format: CellFormat) -> MemoryTable {
    let focus = i64::from(addr);
    let first = focus - CONTEXT_BEFORE;
    let cells = (first..=focus + CONTEXT_AFTER)
        .map(|index| {
            to_domain(index).map_or_else(
                || RenderCell::plain(OUT_OF_RANGE_CELL),
                |addr| render_cell(space, addr, format),
            )
        })
        .collect::<Vec<_>>();
    tabulate(&cells, first)
}

/// Splits `cells` into rows; the first cell sits at address `first`.
fn tabulate(cells: &[RenderCell], first: i64) -> MemoryTable {
    let rows = cells
        .chunks(ROW_WIDTH)
        .zip((first..).step_by(ROW_WIDTH))
        .map(|(chunk, start)| MemoryRow {
            label: row_label(start, chunk.len()),
            cells: chunk.to_vec(),
        })
        .collect();
    MemoryTable { rows }
}

fn row_label(start: i64, len: usize) -> RowLabel {
    let last = i64::try_from(len)
        .ok()
        .and_then(|len| start.checked_add(len - 1))
        .and_then(to_domain);
    match (to_domain(start), last) {
        (Some(addr), Some(_)) => RowLabel::Address(addr),
        _ => RowLabel::OutOfRange,
    }
}
