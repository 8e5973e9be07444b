use chrono::Weekday;

use crate::dish::{contains_price, weekday_from_german, Category};
use crate::error::MenuError;

/// One cell as it appears on a physical table line. `offset` is the char
/// position of the cell's first character; day columns are resolved by
/// offset, so emptiness in a column is visible as the absence of a cell.
#[derive(Debug, Clone)]
pub struct RawCell {
    pub text: String,
    pub offset: usize,
}

/// One physical line of the table, already split into cells.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub page: usize,
    pub index: usize,
    pub cells: Vec<RawCell>,
}

/// The merged result of one or more raw rows: one logical table entry with
/// the concatenated text per day column.
#[derive(Debug, Clone)]
pub struct LogicalCellGroup {
    pub page: usize,
    pub category: Category,
    pub columns: Vec<(Weekday, String)>,
}

/// Split a line into cells. Cells are separated by tabs or runs of two or
/// more spaces; a single space stays inside the cell.
fn split_cells(line: &str) -> Vec<RawCell> {
    let chars: Vec<char> = line.chars().collect();
    let n = chars.len();
    let mut cells = Vec::new();
    let mut i = 0;
    while i < n {
        while i < n && (chars[i] == ' ' || chars[i] == '\t') {
            i += 1;
        }
        if i >= n {
            break;
        }
        let start = i;
        let mut j = i;
        let end = loop {
            while j < n && chars[j] != ' ' && chars[j] != '\t' {
                j += 1;
            }
            let word_end = j;
            // A single space followed by more text continues the cell.
            if j < n && chars[j] == ' ' && j + 1 < n && chars[j + 1] != ' ' && chars[j + 1] != '\t'
            {
                j += 1;
                continue;
            }
            break word_end;
        };
        cells.push(RawCell {
            text: chars[start..end].iter().collect(),
            offset: start,
        });
        i = j;
    }
    cells
}

/// Extract the raw rows of one page, preserving row and column order.
/// No filtering or interpretation happens here.
pub fn extract_rows(page_text: &str, page: usize) -> Result<Vec<RawRow>, MenuError> {
    let mut rows = Vec::new();
    for line in page_text.lines() {
        let cells = split_cells(line);
        if cells.is_empty() {
            continue;
        }
        rows.push(RawRow {
            page,
            index: rows.len(),
            cells,
        });
    }
    if rows.is_empty() {
        return Err(MenuError::NoTable { page });
    }
    Ok(rows)
}

/// Horizontal positions of the weekday columns, taken from the header row.
#[derive(Debug, Clone)]
pub struct DayColumns {
    columns: Vec<(Weekday, usize)>,
}

impl DayColumns {
    /// Find the header row (at least two cells starting with a weekday name)
    /// and record each day's column offset. Returns the header's row index so
    /// callers can skip the preamble above it.
    pub fn detect(rows: &[RawRow]) -> Option<(usize, Self)> {
        for (idx, row) in rows.iter().enumerate() {
            let mut columns = Vec::new();
            for cell in &row.cells {
                if let Some(first) = cell.text.split_whitespace().next() {
                    if let Some(day) = weekday_from_german(first) {
                        columns.push((day, cell.offset));
                    }
                }
            }
            if columns.len() >= 2 {
                return Some((idx, DayColumns { columns }));
            }
        }
        None
    }

    /// Map a cell offset to its day column: the rightmost column starting at
    /// or left of the cell, with a small slack for left drift.
    pub fn day_for(&self, offset: usize) -> Option<Weekday> {
        const SLACK: usize = 2;
        let mut hit = None;
        for &(day, start) in &self.columns {
            if offset + SLACK >= start {
                hit = Some(day);
            } else {
                break;
            }
        }
        hit
    }
}

enum RowKind {
    CategoryHeader(Category),
    DayHeader,
    Junk,
    NewEntry,
    Continuation,
}

fn classify(row: &RawRow) -> RowKind {
    let mut day_cells = 0;
    let mut live_cells = 0;
    let mut has_price = false;
    for cell in &row.cells {
        let lower = cell.text.to_lowercase();
        if lower.contains("hauptgericht") {
            return RowKind::CategoryHeader(Category::Main);
        }
        if lower.contains("beilage") {
            return RowKind::CategoryHeader(Category::Side);
        }
        // A junk cell (separator bar, boilerplate) drops out on its own; the
        // row as a whole is junk only when nothing else is left.
        if is_junk_cell(&lower) {
            continue;
        }
        live_cells += 1;
        if let Some(first) = cell.text.split_whitespace().next() {
            if weekday_from_german(first).is_some() {
                day_cells += 1;
            }
        }
        if contains_price(&cell.text) {
            has_price = true;
        }
    }
    if live_cells == 0 {
        return RowKind::Junk;
    }
    if day_cells >= 2 {
        return RowKind::DayHeader;
    }
    if has_price {
        return RowKind::NewEntry;
    }
    RowKind::Continuation
}

fn is_junk_cell(lower: &str) -> bool {
    if lower.chars().all(|c| !c.is_alphanumeric()) {
        return true;
    }
    lower.contains("speiseplan")
        || lower.contains("alle preise")
        || lower.contains("änderungen vorbehalten")
}

/// Reconstructs logical entries from wrapped physical rows.
///
/// The fold keeps at most one open group. A row carrying a price token or a
/// header keyword starts a new group and closes the previous one; a row with
/// neither, while a group is open, is a continuation and its non-empty cells
/// are appended to the matching day columns. Section headers switch the
/// category carried by subsequent groups.
pub struct RowMerger {
    category: Category,
    open: Option<LogicalCellGroup>,
    groups: Vec<LogicalCellGroup>,
}

impl Default for RowMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl RowMerger {
    pub fn new() -> Self {
        RowMerger {
            // Unknown section defaults to side.
            category: Category::Side,
            open: None,
            groups: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: &RawRow, days: &DayColumns) {
        match classify(row) {
            RowKind::CategoryHeader(category) => {
                self.close_open();
                self.category = category;
            }
            RowKind::DayHeader => self.close_open(),
            RowKind::Junk => {}
            RowKind::NewEntry => {
                self.close_open();
                let mut group = LogicalCellGroup {
                    page: row.page,
                    category: self.category,
                    columns: Vec::new(),
                };
                append_cells(&mut group, row, days);
                self.open = Some(group);
            }
            RowKind::Continuation => match self.open.as_mut() {
                Some(group) => append_cells(group, row, days),
                None => {
                    // Nothing open: a price-less row still begins an entry
                    // (sides bundled under a section header carry no price).
                    let mut group = LogicalCellGroup {
                        page: row.page,
                        category: self.category,
                        columns: Vec::new(),
                    };
                    append_cells(&mut group, row, days);
                    self.open = Some(group);
                }
            },
        }
    }

    /// Close the open group, if any. Called between pages unless the
    /// document is known to wrap dishes across page boundaries.
    pub fn close_open(&mut self) {
        if let Some(group) = self.open.take() {
            if group.columns.iter().any(|(_, text)| !text.trim().is_empty()) {
                self.groups.push(group);
            }
        }
    }

    pub fn finish(mut self) -> Vec<LogicalCellGroup> {
        self.close_open();
        self.groups
    }
}

fn append_cells(group: &mut LogicalCellGroup, row: &RawRow, days: &DayColumns) {
    for cell in &row.cells {
        let fragment = cell.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if fragment.is_empty() || is_junk_cell(&fragment.to_lowercase()) {
            continue;
        }
        // Cells outside the recognized day columns are not part of any dish.
        let Some(day) = days.day_for(cell.offset) else {
            continue;
        };
        match group.columns.iter_mut().find(|(d, _)| *d == day) {
            Some((_, text)) => {
                text.push(' ');
                text.push_str(&fragment);
            }
            None => group.columns.push((day, fragment)),
        }
    }
}
