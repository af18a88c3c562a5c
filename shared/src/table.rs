use std::cmp::Ordering;

use crate::samples::CountrySample;

pub const COLUMN_TITLES: [&str; 5] = [
    "Country",
    "National Anthem",
    "Anthem Date",
    "Country Founded",
    "Audio",
];

pub const PAGE_SIZE_OPTIONS: [PageSize; 5] = [
    PageSize::Rows(10),
    PageSize::Rows(25),
    PageSize::Rows(50),
    PageSize::Rows(100),
    PageSize::All,
];

pub const DEFAULT_PAGE_SIZE: PageSize = PageSize::Rows(25);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Rows(usize),
    All,
}

impl PageSize {
    pub fn label(self) -> String {
        match self {
            Self::Rows(n) => n.to_string(),
            Self::All => "All".to_string(),
        }
    }

    /// `<option>` value; `-1` stands for "All".
    pub fn value(self) -> i64 {
        match self {
            Self::Rows(n) => n as i64,
            Self::All => -1,
        }
    }

    pub fn from_value(raw: &str) -> Option<Self> {
        match raw.trim().parse::<i64>().ok()? {
            -1 => Some(Self::All),
            n if n > 0 => Some(Self::Rows(n as usize)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Self::Ascending => "sorting_asc",
            Self::Descending => "sorting_desc",
        }
    }
}

/// Current search, sort and paging state of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub search: String,
    pub sort_column: usize,
    pub direction: SortDirection,
    pub page_size: PageSize,
    /// Zero-based page index.
    pub page: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_column: 0,
            direction: SortDirection::Ascending,
            page_size: DEFAULT_PAGE_SIZE,
            page: 0,
        }
    }
}

impl TableQuery {
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 0;
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 0;
    }

    /// Header click: toggle on the current column, otherwise sort the new
    /// column ascending.
    pub fn sort_by(&mut self, column: usize) {
        if column >= COLUMN_TITLES.len() {
            return;
        }
        if self.sort_column == column {
            self.direction = self.direction.flip();
        } else {
            self.sort_column = column;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page;
    }
}

/// Rendered (and searched) text of one cell.
pub fn cell_text(row: &CountrySample, column: usize) -> &str {
    match column {
        0 => &row.name,
        1 => &row.anthem,
        2 => &row.anthem_date,
        3 => &row.founded,
        _ => row.audio.label(),
    }
}

/// Sort key of a cell. Every integer orders before every text cell, so
/// mixed columns such as founding years still form a total order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum CellKey {
    Int(i64),
    Text(String),
}

impl CellKey {
    fn of(cell: &str) -> Self {
        match cell.trim().parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(cell.to_lowercase()),
        }
    }
}

/// Integers compare numerically and sort before text; text compares
/// case-insensitively.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    CellKey::of(a).cmp(&CellKey::of(b))
}

fn matches_search(row: &CountrySample, needle: &str) -> bool {
    (0..COLUMN_TITLES.len()).any(|column| cell_text(row, column).to_lowercase().contains(needle))
}

/// One page of query results. `rows` holds indices into the source rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePage {
    pub rows: Vec<usize>,
    pub filtered_total: usize,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    /// One-based index of the first shown row, 0 when nothing is shown.
    pub start: usize,
    /// One-based index of the last shown row.
    pub end: usize,
}

impl TablePage {
    pub fn info(&self) -> String {
        format!(
            "Showing {} to {} of {} countries",
            self.start, self.end, self.filtered_total
        )
    }

    /// Suffix shown while a search hides some rows.
    pub fn filtered_note(&self) -> Option<String> {
        (self.filtered_total < self.total)
            .then(|| format!("(filtered from {} total countries)", self.total))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Filter, sort and paginate `rows`. An out-of-range page is clamped to the
/// last page.
pub fn run(rows: &[CountrySample], query: &TableQuery) -> TablePage {
    let needle = query.search.trim().to_lowercase();
    let mut matched: Vec<usize> = (0..rows.len())
        .filter(|&idx| needle.is_empty() || matches_search(&rows[idx], &needle))
        .collect();

    let column = query.sort_column.min(COLUMN_TITLES.len() - 1);
    let keys: Vec<CellKey> = rows
        .iter()
        .map(|row| CellKey::of(cell_text(row, column)))
        .collect();
    matched.sort_by(|&a, &b| {
        let ord = keys[a].cmp(&keys[b]);
        match query.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    let filtered_total = matched.len();
    let per_page = match query.page_size {
        PageSize::Rows(n) => n.max(1),
        PageSize::All => filtered_total.max(1),
    };
    let page_count = filtered_total.div_ceil(per_page).max(1);
    let page = query.page.min(page_count - 1);
    let offset = page * per_page;
    let shown: Vec<usize> = matched.into_iter().skip(offset).take(per_page).collect();

    let (start, end) = if shown.is_empty() {
        (0, 0)
    } else {
        (offset + 1, offset + shown.len())
    };

    TablePage {
        rows: shown,
        filtered_total,
        total: rows.len(),
        page,
        page_count,
        start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::{AudioRef, table_rows};

    fn column_values(rows: &[CountrySample], page: &TablePage, column: usize) -> Vec<String> {
        page.rows
            .iter()
            .map(|&idx| cell_text(&rows[idx], column).to_string())
            .collect()
    }

    #[test]
    fn search_finds_united_states() {
        let rows = table_rows();
        let mut query = TableQuery::default();
        query.set_search("united states");
        let page = run(&rows, &query);
        assert!(page.filtered_total >= 1);
        assert_eq!(cell_text(&rows[page.rows[0]], 0), "United States");
    }

    #[test]
    fn search_covers_audio_label() {
        let rows = table_rows();
        let mut query = TableQuery::default();
        query.set_search("coming soon");
        assert_eq!(run(&rows, &query).filtered_total, rows.len());
    }

    #[test]
    fn sort_toggle_reverses_column() {
        let rows = table_rows();
        let mut query = TableQuery::default();
        query.set_page_size(PageSize::All);

        for column in 0..COLUMN_TITLES.len() - 1 {
            query.sort_by(column);
            if query.direction == SortDirection::Descending {
                query.sort_by(column);
            }
            let asc = column_values(&rows, &run(&rows, &query), column);
            query.sort_by(column);
            assert_eq!(query.direction, SortDirection::Descending);
            let mut desc = column_values(&rows, &run(&rows, &query), column);
            desc.reverse();
            assert_eq!(asc, desc, "column {column}");
        }
    }

    #[test]
    fn default_sort_is_country_ascending() {
        let rows = table_rows();
        let page = run(&rows, &TableQuery::default());
        let names = column_values(&rows, &page, 0);
        assert_eq!(names.first().map(String::as_str), Some("Afghanistan"));
        assert_eq!(names.last().map(String::as_str), Some("United States"));
    }

    #[test]
    fn numeric_cells_compare_as_integers() {
        assert_eq!(compare_cells("900", "1200"), Ordering::Less);
        assert_eq!(compare_cells("Unknown", "1200"), Ordering::Greater);
        assert_eq!(compare_cells("660 BCE", "1200"), Ordering::Greater);
        assert_eq!(compare_cells("alpha", "Beta"), Ordering::Less);
    }

    fn rows_with_founded(values: &[&str]) -> Vec<CountrySample> {
        let template = table_rows().remove(0);
        values
            .iter()
            .enumerate()
            .map(|(idx, founded)| CountrySample {
                name: format!("Country {idx}"),
                founded: founded.to_string(),
                ..template.clone()
            })
            .collect()
    }

    #[test]
    fn mixed_year_column_sorts_consistently() {
        let rows = rows_with_founded(&[
            "900",
            "1000",
            "10th century",
            "1000",
            "900",
            "660 BCE",
            "Unknown",
            "1776",
        ]);
        let mut query = TableQuery::default();
        query.set_page_size(PageSize::All);
        query.sort_by(3);

        let asc = column_values(&rows, &run(&rows, &query), 3);
        assert_eq!(
            asc,
            [
                "900",
                "900",
                "1000",
                "1000",
                "1776",
                "10th century",
                "660 BCE",
                "Unknown"
            ]
        );

        query.sort_by(3);
        let mut desc = column_values(&rows, &run(&rows, &query), 3);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn integers_order_before_text() {
        assert_eq!(compare_cells("1000", "10th century"), Ordering::Less);
        assert_eq!(compare_cells("10th century", "900"), Ordering::Greater);
        assert_eq!(compare_cells("1776", "660 BCE"), Ordering::Less);
        assert_eq!(compare_cells(" 42 ", "42"), Ordering::Equal);
    }

    #[test]
    fn pagination_reports_ranges() {
        let rows = table_rows();
        let mut query = TableQuery::default();
        query.set_page_size(PageSize::Rows(10));
        let first = run(&rows, &query);
        assert_eq!(first.page_count, 2);
        assert_eq!(first.info(), "Showing 1 to 10 of 20 countries");
        assert_eq!(first.filtered_note(), None);

        query.go_to(1);
        let second = run(&rows, &query);
        assert_eq!(second.info(), "Showing 11 to 20 of 20 countries");

        query.go_to(7);
        assert_eq!(run(&rows, &query).page, 1);
    }

    #[test]
    fn search_and_page_size_reset_page() {
        let mut query = TableQuery::default();
        query.go_to(3);
        query.set_search("a");
        assert_eq!(query.page, 0);
        query.go_to(2);
        query.set_page_size(PageSize::All);
        assert_eq!(query.page, 0);
    }

    #[test]
    fn empty_result_reports_zero_range_and_filter_note() {
        let rows = table_rows();
        let mut query = TableQuery::default();
        query.set_search("atlantis");
        let page = run(&rows, &query);
        assert!(page.is_empty());
        assert_eq!(page.info(), "Showing 0 to 0 of 0 countries");
        assert_eq!(
            page.filtered_note().as_deref(),
            Some("(filtered from 20 total countries)")
        );
    }

    #[test]
    fn sorting_new_column_starts_ascending() {
        let mut query = TableQuery::default();
        query.sort_by(0);
        assert_eq!(query.direction, SortDirection::Descending);
        query.sort_by(2);
        assert_eq!(query.sort_column, 2);
        assert_eq!(query.direction, SortDirection::Ascending);
        query.sort_by(9);
        assert_eq!(query.sort_column, 2);
    }

    #[test]
    fn page_size_values_round_trip_through_select() {
        for size in PAGE_SIZE_OPTIONS {
            assert_eq!(PageSize::from_value(&size.value().to_string()), Some(size));
        }
        assert_eq!(PageSize::from_value("0"), None);
        assert_eq!(PageSize::All.label(), "All");
    }

    #[test]
    fn audio_column_uses_rendered_label() {
        let mut row = table_rows().remove(0);
        row.audio = AudioRef::Available("/audio/af.mp3".into());
        assert_eq!(cell_text(&row, 4), "/audio/af.mp3");
    }
}
