// 📤 Export Transform - Monthly record → three flat sheets
// Sheet layout and Korean headers are fixed; the writer behind
// SpreadsheetSink decides the file format (.xlsx by default, CSV on request).

use crate::model::{HouseholdField, MonthlyRecord, Reading};
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const HOUSEHOLD_SHEET: &str = "세대검침";
pub const COMMERCIAL_SHEET: &str = "상가검침";
pub const MAIN_METER_SHEET: &str = "상수도메인";

pub const MAIN_METER_LABEL: &str = "상수도 메인 계량기";

/// Summary-sheet marker when the delta cannot be computed
pub const SUMMARY_NO_DELTA: &str = "-";

// ============================================================================
// SHEETS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<Reading> for Cell {
    fn from(value: Reading) -> Self {
        match value {
            Some(v) => Cell::Number(v),
            None => Cell::Empty,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub file_name: String,
    pub sheets: Vec<Sheet>,
}

/// "검침기록_2025-03.xlsx"
pub fn workbook_file_name(record: &MonthlyRecord) -> String {
    format!("검침기록_{}.xlsx", record.id)
}

pub fn household_sheet(record: &MonthlyRecord) -> Sheet {
    let mut headers = vec!["층", "호", "담당자"];
    headers.extend(HouseholdField::ALL.iter().map(|f| f.label()));

    let rows = record
        .households
        .iter()
        .map(|h| {
            let mut row = vec![
                Cell::from(h.floor.as_str()),
                Cell::from(h.unit.as_str()),
                Cell::from(h.inspector.label()),
            ];
            row.extend(HouseholdField::ALL.iter().map(|f| Cell::from(h.get(*f))));
            row
        })
        .collect();

    Sheet {
        name: HOUSEHOLD_SHEET,
        headers,
        rows,
    }
}

pub fn commercial_sheet(record: &MonthlyRecord) -> Sheet {
    let rows = record
        .commercials
        .iter()
        .map(|c| {
            vec![
                Cell::from(c.unit.as_str()),
                Cell::from(c.inspector.label()),
                Cell::from(c.water),
            ]
        })
        .collect();

    Sheet {
        name: COMMERCIAL_SHEET,
        headers: vec!["호수", "담당자", "수도계량검침"],
        rows,
    }
}

/// Summary-sheet usage. Looser than `derive::usage_delta`: a missing
/// previous record counts as 0, but a previous record whose main meter is
/// unset still yields "-".
pub fn summary_usage(current: &MonthlyRecord, previous: Option<&MonthlyRecord>) -> String {
    let Some(cur) = current.main_meter else {
        return SUMMARY_NO_DELTA.to_string();
    };

    match previous {
        None => format!("{:.2}", cur),
        Some(p) => match p.main_meter {
            Some(prev) => format!("{:.2}", cur - prev),
            None => SUMMARY_NO_DELTA.to_string(),
        },
    }
}

pub fn main_meter_sheet(current: &MonthlyRecord, previous: Option<&MonthlyRecord>) -> Sheet {
    let previous_value = previous.and_then(|p| p.main_meter).unwrap_or(0.0);

    Sheet {
        name: MAIN_METER_SHEET,
        headers: vec!["항목", "검침값", "전월 검침값", "당월 사용량"],
        rows: vec![vec![
            Cell::from(MAIN_METER_LABEL),
            Cell::from(current.main_meter),
            Cell::Number(previous_value),
            Cell::Text(summary_usage(current, previous)),
        ]],
    }
}

pub fn build_workbook(current: &MonthlyRecord, previous: Option<&MonthlyRecord>) -> Workbook {
    Workbook {
        file_name: workbook_file_name(current),
        sheets: vec![
            household_sheet(current),
            commercial_sheet(current),
            main_meter_sheet(current, previous),
        ],
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Accepts a finished workbook and produces a file the user can open.
pub trait SpreadsheetSink {
    /// Returns where the workbook ended up.
    fn write_workbook(&mut self, workbook: &Workbook) -> Result<PathBuf>;
}

/// Writes `<out_dir>/<workbook stem>/<sheet>.csv`, one file per sheet.
pub struct CsvWorkbookWriter {
    out_dir: PathBuf,
}

impl CsvWorkbookWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn write_sheet(dir: &Path, sheet: &Sheet) -> Result<()> {
        let path = dir.join(format!("{}.csv", sheet.name));
        let mut wtr = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        wtr.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            wtr.write_record(row.iter().map(|c| c.to_string()))?;
        }
        wtr.flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        Ok(())
    }
}

impl SpreadsheetSink for CsvWorkbookWriter {
    fn write_workbook(&mut self, workbook: &Workbook) -> Result<PathBuf> {
        let stem = workbook
            .file_name
            .strip_suffix(".xlsx")
            .unwrap_or(&workbook.file_name);
        let dir = self.out_dir.join(stem);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

        for sheet in &workbook.sheets {
            Self::write_sheet(&dir, sheet)?;
        }

        info!(path = %dir.display(), sheets = workbook.sheets.len(), "workbook exported");
        Ok(dir)
    }
}

/// Writes `<out_dir>/<workbook file name>` as a single .xlsx workbook.
pub struct XlsxWorkbookWriter {
    out_dir: PathBuf,
}

impl XlsxWorkbookWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn write_sheet(book: &mut rust_xlsxwriter::Workbook, sheet: &Sheet) -> Result<()> {
        let worksheet = book.add_worksheet();
        worksheet.set_name(sheet.name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }
        for (r, row) in sheet.rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(r, col, s.as_str())?;
                    }
                    Cell::Number(v) => {
                        worksheet.write_number(r, col, *v)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
        Ok(())
    }
}

impl SpreadsheetSink for XlsxWorkbookWriter {
    fn write_workbook(&mut self, workbook: &Workbook) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir).with_context(|| {
            format!("Failed to create export directory {}", self.out_dir.display())
        })?;

        let mut book = rust_xlsxwriter::Workbook::new();
        for sheet in &workbook.sheets {
            Self::write_sheet(&mut book, sheet)
                .with_context(|| format!("Failed to fill sheet {}", sheet.name))?;
        }

        let path = self.out_dir.join(&workbook.file_name);
        book.save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;

        info!(path = %path.display(), sheets = workbook.sheets.len(), "workbook exported");
        Ok(path)
    }
}

/// Build the workbook for `current` and hand it to `sink`.
pub fn export_record<K: SpreadsheetSink + ?Sized>(
    sink: &mut K,
    current: &MonthlyRecord,
    previous: Option<&MonthlyRecord>,
) -> Result<PathBuf> {
    let workbook = build_workbook(current, previous);
    sink.write_workbook(&workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InspectorRole, COMMERCIAL_UNITS, HOUSEHOLD_COUNT};

    #[test]
    fn test_sheet_row_counts() {
        let record = MonthlyRecord::blank("2025-03");
        let workbook = build_workbook(&record, None);

        assert_eq!(workbook.file_name, "검침기록_2025-03.xlsx");
        let names: Vec<_> = workbook.sheets.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["세대검침", "상가검침", "상수도메인"]);
        assert_eq!(workbook.sheets[0].rows.len(), HOUSEHOLD_COUNT);
        assert_eq!(workbook.sheets[1].rows.len(), COMMERCIAL_UNITS.len());
        assert_eq!(workbook.sheets[2].rows.len(), 1);
    }

    #[test]
    fn test_household_columns_in_order() {
        let mut record = MonthlyRecord::blank("2025-03");
        record.households[0].inspector = InspectorRole::Manager;
        record.households[0].outdoor_unit = Some(1.0);
        record.households[0].water = Some(4.0);
        record.households[0].elec20 = Some(20.0);

        let sheet = household_sheet(&record);
        assert_eq!(
            sheet.headers,
            vec![
                "층", "호", "담당자", "실외기", "난방", "온수", "급수", "전기13", "전기14",
                "전기15", "전기16", "전기17", "전기19", "전기20"
            ]
        );

        let row = &sheet.rows[0];
        assert_eq!(row.len(), sheet.headers.len());
        assert_eq!(row[0], Cell::Text("2층".into()));
        assert_eq!(row[1], Cell::Text("1호".into()));
        assert_eq!(row[2], Cell::Text("과장".into()));
        assert_eq!(row[3], Cell::Number(1.0));
        assert_eq!(row[4], Cell::Empty);
        assert_eq!(row[6], Cell::Number(4.0));
        assert_eq!(row[13], Cell::Number(20.0));
    }

    #[test]
    fn test_commercial_sheet() {
        let mut record = MonthlyRecord::blank("2025-03");
        record.commercials[11].water = Some(3.5);

        let sheet = commercial_sheet(&record);
        assert_eq!(sheet.headers, vec!["호수", "담당자", "수도계량검침"]);
        assert_eq!(
            sheet.rows[11],
            vec![Cell::Text("111-2호".into()), Cell::Text("주임".into()), Cell::Number(3.5)]
        );
        assert_eq!(sheet.rows[0][2], Cell::Empty);
    }

    #[test]
    fn test_main_meter_summary_variants() {
        let mut current = MonthlyRecord::blank("2025-03");
        let mut previous = MonthlyRecord::blank("2025-02");

        // Current unset
        let sheet = main_meter_sheet(&current, Some(&previous));
        assert_eq!(sheet.rows[0][1], Cell::Empty);
        assert_eq!(sheet.rows[0][2], Cell::Number(0.0));
        assert_eq!(sheet.rows[0][3], Cell::Text("-".into()));

        // No previous record: previous counts as 0
        current.main_meter = Some(150.5);
        let sheet = main_meter_sheet(&current, None);
        assert_eq!(sheet.rows[0][0], Cell::Text(MAIN_METER_LABEL.into()));
        assert_eq!(sheet.rows[0][2], Cell::Number(0.0));
        assert_eq!(sheet.rows[0][3], Cell::Text("150.50".into()));

        // Previous record present but unset
        assert_eq!(summary_usage(&current, Some(&previous)), "-");

        previous.main_meter = Some(100.25);
        let sheet = main_meter_sheet(&current, Some(&previous));
        assert_eq!(sheet.rows[0][1], Cell::Number(150.5));
        assert_eq!(sheet.rows[0][2], Cell::Number(100.25));
        assert_eq!(sheet.rows[0][3], Cell::Text("50.25".into()));
    }

    #[test]
    fn test_xlsx_writer_creates_named_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = MonthlyRecord::blank("2025-03");
        record.main_meter = Some(12.0);
        record.households[0].water = Some(7.5);

        let mut sink = XlsxWorkbookWriter::new(dir.path().join("out"));
        let out = export_record(&mut sink, &record, None).unwrap();
        assert_eq!(out, dir.path().join("out").join("검침기록_2025-03.xlsx"));

        // xlsx is a zip container
        let bytes = fs::read(&out).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_csv_writer_creates_one_file_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = MonthlyRecord::blank("2025-03");
        record.main_meter = Some(12.0);
        record.households[0].water = Some(7.5);

        let mut sink = CsvWorkbookWriter::new(dir.path());
        let out = export_record(&mut sink, &record, None).unwrap();
        assert_eq!(out, dir.path().join("검침기록_2025-03"));

        let households = fs::read_to_string(out.join("세대검침.csv")).unwrap();
        let mut lines = households.lines();
        assert_eq!(
            lines.next().unwrap(),
            "층,호,담당자,실외기,난방,온수,급수,전기13,전기14,전기15,전기16,전기17,전기19,전기20"
        );
        assert_eq!(lines.next().unwrap(), "2층,1호,주임,,,,7.5,,,,,,,");
        assert_eq!(households.lines().count(), HOUSEHOLD_COUNT + 1);

        let main = fs::read_to_string(out.join("상수도메인.csv")).unwrap();
        assert_eq!(main.lines().nth(1).unwrap(), "상수도 메인 계량기,12,0,12.00");

        let commercial = fs::read_to_string(out.join("상가검침.csv")).unwrap();
        assert_eq!(commercial.lines().count(), COMMERCIAL_UNITS.len() + 1);
    }
}
