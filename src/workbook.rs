//! Workbook sinks: the report is delivered through "create sheet / append
//! row / embed image / save" and nothing else.
use crate::error::{ReportError, Result};
use crate::types::Anchor;
use crate::util::sanitize_sheet_name;
use rust_xlsxwriter::{Image, Workbook, Worksheet};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Cell::Number(v as f64)
    }
}

/// Opaque handle to a sheet created by a [`WorkbookSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetId(pub usize);

pub trait WorkbookSink {
    fn create_sheet(&mut self, name: &str) -> Result<SheetId>;
    fn append_row(&mut self, sheet: SheetId, values: &[Cell]) -> Result<()>;
    fn embed_image(&mut self, sheet: SheetId, anchor: Anchor, image: &[u8]) -> Result<()>;
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Excel-safe, unique sheet names for one workbook.
#[derive(Debug, Default)]
struct SheetNames(HashSet<String>);

impl SheetNames {
    fn claim(&mut self, wanted: &str) -> String {
        let base = sanitize_sheet_name(wanted);
        let mut name = base.clone();
        let mut n = 2;
        // Excel compares sheet names case-insensitively.
        while self.0.contains(&name.to_lowercase()) {
            let suffix = format!(" ({n})");
            let keep = 31usize.saturating_sub(suffix.chars().count());
            name = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }
        self.0.insert(name.to_lowercase());
        name
    }
}

/// `.xlsx` output backed by `rust_xlsxwriter`.
pub struct XlsxWorkbook {
    workbook: Workbook,
    names: SheetNames,
    sheets: Vec<String>,
    next_row: HashMap<SheetId, u32>,
}

impl XlsxWorkbook {
    pub fn new() -> Self {
        XlsxWorkbook {
            workbook: Workbook::new(),
            names: SheetNames::default(),
            sheets: Vec::new(),
            next_row: HashMap::new(),
        }
    }

    fn sheet(&mut self, id: SheetId) -> Result<&mut Worksheet> {
        let name = self
            .sheets
            .get(id.0)
            .ok_or_else(|| ReportError::Workbook(format!("unknown sheet #{}", id.0)))?;
        Ok(self.workbook.worksheet_from_name(name)?)
    }
}

impl Default for XlsxWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookSink for XlsxWorkbook {
    fn create_sheet(&mut self, name: &str) -> Result<SheetId> {
        let name = self.names.claim(name);
        let sheet = self.workbook.add_worksheet();
        sheet.set_name(&name)?;
        let id = SheetId(self.sheets.len());
        debug!("Created sheet '{}'", name);
        self.sheets.push(name);
        self.next_row.insert(id, 0);
        Ok(id)
    }

    fn append_row(&mut self, id: SheetId, values: &[Cell]) -> Result<()> {
        let row = self.next_row.get(&id).copied().unwrap_or(0);
        let sheet = self.sheet(id)?;
        for (col, cell) in values.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(row, col, s)?;
                }
                Cell::Number(v) => {
                    sheet.write_number(row, col, *v)?;
                }
            }
        }
        self.next_row.insert(id, row + 1);
        Ok(())
    }

    fn embed_image(&mut self, id: SheetId, anchor: Anchor, image: &[u8]) -> Result<()> {
        let image = Image::new_from_buffer(image)?;
        self.sheet(id)?.insert_image(anchor.row, anchor.col, &image)?;
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.workbook.save(path)?;
        Ok(())
    }
}

/// One recorded workbook call.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkbookOp {
    CreateSheet(String),
    AppendRow(SheetId, Vec<Cell>),
    EmbedImage(SheetId, Anchor, usize),
    Save(String),
}

/// In-memory sink that records every call in order.
#[derive(Debug, Default)]
pub struct MemoryWorkbook {
    pub ops: Vec<WorkbookOp>,
    names: SheetNames,
    sheet_names: Vec<String>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub fn sheet_id(&self, name: &str) -> Option<SheetId> {
        self.sheet_names.iter().position(|n| n == name).map(SheetId)
    }

    /// Rows appended to a sheet, in order.
    pub fn rows(&self, id: SheetId) -> Vec<&[Cell]> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                WorkbookOp::AppendRow(s, cells) if *s == id => Some(cells.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Anchors of the images embedded in a sheet, in order.
    pub fn images(&self, id: SheetId) -> Vec<Anchor> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                WorkbookOp::EmbedImage(s, a, _) if *s == id => Some(*a),
                _ => None,
            })
            .collect()
    }
}

impl WorkbookSink for MemoryWorkbook {
    fn create_sheet(&mut self, name: &str) -> Result<SheetId> {
        let name = self.names.claim(name);
        self.ops.push(WorkbookOp::CreateSheet(name.clone()));
        self.sheet_names.push(name);
        Ok(SheetId(self.sheet_names.len() - 1))
    }

    fn append_row(&mut self, sheet: SheetId, values: &[Cell]) -> Result<()> {
        if sheet.0 >= self.sheet_names.len() {
            return Err(ReportError::Workbook(format!("unknown sheet #{}", sheet.0)));
        }
        self.ops.push(WorkbookOp::AppendRow(sheet, values.to_vec()));
        Ok(())
    }

    fn embed_image(&mut self, sheet: SheetId, anchor: Anchor, image: &[u8]) -> Result<()> {
        if sheet.0 >= self.sheet_names.len() {
            return Err(ReportError::Workbook(format!("unknown sheet #{}", sheet.0)));
        }
        self.ops.push(WorkbookOp::EmbedImage(sheet, anchor, image.len()));
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.ops.push(WorkbookOp::Save(path.display().to_string()));
        Ok(())
    }
}
