//! Export of an event sequence to an Excel workbook
//!
//! The exporter takes exactly the sequence it is handed, in the order it is
//! handed, and never consults the filter itself: deciding what is exported is
//! the [`FilterModel`](crate::FilterModel)'s job.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::cache::atomic_write;
use crate::category::CategoryMap;
use crate::error::{Error, PantryResult};
use crate::event::Event;

/// The fixed column order of the exported sheet
const COLUMNS: [&str; 6] = ["ID", "Title", "Start", "End", "Location", "Categories"];

/// Write one row per event to an xlsx workbook at `destination`.
///
/// Category ids are resolved through `categories`, joined by `", "`; unresolved
/// ids appear as their numeric value. The workbook is built in memory and
/// written atomically, so the destination ends up holding either a complete
/// valid file or nothing at all. An empty sequence yields a workbook with only
/// the header row.
pub fn export_events<'a, I>(events: I, categories: &CategoryMap, destination: &Path) -> PantryResult<()>
where
    I: IntoIterator<Item = &'a Event>,
{
    let buffer = build_workbook(events, categories)
        .map_err(|err| Error::Export(format!("unable to build the workbook: {}", err)))?;

    atomic_write(destination, &buffer)
        .map_err(|err| Error::Export(format!("unable to write {:?}: {}", destination, err)))
}

fn build_workbook<'a, I>(events: I, categories: &CategoryMap) -> Result<Vec<u8>, XlsxError>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let bold = Format::new().set_bold();
    for (col, title) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (pos, event) in events.into_iter().enumerate() {
        let row = (pos + 1) as u32;
        worksheet.write_number(row, 0, event.id().as_u64() as f64)?;
        worksheet.write_string(row, 1, event.title())?;
        worksheet.write_string(row, 2, &event.start().to_string())?;
        let end = event.end().map(|d| d.to_string()).unwrap_or_default();
        worksheet.write_string(row, 3, &end)?;
        worksheet.write_string(row, 4, event.location())?;
        worksheet.write_string(row, 5, &categories.joined_names(event.categories()))?;
    }

    workbook.save_to_buffer()
}
