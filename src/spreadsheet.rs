use std::io::Cursor;

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};

use crate::error::ExtractError;
use crate::model::{Record, RecordSet};

fn cell_text(cell: &Data) -> String {
    if cell.is_empty() {
        String::new()
    } else {
        cell.to_string().trim().to_string()
    }
}

/// Reads the first sheet of a workbook into records.
///
/// The workbook format is sniffed from the bytes, not the file name, so any
/// format calamine can open is accepted. The first row is the header row;
/// later rows become one record each, with every cell coerced to text.
/// Columns under an empty header cell are ignored and rows whose cells are
/// all empty are omitted.
pub(crate) fn extract_records(bytes: &[u8]) -> Result<RecordSet, ExtractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(RecordSet::default());
    };
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let Some(header_cells) = rows.next() else {
        return Ok(RecordSet::default());
    };
    let headers = header_cells.iter().map(cell_text).collect::<Vec<_>>();

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|cell| cell_text(cell).is_empty()) {
            continue;
        }

        let mut record = Record::default();
        for (index, name) in headers.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let value = row.get(index).map(cell_text).unwrap_or_default();
            record.insert(name.clone(), value);
        }
        records.push(record);
    }

    Ok(RecordSet::new(records))
}
