use csv::WriterBuilder;

use crate::error::PipelineError;
use crate::model::Record;

/// Serializes the merged rows as CSV, headers first, for inspection and
/// export. Columns come from the first record; missing values become empty
/// fields. An empty sequence yields an empty string.
pub(crate) fn merged_to_csv_string(records: &[Record]) -> Result<String, PipelineError> {
    let Some(first) = records.first() else {
        return Ok(String::new());
    };
    let headers = first.columns().collect::<Vec<_>>();

    let mut writer = WriterBuilder::new().from_writer(Vec::<u8>::new());
    writer.write_record(&headers)?;
    for record in records {
        let row = headers
            .iter()
            .map(|name| record.get(name).unwrap_or(""))
            .collect::<Vec<_>>();
        writer.write_record(&row)?;
    }
    writer.flush().map_err(csv::Error::from)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| PipelineError::Csv(error.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::merged_to_csv_string;
    use crate::model::Record;

    #[test]
    fn writes_headers_then_rows() {
        let records: Vec<Record> = vec![
            [("Nama", "Ana"), ("Nilai", "90")].into_iter().collect(),
            [("Nama", "Budi")].into_iter().collect(),
        ];
        let csv = merged_to_csv_string(&records).expect("CSV should serialize");
        assert_eq!(csv, "Nama,Nilai\nAna,90\nBudi,\n");
    }

    #[test]
    fn empty_sequence_serializes_to_nothing() {
        let csv = merged_to_csv_string(&[]).expect("CSV should serialize");
        assert!(csv.is_empty());
    }
}
