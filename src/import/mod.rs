//! CSV customer import parsing.
//!
//! Turns uploaded bytes into [`CustomerRecord`]s. Persisting them is the job
//! of [`crate::services::imports::ImportService`].

pub mod sniff;

use csv::{StringRecord, StringRecordsIntoIter, Trim};
use serde::Serialize;
use thiserror::Error;

/// Bytes inspected when looking for a header row
pub const DEFAULT_SNIFF_BYTES: usize = 1024;

/// Problems with the shape of an uploaded CSV file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("missing header: the CSV file requires a header row naming the customer fields")]
    MissingHeader,

    #[error("field not present: '{field}' on line {line}")]
    FieldNotPresent { field: &'static str, line: u64 },

    #[error("malformed CSV on line {line}: {message}")]
    Malformed { line: u64, message: String },
}

/// Customer attributes read from a CSV row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Code,
    Note,
}

impl CustomerField {
    pub const ALL: [CustomerField; 3] = [CustomerField::Name, CustomerField::Code, CustomerField::Note];

    pub fn key(self) -> &'static str {
        match self {
            CustomerField::Name => "name",
            CustomerField::Code => "code",
            CustomerField::Note => "note",
        }
    }

    /// Header names accepted for this field, tried in order: the exact key,
    /// its label, then the Italian variants.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            CustomerField::Name => &["name", "Name", "nome", "Nome"],
            CustomerField::Code => &["code", "Code", "codice", "Codice"],
            CustomerField::Note => &["note", "Note", "nota", "Nota"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One parsed data row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRecord {
    pub line: u64,
    pub name: String,
    pub code: String,
    pub note: String,
}

/// Decodes upload bytes as UTF-8, dropping a leading byte-order mark.
/// Invalid sequences are replaced rather than rejected.
pub fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

/// Resolves which header column feeds `field`
fn resolve_column(headers: &StringRecord, field: CustomerField) -> Option<usize> {
    field
        .candidates()
        .iter()
        .find_map(|candidate| headers.iter().position(|h| h == *candidate))
}

/// Opens `text` as a header-keyed customer table.
///
/// Fails with [`FormatError::MissingHeader`] when the first `sniff_bytes`
/// bytes do not look like they start with a header row.
pub fn read_customers(text: &str, sniff_bytes: usize) -> Result<CustomerRows<'_>, FormatError> {
    if !sniff::has_header(sniff::sample(text, sniff_bytes)) {
        return Err(FormatError::MissingHeader);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(malformed)?.clone();
    let columns = CustomerField::ALL.map(|field| resolve_column(&headers, field));

    Ok(CustomerRows {
        records: reader.into_records(),
        columns,
    })
}

fn malformed(err: csv::Error) -> FormatError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    FormatError::Malformed {
        line,
        message: err.to_string(),
    }
}

/// Iterator over the data rows of a customer CSV
pub struct CustomerRows<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    columns: [Option<usize>; 3],
}

impl CustomerRows<'_> {
    /// Header column used for each field, `None` when no candidate matched
    pub fn column(&self, field: CustomerField) -> Option<usize> {
        self.columns[field.index()]
    }

    fn parse(&self, record: &StringRecord) -> Result<CustomerRecord, FormatError> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        Ok(CustomerRecord {
            line,
            name: self.field(record, CustomerField::Name, line)?,
            code: self.field(record, CustomerField::Code, line)?,
            note: self.field(record, CustomerField::Note, line)?,
        })
    }

    fn field(&self, record: &StringRecord, field: CustomerField, line: u64) -> Result<String, FormatError> {
        self.column(field)
            .and_then(|idx| record.get(idx))
            .map(str::to_string)
            .ok_or(FormatError::FieldNotPresent {
                field: field.key(),
                line,
            })
    }
}

impl Iterator for CustomerRows<'_> {
    type Item = Result<CustomerRecord, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(malformed(err))),
        };
        Some(self.parse(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn collect(text: &str) -> Result<Vec<CustomerRecord>, FormatError> {
        read_customers(text, DEFAULT_SNIFF_BYTES)?.collect()
    }

    #[test]
    fn reads_exact_headers() {
        let rows = collect("name,code,note\nA,c1,\nB,c2,first floor\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "c1");
        assert_eq!(rows[1].name, "B");
        assert_eq!(rows[1].note, "first floor");
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn falls_back_to_localized_headers() {
        let rows = collect("codice,nome,nota\nr-01,Mario Rossi,\nr-02,Luigi Verdi,\n").unwrap();
        assert_eq!(rows[0].name, "Mario Rossi");
        assert_eq!(rows[1].code, "r-02");
    }

    #[test]
    fn exact_key_wins_over_localized() {
        let reader = read_customers("nome,name,code,note\nx,y,c,n\n", DEFAULT_SNIFF_BYTES).unwrap();
        assert_eq!(reader.column(CustomerField::Name), Some(1));
    }

    #[test]
    fn byte_order_mark_is_stripped() {
        let text = decode(b"\xef\xbb\xbfname,code,note\nA,c1,\n");
        let rows = collect(&text).unwrap();
        assert_eq!(rows[0].name, "A");
    }

    #[test]
    fn missing_column_names_the_field() {
        assert_matches!(
            collect("name,note\nAnna Bianchi,first floor\n"),
            Err(FormatError::FieldNotPresent { field: "code", line: 2 })
        );
    }

    #[test]
    fn short_row_is_a_missing_field() {
        assert_matches!(
            collect("name,code,note\nAnna,a1\n"),
            Err(FormatError::FieldNotPresent { field: "note", line: 2 })
        );
    }

    #[test]
    fn data_without_header_is_rejected() {
        assert_matches!(
            read_customers("Mario,001,\nLuigi,002,\n", DEFAULT_SNIFF_BYTES).err(),
            Some(FormatError::MissingHeader)
        );
    }

    #[test]
    fn cells_are_trimmed() {
        let rows = collect("name, code, note\n Anna , a1 , \n").unwrap();
        assert_eq!(rows[0].name, "Anna");
        assert_eq!(rows[0].code, "a1");
    }
}
