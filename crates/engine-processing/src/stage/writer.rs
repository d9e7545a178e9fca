use crate::{
    error::StageWriteError,
    stage::{StageFile, object_name},
};
use bytes::Bytes;
use csv::{Terminator, WriterBuilder};
use model::records::batch::NormalizedBatch;
use tracing::debug;

/// Encodes a normalized batch as CSV, splitting it into files of at most
/// `max_file_bytes` (a single oversized row still gets a file of its own).
#[derive(Debug, Clone)]
pub struct StageWriter {
    max_file_bytes: u64,
}

impl StageWriter {
    pub fn new(max_file_bytes: u64) -> Self {
        StageWriter {
            max_file_bytes: max_file_bytes.max(1),
        }
    }

    /// Always returns at least one file; an empty batch yields a header-only
    /// file.
    pub fn write(&self, batch: &NormalizedBatch) -> Result<Vec<StageFile>, StageWriteError> {
        let (buffer, header_len, row_ends) = encode(batch)?;
        let header = &buffer[..header_len];

        let mut chunks: Vec<(Vec<u8>, usize)> = Vec::new();
        let mut current = header.to_vec();
        let mut current_rows = 0usize;
        let mut start = header_len;

        for end in row_ends {
            let row = &buffer[start..end];
            start = end;

            if current_rows > 0 && (current.len() + row.len()) as u64 > self.max_file_bytes {
                chunks.push((std::mem::replace(&mut current, header.to_vec()), current_rows));
                current_rows = 0;
            }
            current.extend_from_slice(row);
            current_rows += 1;
        }
        chunks.push((current, current_rows));

        let parts = chunks.len();
        let stem = batch.resource.stem();
        let files: Vec<StageFile> = chunks
            .into_iter()
            .enumerate()
            .map(|(i, (data, rows))| StageFile {
                name: object_name(stem, i + 1, parts),
                bytes: Bytes::from(data),
                rows,
            })
            .collect();

        debug!(
            resource = %batch.resource,
            rows = batch.row_count(),
            files = files.len(),
            "Encoded stage files"
        );
        Ok(files)
    }
}

/// Encodes header and rows into one buffer and returns the header length and
/// the end offset of every row.
fn encode(batch: &NormalizedBatch) -> Result<(Vec<u8>, usize, Vec<usize>), StageWriteError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(batch.column_names())?;
    writer.flush()?;
    let header_len = writer.get_ref().len();

    let expected = batch.columns.len();
    let mut row_ends = Vec::with_capacity(batch.row_count());
    for (i, row) in batch.rows.iter().enumerate() {
        if row.field_values.len() != expected {
            return Err(StageWriteError::RowWidth {
                row: i,
                expected,
                found: row.field_values.len(),
            });
        }
        writer.write_record(row.field_values.iter().map(|f| f.value.to_string()))?;
        writer.flush()?;
        row_ends.push(writer.get_ref().len());
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| StageWriteError::Io(e.into_error()))?;
    Ok((buffer, header_len, row_ends))
}
