use crate::{core::data_type::DataType, records::row::NormalizedRow, resource::ResourceKind};

/// A column of a normalized batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

/// Every normalized row of one resource for one run, sharing one column
/// layout.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub resource: ResourceKind,
    pub columns: Vec<Column>,
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedBatch {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
