//! Turns fetched JSON records into rows sharing one column layout.

use crate::{
    error::NormalizeError,
    normalize::flatten::{Cell, flatten_record},
};
use model::{
    core::{data_type::DataType, value::FieldValue},
    records::{
        batch::{Column, NormalizedBatch},
        record::Record,
        row::NormalizedRow,
    },
    resource::ResourceKind,
    schema::ResourceSchema,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

pub mod coerce;
pub mod flatten;

pub struct RecordNormalizer {
    resource: ResourceKind,
    schema: &'static ResourceSchema,
}

impl RecordNormalizer {
    pub fn new(resource: ResourceKind) -> Self {
        RecordNormalizer {
            resource,
            schema: resource.schema(),
        }
    }

    /// Normalizes every record of a run. Columns are the declared scalar
    /// fields in schema order followed by all other discovered columns in
    /// lexicographic order; every row carries all of them.
    pub fn normalize(&self, records: &[Record]) -> Result<NormalizedBatch, NormalizeError> {
        let flattened = self.flatten_all(records)?;

        let declared = self.schema.declared_columns();
        let declared_names: HashSet<&str> = declared.iter().map(|(n, _)| n.as_str()).collect();

        let mut discovered: BTreeMap<String, DataType> = BTreeMap::new();
        for cell in flattened.iter().flatten() {
            if declared_names.contains(cell.column.as_str()) {
                continue;
            }
            discovered
                .entry(cell.column.clone())
                .and_modify(|dt| *dt = merge_types(*dt, cell.data_type))
                .or_insert(cell.data_type);
        }

        let renames = self.plan_renames(&declared_names, &discovered);
        let extras: BTreeMap<String, DataType> = discovered
            .into_iter()
            .map(|(name, dt)| (renames.get(&name).cloned().unwrap_or(name), dt))
            .collect();

        let columns: Vec<Column> = declared
            .into_iter()
            .chain(extras)
            .map(|(name, data_type)| Column { name, data_type })
            .collect();
        let index: HashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();

        let mut collisions: BTreeMap<String, Collision> = BTreeMap::new();
        let rows = flattened
            .into_iter()
            .map(|cells| self.build_row(&columns, &index, &renames, cells, &mut collisions))
            .collect();

        for (column, collision) in collisions {
            warn!(
                resource = %self.resource,
                column = %column,
                count = collision.count,
                kept = %collision.kept,
                dropped = %collision.dropped,
                "Several source fields map to one column; kept the first value"
            );
        }

        let batch = NormalizedBatch {
            resource: self.resource,
            columns,
            rows,
        };
        debug!(
            resource = %self.resource,
            rows = batch.row_count(),
            columns = batch.columns.len(),
            "Normalized records"
        );
        Ok(batch)
    }

    fn flatten_all(&self, records: &[Record]) -> Result<Vec<Vec<Cell>>, NormalizeError> {
        let mut mismatches: BTreeMap<String, usize> = BTreeMap::new();
        let mut flattened = Vec::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            let object = record
                .data
                .as_object()
                .filter(|_| record.id().is_some())
                .ok_or(NormalizeError::MissingIdentifier {
                    resource: self.resource,
                    position,
                    page: record.page,
                    field: self.schema.id_field,
                })?;

            let flat = flatten_record(self.schema, object);
            for column in flat.mismatches {
                *mismatches.entry(column).or_default() += 1;
            }
            flattened.push(flat.cells);
        }

        for (column, count) in mismatches {
            warn!(
                resource = %self.resource,
                column = %column,
                count,
                "Values did not match the declared type and were staged as null"
            );
        }

        Ok(flattened)
    }

    /// Renames discovered columns, skipping any rename whose target is
    /// already taken.
    fn plan_renames(
        &self,
        declared: &HashSet<&str>,
        discovered: &BTreeMap<String, DataType>,
    ) -> HashMap<String, String> {
        let mut taken: HashSet<String> = declared
            .iter()
            .map(|s| s.to_string())
            .chain(discovered.keys().cloned())
            .collect();
        let mut renames = HashMap::new();

        for column in discovered.keys() {
            let Some(target) = self.schema.rename(column) else {
                continue;
            };
            if taken.contains(&target) {
                warn!(
                    resource = %self.resource,
                    column = %column,
                    target = %target,
                    "Skipping rename that would collide with an existing column"
                );
                continue;
            }
            taken.insert(target.clone());
            renames.insert(column.clone(), target);
        }

        renames
    }

    fn build_row(
        &self,
        columns: &[Column],
        index: &HashMap<String, usize>,
        renames: &HashMap<String, String>,
        cells: Vec<Cell>,
        collisions: &mut BTreeMap<String, Collision>,
    ) -> NormalizedRow {
        let mut values: Vec<FieldValue> = columns
            .iter()
            .map(|c| FieldValue::null(c.name.clone(), c.data_type))
            .collect();
        let mut sources: Vec<Option<String>> = vec![None; columns.len()];

        for cell in cells {
            let name = renames.get(&cell.column).unwrap_or(&cell.column);
            let Some(&i) = index.get(name) else {
                continue;
            };
            if cell.value.is_null() {
                continue;
            }
            match &sources[i] {
                Some(kept) => {
                    collisions
                        .entry(name.clone())
                        .or_insert_with(|| Collision {
                            count: 0,
                            kept: kept.clone(),
                            dropped: cell.source.clone(),
                        })
                        .count += 1;
                }
                None => {
                    values[i].value = cell.value;
                    sources[i] = Some(cell.source);
                }
            }
        }

        NormalizedRow::new(self.resource, values)
    }
}

/// Non-null values dropped because another source field already filled
/// the column.
struct Collision {
    count: usize,
    kept: String,
    dropped: String,
}

fn merge_types(a: DataType, b: DataType) -> DataType {
    match (a, b) {
        (a, b) if a == b => a,
        (DataType::Null, other) | (other, DataType::Null) => other,
        (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
            DataType::Float
        }
        _ => DataType::Json,
    }
}
