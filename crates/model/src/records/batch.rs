use crate::records::row::RowData;
use std::ops::Range;

/// A bounded, contiguous slice of records written in a single statement.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Zero-based position of this batch within the run.
    pub index: usize,
    /// Offset of the first record within the full record set.
    pub offset: usize,
    pub rows: Vec<RowData>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Record positions covered by this batch, as `offset..offset + len`.
    pub fn record_range(&self) -> Range<usize> {
        self.offset..self.offset + self.rows.len()
    }
}

/// Partitions `rows` into batches of at most `batch_size` records, preserving
/// the original order. The batches cover the record set exactly: no overlap,
/// no gaps.
pub fn partition(rows: Vec<RowData>, batch_size: usize) -> Vec<Batch> {
    assert!(batch_size > 0, "batch size must be positive");

    let mut batches = Vec::with_capacity(rows.len().div_ceil(batch_size));
    let mut offset = 0;
    let mut current: Vec<RowData> = Vec::with_capacity(batch_size.min(rows.len()));

    for row in rows {
        current.push(row);
        if current.len() == batch_size {
            batches.push(Batch {
                index: batches.len(),
                offset,
                rows: std::mem::take(&mut current),
            });
            offset = batches.len() * batch_size;
        }
    }

    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len(),
            offset,
            rows: current,
        });
    }

    batches
}
