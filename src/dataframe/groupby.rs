use super::{DataFrame, Series, Value};
use crate::error::{PlyError, Result};

/// A DataFrame tagged with an ordered, non-empty list of key columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedDataFrame {
    frame: DataFrame,
    groups: Vec<String>,
}

/// The rows of one distinct key tuple, materialised for a single evaluation.
#[derive(Debug, Clone)]
pub struct Partition {
    pub key: Vec<Value>,
    pub frame: DataFrame,
}

impl GroupedDataFrame {
    /// Tag `frame` with `groups`. Keys must name existing columns; repeats
    /// are collapsed keeping the first occurrence.
    pub fn new<S: AsRef<str>>(frame: DataFrame, groups: &[S]) -> Result<Self> {
        let mut keys: Vec<String> = Vec::with_capacity(groups.len());
        for g in groups {
            let g = g.as_ref();
            if !frame.has_column(g) {
                return Err(PlyError::key(format!("group key '{}' is not a column", g)));
            }
            if !keys.iter().any(|k| k == g) {
                keys.push(g.to_string());
            }
        }
        if keys.is_empty() {
            return Err(PlyError::config("at least one group key is required"));
        }

        Ok(GroupedDataFrame {
            frame,
            groups: keys,
        })
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut DataFrame {
        &mut self.frame
    }

    /// Strip the tag.
    pub fn ungroup(self) -> DataFrame {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Split into partitions, in ascending order of the key tuple.
    pub fn partitions(&self) -> Result<Vec<Partition>> {
        Ok(self
            .frame
            .group_rows(&self.groups)?
            .into_iter()
            .map(|(key, rows)| Partition {
                frame: self.frame.gather(&rows),
                key,
            })
            .collect())
    }

    /// A label in `0..k` per row, numbering key tuples in ascending order.
    pub fn group_indices(&self) -> Result<Vec<usize>> {
        let mut labels = vec![0; self.len()];
        for (label, rows) in self.frame.group_rows(&self.groups)?.values().enumerate() {
            for &row in rows {
                labels[row] = label;
            }
        }
        Ok(labels)
    }
}

impl Partition {
    /// Columns holding this partition's key values repeated `n` times.
    pub fn key_columns<'a>(
        &'a self,
        groups: &'a [String],
        n: usize,
    ) -> impl Iterator<Item = (&'a str, Series)> + 'a {
        groups
            .iter()
            .zip(&self.key)
            .map(move |(name, value)| (name.as_str(), Series::broadcast(value, n)))
    }
}

/// Either a plain frame or a grouped one.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Plain(DataFrame),
    Grouped(GroupedDataFrame),
}

impl Dataset {
    pub fn frame(&self) -> &DataFrame {
        match self {
            Dataset::Plain(df) => df,
            Dataset::Grouped(gdf) => gdf.frame(),
        }
    }

    pub fn frame_mut(&mut self) -> &mut DataFrame {
        match self {
            Dataset::Plain(df) => df,
            Dataset::Grouped(gdf) => gdf.frame_mut(),
        }
    }

    /// The group keys, empty when ungrouped.
    pub fn groups(&self) -> &[String] {
        match self {
            Dataset::Plain(_) => &[],
            Dataset::Grouped(gdf) => gdf.groups(),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Dataset::Grouped(_))
    }

    /// Drop the group tag, if any.
    pub fn ungroup(self) -> DataFrame {
        match self {
            Dataset::Plain(df) => df,
            Dataset::Grouped(gdf) => gdf.ungroup(),
        }
    }

    pub fn group_by<S: AsRef<str>>(self, groups: &[S]) -> Result<Dataset> {
        Ok(Dataset::Grouped(GroupedDataFrame::new(
            self.ungroup(),
            groups,
        )?))
    }

    /// Wrap `frame` with the same tag as `self`, keeping only the keys that
    /// still exist in `frame`.
    pub(crate) fn retag(&self, frame: DataFrame) -> Dataset {
        let keys: Vec<&String> = self
            .groups()
            .iter()
            .filter(|k| frame.has_column(k))
            .collect();
        if keys.is_empty() {
            return Dataset::Plain(frame);
        }
        match GroupedDataFrame::new(frame.clone(), &keys) {
            Ok(gdf) => Dataset::Grouped(gdf),
            Err(_) => Dataset::Plain(frame),
        }
    }

    pub fn len(&self) -> usize {
        self.frame().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame().is_empty()
    }
}

impl From<DataFrame> for Dataset {
    fn from(df: DataFrame) -> Self {
        Dataset::Plain(df)
    }
}

impl From<GroupedDataFrame> for Dataset {
    fn from(gdf: GroupedDataFrame) -> Self {
        Dataset::Grouped(gdf)
    }
}
