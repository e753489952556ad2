use super::{Series, Value};
use crate::error::{PlyError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Ordered collection of named, equal-length columns with a row label index.
///
/// Columns are shared between clones and only copied when replaced, so
/// cloning a frame is cheap and never duplicates row data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<String>,
    data: Vec<Arc<Series>>,
    index: Vec<usize>,
}

/// Which member of a set of duplicate rows survives `drop_duplicates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Keep {
    #[default]
    First,
    Last,
    /// Drop every row that has a duplicate.
    None,
}

impl DataFrame {
    pub fn new(columns: Vec<(String, Series)>) -> Result<Self> {
        let len = columns.first().map_or(0, |(_, s)| s.len());
        let mut seen = HashSet::new();
        for (name, series) in &columns {
            if series.len() != len {
                return Err(PlyError::value(format!(
                    "all columns must have the same length: column '{}' has length {}, expected {}",
                    name,
                    series.len(),
                    len
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(PlyError::value(format!("duplicate column name '{}'", name)));
            }
        }

        let (names, series): (Vec<_>, Vec<_>) = columns
            .into_iter()
            .map(|(name, s)| (name, Arc::new(s)))
            .unzip();
        Ok(DataFrame {
            columns: names,
            data: series,
            index: (0..len).collect(),
        })
    }

    /// A frame with no columns that keeps this frame's row labels.
    pub fn empty_like(&self) -> DataFrame {
        DataFrame {
            columns: Vec::new(),
            data: Vec::new(),
            index: self.index.clone(),
        }
    }

    /// A frame with no columns and `n` rows labelled `0..n`.
    pub fn with_index_len(n: usize) -> DataFrame {
        DataFrame {
            columns: Vec::new(),
            data: Vec::new(),
            index: (0..n).collect(),
        }
    }

    /// Get number of rows
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if DataFrame is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get shape (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.columns.len())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get a single column as a Series
    pub fn get_column(&self, name: &str) -> Option<&Series> {
        self.position(name).map(|pos| self.data[pos].as_ref())
    }

    /// Like `get_column`, but a missing column is a `KeyError`.
    pub fn column(&self, name: &str) -> Result<&Series> {
        self.get_column(name)
            .ok_or_else(|| PlyError::key(format!("column '{}' not found", name)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().map(|s| s.as_ref()))
    }

    fn map_rows(&self, index: Vec<usize>, f: impl Fn(&Series) -> Series) -> DataFrame {
        DataFrame {
            columns: self.columns.clone(),
            data: self.data.iter().map(|s| Arc::new(f(s))).collect(),
            index,
        }
    }

    /// Get first n rows
    pub fn head(&self, n: usize) -> DataFrame {
        let n = n.min(self.len());
        let positions: Vec<usize> = (0..n).collect();
        self.gather(&positions)
    }

    /// Get last n rows
    pub fn tail(&self, n: usize) -> DataFrame {
        let start = self.len().saturating_sub(n);
        let positions: Vec<usize> = (start..self.len()).collect();
        self.gather(&positions)
    }

    /// Rows at the given positions, in that order, keeping their labels.
    pub fn take(&self, positions: &[usize]) -> Result<DataFrame> {
        if let Some(&p) = positions.iter().find(|&&p| p >= self.len()) {
            return Err(PlyError::value(format!(
                "row position {} out of bounds for DataFrame of length {}",
                p,
                self.len()
            )));
        }
        Ok(self.gather(positions))
    }

    /// `take` for positions already known to be in bounds.
    pub(crate) fn gather(&self, positions: &[usize]) -> DataFrame {
        let index = positions.iter().map(|&p| self.index[p]).collect();
        self.map_rows(index, |s| s.take(positions))
    }

    /// Filter rows based on a boolean mask
    pub fn filter(&self, mask: &[bool]) -> Result<DataFrame> {
        if mask.len() != self.len() {
            return Err(PlyError::value(format!(
                "mask length {} does not match DataFrame length {}",
                mask.len(),
                self.len()
            )));
        }

        let index = self
            .index
            .iter()
            .zip(mask)
            .filter_map(|(&label, &keep)| if keep { Some(label) } else { None })
            .collect();
        Ok(self.map_rows(index, |s| s.filter(mask)))
    }

    /// Keep the columns whose mask entry is true.
    pub fn select_mask(&self, mask: &[bool]) -> Result<DataFrame> {
        if mask.len() != self.columns.len() {
            return Err(PlyError::value(format!(
                "column mask length {} does not match {} columns",
                mask.len(),
                self.columns.len()
            )));
        }

        let (columns, data) = self
            .columns
            .iter()
            .zip(&self.data)
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|((name, series), _)| (name.clone(), Arc::clone(series)))
            .unzip();

        Ok(DataFrame {
            columns,
            data,
            index: self.index.clone(),
        })
    }

    /// Select specific columns, in the order given
    pub fn select(&self, cols: &[String]) -> Result<DataFrame> {
        let mut new_cols = Vec::with_capacity(cols.len());
        let mut new_data = Vec::with_capacity(cols.len());

        for col in cols {
            let pos = self
                .position(col)
                .ok_or_else(|| PlyError::key(format!("column '{}' not found", col)))?;
            new_cols.push(self.columns[pos].clone());
            new_data.push(Arc::clone(&self.data[pos]));
        }

        Ok(DataFrame {
            columns: new_cols,
            data: new_data,
            index: self.index.clone(),
        })
    }

    /// Add a column, overwriting one of the same name in place.
    pub fn set_column(&mut self, name: impl Into<String>, series: Series) -> Result<()> {
        let name = name.into();
        if series.len() != self.len() {
            return Err(PlyError::value(format!(
                "new column '{}' has length {}, DataFrame has {}",
                name,
                series.len(),
                self.len()
            )));
        }

        match self.position(&name) {
            Some(pos) => self.data[pos] = Arc::new(series),
            None => {
                self.columns.push(name);
                self.data.push(Arc::new(series));
            }
        }
        Ok(())
    }

    /// Add a new column
    pub fn with_column(&self, name: impl Into<String>, series: Series) -> Result<DataFrame> {
        let mut out = self.clone();
        out.set_column(name, series)?;
        Ok(out)
    }

    /// Insert a column at `pos`. The name must not already exist.
    pub fn insert_column(&mut self, pos: usize, name: impl Into<String>, series: Series) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(PlyError::value(format!(
                "cannot insert '{}', already exists",
                name
            )));
        }
        if series.len() != self.len() {
            return Err(PlyError::value(format!(
                "inserted column '{}' has length {}, DataFrame has {}",
                name,
                series.len(),
                self.len()
            )));
        }

        let pos = pos.min(self.columns.len());
        self.columns.insert(pos, name);
        self.data.insert(pos, Arc::new(series));
        Ok(())
    }

    /// Rename columns according to `mapping` (old name, new name).
    pub fn rename(&mut self, mapping: &[(String, String)]) -> Result<()> {
        let lookup: HashMap<&str, &str> = mapping
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .collect();
        for (from, _) in mapping {
            if !self.has_column(from) {
                return Err(PlyError::key(format!("cannot rename missing column '{}'", from)));
            }
        }

        let renamed: Vec<String> = self
            .columns
            .iter()
            .map(|c| lookup.get(c.as_str()).map_or_else(|| c.clone(), |to| to.to_string()))
            .collect();
        let mut seen = HashSet::new();
        if let Some(dup) = renamed.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(PlyError::value(format!(
                "rename produces duplicate column '{}'",
                dup
            )));
        }

        self.columns = renamed;
        Ok(())
    }

    /// Row positions in stable ascending order of `keys`, compared left to right.
    pub fn sort_indices(&self, keys: &[Series]) -> Result<Vec<usize>> {
        if let Some(bad) = keys.iter().find(|k| k.len() != self.len()) {
            return Err(PlyError::value(format!(
                "sort key has length {}, DataFrame has {}",
                bad.len(),
                self.len()
            )));
        }

        let key_values: Vec<Vec<Value>> = keys.iter().map(Series::values).collect();
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.sort_by(|&a, &b| {
            key_values
                .iter()
                .map(|values| values[a].cmp(&values[b]))
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(indices)
    }

    fn positions_of(&self, names: &[String]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|n| {
                self.position(n)
                    .ok_or_else(|| PlyError::key(format!("column '{}' not found", n)))
            })
            .collect()
    }

    fn row_key(&self, positions: &[usize], row: usize) -> Vec<Value> {
        positions
            .iter()
            .filter_map(|&p| self.data[p].get(row))
            .collect()
    }

    /// Remove duplicate rows judged on `subset` (all columns if `None`).
    pub fn drop_duplicates(&self, subset: Option<&[String]>, keep: Keep) -> Result<DataFrame> {
        let positions = match subset {
            Some(names) => self.positions_of(names)?,
            None => (0..self.columns.len()).collect(),
        };

        let keys: Vec<Vec<Value>> = (0..self.len())
            .map(|row| self.row_key(&positions, row))
            .collect();
        let mut counts: HashMap<&[Value], usize> = HashMap::new();
        for key in &keys {
            *counts.entry(key.as_slice()).or_insert(0) += 1;
        }

        let mut seen: HashMap<&[Value], usize> = HashMap::new();
        let mask: Vec<bool> = keys
            .iter()
            .map(|key| {
                let total = counts[key.as_slice()];
                let nth = seen.entry(key.as_slice()).or_insert(0);
                *nth += 1;
                match keep {
                    Keep::First => *nth == 1,
                    Keep::Last => *nth == total,
                    Keep::None => total == 1,
                }
            })
            .collect();

        self.filter(&mask)
    }

    /// Row positions of each distinct key tuple, in ascending tuple order.
    pub fn group_rows(&self, keys: &[String]) -> Result<BTreeMap<Vec<Value>, Vec<usize>>> {
        let positions = self.positions_of(keys)?;
        let mut groups: BTreeMap<Vec<Value>, Vec<usize>> = BTreeMap::new();
        for row in 0..self.len() {
            groups
                .entry(self.row_key(&positions, row))
                .or_default()
                .push(row);
        }
        Ok(groups)
    }

    /// Relabel rows `0..len`.
    pub fn reset_index(&mut self) {
        self.index = (0..self.len()).collect();
    }

    /// Stack frames with the same columns on top of each other.
    ///
    /// Column order follows the first frame; the result is relabelled
    /// `0..n`. An empty slice yields an empty frame.
    pub fn concat(frames: &[DataFrame]) -> Result<DataFrame> {
        let Some(first) = frames.first() else {
            return Ok(DataFrame::default());
        };

        let expected: HashSet<&str> = first.columns.iter().map(String::as_str).collect();
        for frame in &frames[1..] {
            let got: HashSet<&str> = frame.columns.iter().map(String::as_str).collect();
            if got != expected {
                return Err(PlyError::value(format!(
                    "cannot concatenate frames with columns {:?} and {:?}",
                    first.columns, frame.columns
                )));
            }
        }

        let mut data = Vec::with_capacity(first.columns.len());
        for name in &first.columns {
            let parts: Vec<&Series> = frames
                .iter()
                .filter_map(|f| f.get_column(name))
                .collect();
            data.push(Arc::new(Series::concat(&parts)?));
        }

        let len = frames.iter().map(DataFrame::len).sum();
        Ok(DataFrame {
            columns: first.columns.clone(),
            data,
            index: (0..len).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            ("x".to_string(), Series::from(vec!["b", "a", "b", "a"])),
            ("y".to_string(), Series::from(vec![1, 2, 3, 2])),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let err = DataFrame::new(vec![
            ("a".to_string(), Series::from(vec![1, 2])),
            ("b".to_string(), Series::from(vec![1])),
        ])
        .unwrap_err();
        assert!(matches!(err, PlyError::ValueError(_)));
    }

    #[test]
    fn test_take_keeps_labels() {
        let df = sample();
        let taken = df.take(&[3, 1]).unwrap();
        assert_eq!(taken.index(), &[3, 1]);
        assert_eq!(taken.get_column("y"), Some(&Series::from(vec![2, 2])));
    }

    #[test]
    fn test_take_out_of_bounds() {
        let df = sample();
        let err = df.take(&[0, 4]).unwrap_err();
        assert!(matches!(err, PlyError::ValueError(_)));
    }

    #[test]
    fn test_empty_like_keeps_row_count() {
        let df = sample();
        let mut base = df.empty_like();
        assert_eq!(base.shape(), (4, 0));
        base.set_column("z", Series::from(vec![true, false, true, false]))
            .unwrap();
        assert_eq!(base.shape(), (4, 1));
    }

    #[test]
    fn test_sort_indices_is_stable() {
        let df = sample();
        let order = df
            .sort_indices(&[df.column("x").unwrap().clone()])
            .unwrap();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_drop_duplicates_keep_policies() {
        let df = sample();
        let subset = vec!["x".to_string()];
        let first = df.drop_duplicates(Some(&subset), Keep::First).unwrap();
        assert_eq!(first.index(), &[0, 1]);
        let last = df.drop_duplicates(Some(&subset), Keep::Last).unwrap();
        assert_eq!(last.index(), &[2, 3]);
        let none = df.drop_duplicates(None, Keep::None).unwrap();
        assert_eq!(none.index(), &[0, 2]);
    }

    #[test]
    fn test_group_rows_sorted_by_key() {
        let df = sample();
        let groups = df.group_rows(&["x".to_string()]).unwrap();
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec![vec![Value::from("a")], vec![Value::from("b")]]);
        assert_eq!(groups[&vec![Value::from("b")]], vec![0, 2]);
    }

    #[test]
    fn test_concat_resets_index() {
        let df = sample();
        let out = DataFrame::concat(&[df.tail(1), df.head(2)]).unwrap();
        assert_eq!(out.index(), &[0, 1, 2]);
        assert_eq!(out.get_column("y"), Some(&Series::from(vec![2, 1, 2])));
    }

    #[test]
    fn test_insert_existing_column_fails() {
        let mut df = sample();
        assert!(df.insert_column(0, "x", Series::from(vec![0, 0, 0, 0])).is_err());
        df.insert_column(0, "k", Series::from(vec![0, 0, 0, 0])).unwrap();
        assert_eq!(df.columns()[0], "k");
    }

    #[test]
    fn test_rename_detects_collisions() {
        let mut df = sample();
        let err = df
            .rename(&[("x".to_string(), "y".to_string())])
            .unwrap_err();
        assert!(matches!(err, PlyError::ValueError(_)));
        assert!(df.rename(&[("nope".to_string(), "z".to_string())]).is_err());
    }
}
