use super::Select;
use crate::dataframe::Dataset;
use crate::error::{PlyError, Result};
use regex::Regex;
use std::collections::HashSet;

/// Empty criteria select nothing.
fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

pub(super) fn select(data: &Dataset, spec: &Select) -> Result<Dataset> {
    let pattern = criterion(&spec.matches)
        .map(Regex::new)
        .transpose()
        .map_err(|e| PlyError::value(format!("invalid pattern: {}", e)))?;
    let names: HashSet<&str> = spec.names.iter().map(String::as_str).collect();
    let groups: HashSet<&str> = data.groups().iter().map(String::as_str).collect();
    let startswith = criterion(&spec.startswith);
    let endswith = criterion(&spec.endswith);
    let contains = criterion(&spec.contains);

    let mask: Vec<bool> = data
        .frame()
        .columns()
        .iter()
        .map(|col| {
            let selected = names.contains(col.as_str())
                || startswith.is_some_and(|p| col.starts_with(p))
                || endswith.is_some_and(|s| col.ends_with(s))
                || contains.is_some_and(|c| col.contains(c))
                || pattern
                    .as_ref()
                    .is_some_and(|re| re.find(col).is_some_and(|m| m.start() == 0))
                || groups.contains(col.as_str());
            selected != spec.drop
        })
        .collect();

    let frame = data.frame().select_mask(&mask)?;
    Ok(data.retag(frame))
}
