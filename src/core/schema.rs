// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Table metadata consumed by the analyzer
//!
//! [`TableMetadata`] is the narrow view of a table the analyzer needs: the
//! column list, the designated timestamp, which symbol columns carry a
//! secondary index, and whether NULL may be used as a key value. [`Schema`]
//! is the in-memory implementation, built with [`SchemaBuilder`].

use std::fmt;

use rustc_hash::FxHashMap;

use super::types::DataType;

/// Read-only table metadata
pub trait TableMetadata {
    /// Number of columns
    fn column_count(&self) -> usize;

    /// Column at `index`; `index` must be below `column_count()`
    fn column(&self, index: usize) -> &SchemaColumn;

    /// Resolve a column name, ignoring case
    fn column_index(&self, name: &str) -> Option<usize>;

    /// Index of the designated timestamp column, if any
    fn timestamp_index(&self) -> Option<usize>;

    /// Whether NULL is accepted as a key value for index lookups
    fn accepts_null_keys(&self) -> bool;

    /// Name of the designated timestamp column
    fn timestamp_name(&self) -> Option<&str> {
        self.timestamp_index()
            .map(|index| self.column(index).name.as_str())
    }

    /// Whether `name` refers to the designated timestamp
    fn is_timestamp(&self, name: &str) -> bool {
        self.timestamp_name()
            .is_some_and(|ts| ts.eq_ignore_ascii_case(name))
    }
}

/// A column definition in a table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    /// Unique identifier for the column (0-based index)
    pub id: usize,

    /// Column name
    pub name: String,

    /// Data type of the column
    pub data_type: DataType,

    /// Whether the column has a secondary index
    pub indexed: bool,
}

impl SchemaColumn {
    /// Create a new column definition
    pub fn new(id: usize, name: impl Into<String>, data_type: DataType, indexed: bool) -> Self {
        Self {
            id,
            name: name.into(),
            data_type,
            indexed,
        }
    }

    /// Returns true for symbol columns with a secondary index
    pub fn is_indexed_symbol(&self) -> bool {
        self.indexed && self.data_type == DataType::Symbol
    }
}

impl fmt::Display for SchemaColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if self.indexed {
            write!(f, " INDEX")?;
        }
        Ok(())
    }
}

/// Table schema definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Name of the table
    pub table_name: String,

    /// Column definitions
    pub columns: Vec<SchemaColumn>,

    /// Designated timestamp column
    timestamp_index: Option<usize>,

    /// Explicit NULL-key capability, derived from the timestamp when unset
    null_keys: Option<bool>,

    /// Lowercase column name -> index
    column_index_map: FxHashMap<String, usize>,
}

impl Schema {
    /// Create a new schema with the given table name and columns
    pub fn new(table_name: impl Into<String>, columns: Vec<SchemaColumn>) -> Self {
        let column_index_map = columns
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.name.to_lowercase(), idx))
            .collect();
        Self {
            table_name: table_name.into(),
            columns,
            timestamp_index: None,
            null_keys: None,
            column_index_map,
        }
    }

    /// Find a column by name (case-insensitive)
    pub fn find_column(&self, name: &str) -> Option<(usize, &SchemaColumn)> {
        let idx = *self.column_index_map.get(&name.to_lowercase())?;
        Some((idx, &self.columns[idx]))
    }

    /// Get a column by index
    pub fn get_column(&self, index: usize) -> Option<&SchemaColumn> {
        self.columns.get(index)
    }

    /// Get the data type of a column by name
    pub fn get_column_type(&self, name: &str) -> Option<DataType> {
        self.find_column(name).map(|(_, col)| col.data_type)
    }

    /// Check if a column exists by name
    pub fn has_column(&self, name: &str) -> bool {
        self.find_column(name).is_some()
    }
}

impl TableMetadata for Schema {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column(&self, index: usize) -> &SchemaColumn {
        &self.columns[index]
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.find_column(name).map(|(idx, _)| idx)
    }

    fn timestamp_index(&self) -> Option<usize> {
        self.timestamp_index
    }

    fn accepts_null_keys(&self) -> bool {
        self.null_keys.unwrap_or(self.timestamp_index.is_some())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.table_name)?;
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", col)?;
        }
        write!(f, ")")?;
        if let Some(name) = self.timestamp_name() {
            write!(f, " timestamp({})", name)?;
        }
        Ok(())
    }
}

/// Builder for creating schemas more ergonomically
pub struct SchemaBuilder {
    table_name: String,
    columns: Vec<SchemaColumn>,
    timestamp: Option<String>,
    null_keys: Option<bool>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            timestamp: None,
            null_keys: None,
        }
    }

    /// Add a column
    pub fn column(mut self, name: impl Into<String>, data_type: DataType, indexed: bool) -> Self {
        let id = self.columns.len();
        self.columns
            .push(SchemaColumn::new(id, name, data_type, indexed));
        self
    }

    /// Add an unindexed column
    pub fn add(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.column(name, data_type, false)
    }

    /// Add a symbol column with a secondary index
    pub fn add_indexed_symbol(self, name: impl Into<String>) -> Self {
        self.column(name, DataType::Symbol, true)
    }

    /// Add a timestamp column and make it the designated timestamp
    pub fn add_designated_timestamp(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.timestamp = Some(name.clone());
        self.column(name, DataType::Timestamp, false)
    }

    /// Override the NULL key capability
    pub fn null_keys(mut self, accepted: bool) -> Self {
        self.null_keys = Some(accepted);
        self
    }

    /// Build the schema
    pub fn build(self) -> Schema {
        let mut schema = Schema::new(self.table_name, self.columns);
        schema.timestamp_index = self
            .timestamp
            .and_then(|name| schema.find_column(&name).map(|(idx, _)| idx));
        schema.null_keys = self.null_keys;
        schema
    }
}
