//! collection of tables (rows and path to source file)
//!
//! [Tables] tracks per [Kind]
//! - the source path
//! - the rows, in input order
//! and gives each row a [Location]. Once added rows keep their position (removal is not possible)
use crate::entity::Kind;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// A single row: column name to cell value
pub type Row = IndexMap<String, String>;

pub type Source = Option<PathBuf>;

/// Where a row came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub source: Source,
    /// 1-based, not counting the header line
    pub row: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(path) => write!(f, "{} row {}", path.display(), self.row),
            None => write!(f, "row {}", self.row),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Table {
    source: Source,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            rows: Default::default(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> impl Iterator<Item = (Location, &Row)> {
        self.rows.iter().enumerate().map(|(index, row)| {
            (
                Location {
                    source: self.source.clone(),
                    row: index + 1,
                },
                row,
            )
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column order for writing: the canonical columns of `kind`, then extra columns as they appear
    pub fn columns(&self, kind: Kind) -> Vec<&str> {
        let mut columns: Vec<&str> = kind.columns().to_vec();
        for row in &self.rows {
            for column in row.keys() {
                if !columns.contains(&column.as_str()) {
                    columns.push(column);
                }
            }
        }
        columns
    }

    /// Read a table with a header line. Cells are trimmed.
    pub fn from_csv<R: std::io::Read>(reader: R, source: Source) -> Result<Self, LoadError> {
        let parse_failed = |error| LoadError::CsvParseFailed {
            path: source.clone(),
            source: error,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers().map_err(parse_failed)?.clone();

        let mut rows = vec![];
        for record in reader.records() {
            let record = record.map_err(parse_failed)?;
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect();
            tracing::trace!(?row, "read row");
            rows.push(row);
        }

        Ok(Self { source, rows })
    }

    pub fn write_csv<W: std::io::Write>(&self, kind: Kind, writer: W) -> Result<(), LoadError> {
        let columns = self.columns(kind);
        let mut writer = csv::Writer::from_writer(writer);

        writer
            .write_record(&columns)
            .map_err(LoadError::CsvWriteFailed)?;
        for row in &self.rows {
            writer
                .write_record(
                    columns
                        .iter()
                        .map(|column| row.get(*column).map(String::as_str).unwrap_or_default()),
                )
                .map_err(LoadError::CsvWriteFailed)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// One table per [Kind]
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Tables {
    tables: IndexMap<Kind, Table>,
}

impl Tables {
    /// Inserts a table, replacing any previous table of the same kind
    pub fn insert(&mut self, kind: Kind, table: Table) -> Option<Table> {
        self.tables.insert(kind, table)
    }

    /// Appends a row, creating a table without source if needed
    pub fn push_row(&mut self, kind: Kind, row: Row) {
        self.tables.entry(kind).or_default().push(row);
    }

    pub fn get(&self, kind: Kind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Kind, &Table)> {
        self.tables.iter().map(|(kind, table)| (*kind, table))
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn row_count(&self) -> usize {
        self.tables.values().map(Table::len).sum()
    }
}

impl Tables {
    pub fn load_file(&mut self, kind: Kind, file_path: &Path) -> Result<(), LoadError> {
        let open_failed = |source: std::io::Error| LoadError::OpenFailed {
            path: file_path.to_path_buf(),
            source,
        };

        let file_path = file_path.canonicalize().map_err(open_failed)?;
        tracing::info!(path=%file_path.display(), %kind, "loading file");

        let file = std::fs::File::open(&file_path).map_err(open_failed)?;
        let table = Table::from_csv(file, Some(file_path))?;

        self.insert(kind, table);
        Ok(())
    }

    /// Loads every table whose default file name exists in `dir_path`
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut any_files_loaded = false;

        for kind in Kind::ALL {
            let file_path = dir_path.join(kind.file_name());
            if !file_path.is_file() {
                tracing::debug!(path=%file_path.display(), "no such table file");
                continue;
            }

            self.load_file(kind, &file_path)?;
            any_files_loaded = true;
        }

        if !any_files_loaded {
            return Err(LoadError::NoFilesFound(dir_path.to_path_buf()));
        }

        Ok(())
    }

    /// Writes every table to its default file name in `dir_path`
    pub fn write_directory(&self, dir_path: &Path) -> Result<(), LoadError> {
        std::fs::create_dir_all(dir_path)?;

        for (kind, table) in self.iter() {
            let file_path = dir_path.join(kind.file_name());
            tracing::info!(path=%file_path.display(), rows = table.len(), "writing file");
            table.write_csv(kind, std::fs::File::create(&file_path)?)?;
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No table files found in {}", .0.display())]
    NoFilesFound(PathBuf),
    #[error("Unable to open {}", .path.display())]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse csv from {}", display_source(.path))]
    CsvParseFailed { path: Source, source: csv::Error },
    #[error("Unable to write csv")]
    CsvWriteFailed(#[source] csv::Error),
}

fn display_source(source: &Source) -> String {
    match source {
        Some(path) => path.display().to_string(),
        None => "input".to_string(),
    }
}

/// Utility macro to create [Tables] from csv text
///
/// ```
/// # use ndo_vars::tables;
/// let tables = tables! {
///   Vrf => "name,schema,template\nVRF1,S1,T1",
///   ApplicationProfile => "name,schema,template\nAP1,S1,T1",
/// };
/// assert_eq!(tables.table_count(), 2);
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use ndo_vars::tables;
/// tables! { Vrf => "name,schema\nVRF1" };
/// ```
#[macro_export]
macro_rules! tables {
    { $($kind:ident => $csv:expr),+ $(,)? } => {{
        let mut tables = $crate::tables::Tables::default();
        $(
            tables.insert(
                $crate::entity::Kind::$kind,
                $crate::tables::Table::from_csv($csv.as_bytes(), None).expect("csv must parse"),
            );
        )+

        tables
    }};
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn locations() {
        let tables = tables! {
            Vrf => "name, schema ,template\n VRF1 ,S1,T1\nVRF2,S1,T1\n",
        };
        let table = tables.get(Kind::Vrf).unwrap();

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].0.row, 2);
        assert_eq!(rows[1].0.to_string(), "row 2");
        assert_eq!(rows[0].1.get("name").map(String::as_str), Some("VRF1"));
        assert_eq!(rows[0].1.get("schema").map(String::as_str), Some("S1"));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vrfs.csv"), "name,schema,template\nVRF1,S1,T1\n").unwrap();
        std::fs::write(dir.path().join("unrelated.csv"), "a,b\n1,2\n").unwrap();

        let mut tables = Tables::default();
        tables.load_directory(dir.path()).unwrap();

        assert_eq!(tables.table_count(), 1);
        let table = tables.get(Kind::Vrf).unwrap();
        assert!(table.source().unwrap().ends_with("vrfs.csv"));
        let (location, _) = table.rows().next().unwrap();
        assert!(location.to_string().ends_with("vrfs.csv row 1"));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("my_vrfs.csv");

        let error = Tables::default()
            .load_file(Kind::Vrf, &file_path)
            .unwrap_err();

        let LoadError::OpenFailed { path, .. } = &error else {
            panic!("unexpected error {error:?}");
        };
        assert_eq!(path, &file_path);
        assert!(error.to_string().ends_with("my_vrfs.csv"));
    }

    #[test]
    fn load_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let error = Tables::default().load_directory(dir.path()).unwrap_err();
        assert!(matches!(error, LoadError::NoFilesFound(_)));
    }

    #[test]
    fn write_keeps_extra_columns() {
        let tables = tables! {
            Subnet => "site_name,bd_name,subnet_ip,scope,template,schema\nSite1,BD1,10.0.0.1/24,public,T1,S1",
        };
        let dir = tempfile::tempdir().unwrap();
        tables.write_directory(dir.path()).unwrap();

        let written = std::fs::read_to_string(dir.path().join("bd_subnets.csv")).unwrap();
        assert_eq!(
            written,
            "bd_name,site_name,subnet_ip,scope,template,schema\nBD1,Site1,10.0.0.1/24,public,T1,S1\n"
        );
    }
}
