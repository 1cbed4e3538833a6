//! # ndo-vars - spreadsheet tables to NDO schema variables
//!
//! Operators keep fabric configuration (VRFs, bridge domains, subnets, application profiles,
//! endpoint groups and their domain associations) in CSV files. `ndo-vars` checks how those
//! tables refer to each other and builds one nested document for the NDO playbooks.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `ndo-vars` works internally.
//!
//! ### Terms
//!
//! - a **table** is one CSV file, one per entity [Kind](entity::Kind)
//! - a **row** maps column names to cell values, all strings
//! - a **template** is a (schema, template) pair, [TemplateRef](entity::TemplateRef). It
//!   partitions the output: schema → template → entities
//! - a **reference** is a column holding the name of another entity, e.g. the `vrf` of a bridge
//!   domain
//!
//! ### Loading files
//!
//! see [tables::Tables]
//!
//! Each file is read into a [tables::Table], which keeps the rows in input order and the path of
//! the file. Together they give every row a [tables::Location] used in error messages. At this
//! point a file only has to be valid CSV with a header line.
//!
//! ### Normalizing
//!
//! see [normalize::Records::from_tables]
//!
//! Each row becomes a typed record ([entity]). Required columns must be present and non-empty,
//! booleans are `true`/`false` (any case), `subnet_ip` is a CIDR, `scope` and `domain_type` come
//! from a fixed vocabulary. Unknown columns are ignored. The first bad row ends the run.
//!
//! The subnet and domain association tables are optional, a missing table has no rows.
//!
//! ### Resolving
//!
//! see [resolve::resolve]
//!
//! First every table is checked for duplicate keys. Then references are looked up:
//!
//! | **record**         | **column** | **target**          | **lookup**                    |
//! |--------------------|------------|---------------------|-------------------------------|
//! | bridge domain      | `vrf`      | VRF                 | own template, then everywhere |
//! | endpoint group     | `ap`       | application profile | own template only             |
//! | endpoint group     | `bd`       | bridge domain       | own template, then everywhere |
//! | endpoint group     | `vrf`      | VRF                 | own template, then everywhere |
//! | subnet             | `bd_name`  | bridge domain       | everywhere, or qualifier      |
//! | domain association | `epg_name` | endpoint group      | everywhere, or qualifier      |
//!
//! "Everywhere" has to find exactly one entity. When a name exists in several templates the row
//! needs to say which one it means: subnets and domain associations accept optional `schema` and
//! `template` columns for that.
//!
//! The result is a side table of indices ([resolve::Links]); records are never changed.
//!
//! ### Assembling
//!
//! see [assemble::assemble]
//!
//! Records are placed into a [document::Document]. Templates appear in the order they are first
//! used (VRFs, then bridge domains, application profiles and endpoint groups), entities and their
//! children keep input order.
//!
//! ### Output
//!
//! The document is serialized via [serde]. [ndo::NdoVars] renders the flat `ndo_schema_data`
//! layout instead, and [flatten::flatten] turns a document back into tables.
//!
pub mod assemble;
pub mod document;
pub mod entity;
pub mod error;
pub mod flatten;
pub mod ndo;
pub mod normalize;
pub mod resolve;
pub mod tables;

pub use error::Error;

/// Normalize, resolve and assemble
#[tracing::instrument(level = "debug", skip_all, fields(rows = tables.row_count()))]
pub fn convert(tables: &tables::Tables) -> Result<document::Document, Error> {
    let records = normalize::Records::from_tables(tables)?;
    let links = resolve::resolve(&records)?;
    Ok(assemble::assemble(&records, &links))
}
