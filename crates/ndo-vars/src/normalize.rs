//! rows to typed records
use crate::entity::{
    columns, ApplicationProfile, BridgeDomain, DomainAssociation, EndpointGroup, Entity,
    EntityKey, Kind, Subnet, TemplateRef, Vocabulary, Vrf,
};
use crate::error::{Error, Origin};
use crate::tables::{Location, Row, Table, Tables};
use ipnet::IpNet;

/// A typed record and the row it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct Record<E> {
    pub location: Location,
    pub entity: E,
}

/// All normalized records, each list in input order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Records {
    pub vrfs: Vec<Record<Vrf>>,
    pub bridge_domains: Vec<Record<BridgeDomain>>,
    pub subnets: Vec<Record<Subnet>>,
    pub application_profiles: Vec<Record<ApplicationProfile>>,
    pub endpoint_groups: Vec<Record<EndpointGroup>>,
    pub domain_associations: Vec<Record<DomainAssociation>>,
}

impl Records {
    pub fn from_tables(tables: &Tables) -> Result<Self, Error> {
        Ok(Self {
            vrfs: normalize_kind(tables)?,
            bridge_domains: normalize_kind(tables)?,
            subnets: normalize_kind(tables)?,
            application_profiles: normalize_kind(tables)?,
            endpoint_groups: normalize_kind(tables)?,
            domain_associations: normalize_kind(tables)?,
        })
    }
}

fn normalize_kind<E: Entity>(tables: &Tables) -> Result<Vec<Record<E>>, Error> {
    match tables.get(E::KIND) {
        Some(table) => normalize(table),
        None if E::KIND.is_optional() => {
            tracing::debug!(kind=%E::KIND, "optional table absent");
            Ok(vec![])
        }
        None => Err(Error::MissingTable(E::KIND)),
    }
}

/// Normalize every row of a table, stopping at the first bad row
pub fn normalize<E: Entity>(table: &Table) -> Result<Vec<Record<E>>, Error> {
    let records = table
        .rows()
        .map(|(location, row)| normalize_row(location, row))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(kind=%E::KIND, count = records.len(), "normalized");
    Ok(records)
}

pub fn normalize_row<E: Entity>(location: Location, row: &Row) -> Result<Record<E>, Error> {
    let fields = Fields::new(E::KIND, &location, row);
    let entity = E::from_fields(&fields)?;
    Ok(Record { location, entity })
}

/// Typed access to the cells of one row
pub struct Fields<'r> {
    kind: Kind,
    location: &'r Location,
    row: &'r Row,
}

impl<'r> Fields<'r> {
    pub fn new(kind: Kind, location: &'r Location, row: &'r Row) -> Self {
        Self {
            kind,
            location,
            row,
        }
    }

    fn origin(&self) -> Origin {
        Origin::new(
            self.kind,
            EntityKey::from_row(self.kind, self.row),
            self.location.clone(),
        )
    }

    fn malformed(&self, column: &'static str, reason: &str) -> Error {
        Error::MalformedRow {
            origin: self.origin(),
            column,
            reason: reason.to_string(),
        }
    }

    fn value(&self, column: &'static str) -> Result<&'r str, Error> {
        match self.row.get(column) {
            None => Err(self.malformed(column, "is missing")),
            Some(value) if value.is_empty() => Err(self.malformed(column, "is empty")),
            Some(value) => Ok(value.as_str()),
        }
    }

    pub fn required(&self, column: &'static str) -> Result<String, Error> {
        self.value(column).map(str::to_string)
    }

    /// `None` for a missing column or an empty cell
    pub fn optional(&self, column: &'static str) -> Option<String> {
        self.row
            .get(column)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    pub fn boolean(&self, column: &'static str) -> Result<bool, Error> {
        let value = self.value(column)?;
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(Error::InvalidBoolean {
                origin: self.origin(),
                column,
                value: value.to_string(),
            })
        }
    }

    /// A network address with prefix length, host bits are kept
    pub fn cidr(&self, column: &'static str) -> Result<IpNet, Error> {
        let value = self.value(column)?;
        value.parse().map_err(|error: ipnet::AddrParseError| Error::InvalidCidr {
            origin: self.origin(),
            column,
            value: value.to_string(),
            reason: error.to_string(),
        })
    }

    /// One of the values of `V`, compared case-insensitively
    pub fn choice<V: Vocabulary>(&self, column: &'static str) -> Result<V, Error> {
        let value = self.value(column)?;
        V::VALUES
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(value))
            .map(|(_, choice)| *choice)
            .ok_or_else(|| Error::InvalidEnum {
                origin: self.origin(),
                column,
                value: value.to_string(),
                allowed: V::allowed(),
            })
    }

    /// The required (schema, template) pair
    pub fn template(&self) -> Result<TemplateRef, Error> {
        Ok(TemplateRef::new(
            self.required(columns::SCHEMA)?,
            self.required(columns::TEMPLATE)?,
        ))
    }

    /// An optional (schema, template) pair from the given columns, both or neither must be given
    pub fn qualifier(
        &self,
        schema_column: &'static str,
        template_column: &'static str,
    ) -> Result<Option<TemplateRef>, Error> {
        match (self.optional(schema_column), self.optional(template_column)) {
            (Some(schema), Some(template)) => Ok(Some(TemplateRef::new(schema, template))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(self.malformed(
                template_column,
                &format!("is required when {schema_column} is given"),
            )),
            (None, Some(_)) => Err(self.malformed(
                schema_column,
                &format!("is required when {template_column} is given"),
            )),
        }
    }
}
