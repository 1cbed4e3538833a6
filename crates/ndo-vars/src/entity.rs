//! typed records for each table
//!
//! Every entity is built once from a row (see [crate::normalize]) and never changed afterwards.
//! References to other entities are plain names here, they become links in [crate::resolve].
use crate::normalize::Fields;
use crate::Error;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

/// Column names shared by all tables
pub mod columns {
    pub const NAME: &str = "name";
    pub const SCHEMA: &str = "schema";
    pub const TEMPLATE: &str = "template";
    pub const VRF: &str = "vrf";
    pub const LAYER2_STRETCH: &str = "layer2_stretch";
    pub const UNICAST_ROUTING: &str = "unicast_routing";
    pub const BD_NAME: &str = "bd_name";
    pub const SITE_NAME: &str = "site_name";
    pub const SUBNET_IP: &str = "subnet_ip";
    pub const SCOPE: &str = "scope";
    pub const AP: &str = "ap";
    pub const BD: &str = "bd";
    pub const DESCRIPTION: &str = "description";
    pub const EPG_NAME: &str = "epg_name";
    pub const DOMAIN_TYPE: &str = "domain_type";
    pub const DOMAIN_NAME: &str = "domain_name";
    pub const VRF_SCHEMA: &str = "vrf_schema";
    pub const VRF_TEMPLATE: &str = "vrf_template";
    pub const BD_SCHEMA: &str = "bd_schema";
    pub const BD_TEMPLATE: &str = "bd_template";

    /// The (schema, template) columns that select the target template of a reference column
    pub fn qualifiers(reference: &str) -> Option<(&'static str, &'static str)> {
        match reference {
            VRF => Some((VRF_SCHEMA, VRF_TEMPLATE)),
            BD => Some((BD_SCHEMA, BD_TEMPLATE)),
            BD_NAME | EPG_NAME => Some((SCHEMA, TEMPLATE)),
            _ => None,
        }
    }
}

use columns::*;

/// The kind of entity a table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Vrf,
    BridgeDomain,
    Subnet,
    ApplicationProfile,
    EndpointGroup,
    DomainAssociation,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::Vrf,
        Kind::BridgeDomain,
        Kind::Subnet,
        Kind::ApplicationProfile,
        Kind::EndpointGroup,
        Kind::DomainAssociation,
    ];

    /// File name used when loading from or writing to a directory
    pub fn file_name(self) -> &'static str {
        match self {
            Kind::Vrf => "vrfs.csv",
            Kind::BridgeDomain => "bridge_domains.csv",
            Kind::Subnet => "bd_subnets.csv",
            Kind::ApplicationProfile => "anps.csv",
            Kind::EndpointGroup => "epgs.csv",
            Kind::DomainAssociation => "epg_domains.csv",
        }
    }

    /// Optional tables may be absent, which means "no rows"
    pub fn is_optional(self) -> bool {
        matches!(self, Kind::Subnet | Kind::DomainAssociation)
    }

    /// Columns in their canonical order
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Kind::Vrf => &[NAME, SCHEMA, TEMPLATE],
            Kind::BridgeDomain => &[
                NAME,
                SCHEMA,
                TEMPLATE,
                VRF,
                LAYER2_STRETCH,
                UNICAST_ROUTING,
            ],
            Kind::Subnet => &[BD_NAME, SITE_NAME, SUBNET_IP, SCOPE],
            Kind::ApplicationProfile => &[NAME, SCHEMA, TEMPLATE],
            Kind::EndpointGroup => &[NAME, SCHEMA, TEMPLATE, AP, BD, DESCRIPTION, VRF],
            Kind::DomainAssociation => &[EPG_NAME, SITE_NAME, DOMAIN_TYPE, DOMAIN_NAME],
        }
    }

    /// Columns that identify a row, used in error messages
    pub fn key_columns(self) -> &'static [&'static str] {
        match self {
            Kind::Vrf
            | Kind::BridgeDomain
            | Kind::ApplicationProfile
            | Kind::EndpointGroup => &[SCHEMA, TEMPLATE, NAME],
            Kind::Subnet => &[SCHEMA, TEMPLATE, BD_NAME, SITE_NAME, SUBNET_IP],
            Kind::DomainAssociation => &[
                SCHEMA,
                TEMPLATE,
                EPG_NAME,
                SITE_NAME,
                DOMAIN_TYPE,
                DOMAIN_NAME,
            ],
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Vrf => f.write_str("VRF"),
            Kind::BridgeDomain => f.write_str("bridge domain"),
            Kind::Subnet => f.write_str("subnet"),
            Kind::ApplicationProfile => f.write_str("application profile"),
            Kind::EndpointGroup => f.write_str("endpoint group"),
            Kind::DomainAssociation => f.write_str("domain association"),
        }
    }
}

/// Values that identify an entity (or a raw row)
///
/// Two entities of the same [Kind] with equal keys are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EntityKey(Vec<(&'static str, String)>);

impl EntityKey {
    pub fn push(&mut self, column: &'static str, value: impl ToString) {
        self.0.push((column, value.to_string()));
    }

    /// Build a key from whatever key columns a raw row has
    pub fn from_row(kind: Kind, row: &crate::tables::Row) -> Self {
        let mut key = Self::default();
        for column in kind.key_columns() {
            if let Some(value) = row.get(*column).filter(|value| !value.is_empty()) {
                key.push(column, value);
            }
        }
        key
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (position, (column, value)) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}={value}")?;
        }
        f.write_str("]")
    }
}

/// A (schema, template) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateRef {
    pub schema: String,
    pub template: String,
}

impl TemplateRef {
    pub fn new(schema: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            template: template.into(),
        }
    }
}

impl std::fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.schema, self.template)
    }
}

/// A record type that can be built from a table row
pub trait Entity: Sized {
    const KIND: Kind;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error>;

    /// Identifies the record in messages
    ///
    /// For entities with a template of their own this is also the uniqueness key. Subnets and
    /// domain associations are unique per resolved parent instead (see [crate::resolve]).
    fn key(&self) -> EntityKey;
}

/// Entities that live in a template and are referenced by name
pub trait Scoped {
    fn name(&self) -> &str;
    fn template(&self) -> &TemplateRef;
}

/// A closed set of accepted cell values
pub trait Vocabulary: Sized + Copy + 'static {
    const VALUES: &'static [(&'static str, Self)];

    /// Canonical spelling, as written to output
    fn as_str(self) -> &'static str;

    fn allowed() -> Vec<&'static str> {
        Self::VALUES.iter().map(|(text, _)| *text).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetScope {
    Public,
    Private,
}

impl Vocabulary for SubnetScope {
    const VALUES: &'static [(&'static str, Self)] =
        &[("public", SubnetScope::Public), ("private", SubnetScope::Private)];

    fn as_str(self) -> &'static str {
        match self {
            SubnetScope::Public => "public",
            SubnetScope::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    Physical,
    Vmm,
}

impl Vocabulary for DomainType {
    const VALUES: &'static [(&'static str, Self)] =
        &[("physical", DomainType::Physical), ("vmm", DomainType::Vmm)];

    fn as_str(self) -> &'static str {
        match self {
            DomainType::Physical => "physical",
            DomainType::Vmm => "vmm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vrf {
    pub name: String,
    pub template: TemplateRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeDomain {
    pub name: String,
    pub template: TemplateRef,
    pub vrf: String,
    /// Template of `vrf`, from `vrf_schema`/`vrf_template`
    pub vrf_qualifier: Option<TemplateRef>,
    pub layer2_stretch: bool,
    pub unicast_routing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub bd_name: String,
    pub site_name: String,
    pub subnet_ip: IpNet,
    pub scope: SubnetScope,
    /// Optional scope qualifier for `bd_name`
    pub template: Option<TemplateRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationProfile {
    pub name: String,
    pub template: TemplateRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointGroup {
    pub name: String,
    pub template: TemplateRef,
    pub ap: String,
    pub bd: String,
    pub bd_qualifier: Option<TemplateRef>,
    pub description: String,
    pub vrf: String,
    pub vrf_qualifier: Option<TemplateRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAssociation {
    pub epg_name: String,
    pub site_name: String,
    pub domain_type: DomainType,
    pub domain_name: String,
    /// Optional scope qualifier for `epg_name`
    pub template: Option<TemplateRef>,
}

fn scoped_key(template: &TemplateRef, name: &str) -> EntityKey {
    let mut key = EntityKey::default();
    key.push(SCHEMA, &template.schema);
    key.push(TEMPLATE, &template.template);
    key.push(NAME, name);
    key
}

fn qualifier_key(template: &Option<TemplateRef>) -> EntityKey {
    let mut key = EntityKey::default();
    if let Some(template) = template {
        key.push(SCHEMA, &template.schema);
        key.push(TEMPLATE, &template.template);
    }
    key
}

impl Entity for Vrf {
    const KIND: Kind = Kind::Vrf;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            name: fields.required(NAME)?,
            template: fields.template()?,
        })
    }

    fn key(&self) -> EntityKey {
        scoped_key(&self.template, &self.name)
    }
}

impl Entity for BridgeDomain {
    const KIND: Kind = Kind::BridgeDomain;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            name: fields.required(NAME)?,
            template: fields.template()?,
            vrf: fields.required(VRF)?,
            vrf_qualifier: fields.qualifier(VRF_SCHEMA, VRF_TEMPLATE)?,
            layer2_stretch: fields.boolean(LAYER2_STRETCH)?,
            unicast_routing: fields.boolean(UNICAST_ROUTING)?,
        })
    }

    fn key(&self) -> EntityKey {
        scoped_key(&self.template, &self.name)
    }
}

impl Entity for Subnet {
    const KIND: Kind = Kind::Subnet;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            bd_name: fields.required(BD_NAME)?,
            site_name: fields.required(SITE_NAME)?,
            subnet_ip: fields.cidr(SUBNET_IP)?,
            scope: fields.choice(SCOPE)?,
            template: fields.qualifier(SCHEMA, TEMPLATE)?,
        })
    }

    fn key(&self) -> EntityKey {
        let mut key = qualifier_key(&self.template);
        key.push(BD_NAME, &self.bd_name);
        key.push(SITE_NAME, &self.site_name);
        key.push(SUBNET_IP, self.subnet_ip);
        key
    }
}

impl Entity for ApplicationProfile {
    const KIND: Kind = Kind::ApplicationProfile;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            name: fields.required(NAME)?,
            template: fields.template()?,
        })
    }

    fn key(&self) -> EntityKey {
        scoped_key(&self.template, &self.name)
    }
}

impl Entity for EndpointGroup {
    const KIND: Kind = Kind::EndpointGroup;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            name: fields.required(NAME)?,
            template: fields.template()?,
            ap: fields.required(AP)?,
            bd: fields.required(BD)?,
            bd_qualifier: fields.qualifier(BD_SCHEMA, BD_TEMPLATE)?,
            description: fields.optional(DESCRIPTION).unwrap_or_default(),
            vrf: fields.required(VRF)?,
            vrf_qualifier: fields.qualifier(VRF_SCHEMA, VRF_TEMPLATE)?,
        })
    }

    fn key(&self) -> EntityKey {
        scoped_key(&self.template, &self.name)
    }
}

impl Entity for DomainAssociation {
    const KIND: Kind = Kind::DomainAssociation;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            epg_name: fields.required(EPG_NAME)?,
            site_name: fields.required(SITE_NAME)?,
            domain_type: fields.choice(DOMAIN_TYPE)?,
            domain_name: fields.required(DOMAIN_NAME)?,
            template: fields.qualifier(SCHEMA, TEMPLATE)?,
        })
    }

    fn key(&self) -> EntityKey {
        let mut key = qualifier_key(&self.template);
        key.push(EPG_NAME, &self.epg_name);
        key.push(SITE_NAME, &self.site_name);
        key.push(DOMAIN_TYPE, self.domain_type.as_str());
        key.push(DOMAIN_NAME, &self.domain_name);
        key
    }
}

macro_rules! impl_scoped {
    ($($entity:ty),+) => {
        $(
            impl Scoped for $entity {
                fn name(&self) -> &str {
                    &self.name
                }

                fn template(&self) -> &TemplateRef {
                    &self.template
                }
            }
        )+
    };
}

impl_scoped!(Vrf, BridgeDomain, ApplicationProfile, EndpointGroup);

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_display() {
        let vrf = Vrf {
            name: "VRF1".into(),
            template: TemplateRef::new("S1", "T1"),
        };
        assert_eq!(vrf.key().to_string(), "[schema=S1, template=T1, name=VRF1]");
    }

    #[test]
    fn qualified_subnet_key_differs() {
        let mut subnet = Subnet {
            bd_name: "BD1".into(),
            site_name: "Site1".into(),
            subnet_ip: "10.1.1.0/24".parse().unwrap(),
            scope: SubnetScope::Private,
            template: None,
        };
        let unqualified = subnet.key();
        subnet.template = Some(TemplateRef::new("S1", "T1"));
        assert!(unqualified != subnet.key());
    }

    #[test]
    fn vocabulary_strings() {
        assert_eq!(SubnetScope::Private.as_str(), "private");
        assert_eq!(DomainType::Vmm.as_str(), "vmm");
        assert_eq!(DomainType::allowed(), vec!["physical", "vmm"]);
    }

    #[test]
    fn optional_tables() {
        let optional: Vec<_> = Kind::ALL.into_iter().filter(|k| k.is_optional()).collect();
        assert_eq!(optional, vec![Kind::Subnet, Kind::DomainAssociation]);
    }
}
