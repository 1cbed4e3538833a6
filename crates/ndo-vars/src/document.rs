//! the assembled configuration tree
//!
//! ```yaml
//! <schema>:
//!   <template>:
//!     vrfs: [...]
//!     bridge_domains: [{..., subnets: [...]}]
//!     application_profiles: [{..., endpoint_groups: [{..., domain_associations: [...]}]}]
//! ```
//!
//! Maps keep insertion order. References to other entities are names; a `*_template` field is only
//! present when the referenced entity lives in another template.
use crate::entity::{DomainType, SubnetScope, TemplateRef};
use indexmap::IndexMap;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    schemas: IndexMap<String, Schema>,
}

impl Document {
    pub fn schemas(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
    }

    /// All templates, schema by schema
    pub fn templates(&self) -> impl Iterator<Item = (TemplateRef, &Template)> {
        self.schemas.iter().flat_map(|(schema_name, schema)| {
            schema.templates.iter().map(move |(template_name, template)| {
                (
                    TemplateRef::new(schema_name.as_str(), template_name.as_str()),
                    template,
                )
            })
        })
    }

    pub fn get(&self, schema: &str, template: &str) -> Option<&Template> {
        self.schemas.get(schema).and_then(|s| s.get(template))
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for (_, template) in self.templates() {
            summary.vrfs += template.vrfs.len();
            summary.bridge_domains += template.bridge_domains.len();
            summary.application_profiles += template.application_profiles.len();
            for bd in &template.bridge_domains {
                summary.subnets += bd.subnets.len();
            }
            for ap in &template.application_profiles {
                summary.endpoint_groups += ap.endpoint_groups.len();
                for epg in &ap.endpoint_groups {
                    summary.domain_associations += epg.domain_associations.len();
                }
            }
        }
        summary
    }

    /// Get or create a template node
    pub(crate) fn template_mut(&mut self, template: &TemplateRef) -> &mut Template {
        self.schemas
            .entry(template.schema.clone())
            .or_default()
            .templates
            .entry(template.template.clone())
            .or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    templates: IndexMap<String, Template>,
}

impl Schema {
    pub fn templates(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates
            .iter()
            .map(|(name, template)| (name.as_str(), template))
    }

    pub fn get(&self, template: &str) -> Option<&Template> {
        self.templates.get(template)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub vrfs: Vec<VrfNode>,
    pub bridge_domains: Vec<BridgeDomainNode>,
    pub application_profiles: Vec<ApplicationProfileNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrfNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeDomainNode {
    pub name: String,
    pub vrf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrf_template: Option<TemplateRef>,
    pub layer2_stretch: bool,
    pub unicast_routing: bool,
    #[serde(default)]
    pub subnets: Vec<SubnetNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetNode {
    pub site_name: String,
    pub subnet_ip: IpNet,
    pub scope: SubnetScope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationProfileNode {
    pub name: String,
    #[serde(default)]
    pub endpoint_groups: Vec<EndpointGroupNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointGroupNode {
    pub name: String,
    pub bd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bd_template: Option<TemplateRef>,
    #[serde(default)]
    pub description: String,
    pub vrf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrf_template: Option<TemplateRef>,
    #[serde(default)]
    pub domain_associations: Vec<DomainAssociationNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAssociationNode {
    pub site_name: String,
    pub domain_type: DomainType,
    pub domain_name: String,
}

/// Entity counts of a [Document]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub vrfs: usize,
    pub bridge_domains: usize,
    pub subnets: usize,
    pub application_profiles: usize,
    pub endpoint_groups: usize,
    pub domain_associations: usize,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  - VRFs: {}", self.vrfs)?;
        writeln!(f, "  - Bridge Domains: {}", self.bridge_domains)?;
        writeln!(f, "  - Subnets: {}", self.subnets)?;
        writeln!(f, "  - ANPs: {}", self.application_profiles)?;
        writeln!(f, "  - EPGs: {}", self.endpoint_groups)?;
        write!(f, "  - Domain Associations: {}", self.domain_associations)
    }
}
