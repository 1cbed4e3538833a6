//! the `ndo_schema_data` variables layout
//!
//! Flat lists in which every entry repeats its schema and template. Subnets and domain
//! associations are grouped per site. This is the layout the NDO schema playbooks read.
use crate::document::Document;
use crate::entity::{DomainType, SubnetScope};
use indexmap::IndexMap;
use ipnet::IpNet;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdoVars {
    pub ndo_schema_data: SchemaData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaData {
    pub vrfs: Vec<Vrf>,
    pub bridge_domains: Vec<BridgeDomain>,
    pub anps: Vec<Anp>,
    pub epgs: Vec<Epg>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vrf {
    pub name: String,
    pub schema: String,
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeDomain {
    pub name: String,
    pub schema: String,
    pub template: String,
    pub vrf: String,
    pub layer2_stretch: bool,
    pub unicast_routing: bool,
    pub sites: Vec<BridgeDomainSite>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeDomainSite {
    pub name: String,
    pub subnets: Vec<Subnet>,
    /// always empty, rendered as `null`
    pub l3outs: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subnet {
    pub ip: IpNet,
    pub scope: SubnetScope,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anp {
    pub name: String,
    pub schema: String,
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Epg {
    pub name: String,
    pub schema: String,
    pub template: String,
    pub ap: String,
    pub bd: String,
    pub description: String,
    pub vrf: String,
    pub sites: Vec<EpgSite>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpgSite {
    pub name: String,
    pub phys_domain_association: Vec<String>,
    pub vmm_domain_association: Vec<String>,
}

impl From<&Document> for NdoVars {
    fn from(document: &Document) -> Self {
        let mut data = SchemaData::default();

        for (template_ref, template) in document.templates() {
            let schema = &template_ref.schema;
            let template_name = &template_ref.template;

            for vrf in &template.vrfs {
                data.vrfs.push(Vrf {
                    name: vrf.name.clone(),
                    schema: schema.clone(),
                    template: template_name.clone(),
                });
            }

            for bd in &template.bridge_domains {
                let mut sites: IndexMap<&str, Vec<Subnet>> = IndexMap::new();
                for subnet in &bd.subnets {
                    sites.entry(&subnet.site_name).or_default().push(Subnet {
                        ip: subnet.subnet_ip,
                        scope: subnet.scope,
                    });
                }

                data.bridge_domains.push(BridgeDomain {
                    name: bd.name.clone(),
                    schema: schema.clone(),
                    template: template_name.clone(),
                    vrf: bd.vrf.clone(),
                    layer2_stretch: bd.layer2_stretch,
                    unicast_routing: bd.unicast_routing,
                    sites: sites
                        .into_iter()
                        .map(|(name, subnets)| BridgeDomainSite {
                            name: name.to_string(),
                            subnets,
                            l3outs: None,
                        })
                        .collect(),
                });
            }

            for ap in &template.application_profiles {
                data.anps.push(Anp {
                    name: ap.name.clone(),
                    schema: schema.clone(),
                    template: template_name.clone(),
                });

                for epg in &ap.endpoint_groups {
                    let mut sites: IndexMap<&str, EpgSite> = IndexMap::new();
                    for association in &epg.domain_associations {
                        let site = sites
                            .entry(&association.site_name)
                            .or_insert_with(|| EpgSite {
                                name: association.site_name.clone(),
                                ..Default::default()
                            });
                        let domains = match association.domain_type {
                            DomainType::Physical => &mut site.phys_domain_association,
                            DomainType::Vmm => &mut site.vmm_domain_association,
                        };
                        domains.push(association.domain_name.clone());
                    }

                    data.epgs.push(Epg {
                        name: epg.name.clone(),
                        schema: schema.clone(),
                        template: template_name.clone(),
                        ap: ap.name.clone(),
                        bd: epg.bd.clone(),
                        description: epg.description.clone(),
                        vrf: epg.vrf.clone(),
                        sites: sites.into_values().collect(),
                    });
                }
            }
        }

        NdoVars {
            ndo_schema_data: data,
        }
    }
}
