//! Property tests: converting the flattened form of a document gives the same document
//!
//! Generated tables always resolve: references point into the template of the referencing row,
//! names repeat across templates, and subnet and domain association rows are always qualified.

use ndo_vars::entity::Kind;
use ndo_vars::tables::{Row, Table, Tables};
use proptest::collection::{btree_map, btree_set};
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct BridgeDomainInput {
    vrf: Index,
    layer2_stretch: bool,
    unicast_routing: bool,
    /// (site, third octet) to public scope
    subnets: BTreeMap<(u8, u8), bool>,
}

#[derive(Debug, Clone)]
struct EndpointGroupInput {
    ap: Index,
    bd: Index,
    vrf: Index,
    description: String,
    /// (site, vmm, domain)
    domains: BTreeSet<(u8, bool, u8)>,
}

#[derive(Debug, Clone)]
struct TemplateInput {
    vrfs: Vec<u8>,
    aps: Vec<u8>,
    bds: BTreeMap<u8, BridgeDomainInput>,
    epgs: BTreeMap<u8, EndpointGroupInput>,
}

fn bridge_domain() -> impl Strategy<Value = BridgeDomainInput> {
    (
        any::<Index>(),
        any::<bool>(),
        any::<bool>(),
        btree_map((1u8..3, 0u8..4), any::<bool>(), 0..3),
    )
        .prop_map(
            |(vrf, layer2_stretch, unicast_routing, subnets)| BridgeDomainInput {
                vrf,
                layer2_stretch,
                unicast_routing,
                subnets,
            },
        )
}

fn endpoint_group() -> impl Strategy<Value = EndpointGroupInput> {
    (
        any::<Index>(),
        any::<Index>(),
        any::<Index>(),
        "[a-z]{0,8}",
        btree_set((1u8..3, any::<bool>(), 0u8..3), 0..3),
    )
        .prop_map(|(ap, bd, vrf, description, domains)| EndpointGroupInput {
            ap,
            bd,
            vrf,
            description,
            domains,
        })
}

fn template() -> impl Strategy<Value = TemplateInput> {
    (
        btree_set(0u8..4, 1..4),
        btree_set(0u8..3, 1..3),
        btree_map(0u8..4, bridge_domain(), 1..4),
        btree_map(0u8..4, endpoint_group(), 0..4),
    )
        .prop_map(|(vrfs, aps, bds, epgs)| TemplateInput {
            vrfs: vrfs.into_iter().collect(),
            aps: aps.into_iter().collect(),
            bds,
            epgs,
        })
}

fn row(cells: &[(&str, String)]) -> Row {
    cells
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

fn qualified_row(qualifier: &[(&str, String)], cells: &[(&str, String)]) -> Row {
    qualifier
        .iter()
        .chain(cells)
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

fn tables(templates: &BTreeMap<(u8, u8), TemplateInput>) -> Tables {
    let mut tables = Tables::default();
    for kind in Kind::ALL {
        tables.insert(kind, Table::new(None));
    }

    for ((schema, template), input) in templates {
        let schema = format!("S{schema}");
        let template = format!("T{template}");
        let qualifier = [("schema", schema.clone()), ("template", template.clone())];

        for vrf in &input.vrfs {
            tables.push_row(
                Kind::Vrf,
                qualified_row(&qualifier, &[("name", format!("VRF{vrf}"))]),
            );
        }

        let bd_names: Vec<u8> = input.bds.keys().copied().collect();
        for (bd, bd_input) in &input.bds {
            tables.push_row(
                Kind::BridgeDomain,
                row(&[
                    ("name", format!("BD{bd}")),
                    ("schema", schema.clone()),
                    ("template", template.clone()),
                    ("vrf", format!("VRF{}", bd_input.vrf.get(&input.vrfs))),
                    ("layer2_stretch", bd_input.layer2_stretch.to_string()),
                    ("unicast_routing", bd_input.unicast_routing.to_string()),
                ]),
            );

            for ((site, octet), public) in &bd_input.subnets {
                let scope_value = if *public { "public" } else { "private" };
                tables.push_row(
                    Kind::Subnet,
                    qualified_row(
                        &qualifier,
                        &[
                            ("bd_name", format!("BD{bd}")),
                            ("site_name", format!("Site{site}")),
                            ("subnet_ip", format!("10.{bd}.{octet}.1/24")),
                            ("scope", scope_value.to_string()),
                        ],
                    ),
                );
            }
        }

        for ap in &input.aps {
            tables.push_row(
                Kind::ApplicationProfile,
                qualified_row(&qualifier, &[("name", format!("AP{ap}"))]),
            );
        }

        for (epg, epg_input) in &input.epgs {
            tables.push_row(
                Kind::EndpointGroup,
                row(&[
                    ("name", format!("EPG{epg}")),
                    ("schema", schema.clone()),
                    ("template", template.clone()),
                    ("ap", format!("AP{}", epg_input.ap.get(&input.aps))),
                    ("bd", format!("BD{}", epg_input.bd.get(&bd_names))),
                    ("description", epg_input.description.clone()),
                    ("vrf", format!("VRF{}", epg_input.vrf.get(&input.vrfs))),
                ]),
            );

            for (site, vmm, domain) in &epg_input.domains {
                let domain_type = if *vmm { "vmm" } else { "physical" };
                tables.push_row(
                    Kind::DomainAssociation,
                    qualified_row(
                        &qualifier,
                        &[
                            ("epg_name", format!("EPG{epg}")),
                            ("site_name", format!("Site{site}")),
                            ("domain_type", domain_type.to_string()),
                            ("domain_name", format!("DOM{domain}")),
                        ],
                    ),
                );
            }
        }
    }

    tables
}

proptest! {
    #[test]
    fn flatten_round_trip(templates in btree_map((0u8..2, 0u8..2), template(), 1..4)) {
        let tables = tables(&templates);
        let document = ndo_vars::convert(&tables).unwrap();

        let flattened = ndo_vars::flatten::flatten(&document);
        for kind in Kind::ALL {
            prop_assert_eq!(
                flattened.get(kind).map(Table::len),
                tables.get(kind).map(Table::len),
                "{}",
                kind
            );
        }

        prop_assert_eq!(ndo_vars::convert(&flattened).unwrap(), document);
    }

    #[test]
    fn ndo_layout_keeps_every_entity(templates in btree_map((0u8..2, 0u8..2), template(), 1..4)) {
        let tables = tables(&templates);
        let document = ndo_vars::convert(&tables).unwrap();
        let summary = document.summary();
        let data = ndo_vars::ndo::NdoVars::from(&document).ndo_schema_data;

        prop_assert_eq!(data.vrfs.len(), summary.vrfs);
        prop_assert_eq!(data.bridge_domains.len(), summary.bridge_domains);
        prop_assert_eq!(data.anps.len(), summary.application_profiles);
        prop_assert_eq!(data.epgs.len(), summary.endpoint_groups);

        let subnets: usize = data
            .bridge_domains
            .iter()
            .flat_map(|bd| &bd.sites)
            .map(|site| site.subnets.len())
            .sum();
        prop_assert_eq!(subnets, summary.subnets);

        let domains: usize = data
            .epgs
            .iter()
            .flat_map(|epg| &epg.sites)
            .map(|site| site.phys_domain_association.len() + site.vmm_domain_association.len())
            .sum();
        prop_assert_eq!(domains, summary.domain_associations);
    }
}
