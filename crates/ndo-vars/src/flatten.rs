//! a [Document] back to [Tables]
//!
//! Normalizing the flattened tables again gives the same document. Rows come out grouped by
//! template, so only the row set (not the row order) matches the input. References into another
//! template are written with their `*_schema`/`*_template` columns.
use crate::document::Document;
use crate::entity::{columns::*, Kind, TemplateRef, Vocabulary};
use crate::tables::{Row, Table, Tables};
use std::collections::HashMap;

pub fn flatten(document: &Document) -> Tables {
    let mut tables = Tables::default();
    for kind in Kind::ALL {
        tables.insert(kind, Table::new(None));
    }

    // child rows only need a qualifier when the parent name is declared in several templates
    let mut bd_names: HashMap<&str, usize> = HashMap::new();
    let mut epg_names: HashMap<&str, usize> = HashMap::new();
    for (_, template) in document.templates() {
        for bd in &template.bridge_domains {
            *bd_names.entry(bd.name.as_str()).or_default() += 1;
        }
        for epg in template
            .application_profiles
            .iter()
            .flat_map(|ap| &ap.endpoint_groups)
        {
            *epg_names.entry(epg.name.as_str()).or_default() += 1;
        }
    }

    for (template_ref, template) in document.templates() {
        let schema = template_ref.schema.as_str();
        let template_name = template_ref.template.as_str();
        let qualify = |row: &mut Row| {
            row.insert(SCHEMA.to_string(), schema.to_string());
            row.insert(TEMPLATE.to_string(), template_name.to_string());
        };

        for vrf in &template.vrfs {
            tables.push_row(
                Kind::Vrf,
                row([(NAME, vrf.name.as_str()), (SCHEMA, schema), (TEMPLATE, template_name)]),
            );
        }

        for bd in &template.bridge_domains {
            let mut bd_row = row([
                (NAME, bd.name.as_str()),
                (SCHEMA, schema),
                (TEMPLATE, template_name),
                (VRF, bd.vrf.as_str()),
                (LAYER2_STRETCH, bd.layer2_stretch.to_string().as_str()),
                (UNICAST_ROUTING, bd.unicast_routing.to_string().as_str()),
            ]);
            pin(&mut bd_row, VRF, &bd.vrf_template);
            tables.push_row(Kind::BridgeDomain, bd_row);

            for subnet in &bd.subnets {
                let mut subnet_row = row([
                    (BD_NAME, bd.name.as_str()),
                    (SITE_NAME, subnet.site_name.as_str()),
                    (SUBNET_IP, subnet.subnet_ip.to_string().as_str()),
                    (SCOPE, subnet.scope.as_str()),
                ]);
                if bd_names[bd.name.as_str()] > 1 {
                    qualify(&mut subnet_row);
                }
                tables.push_row(Kind::Subnet, subnet_row);
            }
        }

        for ap in &template.application_profiles {
            tables.push_row(
                Kind::ApplicationProfile,
                row([(NAME, ap.name.as_str()), (SCHEMA, schema), (TEMPLATE, template_name)]),
            );

            for epg in &ap.endpoint_groups {
                let mut epg_row = row([
                    (NAME, epg.name.as_str()),
                    (SCHEMA, schema),
                    (TEMPLATE, template_name),
                    (AP, ap.name.as_str()),
                    (BD, epg.bd.as_str()),
                    (DESCRIPTION, epg.description.as_str()),
                    (VRF, epg.vrf.as_str()),
                ]);
                pin(&mut epg_row, BD, &epg.bd_template);
                pin(&mut epg_row, VRF, &epg.vrf_template);
                tables.push_row(Kind::EndpointGroup, epg_row);

                for association in &epg.domain_associations {
                    let mut association_row = row([
                        (EPG_NAME, epg.name.as_str()),
                        (SITE_NAME, association.site_name.as_str()),
                        (DOMAIN_TYPE, association.domain_type.as_str()),
                        (DOMAIN_NAME, association.domain_name.as_str()),
                    ]);
                    if epg_names[epg.name.as_str()] > 1 {
                        qualify(&mut association_row);
                    }
                    tables.push_row(Kind::DomainAssociation, association_row);
                }
            }
        }
    }

    tracing::debug!(rows = tables.row_count(), "flattened");
    tables
}

/// Adds the qualifier columns of `reference` when the target lives in another template
fn pin(row: &mut Row, reference: &str, target: &Option<TemplateRef>) {
    if let (Some(target), Some((schema, template))) = (target, qualifiers(reference)) {
        row.insert(schema.to_string(), target.schema.clone());
        row.insert(template.to_string(), target.template.clone());
    }
}

fn row<const N: usize>(cells: [(&str, &str); N]) -> Row {
    cells
        .into_iter()
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(tables: &Tables, kind: Kind) -> Vec<Vec<(String, String)>> {
        tables
            .get(kind)
            .unwrap()
            .rows()
            .map(|(_, row)| row.clone().into_iter().collect())
            .collect()
    }

    fn cells(cells: &[(&str, &str)]) -> Vec<(String, String)> {
        cells
            .iter()
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn flatten_bridge_domain() {
        let tables = crate::tables! {
            Vrf => "name,schema,template\nVRF1,S1,T1",
            BridgeDomain => "name,schema,template,vrf,layer2_stretch,unicast_routing\nBD1,S1,T1,VRF1,TRUE,false",
            Subnet => "bd_name,site_name,subnet_ip,scope\nBD1,Site1,10.1.1.0/24,Private",
            ApplicationProfile => "name,schema,template",
            EndpointGroup => "name,schema,template,ap,bd,description,vrf",
        };

        let flattened = flatten(&crate::convert(&tables).unwrap());

        assert_eq!(
            rows(&flattened, Kind::BridgeDomain),
            vec![cells(&[
                ("name", "BD1"),
                ("schema", "S1"),
                ("template", "T1"),
                ("vrf", "VRF1"),
                ("layer2_stretch", "true"),
                ("unicast_routing", "false"),
            ])]
        );
        assert_eq!(
            rows(&flattened, Kind::Subnet),
            vec![cells(&[
                ("bd_name", "BD1"),
                ("site_name", "Site1"),
                ("subnet_ip", "10.1.1.0/24"),
                ("scope", "private"),
            ])]
        );
        assert!(flattened.get(Kind::DomainAssociation).unwrap().is_empty());
    }

    #[test]
    fn qualify_shared_names() {
        let tables = crate::tables! {
            Vrf => "name,schema,template\nVRF1,S1,T1\nVRF1,S1,T2",
            BridgeDomain => "name,schema,template,vrf,layer2_stretch,unicast_routing\nBD1,S1,T1,VRF1,true,true\nBD1,S1,T2,VRF1,true,true",
            Subnet => "bd_name,site_name,subnet_ip,scope,schema,template\nBD1,Site1,10.0.0.1/24,public,S1,T2",
            ApplicationProfile => "name,schema,template\nAP1,S1,T1",
            EndpointGroup => "name,schema,template,ap,bd,description,vrf\nEPG1,S1,T1,AP1,BD1,,VRF1",
            DomainAssociation => "epg_name,site_name,domain_type,domain_name\nEPG1,Site1,vmm,VMM1",
        };

        let document = crate::convert(&tables).unwrap();
        let flattened = flatten(&document);

        let subnets = rows(&flattened, Kind::Subnet);
        assert!(subnets[0].contains(&("template".to_string(), "T2".to_string())));

        let associations = rows(&flattened, Kind::DomainAssociation);
        assert_eq!(associations[0].len(), 4);

        assert_eq!(crate::convert(&flattened).unwrap(), document);
    }

    #[test]
    fn pin_cross_template_references() {
        let tables = crate::tables! {
            Vrf => "name,schema,template\nVRF1,S1,Shared",
            BridgeDomain => "name,schema,template,vrf,layer2_stretch,unicast_routing\nBD1,S1,T1,VRF1,true,true\nBD1,S1,T2,VRF1,true,true",
            ApplicationProfile => "name,schema,template\nAP1,S1,T3",
            EndpointGroup => "name,schema,template,ap,bd,description,vrf,bd_schema,bd_template\nEPG1,S1,T3,AP1,BD1,,VRF1,S1,T2",
        };

        let document = crate::convert(&tables).unwrap();
        let flattened = flatten(&document);

        let bds = rows(&flattened, Kind::BridgeDomain);
        assert!(bds[0].contains(&("vrf_schema".to_string(), "S1".to_string())));
        assert!(bds[0].contains(&("vrf_template".to_string(), "Shared".to_string())));

        let epgs = rows(&flattened, Kind::EndpointGroup);
        assert!(epgs[0].contains(&("bd_template".to_string(), "T2".to_string())));
        assert!(epgs[0].contains(&("vrf_template".to_string(), "Shared".to_string())));

        assert_eq!(crate::convert(&flattened).unwrap(), document);
    }
}
