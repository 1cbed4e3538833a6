//! records and links to a [Document]
//!
//! Assembly trusts its input: records come from [crate::normalize] and links from
//! [crate::resolve]. A link that does not fit the records is a bug and panics.
use crate::document::{
    ApplicationProfileNode, BridgeDomainNode, DomainAssociationNode, Document,
    EndpointGroupNode, SubnetNode, VrfNode,
};
use crate::entity::TemplateRef;
use crate::normalize::Records;
use crate::resolve::Links;

pub fn assemble(records: &Records, links: &Links) -> Document {
    check_links(records, links);

    // children grouped by parent index, in input order
    let mut subnets: Vec<Vec<SubnetNode>> = vec![vec![]; records.bridge_domains.len()];
    for (record, bd) in records.subnets.iter().zip(&links.subnet_bd) {
        let subnet = &record.entity;
        subnets[*bd].push(SubnetNode {
            site_name: subnet.site_name.clone(),
            subnet_ip: subnet.subnet_ip,
            scope: subnet.scope,
        });
    }

    let mut associations: Vec<Vec<DomainAssociationNode>> =
        vec![vec![]; records.endpoint_groups.len()];
    for (record, epg) in records
        .domain_associations
        .iter()
        .zip(&links.domain_association_epg)
    {
        let association = &record.entity;
        associations[*epg].push(DomainAssociationNode {
            site_name: association.site_name.clone(),
            domain_type: association.domain_type,
            domain_name: association.domain_name.clone(),
        });
    }

    let mut endpoint_groups: Vec<Vec<EndpointGroupNode>> =
        vec![vec![]; records.application_profiles.len()];
    for (index, (record, domain_associations)) in records
        .endpoint_groups
        .iter()
        .zip(associations)
        .enumerate()
    {
        let epg = &record.entity;
        let bd = &records.bridge_domains[links.endpoint_group_bd[index]].entity;
        let vrf = &records.vrfs[links.endpoint_group_vrf[index]].entity;

        endpoint_groups[links.endpoint_group_ap[index]].push(EndpointGroupNode {
            name: epg.name.clone(),
            bd: bd.name.clone(),
            bd_template: foreign(&epg.template, &bd.template),
            description: epg.description.clone(),
            vrf: vrf.name.clone(),
            vrf_template: foreign(&epg.template, &vrf.template),
            domain_associations,
        });
    }

    let mut document = Document::default();

    // fix template order before filling in
    let templates = records
        .vrfs
        .iter()
        .map(|record| &record.entity.template)
        .chain(records.bridge_domains.iter().map(|r| &r.entity.template))
        .chain(records.application_profiles.iter().map(|r| &r.entity.template))
        .chain(records.endpoint_groups.iter().map(|r| &r.entity.template));
    for template in templates {
        document.template_mut(template);
    }

    for record in &records.vrfs {
        let vrf = &record.entity;
        document.template_mut(&vrf.template).vrfs.push(VrfNode {
            name: vrf.name.clone(),
        });
    }

    for ((record, subnets), vrf_index) in records
        .bridge_domains
        .iter()
        .zip(subnets)
        .zip(&links.bridge_domain_vrf)
    {
        let bd = &record.entity;
        let vrf = &records.vrfs[*vrf_index].entity;
        document
            .template_mut(&bd.template)
            .bridge_domains
            .push(BridgeDomainNode {
                name: bd.name.clone(),
                vrf: vrf.name.clone(),
                vrf_template: foreign(&bd.template, &vrf.template),
                layer2_stretch: bd.layer2_stretch,
                unicast_routing: bd.unicast_routing,
                subnets,
            });
    }

    for (record, endpoint_groups) in records.application_profiles.iter().zip(endpoint_groups) {
        let ap = &record.entity;
        document
            .template_mut(&ap.template)
            .application_profiles
            .push(ApplicationProfileNode {
                name: ap.name.clone(),
                endpoint_groups,
            });
    }

    tracing::debug!(summary = ?document.summary(), "assembled");
    document
}

fn foreign(own: &TemplateRef, target: &TemplateRef) -> Option<TemplateRef> {
    (own != target).then(|| target.clone())
}

fn check_links(records: &Records, links: &Links) {
    let expected = [
        (links.bridge_domain_vrf.len(), records.bridge_domains.len()),
        (links.endpoint_group_ap.len(), records.endpoint_groups.len()),
        (links.endpoint_group_bd.len(), records.endpoint_groups.len()),
        (links.endpoint_group_vrf.len(), records.endpoint_groups.len()),
        (links.subnet_bd.len(), records.subnets.len()),
        (links.domain_association_epg.len(), records.domain_associations.len()),
    ];

    for (linked, count) in expected {
        assert_eq!(linked, count, "links do not match records: {links:?}");
    }
}
