//! duplicate detection and reference resolution
//!
//! References are names. A name is looked up in the (schema, template) of the referencing entity
//! first. If it is not declared there every template is searched, and it must match exactly one
//! entity. Subnets and domain associations have no template of their own: they are looked up
//! everywhere, or only in the template given by their optional `schema`/`template` columns.
//! Likewise `vrf_schema`/`vrf_template` and `bd_schema`/`bd_template` pin the `vrf` and `bd`
//! references of bridge domains and endpoint groups to one template.
//!
//! Subnets and domain associations are checked for duplicates after resolution, keyed on the
//! entity they resolved to.
use crate::entity::{columns, Entity, EntityKey, Scoped, TemplateRef, Vocabulary};
use crate::error::{Error, Origin};
use crate::normalize::{Record, Records};
use crate::tables::Location;
use std::collections::HashMap;

/// Resolved references as indices into the lists of [Records]
///
/// `bridge_domain_vrf[i]` is the index (in `records.vrfs`) of the VRF of `records.bridge_domains[i]`.
/// The other fields follow the same pattern.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Links {
    pub bridge_domain_vrf: Vec<usize>,
    pub endpoint_group_ap: Vec<usize>,
    pub endpoint_group_bd: Vec<usize>,
    pub endpoint_group_vrf: Vec<usize>,
    pub subnet_bd: Vec<usize>,
    pub domain_association_epg: Vec<usize>,
}

pub fn resolve(records: &Records) -> Result<Links, Error> {
    check_unique(&records.vrfs, |_, vrf| vrf.key())?;
    check_unique(&records.application_profiles, |_, ap| ap.key())?;
    check_unique(&records.bridge_domains, |_, bd| bd.key())?;
    check_unique(&records.endpoint_groups, |_, epg| epg.key())?;

    let vrfs = Index::new(&records.vrfs);
    let aps = Index::new(&records.application_profiles);
    let bds = Index::new(&records.bridge_domains);
    let epgs = Index::new(&records.endpoint_groups);

    let mut links = Links::default();

    for record in &records.bridge_domains {
        let bd = &record.entity;
        let vrf = vrfs.resolve(
            record,
            columns::VRF,
            &bd.vrf,
            Scope::preferring(&bd.template, &bd.vrf_qualifier),
        )?;
        links.bridge_domain_vrf.push(vrf);
    }

    for record in &records.endpoint_groups {
        let epg = &record.entity;

        // the endpoint group is nested inside its application profile
        let ap = aps.resolve(record, columns::AP, &epg.ap, Scope::Only(&epg.template))?;
        let bd = bds.resolve(
            record,
            columns::BD,
            &epg.bd,
            Scope::preferring(&epg.template, &epg.bd_qualifier),
        )?;
        let vrf = vrfs.resolve(
            record,
            columns::VRF,
            &epg.vrf,
            Scope::preferring(&epg.template, &epg.vrf_qualifier),
        )?;

        if links.bridge_domain_vrf[bd] != vrf {
            tracing::warn!(
                epg = %epg.name,
                template = %epg.template,
                vrf = %epg.vrf,
                bd_vrf = %records.bridge_domains[bd].entity.vrf,
                "endpoint group VRF differs from the VRF of its bridge domain"
            );
        }

        links.endpoint_group_ap.push(ap);
        links.endpoint_group_bd.push(bd);
        links.endpoint_group_vrf.push(vrf);
    }

    for record in &records.subnets {
        let subnet = &record.entity;
        let bd = bds.resolve(
            record,
            columns::BD_NAME,
            &subnet.bd_name,
            Scope::qualified(&subnet.template),
        )?;
        links.subnet_bd.push(bd);
    }

    for record in &records.domain_associations {
        let association = &record.entity;
        let epg = epgs.resolve(
            record,
            columns::EPG_NAME,
            &association.epg_name,
            Scope::qualified(&association.template),
        )?;
        links.domain_association_epg.push(epg);
    }

    // qualified and unqualified rows may name the same parent
    check_unique(&records.subnets, |index, subnet| {
        let bd = &records.bridge_domains[links.subnet_bd[index]].entity;
        let mut key = parent_key(&bd.template, columns::BD_NAME, &bd.name);
        key.push(columns::SITE_NAME, &subnet.site_name);
        key.push(columns::SUBNET_IP, subnet.subnet_ip);
        key
    })?;
    check_unique(&records.domain_associations, |index, association| {
        let epg = &records.endpoint_groups[links.domain_association_epg[index]].entity;
        let mut key = parent_key(&epg.template, columns::EPG_NAME, &epg.name);
        key.push(columns::SITE_NAME, &association.site_name);
        key.push(columns::DOMAIN_TYPE, association.domain_type.as_str());
        key.push(columns::DOMAIN_NAME, &association.domain_name);
        key
    })?;

    tracing::debug!(
        bridge_domains = links.bridge_domain_vrf.len(),
        endpoint_groups = links.endpoint_group_ap.len(),
        subnets = links.subnet_bd.len(),
        domain_associations = links.domain_association_epg.len(),
        "references resolved"
    );

    Ok(links)
}

/// Fails on the first record whose key was seen before
fn check_unique<E: Entity>(
    records: &[Record<E>],
    key_of: impl Fn(usize, &E) -> EntityKey,
) -> Result<(), Error> {
    let mut seen: HashMap<EntityKey, &Location> = HashMap::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let key = key_of(index, &record.entity);
        if let Some(first) = seen.get(&key) {
            return Err(Error::DuplicateEntity {
                kind: E::KIND,
                first: (*first).clone(),
                duplicate: record.location.clone(),
                key,
            });
        }
        seen.insert(key, &record.location);
    }

    Ok(())
}

fn parent_key(template: &TemplateRef, column: &'static str, name: &str) -> EntityKey {
    let mut key = EntityKey::default();
    key.push(columns::SCHEMA, &template.schema);
    key.push(columns::TEMPLATE, &template.template);
    key.push(column, name);
    key
}

/// Where to look for a referenced name
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    /// This template first, then everywhere
    Prefer(&'a TemplateRef),
    /// This template only
    Only(&'a TemplateRef),
    Anywhere,
}

impl<'a> Scope<'a> {
    /// The qualified template only, or `own` first
    fn preferring(own: &'a TemplateRef, qualifier: &'a Option<TemplateRef>) -> Self {
        match qualifier {
            Some(template) => Scope::Only(template),
            None => Scope::Prefer(own),
        }
    }

    fn qualified(qualifier: &'a Option<TemplateRef>) -> Self {
        match qualifier {
            Some(template) => Scope::Only(template),
            None => Scope::Anywhere,
        }
    }
}

/// Name lookup for one kind of scoped entity
struct Index<'r, E> {
    records: &'r [Record<E>],
    scoped: HashMap<&'r TemplateRef, HashMap<&'r str, usize>>,
    by_name: HashMap<&'r str, Vec<usize>>,
}

impl<'r, E: Entity + Scoped> Index<'r, E> {
    /// Expects unique (schema, template, name) keys
    fn new(records: &'r [Record<E>]) -> Self {
        let mut scoped: HashMap<&TemplateRef, HashMap<&str, usize>> = HashMap::new();
        let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();

        for (index, record) in records.iter().enumerate() {
            let entity = &record.entity;
            scoped
                .entry(entity.template())
                .or_default()
                .insert(entity.name(), index);
            by_name.entry(entity.name()).or_default().push(index);
        }

        Self {
            records,
            scoped,
            by_name,
        }
    }

    /// Index of the match, or all candidates (none when missing)
    fn find(&self, name: &str, scope: Scope<'_>) -> Result<usize, Vec<usize>> {
        let template = match scope {
            Scope::Prefer(template) | Scope::Only(template) => Some(template),
            Scope::Anywhere => None,
        };

        if let Some(template) = template {
            if let Some(index) = self
                .scoped
                .get(template)
                .and_then(|names| names.get(name))
            {
                return Ok(*index);
            }

            if let Scope::Only(_) = scope {
                return Err(vec![]);
            }
        }

        match self.by_name.get(name).map(Vec::as_slice) {
            Some([index]) => Ok(*index),
            Some(candidates) => Err(candidates.to_vec()),
            None => Err(vec![]),
        }
    }

    fn resolve<C: Entity>(
        &self,
        child: &Record<C>,
        column: &'static str,
        target: &str,
        scope: Scope<'_>,
    ) -> Result<usize, Error> {
        let origin = || Origin::new(C::KIND, child.entity.key(), child.location.clone());

        match self.find(target, scope) {
            Ok(index) => {
                tracing::trace!(kind=%C::KIND, column, target, index, "resolved");
                Ok(index)
            }
            Err(candidates) if candidates.is_empty() => Err(Error::UnresolvedReference {
                origin: origin(),
                column,
                target: target.to_string(),
                target_kind: E::KIND,
            }),
            Err(candidates) => Err(Error::AmbiguousReference {
                origin: origin(),
                column,
                target: target.to_string(),
                target_kind: E::KIND,
                candidates: candidates
                    .into_iter()
                    .map(|index| self.records[index].entity.template().clone())
                    .collect(),
            }),
        }
    }
}
