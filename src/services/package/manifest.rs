//! `imsmanifest.xml` parsing and SCO discovery.
//!
//! Element and attribute names are matched on their local name so both
//! prefixed (`adlcp:scormtype`) and plain spellings are accepted.

use super::types::{Item, LaunchableUnit, Manifest, Organization, Resource};
use crate::types::errors::{PackageError, PackageResult};
use roxmltree::{Document, Node, ParsingOptions};
use std::collections::BTreeMap;

pub const MANIFEST_FILE_NAME: &str = "imsmanifest.xml";

/// Parse the manifest document into its organization/resource tree.
pub fn parse_manifest(xml: &str) -> PackageResult<Manifest> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| PackageError::ManifestInvalid(e.to_string()))?;

    let root = doc
        .descendants()
        .find(|n| is_element(n, "manifest"))
        .ok_or_else(|| PackageError::ManifestInvalid("missing <manifest> root".to_string()))?;

    let schema_version = root
        .descendants()
        .find(|n| is_element(n, "schemaversion"))
        .map(|n| text_of(&n))
        .unwrap_or_default();

    let resources: BTreeMap<String, Resource> = root
        .descendants()
        .filter(|n| is_element(n, "resource"))
        .map(|n| {
            let resource = parse_resource(&n);
            (resource.identifier.clone(), resource)
        })
        .collect();

    let organizations = root
        .descendants()
        .filter(|n| is_element(n, "organizations"))
        .flat_map(|orgs| orgs.children().filter(|n| is_element(n, "organization")))
        .map(|org| Organization {
            identifier: attr(&org, "identifier"),
            title: child_title(&org),
            items: parse_items(&org, &resources),
        })
        .collect();

    Ok(Manifest {
        identifier: attr(&root, "identifier"),
        version: attr(&root, "version"),
        schema_version,
        organizations,
        resources,
    })
}

/// Flatten every organization depth-first and keep the items backed by a
/// `sco` resource with an entry path.
pub fn launchable_units(manifest: &Manifest) -> Vec<LaunchableUnit> {
    let mut units = Vec::new();
    for org in &manifest.organizations {
        collect_units(&org.items, "", &mut units);
    }
    units
}

fn collect_units(items: &[Item], trail: &str, units: &mut Vec<LaunchableUnit>) {
    for item in items {
        let breadcrumb = if trail.is_empty() {
            item.title.clone()
        } else {
            format!("{trail} > {}", item.title)
        };

        let is_sco = item
            .scorm_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("sco"));
        if let (true, Some(href)) = (is_sco, item.href.as_deref().filter(|h| !h.is_empty())) {
            units.push(LaunchableUnit {
                identifier: item.identifier.clone(),
                title: item.title.clone(),
                entry_path: href.to_string(),
                launch_parameters: item.parameters.clone(),
                visible: item.visible,
                breadcrumb: breadcrumb.clone(),
            });
        }

        collect_units(&item.children, &breadcrumb, units);
    }
}

fn parse_resource(node: &Node) -> Resource {
    let scorm_type = node
        .attributes()
        .find(|a| a.name().eq_ignore_ascii_case("scormtype"))
        .map(|a| a.value().to_string());

    Resource {
        identifier: attr(node, "identifier"),
        resource_type: attr(node, "type"),
        href: node.attribute("href").map(str::to_string),
        scorm_type,
        files: node
            .children()
            .filter(|n| is_element(n, "file"))
            .filter_map(|n| n.attribute("href").map(str::to_string))
            .collect(),
    }
}

fn parse_items(parent: &Node, resources: &BTreeMap<String, Resource>) -> Vec<Item> {
    parent
        .children()
        .filter(|n| is_element(n, "item"))
        .map(|node| {
            let identifierref = attr(&node, "identifierref");
            let resource = resources.get(&identifierref);

            Item {
                identifier: attr(&node, "identifier"),
                title: child_title(&node),
                visible: node.attribute("isvisible") != Some("false"),
                parameters: attr(&node, "parameters"),
                href: resource.and_then(|r| r.href.clone()),
                scorm_type: resource.and_then(|r| r.scorm_type.clone()),
                children: parse_items(&node, resources),
                identifierref,
            }
        })
        .collect()
}

fn is_element(node: &Node, local_name: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(local_name)
}

fn attr(node: &Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

fn child_title(node: &Node) -> String {
    node.children()
        .find(|n| is_element(n, "title"))
        .map(|n| text_of(&n))
        .unwrap_or_default()
}

fn text_of(node: &Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
#[path = "tests/manifest_tests.rs"]
mod tests;
