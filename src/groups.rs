use crate::types::Record;
use std::collections::HashMap;
use tracing::debug;

/// Records sharing one `role` value. The group owns copies of its records.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub role: String,
    pub records: Vec<Record>,
}

/// Split records into disjoint groups by exact `role` value.
///
/// Order: `expected_roles` first, in the order given, then every other role
/// in the order it is first seen. An expected role without records still
/// produces an (empty) group. Role values are compared verbatim.
pub fn partition(records: &[Record], expected_roles: &[String]) -> Vec<Group> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for role in expected_roles {
        if !index.contains_key(role) {
            index.insert(role.clone(), groups.len());
            groups.push(Group { role: role.clone(), records: Vec::new() });
        }
    }

    for r in records {
        let i = match index.get(&r.role) {
            Some(&i) => i,
            None => {
                index.insert(r.role.clone(), groups.len());
                groups.push(Group { role: r.role.clone(), records: Vec::new() });
                groups.len() - 1
            }
        };
        groups[i].records.push(r.clone());
    }

    for g in &groups {
        debug!("Group '{}' has {} records", g.role, g.records.len());
    }
    groups
}
