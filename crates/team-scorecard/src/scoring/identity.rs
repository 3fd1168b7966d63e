use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::domain::{ActivityRecord, NameAliasMapping};

/// Trim and collapse whitespace runs; case is preserved.
pub fn normalize_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shorter names win; equal lengths fall back to lexicographic order.
fn preferred(left: &str, right: &str) -> Ordering {
    left.chars()
        .count()
        .cmp(&right.chars().count())
        .then_with(|| left.cmp(right))
}

/// Disjoint sets whose root is always the preferred member.
#[derive(Debug, Default)]
struct AliasGroups {
    parent: HashMap<String, String>,
}

impl AliasGroups {
    fn find(&mut self, name: &str) -> String {
        let mut root = name.to_string();
        while let Some(next) = self.parent.get(&root) {
            if *next == root {
                break;
            }
            root = next.clone();
        }

        let mut cursor = name.to_string();
        while cursor != root {
            let next = self
                .parent
                .insert(cursor.clone(), root.clone())
                .unwrap_or_else(|| root.clone());
            cursor = next;
        }

        root
    }

    fn join(&mut self, left: &str, right: &str) {
        for name in [left, right] {
            self.parent
                .entry(name.to_string())
                .or_insert_with(|| name.to_string());
        }

        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return;
        }

        match preferred(&left_root, &right_root) {
            Ordering::Greater => {
                self.parent.insert(left_root, right_root);
            }
            _ => {
                self.parent.insert(right_root, left_root);
            }
        }
    }

    /// Merge `member` into the group of `anchor`, keeping the anchor's root.
    fn attach(&mut self, member: &str, anchor: &str) {
        self.parent
            .entry(member.to_string())
            .or_insert_with(|| member.to_string());

        let member_root = self.find(member);
        let anchor_root = self.find(anchor);
        if member_root != anchor_root {
            self.parent.insert(member_root, anchor_root);
        }
    }

    fn members(&self) -> Vec<String> {
        self.parent.keys().cloned().collect()
    }
}

/// Order an alias pair as `(canonical, alternate)`.
fn split_pair(left: String, right: String) -> (String, String) {
    match preferred(&left, &right) {
        Ordering::Greater => (right, left),
        _ => (left, right),
    }
}

/// Snapshot of alias tables used to fold differently spelled names together.
#[derive(Debug, Clone, Default)]
pub struct NameIdentityResolver {
    lookup: HashMap<String, String>,
    alternates: HashMap<String, String>,
}

impl NameIdentityResolver {
    pub fn build(aliases: &[NameAliasMapping], activity: &[ActivityRecord]) -> Self {
        let mut groups = AliasGroups::default();
        let mut explicit_names = HashSet::new();
        let mut explicit_pairs = Vec::new();

        for mapping in aliases {
            let name = normalize_name(&mapping.name);
            let alternate = normalize_name(&mapping.alternate_name);
            if name.is_empty() || alternate.is_empty() || name == alternate {
                continue;
            }

            groups.join(&name, &alternate);
            explicit_names.insert(name.clone());
            explicit_names.insert(alternate.clone());
            explicit_pairs.push(split_pair(name, alternate));
        }

        let mut inferred_pairs = Vec::new();
        for record in activity {
            let Some(raw) = record.alternative_names.as_deref() else {
                continue;
            };
            let person = normalize_name(&record.person_name);
            if person.is_empty() {
                continue;
            }

            for alternate in raw.split([',', ';']).map(normalize_name) {
                if alternate.is_empty()
                    || alternate == person
                    || explicit_names.contains(&alternate)
                {
                    continue;
                }

                if explicit_names.contains(&person) {
                    groups.attach(&alternate, &person);
                } else {
                    groups.join(&person, &alternate);
                }
                inferred_pairs.push(split_pair(person.clone(), alternate));
            }
        }

        let mut lookup = HashMap::new();
        for member in groups.members() {
            let canonical = groups.find(&member);
            lookup.insert(member, canonical);
        }

        let mut alternates = HashMap::new();
        for (short, long) in inferred_pairs.into_iter().chain(explicit_pairs) {
            if let Some(canonical) = lookup.get(&short) {
                alternates.insert(canonical.clone(), long);
            }
        }

        Self { lookup, alternates }
    }

    pub fn canonicalize(&self, name: &str) -> String {
        let normalized = normalize_name(name);
        match self.lookup.get(&normalized) {
            Some(canonical) => canonical.clone(),
            None => normalized,
        }
    }

    /// Display label for the other spelling recorded against a canonical key.
    pub fn alternate_name(&self, canonical: &str) -> Option<&str> {
        self.alternates.get(canonical).map(String::as_str)
    }
}
