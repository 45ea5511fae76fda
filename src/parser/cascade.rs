//! Cascade resolution and stylesheet flattening.
//!
//! [`flatten`] groups rules by (selector text, media context) in source
//! order and resolves every property to one winning value:
//!
//! 1. Shorthands are expanded and folded longhand-by-longhand
//! 2. `!important` strictly dominates
//! 3. Higher specificity wins among equals on importance
//! 4. Source order (later wins) breaks remaining ties
//!
//! After a group is resolved, shorthand families are re-contracted where
//! legal. At-rules pass through untouched in their original order. Rules
//! that entered with a shared `selector_list_id` keep it only while every
//! sibling's final declaration set is identical.

use std::collections::HashMap;

use log::debug;

use crate::parser::media::{MediaId, MediaIndex};
use crate::parser::shorthand;
use crate::parser::stylesheet::{Declaration, Item, Rule, Stylesheet};

/// The stored winner for one property while a group is being resolved.
struct Entry {
    value: String,
    important: bool,
    specificity: u32,
}

struct Group {
    selector: String,
    /// Sorted media-id signature, in the source sheet's id space.
    media: Vec<MediaId>,
    list_id: Option<usize>,
    /// Set when rules from two different selector lists fold into this
    /// group; the id stays cleared for good.
    list_poisoned: bool,
    props: Vec<(String, Entry)>,
    final_decls: Vec<Declaration>,
}

/// Resolves the cascade into a new stylesheet. Never fails on a valid
/// input sheet, and is idempotent.
pub fn flatten(sheet: &Stylesheet) -> Stylesheet {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<(String, Vec<MediaId>), usize> = HashMap::new();
    let mut group_of_rule: HashMap<usize, usize> = HashMap::new();
    // Which groups each selector list's members landed in, in source order.
    let mut list_members: HashMap<usize, Vec<usize>> = HashMap::new();

    for item in &sheet.items {
        let Item::Rule(rule) = item else { continue };
        let mut signature: Vec<MediaId> = sheet.media.media_for(rule.id).to_vec();
        signature.sort();
        let key = (rule.selector.clone(), signature.clone());
        let gi = match index.get(&key) {
            Some(&gi) => gi,
            None => {
                groups.push(Group {
                    selector: rule.selector.clone(),
                    media: signature,
                    list_id: None,
                    list_poisoned: false,
                    props: Vec::new(),
                    final_decls: Vec::new(),
                });
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        group_of_rule.insert(rule.id, gi);

        let group = &mut groups[gi];
        if let Some(list) = rule.selector_list_id {
            let members = list_members.entry(list).or_default();
            if !members.contains(&gi) {
                members.push(gi);
            }
            match group.list_id {
                None if !group.list_poisoned => group.list_id = Some(list),
                Some(existing) if existing != list => {
                    group.list_id = None;
                    group.list_poisoned = true;
                }
                _ => {}
            }
        }
        let specificity = rule.specificity();
        for decl in &rule.declarations {
            fold(&mut group.props, decl, specificity);
        }
    }

    for group in &mut groups {
        let decls: Vec<Declaration> = group
            .props
            .iter()
            .map(|(p, e)| Declaration::new(p, &e.value, e.important))
            .collect();
        group.final_decls = shorthand::contract_all(decls);
    }

    clear_diverged_lists(&mut groups, &list_members);

    // Rebuild the sequence in original order: each group at its first
    // member's slot, at-rules at their own slots, ids renumbered.
    let mut out = Stylesheet::new();
    out.charset = sheet.charset.clone();
    out.imports = sheet.imports.clone();
    out.next_list_id = sheet.next_list_id;
    let mut emitted = vec![false; groups.len()];

    for item in &sheet.items {
        match item {
            Item::AtRule(at) => {
                let new_id = out.items.len();
                let mut at = at.clone();
                at.id = new_id;
                carry_media(&sheet.media, sheet.media.media_for(item.id()), &mut out.media, new_id);
                out.items.push(Item::AtRule(at));
            }
            Item::Rule(rule) => {
                let gi = group_of_rule[&rule.id];
                if emitted[gi] {
                    continue;
                }
                emitted[gi] = true;
                let group = &groups[gi];
                let new_id = out.items.len();
                let mut new_rule =
                    Rule::new(new_id, group.selector.clone(), group.final_decls.clone());
                new_rule.selector_list_id = group.list_id;
                carry_media(&sheet.media, &group.media, &mut out.media, new_id);
                out.items.push(Item::Rule(new_rule));
            }
        }
    }

    debug!(
        "flattened {} items into {}",
        sheet.items.len(),
        out.items.len()
    );
    out
}

/// Folds one declaration into a group's property map, expanding shorthands
/// recursively so only longhands are stored.
fn fold(props: &mut Vec<(String, Entry)>, decl: &Declaration, specificity: u32) {
    if let Some(parts) = shorthand::expand(&decl.property, &decl.value) {
        for (property, value) in parts {
            let longhand = Declaration::new(&property, &value, decl.important);
            fold(props, &longhand, specificity);
        }
        return;
    }
    match props.iter_mut().find(|(p, _)| *p == decl.property) {
        Some((_, entry)) => {
            if replaces(entry, decl.important, specificity) {
                entry.value = decl.value.clone();
                entry.important = decl.important;
                entry.specificity = specificity;
            }
        }
        None => props.push((
            decl.property.clone(),
            Entry {
                value: decl.value.clone(),
                important: decl.important,
                specificity,
            },
        )),
    }
}

/// The per-property precedence rule. `!important` strictly dominates;
/// among equals on importance, specificity decides, and source order
/// (later wins) breaks ties.
fn replaces(stored: &Entry, new_important: bool, new_specificity: u32) -> bool {
    if new_important {
        !stored.important || stored.specificity <= new_specificity
    } else {
        !stored.important && stored.specificity <= new_specificity
    }
}

/// Clears `selector_list_id`s on members whose final declaration sets
/// diverged from their siblings. The leading run of members that still
/// agree with the list's first member keeps the id (so `h1, h2` stay
/// grouped when only `h3` diverged); a list whose first member itself
/// diverged from everyone loses the id entirely.
fn clear_diverged_lists(groups: &mut [Group], list_members: &HashMap<usize, Vec<usize>>) {
    for members in list_members.values() {
        if members.len() < 2 {
            continue;
        }
        let reference = groups[members[0]].final_decls.clone();
        let matching: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&gi| groups[gi].final_decls == reference)
            .collect();
        if matching.len() == members.len() {
            continue;
        }
        for &gi in members {
            if matching.len() < 2 || !matching.contains(&gi) {
                groups[gi].list_id = None;
            }
        }
    }
}

/// Re-registers an item's media context into the rebuilt index, interning
/// query texts afresh so the new sheet's identifier set stays closed.
fn carry_media(old: &MediaIndex, media: &[MediaId], new: &mut MediaIndex, new_id: usize) {
    if media.is_empty() {
        new.register(new_id, MediaId::ALL);
        return;
    }
    for &m in media {
        let query = old.query_text(m).to_string();
        let id = new.intern_known(&query);
        new.register(new_id, id);
    }
}
