//! Descendant closure for cascading operations.

use std::collections::HashSet;

use websharex_core::types::EntryId;
use websharex_entity::entry::Entry;

/// Every entry below `root`, including `root` itself.
pub fn descendants_of(entries: &[Entry], root: EntryId) -> HashSet<EntryId> {
    descendants_of_all(entries, [root])
}

/// Union of the descendant sets of several roots, roots included.
///
/// Fixed-point expansion: rescan until a pass adds nothing. Cycles
/// terminate because an id is only ever added once.
pub fn descendants_of_all(
    entries: &[Entry],
    roots: impl IntoIterator<Item = EntryId>,
) -> HashSet<EntryId> {
    let mut set: HashSet<EntryId> = roots.into_iter().collect();
    loop {
        let before = set.len();
        for entry in entries {
            if let Some(parent) = entry.parent_id {
                if set.contains(&parent) {
                    set.insert(entry.id);
                }
            }
        }
        if set.len() == before {
            return set;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes_nested_descendants_in_any_order() {
        let top = Entry::folder("top", None);
        let mid = Entry::folder("mid", Some(top.id));
        let leaf = Entry::folder("leaf", Some(mid.id));
        let other = Entry::folder("other", None);
        // Children listed before their parents.
        let entries = vec![leaf.clone(), mid.clone(), other.clone(), top.clone()];

        let set = descendants_of(&entries, top.id);
        assert_eq!(set, HashSet::from([top.id, mid.id, leaf.id]));
        assert_eq!(descendants_of(&entries, leaf.id), HashSet::from([leaf.id]));
    }

    #[test]
    fn test_unrelated_entries_do_not_change_result() {
        let top = Entry::folder("top", None);
        let child = Entry::folder("child", Some(top.id));
        let mut entries = vec![top.clone(), child.clone()];
        let before = descendants_of(&entries, top.id);

        let stranger = Entry::folder("stranger", None);
        entries.push(Entry::folder("nested", Some(stranger.id)));
        entries.push(stranger);
        assert_eq!(descendants_of(&entries, top.id), before);
        assert_eq!(descendants_of(&entries, top.id), descendants_of(&entries, top.id));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut a = Entry::folder("a", None);
        let b = Entry::folder("b", Some(a.id));
        a.parent_id = Some(b.id);
        let entries = vec![a.clone(), b.clone()];
        assert_eq!(descendants_of(&entries, a.id), HashSet::from([a.id, b.id]));
    }

    #[test]
    fn test_root_always_included() {
        let missing = EntryId::new();
        assert_eq!(descendants_of(&[], missing), HashSet::from([missing]));
    }
}
