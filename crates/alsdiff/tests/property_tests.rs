//! Property-based tests for the diff engine
//!
//! These tests use proptest to verify:
//! 1. Identity: a tree diffed against itself yields nothing
//! 2. Edits invert when the inputs are swapped
//! 3. Ignored tags never influence the result
//! 4. Time values are compared after rounding to two digits
//! 5. The number of shallow comparisons per level stays within n * (m + 1)

use alsdiff::{diff_elements, report, Change, Config, Differ, Element, Node};
use proptest::prelude::*;

const TAGS: &[&str] = &["Track", "Clip", "Device", "Note"];

/// Arbitrary small tree with tags drawn from a fixed pool
fn tree() -> impl Strategy<Value = Element> {
    let leaf = (prop::sample::select(TAGS), 0u8..4, prop::option::of("[a-c]{1,3}")).prop_map(
        |(tag, id, text)| {
            let element = Element::new(tag).with_attribute("Id", id.to_string());
            match text {
                Some(text) => element.with_text(text),
                None => element,
            }
        },
    );
    leaf.prop_recursive(3, 32, 5, |inner| {
        (prop::sample::select(TAGS), 0u8..4, prop::collection::vec(inner, 0..5)).prop_map(
            |(tag, id, children)| {
                children.into_iter().fold(
                    Element::new(tag).with_attribute("Id", id.to_string()),
                    Element::with_child,
                )
            },
        )
    })
}

fn keyed_list(keys: &[u16]) -> Element {
    keys.iter().fold(Element::new("List"), |list, key| {
        list.with_child(Element::new("Item").with_attribute("Key", key.to_string()))
    })
}

/// Insert an ignored element before every child, at every level
fn sprinkle_ignored(element: &Element, tag: &str, salt: usize) -> Element {
    let mut result = Element {
        children: Vec::new(),
        ..element.clone()
    };
    for (index, child) in element.child_elements().enumerate() {
        if (index + salt) % 2 == 0 {
            result = result.with_child(Element::new(tag).with_attribute("Value", index.to_string()));
        }
        result = result.with_child(sprinkle_ignored(child, tag, salt));
    }
    if let Some(text) = element.text() {
        result.children.insert(0, alsdiff::Content::Text(text.to_string()));
    }
    result
}

fn labels(changes: &[Change<'_>]) -> Vec<(&'static str, String)> {
    changes
        .iter()
        .map(|change| (change.label(), change.node().describe()))
        .collect()
}

proptest! {
    #[test]
    fn diff_of_tree_with_itself_is_empty(tree in tree()) {
        let config = Config::default();
        let changes = diff_elements(&tree, &tree, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(changes.is_empty());

        let copy = tree.clone();
        let changes = diff_elements(&tree, &copy, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(changes.is_empty());
    }

    #[test]
    fn single_insertion_inverts_to_single_removal(
        len in 0usize..12,
        position in any::<prop::sample::Index>(),
    ) {
        let config = Config::default();
        let keys: Vec<u16> = (0..len).map(|k| u16::try_from(k).unwrap_or(0)).collect();
        let at = position.index(len + 1);
        let mut inserted = keys.clone();
        inserted.insert(at, 1000);
        let (shorter, longer) = (keyed_list(&keys), keyed_list(&inserted));

        let forward = diff_elements(&shorter, &longer, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let backward = diff_elements(&longer, &shorter, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(labels(&forward), vec![("added", "<Item Key=\"1000\" />".to_string())]);
        prop_assert_eq!(labels(&backward), vec![("removed", "<Item Key=\"1000\" />".to_string())]);
    }

    #[test]
    fn ignored_tags_do_not_change_output(old in tree(), new in tree(), salt in 0usize..2) {
        let config = Config::default();
        let expected = diff_elements(&old, &new, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let noisy_old = sprinkle_ignored(&old, "CurrentZoom", salt);
        let noisy_new = sprinkle_ignored(&new, "SelectedDevice", salt + 1);
        let actual = diff_elements(&noisy_old, &noisy_new, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(report::render(&expected), report::render(&actual));
    }

    #[test]
    fn time_values_within_rounding_are_equal(
        cents in 0u32..100_000,
        left in 0u32..500,
        right in 0u32..500,
    ) {
        // both values stay strictly below the half-cent, so they round to `cents`
        let value = |extra: u32| format!("{}.{:02}{:03}", cents / 100, cents % 100, extra);
        let config = Config::default();
        let a = Element::new("LeftTime").with_attribute("Value", value(left));
        let b = Element::new("LeftTime").with_attribute("Value", value(right));
        let equal = Node::root(&a, &config).shallow_equal(&Node::root(&b, &config));
        prop_assert_eq!(equal, Ok(true));
    }

    #[test]
    fn time_values_a_cent_apart_differ(cents in 0u32..100_000, step in 1u32..500) {
        let value = |c: u32| format!("{}.{:02}", c / 100, c % 100);
        let config = Config::default();
        let a = Element::new("RightTime").with_attribute("Value", value(cents));
        let b = Element::new("RightTime").with_attribute("Value", value(cents + step));
        let equal = Node::root(&a, &config).shallow_equal(&Node::root(&b, &config));
        prop_assert_eq!(equal, Ok(false));
    }

    #[test]
    fn comparisons_are_bounded(
        old in prop::collection::vec(0u16..6, 0..16),
        new in prop::collection::vec(0u16..6, 0..16),
    ) {
        let config = Config::default();
        let (old_list, new_list) = (keyed_list(&old), keyed_list(&new));
        let mut differ = Differ::new();
        differ
            .diff(&Node::root(&old_list, &config), &Node::root(&new_list, &config))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(differ.comparisons() <= old.len() * (new.len() + 1));
    }
}
