//! Property-based tests for tree composition.
use options_tree::{OptionsArray, TreeElement};
use proptest::prelude::*;

mod strategies {
    use super::*;

    /// Distinct node names, so identifiers can be compared positionally.
    pub fn names(max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[a-z][a-z0-9]{0,5}", 1..=max)
            .prop_map(|names| names.into_iter().collect())
    }

    pub fn array(name: &'static str, max: usize) -> impl Strategy<Value = OptionsArray> {
        names(max).prop_map(move |names| OptionsArray::new(name, names).unwrap())
    }
}

fn identifiers(tree: &impl TreeElement) -> Vec<String> {
    tree.collapse().iter().map(ToString::to_string).collect()
}

proptest! {
    #[test]
    fn product_is_row_major_cross_product(
        a in strategies::array("a", 5),
        b in strategies::array("b", 5),
    ) {
        let expected = a
            .names()
            .iter()
            .flat_map(|outer| b.names().into_iter().map(move |inner| format!("{}_{}", outer, inner)))
            .collect::<Vec<_>>();
        let tree = &a * b.clone();

        prop_assert_eq!(tree.count_leaves(), a.len() * b.len());
        prop_assert_eq!(identifiers(&tree), expected);
    }

    #[test]
    fn sequential_attach_pairs_leading_nodes(
        a in strategies::array("a", 6),
        b in strategies::array("b", 6),
    ) {
        let tree = &a + b.clone();
        let names = identifiers(&tree);
        let paired = a.len().min(b.len());

        prop_assert_eq!(names.len(), a.len());
        for (index, name) in names.iter().enumerate() {
            let expected = if index < paired {
                format!("{}_{}", a[index].name(), b[index].name())
            } else {
                a[index].name().to_string()
            };
            prop_assert_eq!(name, &expected);
        }
    }

    #[test]
    fn copies_collapse_independently(
        a in strategies::array("a", 4),
        b in strategies::array("b", 4),
    ) {
        let tree = a * b;
        let copy = tree.clone();
        let expected = tree.collapse();

        let mut leaves = copy.collapse();
        for leaf in &mut leaves {
            leaf.insert("a", "changed");
            leaf.remove("b");
        }

        prop_assert_eq!(tree.collapse(), expected.clone());
        prop_assert_eq!(copy.collapse(), expected);
    }
}
