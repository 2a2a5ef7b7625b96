//! Prerequisite expressions.
//!
//! A [`PrereqTree`] is a boolean expression over module codes. Leaves name a
//! single module; groups combine their children with either ALL-of or ANY-of
//! semantics. The canonical shape produced by catalog files is an ANY-of
//! group of ALL-of groups, but arbitrary nesting is supported.

use std::fmt;

use crate::domain::ModuleCode;

/// How the children of a [`PrereqTree::Group`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Every child must be satisfied.
    AllOf,
    /// At least one child must be satisfied.
    AnyOf,
}

impl Combinator {
    const fn keyword(self) -> &'static str {
        match self {
            Self::AllOf => "and",
            Self::AnyOf => "or",
        }
    }
}

/// A prerequisite expression.
///
/// The tree is built fresh whenever it is decoded and is never mutated in
/// place, so it cannot contain cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrereqTree {
    /// A single module that must have been completed.
    Leaf(ModuleCode),
    /// A combination of sub-expressions.
    ///
    /// A group with no children is vacuously satisfied.
    Group(Combinator, Vec<PrereqTree>),
}

impl Default for PrereqTree {
    fn default() -> Self {
        Self::none()
    }
}

impl PrereqTree {
    /// The deepest group nesting a stored expression may have.
    pub const MAX_DEPTH: usize = 128;

    /// An expression with no prerequisites.
    #[must_use]
    pub const fn none() -> Self {
        Self::Group(Combinator::AnyOf, Vec::new())
    }

    /// Builds an expression from nested lists of codes.
    ///
    /// Each inner list is an ALL-of group; the outer list is the ANY-of
    /// combination of those groups.
    #[must_use]
    pub fn from_groups(groups: Vec<Vec<ModuleCode>>) -> Self {
        let children = groups
            .into_iter()
            .map(|group| Self::Group(Combinator::AllOf, group.into_iter().map(Self::Leaf).collect()))
            .collect();
        Self::Group(Combinator::AnyOf, children)
    }

    /// Builds an expression from a legacy flat list of codes.
    ///
    /// The list becomes a single mandatory combination: one ALL-of group
    /// wrapped in one ANY-of group, in the original order.
    #[must_use]
    pub fn from_legacy(codes: Vec<ModuleCode>) -> Self {
        Self::from_groups(vec![codes])
    }

    /// Returns `true` if the expression references no modules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes().next().is_none()
    }

    /// Iterates over every leaf code in pre-order, including repeats.
    pub fn codes(&self) -> impl Iterator<Item = &ModuleCode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                match node {
                    Self::Leaf(code) => return Some(code),
                    Self::Group(_, children) => stack.extend(children.iter().rev()),
                }
            }
            None
        })
    }

    /// The number of groups on the longest path from the root to a node.
    ///
    /// A leaf has depth zero; an empty group has depth one.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                Self::Leaf(_) => deepest = deepest.max(depth),
                Self::Group(_, children) => {
                    deepest = deepest.max(depth + 1);
                    stack.extend(children.iter().map(|child| (child, depth + 1)));
                }
            }
        }
        deepest
    }

    /// Expands the expression into the ordered list of ALL-of combinations,
    /// any one of which satisfies it.
    ///
    /// This is the disjunctive normal form of the tree: ANY-of groups
    /// concatenate the combinations of their children, ALL-of groups take
    /// the ordered cartesian product. Combinations that reference no modules
    /// are omitted, so an expression with no prerequisites yields an empty
    /// list.
    #[must_use]
    pub fn flatten_groups(&self) -> Vec<Vec<ModuleCode>> {
        let mut groups = self.combinations();
        groups.retain(|group| !group.is_empty());
        groups
    }

    /// An upper bound on the length of [`flatten_groups`](Self::flatten_groups),
    /// computed without expanding the tree.
    ///
    /// Returns `None` if the bound does not fit in a `usize`.
    #[must_use]
    pub fn combination_count(&self) -> Option<usize> {
        match self {
            Self::Leaf(_) => Some(1),
            Self::Group(_, children) if children.is_empty() => Some(1),
            Self::Group(Combinator::AnyOf, children) => children
                .iter()
                .try_fold(0usize, |total, child| total.checked_add(child.combination_count()?)),
            Self::Group(Combinator::AllOf, children) => children
                .iter()
                .try_fold(1usize, |total, child| total.checked_mul(child.combination_count()?)),
        }
    }

    fn combinations(&self) -> Vec<Vec<ModuleCode>> {
        match self {
            Self::Leaf(code) => vec![vec![code.clone()]],
            Self::Group(_, children) if children.is_empty() => vec![Vec::new()],
            Self::Group(Combinator::AnyOf, children) => {
                children.iter().flat_map(Self::combinations).collect()
            }
            Self::Group(Combinator::AllOf, children) => {
                children.iter().fold(vec![Vec::new()], |acc, child| {
                    let options = child.combinations();
                    acc.iter()
                        .flat_map(|prefix| {
                            options.iter().map(move |option| {
                                let mut combined = prefix.clone();
                                combined.extend(option.iter().cloned());
                                combined
                            })
                        })
                        .collect()
                })
            }
        }
    }
}

impl PrereqTree {
    /// The combinator that appears at the top level of the rendered form.
    ///
    /// Single-child groups render as their child, so this looks through
    /// them. Leaves and empty groups render without a combinator.
    fn rendered_combinator(&self) -> Option<Combinator> {
        let mut node = self;
        loop {
            match node {
                Self::Group(_, children) if children.len() == 1 => node = &children[0],
                Self::Group(combinator, children) if children.len() > 1 => {
                    return Some(*combinator);
                }
                _ => return None,
            }
        }
    }
}

impl fmt::Display for PrereqTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(code) => write!(f, "{code}"),
            Self::Group(_, children) if children.is_empty() => write!(f, "none"),
            Self::Group(_, children) if children.len() == 1 => write!(f, "{}", children[0]),
            Self::Group(combinator, children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", combinator.keyword())?;
                    }
                    if child.rendered_combinator().is_some() {
                        write!(f, "({child})")?;
                    } else {
                        write!(f, "{child}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ModuleCode {
        s.parse().unwrap()
    }

    fn leaf(s: &str) -> PrereqTree {
        PrereqTree::Leaf(code(s))
    }

    fn codes(list: &[&str]) -> Vec<ModuleCode> {
        list.iter().map(|s| code(s)).collect()
    }

    #[test]
    fn none_is_empty() {
        assert!(PrereqTree::none().is_empty());
        assert!(PrereqTree::none().flatten_groups().is_empty());
    }

    #[test]
    fn legacy_list_becomes_single_mandatory_group() {
        let tree = PrereqTree::from_legacy(codes(&["CS1010", "MA1521"]));
        assert_eq!(
            tree,
            PrereqTree::Group(
                Combinator::AnyOf,
                vec![PrereqTree::Group(
                    Combinator::AllOf,
                    vec![leaf("CS1010"), leaf("MA1521")]
                )]
            )
        );
    }

    #[test]
    fn canonical_shape_flattens_to_inner_groups() {
        let groups = vec![codes(&["A", "B"]), codes(&["A", "C"])];
        let tree = PrereqTree::from_groups(groups.clone());
        assert_eq!(tree.flatten_groups(), groups);
    }

    #[test]
    fn nested_all_of_takes_cartesian_product() {
        // (A or B) and C
        let tree = PrereqTree::Group(
            Combinator::AllOf,
            vec![
                PrereqTree::Group(Combinator::AnyOf, vec![leaf("A"), leaf("B")]),
                leaf("C"),
            ],
        );
        assert_eq!(
            tree.flatten_groups(),
            vec![codes(&["A", "C"]), codes(&["B", "C"])]
        );
    }

    #[test]
    fn empty_group_is_vacuously_satisfied() {
        let tree = PrereqTree::Group(
            Combinator::AllOf,
            vec![PrereqTree::Group(Combinator::AnyOf, vec![]), leaf("X")],
        );
        assert_eq!(tree.flatten_groups(), vec![codes(&["X"])]);
    }

    #[test]
    fn codes_are_visited_in_order_with_repeats() {
        let tree = PrereqTree::from_groups(vec![codes(&["A", "B"]), codes(&["A", "C"])]);
        let visited: Vec<_> = tree.codes().map(ModuleCode::as_str).collect();
        assert_eq!(visited, ["A", "B", "A", "C"]);
    }

    #[test]
    fn display_is_infix() {
        let tree = PrereqTree::from_groups(vec![codes(&["CS1010", "MA1521"]), codes(&["CS1101S"])]);
        assert_eq!(tree.to_string(), "(CS1010 and MA1521) or CS1101S");
        assert_eq!(PrereqTree::none().to_string(), "none");
    }

    #[test]
    fn display_brackets_wrapped_groups() {
        // AllOf[AnyOf[AnyOf[A, B]], C]
        let tree = PrereqTree::Group(
            Combinator::AllOf,
            vec![
                PrereqTree::Group(
                    Combinator::AnyOf,
                    vec![PrereqTree::Group(Combinator::AnyOf, vec![leaf("A"), leaf("B")])],
                ),
                leaf("C"),
            ],
        );
        assert_eq!(tree.to_string(), "(A or B) and C");
    }

    #[test]
    fn combination_count_does_not_expand() {
        let tree = PrereqTree::Group(
            Combinator::AllOf,
            (0..70)
                .map(|i| {
                    PrereqTree::Group(
                        Combinator::AnyOf,
                        vec![leaf(&format!("A{i}")), leaf(&format!("B{i}"))],
                    )
                })
                .collect(),
        );
        assert_eq!(tree.combination_count(), None);

        let canonical = PrereqTree::from_groups(vec![codes(&["A", "B"]), codes(&["C"])]);
        assert_eq!(canonical.combination_count(), Some(2));
    }

    #[test]
    fn depth_counts_nested_groups() {
        assert_eq!(leaf("A").depth(), 0);
        assert_eq!(PrereqTree::none().depth(), 1);
        assert_eq!(
            PrereqTree::from_groups(vec![codes(&["A", "B"])]).depth(),
            2
        );
    }
}
