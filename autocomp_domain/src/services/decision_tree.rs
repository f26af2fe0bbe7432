// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Decision Tree
//!
//! Deserializes the flat-array decision tree format described in §3 and
//! classifies feature vectors into `(codec, level)` decisions. The tree is
//! trained offline (out of scope here, per the spec's non-goals) and is
//! treated strictly as an immutable, reentrant lookup structure once loaded.

use std::io::BufRead;

use crate::error::AutoCompError;
use crate::value_objects::Codec;

#[derive(Debug, Clone, Copy)]
struct Node {
    left: usize,
    right: usize,
    feature: usize,
    threshold: f64,
    value: usize,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.left == self.right
    }
}

#[derive(Debug)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    compressors: Vec<Codec>,
    n_features: usize,
}

impl DecisionTree {
    /// Parses the header + node table described in §3:
    /// `n_labels`, `n_labels` label lines, `n_features`, `n_nodes`, then
    /// `n_nodes` lines of `left right feature threshold value`.
    pub fn load<R: BufRead>(reader: R) -> Result<Self, AutoCompError> {
        let mut lines = reader.lines();

        let n_labels: usize = Self::next_token(&mut lines)?;
        let mut compressors = Vec::with_capacity(n_labels);
        for _ in 0..n_labels {
            let label = Self::next_line(&mut lines)?;
            compressors.push(Self::parse_label(&label)?);
        }

        let n_features: usize = Self::next_token(&mut lines)?;
        let n_nodes: usize = Self::next_token(&mut lines)?;

        let mut nodes = Vec::with_capacity(n_nodes);
        for _ in 0..n_nodes {
            let line = Self::next_line(&mut lines)?;
            let mut parts = line.split_whitespace();
            let left: usize = Self::parse_field(parts.next(), "left")?;
            let right: usize = Self::parse_field(parts.next(), "right")?;
            let feature: usize = Self::parse_field(parts.next(), "feature")?;
            let threshold: f64 = Self::parse_field(parts.next(), "threshold")?;
            let value: usize = Self::parse_field(parts.next(), "value")?;
            nodes.push(Node {
                left,
                right,
                feature,
                threshold,
                value,
            });
        }

        let tree = Self {
            nodes,
            compressors,
            n_features,
        };
        tree.validate()?;
        Ok(tree)
    }

    fn validate(&self) -> Result<(), AutoCompError> {
        if self.nodes.is_empty() {
            return Err(AutoCompError::io("decision tree has no nodes"));
        }
        for node in &self.nodes {
            if node.is_leaf() {
                if node.value >= self.compressors.len() {
                    return Err(AutoCompError::io(format!(
                        "leaf value {} out of range for {} labels",
                        node.value,
                        self.compressors.len()
                    )));
                }
            } else {
                if node.feature >= self.n_features {
                    return Err(AutoCompError::io(format!(
                        "feature index {} out of range for {} features",
                        node.feature, self.n_features
                    )));
                }
                if node.left >= self.nodes.len() || node.right >= self.nodes.len() {
                    return Err(AutoCompError::io("node child index out of range"));
                }
            }
        }
        Ok(())
    }

    /// Label parsing per §3: split at `_`; codec name uppercased, level
    /// parsed from the remainder or `-1` if absent.
    fn parse_label(label: &str) -> Result<Codec, AutoCompError> {
        match label.split_once('_') {
            Some((name, level_str)) => {
                let level: i32 = level_str
                    .parse()
                    .map_err(|_| AutoCompError::io(format!("bad level in label {label:?}")))?;
                Codec::from_name(name, level)
            }
            None => Codec::from_name(label, -1),
        }
    }

    fn next_token<T: std::str::FromStr>(
        lines: &mut std::io::Lines<impl BufRead>,
    ) -> Result<T, AutoCompError> {
        let line = Self::next_line(lines)?;
        line.trim()
            .parse()
            .map_err(|_| AutoCompError::io(format!("expected integer, got {line:?}")))
    }

    fn next_line(lines: &mut std::io::Lines<impl BufRead>) -> Result<String, AutoCompError> {
        lines
            .next()
            .ok_or_else(|| AutoCompError::io("unexpected end of decision tree file"))?
            .map_err(|e| AutoCompError::io(e.to_string()))
    }

    fn parse_field<T: std::str::FromStr>(
        token: Option<&str>,
        field: &str,
    ) -> Result<T, AutoCompError> {
        token
            .ok_or_else(|| AutoCompError::io(format!("missing {field} field in node line")))?
            .parse()
            .map_err(|_| AutoCompError::io(format!("bad {field} field in node line")))
    }

    /// Classifies a feature point of length `n_features`, per the loop in
    /// §4.H. Halts in at most `depth(tree)` steps since every non-leaf
    /// strictly advances `i` to a child index (the tree is acyclic).
    pub fn classify(&self, point: &[i32]) -> Result<Codec, AutoCompError> {
        if point.len() != self.n_features {
            return Err(AutoCompError::InvalidArgument(format!(
                "expected {} features, got {}",
                self.n_features,
                point.len()
            )));
        }

        let mut i = 0usize;
        loop {
            let node = &self.nodes[i];
            if node.is_leaf() {
                return Ok(self.compressors[node.value]);
            }
            let x = point[node.feature] as f64;
            i = if x <= node.threshold { node.left } else { node.right };
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A minimal two-leaf tree: feature 0 <= 5 -> copy, else zlib_6.
    fn sample_tree_text() -> &'static str {
        "2\ncopy\nzlib_6\n1\n3\n0 1 0 5 0\n0 0 0 0 0\n0 0 0 0 1\n"
    }

    #[test]
    fn loads_and_classifies() {
        let tree = DecisionTree::load(Cursor::new(sample_tree_text())).unwrap();
        assert_eq!(tree.n_features(), 1);
        assert_eq!(tree.classify(&[3]).unwrap(), Codec::Copy);
        assert_eq!(tree.classify(&[9]).unwrap(), Codec::Zlib(6));
    }

    #[test]
    fn wrong_feature_count_fails() {
        let tree = DecisionTree::load(Cursor::new(sample_tree_text())).unwrap();
        assert!(tree.classify(&[1, 2]).is_err());
    }

    #[test]
    fn label_without_level_is_negative_one() {
        let text = "1\nsnappy\n1\n1\n0 0 0 0 0\n";
        let tree = DecisionTree::load(Cursor::new(text)).unwrap();
        assert_eq!(tree.classify(&[0]).unwrap(), Codec::Snappy);
    }

    #[test]
    fn out_of_range_leaf_value_is_rejected_at_load() {
        let text = "1\ncopy\n1\n1\n0 0 0 0 5\n";
        assert!(DecisionTree::load(Cursor::new(text)).is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        /// Builds a well-formed, acyclic binary tree over `n_features`
        /// features and `depth` levels: internal nodes split on a feature
        /// with a threshold, every path bottoms out at a leaf pointing at a
        /// valid label index. Matches the §3 flat-array format `load`
        /// parses, so any tree this strategy produces is guaranteed to pass
        /// `validate`.
        fn balanced_tree_text(n_features: usize, depth: u32) -> (String, usize) {
            let labels = ["copy", "zlib_6", "snappy", "bzip2_9", "fpc_16"];
            let n_labels = labels.len();

            let mut nodes: Vec<(usize, usize, usize, i32, usize)> = Vec::new();
            fn build(
                depth: u32,
                n_features: usize,
                n_labels: usize,
                nodes: &mut Vec<(usize, usize, usize, i32, usize)>,
            ) -> usize {
                let idx = nodes.len();
                nodes.push((0, 0, 0, 0, 0));
                if depth == 0 {
                    let leaf_value = idx % n_labels;
                    nodes[idx] = (idx, idx, 0, 0, leaf_value);
                } else {
                    let feature = idx % n_features;
                    let left = build(depth - 1, n_features, n_labels, nodes);
                    let right = build(depth - 1, n_features, n_labels, nodes);
                    nodes[idx] = (left, right, feature, 0, 0);
                }
                idx
            }
            build(depth, n_features, n_labels, &mut nodes);

            let mut text = format!("{n_labels}\n");
            for label in &labels {
                text.push_str(label);
                text.push('\n');
            }
            text.push_str(&format!("{n_features}\n{}\n", nodes.len()));
            for (left, right, feature, threshold, value) in &nodes {
                text.push_str(&format!("{left} {right} {feature} {threshold} {value}\n"));
            }
            (text, nodes.len())
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Classification always halts (no infinite loop / panic) and
            /// returns a codec that is one of the tree's declared labels,
            /// for any well-formed tree and any feature vector of the right
            /// arity.
            #[test]
            fn classification_terminates_and_returns_a_declared_label(
                n_features in 1usize..4,
                depth in 0u32..6,
                point in prop::collection::vec(any::<i32>(), 1..4),
            ) {
                let (text, node_count) = balanced_tree_text(n_features, depth);
                let tree = DecisionTree::load(Cursor::new(text)).unwrap();

                let point: Vec<i32> = point.into_iter().cycle().take(n_features).collect();
                let result = tree.classify(&point);

                prop_assert!(result.is_ok());
                let codec = result.unwrap();
                prop_assert!(matches!(
                    codec,
                    Codec::Copy | Codec::Zlib(6) | Codec::Snappy | Codec::Bzip2(9) | Codec::Fpc(16)
                ));
                prop_assert!(node_count <= (1usize << (depth + 1)));
            }

            /// A feature vector of the wrong length is always rejected,
            /// regardless of tree shape.
            #[test]
            fn wrong_arity_point_always_fails(
                n_features in 1usize..4,
                depth in 0u32..4,
                wrong_len in 0usize..8,
            ) {
                let (text, _) = balanced_tree_text(n_features, depth);
                let tree = DecisionTree::load(Cursor::new(text)).unwrap();
                prop_assume!(wrong_len != n_features);

                let point = vec![0i32; wrong_len];
                prop_assert!(tree.classify(&point).is_err());
            }
        }
    }
}
