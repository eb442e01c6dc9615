//! Dependency ordering for bw
//!
//! Both the group hierarchy (parents before subgroups) and item execution
//! (dependencies before dependents) are orderings of a directed graph
//! given as an adjacency list of names. [`sort::topological_sort`] and
//! [`sort::sorted_topological_sort`] produce them and report cycles.

pub mod sort;
