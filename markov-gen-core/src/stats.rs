use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::model::graph::MarkovGraph;
use crate::model::ngram::NGram;

/// Structural summary of a Markov graph seen as a directed graph.
///
/// Nodes are every n-gram appearing as a source or a destination, so
/// terminal states are counted too. The degree of a node is its in-degree
/// plus its out-degree; a self-loop counts twice.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GraphStats {
	pub nodes: usize,
	pub edges: usize,
	pub average_degree: f64,
	/// `edges / (nodes * (nodes - 1))`, zero for fewer than two nodes.
	pub density: f64,
	/// Mean directed clustering coefficient over all nodes.
	pub average_clustering: f64,
	pub weakly_connected_components: usize,
	pub max_degree: usize,
	/// `(degree, number of nodes with that degree)`, by increasing degree.
	pub degree_histogram: Vec<(usize, usize)>,
}

impl GraphStats {
	pub fn compute(graph: &MarkovGraph) -> Self {
		let mut ids: HashMap<&NGram, usize> = HashMap::new();
		let mut edges = Vec::with_capacity(graph.edge_count());
		for (source, transition) in graph.edges() {
			let next = ids.len();
			let s = *ids.entry(source).or_insert(next);
			let next = ids.len();
			let t = *ids.entry(&transition.target).or_insert(next);
			edges.push((s, t));
		}

		let nodes = ids.len();
		let mut degrees = vec![0usize; nodes];
		let mut components = DisjointSet::new(nodes);
		for &(s, t) in &edges {
			degrees[s] += 1;
			degrees[t] += 1;
			components.union(s, t);
		}

		let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
		for degree in &degrees {
			*histogram.entry(*degree).or_insert(0) += 1;
		}

		let edge_count = edges.len();
		Self {
			nodes,
			edges: edge_count,
			average_degree: if nodes == 0 { 0.0 } else { degrees.iter().sum::<usize>() as f64 / nodes as f64 },
			density: if nodes < 2 { 0.0 } else { edge_count as f64 / (nodes as f64 * (nodes - 1) as f64) },
			average_clustering: average_clustering(nodes, &edges),
			weakly_connected_components: components.count(),
			max_degree: degrees.iter().copied().max().unwrap_or(0),
			degree_histogram: histogram.into_iter().collect(),
		}
	}
}

impl fmt::Display for GraphStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Number of nodes: {}", self.nodes)?;
		writeln!(f, "Number of edges: {}", self.edges)?;
		writeln!(f, "Average degree: {:.2}", self.average_degree)?;
		writeln!(f, "Density: {}", self.density)?;
		writeln!(f, "Average clustering coefficient: {}", self.average_clustering)?;
		writeln!(f, "Maximum degree: {}", self.max_degree)?;
		write!(f, "Number of weakly connected components: {}", self.weakly_connected_components)
	}
}

/// Average of the directed clustering coefficients (Fagiolo, 2007).
///
/// For node `i` with `T` directed triangles, total degree `d` and `b`
/// reciprocated neighbours, `c(i) = T / (2 (d (d - 1) - 2 b))`. Self-loops
/// are ignored and nodes without triangles count as zero.
fn average_clustering(nodes: usize, edges: &[(usize, usize)]) -> f64 {
	if nodes == 0 {
		return 0.0;
	}

	let mut preds = vec![BTreeSet::new(); nodes];
	let mut succs = vec![BTreeSet::new(); nodes];
	for &(s, t) in edges {
		if s != t {
			succs[s].insert(t);
			preds[t].insert(s);
		}
	}

	let total: f64 = (0..nodes)
		.map(|i| {
			let triangles: usize = preds[i]
				.iter()
				.chain(&succs[i])
				.map(|&j| {
					[(&preds[i], &preds[j]), (&preds[i], &succs[j]), (&succs[i], &preds[j]), (&succs[i], &succs[j])]
						.into_iter()
						.map(|(a, b)| a.intersection(b).count())
						.sum::<usize>()
				})
				.sum();
			if triangles == 0 {
				return 0.0;
			}
			let degree = preds[i].len() + succs[i].len();
			let reciprocal = preds[i].intersection(&succs[i]).count();
			triangles as f64 / (2 * (degree * (degree - 1) - 2 * reciprocal)) as f64
		})
		.sum();
	total / nodes as f64
}

/// Union-find over node indices, with path halving and union by size.
struct DisjointSet {
	parent: Vec<usize>,
	size: Vec<usize>,
	sets: usize,
}

impl DisjointSet {
	fn new(len: usize) -> Self {
		Self { parent: (0..len).collect(), size: vec![1; len], sets: len }
	}

	fn find(&mut self, mut node: usize) -> usize {
		while self.parent[node] != node {
			self.parent[node] = self.parent[self.parent[node]];
			node = self.parent[node];
		}
		node
	}

	fn union(&mut self, a: usize, b: usize) {
		let (mut a, mut b) = (self.find(a), self.find(b));
		if a == b {
			return;
		}
		if self.size[a] < self.size[b] {
			std::mem::swap(&mut a, &mut b);
		}
		self.parent[b] = a;
		self.size[a] += self.size[b];
		self.sets -= 1;
	}

	fn count(&self) -> usize {
		self.sets
	}
}
