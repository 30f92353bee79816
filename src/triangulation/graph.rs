use std::cmp::Ordering;

/// Adjacency-list graph; `adj[i]` lists one entry per glued face of node `i`.
#[derive(Clone, Debug)]
pub struct Graph {
    adj: Vec<Vec<usize>>,
}

#[derive(Clone, Debug)]
pub struct GraphEdge(pub usize, pub usize);

impl Graph {
    pub fn new(adj: Vec<Vec<usize>>) -> Self {
        Graph { adj }
    }

    /// List every edge once. Every edge must be recorded at both of its ends, so a loop shows up
    /// twice in the list of its node.
    pub fn edges(&self) -> Vec<GraphEdge> {
        let mut edges = vec![];
        for (i, nbrs) in self.adj.iter().enumerate() {
            let mut loops = 0;
            for &node in nbrs {
                match i.cmp(&node) {
                    Ordering::Less => edges.push(GraphEdge(i, node)),
                    Ordering::Equal => {
                        loops += 1;
                        if loops % 2 == 0 {
                            edges.push(GraphEdge(i, i));
                        }
                    }
                    Ordering::Greater => (),
                }
            }
        }
        edges
    }

    /// Group the nodes into connected components, each sorted, in order of their smallest node.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut component = vec![None; self.adj.len()];
        let mut comps = vec![];
        for seed in 0..self.adj.len() {
            if component[seed].is_some() {
                continue;
            }
            let id = comps.len();
            component[seed] = Some(id);
            let mut members = vec![seed];
            let mut queue = vec![seed];
            while let Some(node) = queue.pop() {
                for &nbr in &self.adj[node] {
                    if component[nbr].is_none() {
                        component[nbr] = Some(id);
                        members.push(nbr);
                        queue.push(nbr);
                    }
                }
            }
            members.sort_unstable();
            comps.push(members);
        }
        comps
    }
}

impl PartialEq for GraphEdge {
    fn eq(&self, other: &Self) -> bool {
        (self.0 == other.0 && self.1 == other.1) || (self.0 == other.1 && self.1 == other.0)
    }
}
