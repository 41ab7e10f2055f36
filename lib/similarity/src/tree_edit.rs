// Zhang-Shasha ordered tree edit distance over n-gram labeled trees
use samos_core::{NGram, NTree};

const INSERT_COST: f64 = 1.0;
const DELETE_COST: f64 = 1.0;

/// Post-order view of a tree: labels and leftmost leaf descendants
struct Indexed<'a> {
    labels: Vec<&'a NGram>,
    leftmost: Vec<usize>,
    keyroots: Vec<usize>,
}

impl<'a> Indexed<'a> {
    fn new(tree: &'a NTree) -> Self {
        let mut labels = Vec::with_capacity(tree.size());
        let mut leftmost = Vec::with_capacity(tree.size());
        Self::visit(tree, &mut labels, &mut leftmost);

        // a keyroot is the highest node sharing its leftmost leaf
        let mut highest = vec![usize::MAX; labels.len()];
        for (node, &leaf) in leftmost.iter().enumerate() {
            highest[leaf] = node;
        }
        let mut keyroots: Vec<usize> = highest.into_iter().filter(|&n| n != usize::MAX).collect();
        keyroots.sort_unstable();

        Self {
            labels,
            leftmost,
            keyroots,
        }
    }

    fn visit(tree: &'a NTree, labels: &mut Vec<&'a NGram>, leftmost: &mut Vec<usize>) -> usize {
        let mut first_leaf = None;
        for child in &tree.children {
            let child_index = Self::visit(child, labels, leftmost);
            if first_leaf.is_none() {
                first_leaf = Some(leftmost[child_index]);
            }
        }
        let index = labels.len();
        labels.push(&tree.node);
        leftmost.push(first_leaf.unwrap_or(index));
        index
    }

    #[inline]
    fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Edit distance with unit insert/delete cost and caller-defined rename cost
pub fn tree_edit_distance<F>(a: &NTree, b: &NTree, mut rename: F) -> f64
where
    F: FnMut(&NGram, &NGram) -> f64,
{
    let (ta, tb) = (Indexed::new(a), Indexed::new(b));
    let mut tree_dist = vec![vec![0.0f64; tb.len()]; ta.len()];

    for &i in &ta.keyroots {
        for &j in &tb.keyroots {
            forest_distance(&ta, &tb, i, j, &mut tree_dist, &mut rename);
        }
    }
    tree_dist[ta.len() - 1][tb.len() - 1]
}

fn forest_distance<F>(
    ta: &Indexed<'_>,
    tb: &Indexed<'_>,
    i: usize,
    j: usize,
    tree_dist: &mut [Vec<f64>],
    rename: &mut F,
) where
    F: FnMut(&NGram, &NGram) -> f64,
{
    let (li, lj) = (ta.leftmost[i], tb.leftmost[j]);
    let (rows, cols) = (i - li + 2, j - lj + 2);
    let mut fd = vec![vec![0.0f64; cols]; rows];

    for x in 1..rows {
        fd[x][0] = fd[x - 1][0] + DELETE_COST;
    }
    for y in 1..cols {
        fd[0][y] = fd[0][y - 1] + INSERT_COST;
    }

    for x in 1..rows {
        for y in 1..cols {
            let (i1, j1) = (li + x - 1, lj + y - 1);
            let delete = fd[x - 1][y] + DELETE_COST;
            let insert = fd[x][y - 1] + INSERT_COST;
            if ta.leftmost[i1] == li && tb.leftmost[j1] == lj {
                let cost = rename(ta.labels[i1], tb.labels[j1]);
                fd[x][y] = delete.min(insert).min(fd[x - 1][y - 1] + cost);
                tree_dist[i1][j1] = fd[x][y];
            } else {
                let (p, q) = (ta.leftmost[i1] - li, tb.leftmost[j1] - lj);
                fd[x][y] = delete.min(insert).min(fd[p][q] + tree_dist[i1][j1]);
            }
        }
    }
}
