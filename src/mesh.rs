//! Read-only mesh view handed over by the I/O layer.

/// One block of homogeneous elements.
///
/// `connectivity` holds `num_elements * nodes_per_element` 1-based node
/// references, element-major.
#[derive(Clone, Debug)]
pub struct ElementBlock {
    /// Externally assigned block id, used in diagnostics.
    pub id: i64,
    pub num_elements: usize,
    pub nodes_per_element: usize,
    pub connectivity: Vec<usize>,
}

impl ElementBlock {
    pub fn new(id: i64, nodes_per_element: usize, connectivity: Vec<usize>) -> Self {
        assert!(nodes_per_element > 0);
        assert_eq!(connectivity.len() % nodes_per_element, 0);
        let num_elements = connectivity.len() / nodes_per_element;
        Self {
            id,
            num_elements,
            nodes_per_element,
            connectivity,
        }
    }

    /// Connectivity slice (1-based node references) of local element `e`.
    #[inline]
    pub fn element(&self, e: usize) -> &[usize] {
        let start = e * self.nodes_per_element;
        &self.connectivity[start..start + self.nodes_per_element]
    }
}

/// An independently ordered mesh dataset: node coordinates plus element
/// blocks, with optional externally stored global id arrays.
///
/// `y` and `z` are empty when the dimension omits those axes.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub dimension: usize, // 1, 2 or 3
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub blocks: Vec<ElementBlock>,
    /// Global node ids, when the file stores a node number map.
    pub node_ids: Option<Vec<i64>>,
    /// Global element ids, when the file stores an element number map.
    pub elem_ids: Option<Vec<i64>>,
}

impl Mesh {
    pub fn new(dimension: usize, x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        assert!((1..=3).contains(&dimension));
        if dimension > 1 {
            assert_eq!(y.len(), x.len());
        }
        if dimension > 2 {
            assert_eq!(z.len(), x.len());
        }
        Self {
            dimension,
            x,
            y,
            z,
            blocks: Vec::new(),
            node_ids: None,
            elem_ids: None,
        }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.x.len()
    }

    /// Total element count across all blocks.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.blocks.iter().map(|b| b.num_elements).sum()
    }

    /// Coordinate of node `n` (0-based); absent axes read 0.0.
    #[inline]
    pub fn node_coord(&self, n: usize) -> [f64; 3] {
        [
            self.x[n],
            if self.dimension > 1 { self.y[n] } else { 0.0 },
            if self.dimension > 2 { self.z[n] } else { 0.0 },
        ]
    }

    /// Split a 0-based global element index into `(block, local)` indices.
    pub fn global_to_block_local(&self, global: usize) -> Option<(usize, usize)> {
        let mut offset = 0;
        for (b, block) in self.blocks.iter().enumerate() {
            if global < offset + block.num_elements {
                return Some((b, global - offset));
            }
            offset += block.num_elements;
        }
        None
    }

    /// Arithmetic mean, per axis, of the nodes referenced by `conn`
    /// (1-based references).
    pub fn centroid(&self, conn: &[usize]) -> [f64; 3] {
        let mut sum = [0.0_f64; 3];
        for &node in conn {
            debug_assert!(node >= 1 && node <= self.num_nodes());
            sum[0] += self.x[node - 1];
            if self.dimension > 1 {
                sum[1] += self.y[node - 1];
            }
            if self.dimension > 2 {
                sum[2] += self.z[node - 1];
            }
        }
        let n = conn.len() as f64;
        [sum[0] / n, sum[1] / n, sum[2] / n]
    }
}
