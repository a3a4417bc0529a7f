//! Merkle tree over column leaves.
//
// Heap layout: node 1 is the root, node i has children 2i and 2i+1, and the
// leaves occupy nodes `leaf_count..2 * leaf_count`. Leaf and inner-node hashes
// carry distinct one-byte prefixes.

use super::errors::{LigeroError, LigeroResult};
use rayon::prelude::*;
use sha2::digest::{consts::U32, Digest, OutputSizeUser};
use std::marker::PhantomData;

pub type Digest32 = [u8; 32];

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

pub fn hash_leaf<D>(data: &[u8]) -> Digest32
where
    D: Digest + OutputSizeUser<OutputSize = U32>,
{
    let mut hasher = D::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(data);
    hasher.finalize().into()
}

pub fn hash_node<D>(left: &Digest32, right: &Digest32) -> Digest32
where
    D: Digest + OutputSizeUser<OutputSize = U32>,
{
    let mut hasher = D::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

#[derive(Debug, Clone)]
pub struct MerkleTree<D> {
    nodes: Vec<Digest32>,
    leaf_count: usize,
    _hash: PhantomData<fn() -> D>,
}

impl<D> MerkleTree<D>
where
    D: Digest + OutputSizeUser<OutputSize = U32>,
{
    /// Builds the tree; the leaf count must be a power of two.
    pub fn new<T: AsRef<[u8]> + Sync>(leaves: &[T]) -> LigeroResult<Self> {
        let leaf_count = leaves.len();
        if leaf_count == 0 || !leaf_count.is_power_of_two() {
            return Err(LigeroError::merkle_error(
                "build",
                "leaf count must be a non-zero power of two",
            ));
        }
        let mut nodes = vec![[0u8; 32]; 2 * leaf_count];
        nodes[leaf_count..]
            .par_iter_mut()
            .zip(leaves.par_iter())
            .for_each(|(node, leaf)| *node = hash_leaf::<D>(leaf.as_ref()));

        for i in (1..leaf_count).rev() {
            nodes[i] = hash_node::<D>(&nodes[2 * i], &nodes[2 * i + 1]);
        }

        Ok(Self {
            nodes,
            leaf_count,
            _hash: PhantomData,
        })
    }

    /// With a single leaf the root is the leaf hash.
    pub fn root(&self) -> Digest32 {
        self.nodes[1]
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Sibling hashes from the leaf up to the root.
    pub fn generate_auth_path(&self, leaf_index: usize) -> LigeroResult<Vec<Digest32>> {
        if leaf_index >= self.leaf_count {
            return Err(LigeroError::merkle_error(
                "open",
                &format!("leaf {} out of range 0..{}", leaf_index, self.leaf_count),
            ));
        }
        let mut path = Vec::with_capacity(self.leaf_count.trailing_zeros() as usize);
        let mut current_index = leaf_index + self.leaf_count;
        while current_index > 1 {
            path.push(self.nodes[current_index ^ 1]);
            current_index /= 2;
        }
        Ok(path)
    }

    pub fn verify_auth_path(
        root: &Digest32,
        leaf: &[u8],
        leaf_index: usize,
        path: &[Digest32],
    ) -> bool {
        if path.len() >= usize::BITS as usize || leaf_index >> path.len() != 0 {
            return false;
        }
        let mut current_hash = hash_leaf::<D>(leaf);
        let mut current_index = leaf_index;
        for sibling in path {
            current_hash = if current_index % 2 == 0 {
                hash_node::<D>(&current_hash, sibling)
            } else {
                hash_node::<D>(sibling, &current_hash)
            };
            current_index /= 2;
        }
        current_hash == *root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Sha256;
    use sha3::Sha3_256;

    fn leaves(count: usize) -> Vec<Vec<u8>> {
        (0..count).map(|i| format!("column-{i}").into_bytes()).collect()
    }

    #[test]
    fn test_auth_paths_verify() {
        let data = leaves(16);
        let tree = MerkleTree::<Sha256>::new(&data).unwrap();
        let root = tree.root();
        for (i, leaf) in data.iter().enumerate() {
            let path = tree.generate_auth_path(i).unwrap();
            assert_eq!(path.len(), 4);
            assert!(MerkleTree::<Sha256>::verify_auth_path(&root, leaf, i, &path));
        }
    }

    #[test]
    fn test_tampering_detected() {
        let data = leaves(8);
        let tree = MerkleTree::<Sha3_256>::new(&data).unwrap();
        let root = tree.root();
        let path = tree.generate_auth_path(3).unwrap();
        assert!(!MerkleTree::<Sha3_256>::verify_auth_path(&root, b"forged", 3, &path));
        assert!(!MerkleTree::<Sha3_256>::verify_auth_path(&root, &data[3], 2, &path));
        assert!(!MerkleTree::<Sha3_256>::verify_auth_path(&root, &data[3], 11, &path));
        let mut bad_path = path.clone();
        bad_path[1][0] ^= 1;
        assert!(!MerkleTree::<Sha3_256>::verify_auth_path(&root, &data[3], 3, &bad_path));
    }

    #[test]
    fn test_hash_functions_give_different_roots() {
        let data = leaves(4);
        let a = MerkleTree::<Sha256>::new(&data).unwrap().root();
        let b = MerkleTree::<Sha3_256>::new(&data).unwrap().root();
        assert_ne!(a, b);
    }

    #[test]
    fn test_single_leaf_and_bad_sizes() {
        let data = leaves(1);
        let tree = MerkleTree::<Sha256>::new(&data).unwrap();
        assert!(tree.generate_auth_path(0).unwrap().is_empty());
        assert!(MerkleTree::<Sha256>::verify_auth_path(&tree.root(), &data[0], 0, &[]));
        assert!(MerkleTree::<Sha256>::new(&leaves(3)).is_err());
        assert!(MerkleTree::<Sha256>::new::<Vec<u8>>(&[]).is_err());
        assert!(tree.generate_auth_path(1).is_err());
    }
}
