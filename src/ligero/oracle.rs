//! Column commitments to an interleaved codeword.
//!
//! All committed rows share the codeword domain; opening position `j`
//! reveals the column `(U_0[j], ..., U_{R-1}[j])`.

use super::errors::{LigeroError, LigeroResult};
use super::field_serde;
use super::field_utils::{serialize_field_slice, LigeroField};
use super::merkle::{Digest32, MerkleTree};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, IfIsHumanReadable};
use sha2::digest::{consts::U32, Digest, OutputSizeUser};
use sha2::Sha256;
use std::marker::PhantomData;
use tracing::debug;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOpening<F: LigeroField> {
    pub position: usize,
    #[serde(with = "field_serde::vec")]
    pub values: Vec<F>,
    #[serde_as(as = "Vec<IfIsHumanReadable<Hex>>")]
    pub auth_path: Vec<Digest32>,
}

/// Commit / open / verify capability behind which the commitment scheme
/// can be swapped.
pub trait Oracle<F: LigeroField>: Send + Sync {
    type Handle: Send + Sync;

    /// Commits to equally long rows.
    fn commit(&self, rows: Vec<Vec<F>>) -> LigeroResult<Self::Handle>;

    fn root(&self, handle: &Self::Handle) -> Digest32;

    /// The committed rows, for the prover's own use.
    fn codewords<'h>(&self, handle: &'h Self::Handle) -> &'h [Vec<F>];

    fn open(&self, handle: &Self::Handle, position: usize) -> LigeroResult<ColumnOpening<F>>;

    fn verify_opening(&self, root: &Digest32, opening: &ColumnOpening<F>) -> bool;

    fn open_many(
        &self,
        handle: &Self::Handle,
        positions: &[usize],
    ) -> LigeroResult<Vec<ColumnOpening<F>>> {
        positions.iter().map(|p| self.open(handle, *p)).collect()
    }
}

/// Merkle tree over serialized columns, generic over a 32-byte hash.
#[derive(Debug)]
pub struct MerkleOracle<F, D = Sha256> {
    _marker: PhantomData<fn() -> (F, D)>,
}

impl<F, D> MerkleOracle<F, D> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, D> Default for MerkleOracle<F, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, D> Clone for MerkleOracle<F, D> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

pub struct MerkleCommitment<F: LigeroField, D> {
    rows: Vec<Vec<F>>,
    tree: MerkleTree<D>,
}

impl<F: LigeroField, D> MerkleCommitment<F, D> {
    pub fn rows(&self) -> &[Vec<F>] {
        &self.rows
    }
}

fn column<F: LigeroField>(rows: &[Vec<F>], position: usize) -> Vec<F> {
    rows.iter().map(|row| row[position]).collect()
}

impl<F, D> Oracle<F> for MerkleOracle<F, D>
where
    F: LigeroField,
    D: Digest + OutputSizeUser<OutputSize = U32>,
{
    type Handle = MerkleCommitment<F, D>;

    fn commit(&self, rows: Vec<Vec<F>>) -> LigeroResult<Self::Handle> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| LigeroError::merkle_error("commit", "no rows to commit"))?;
        if rows.iter().any(|row| row.len() != width) {
            return Err(LigeroError::merkle_error("commit", "rows differ in length"));
        }
        let leaves: Vec<Vec<u8>> = (0..width)
            .into_par_iter()
            .map(|j| serialize_field_slice(&column(&rows, j)))
            .collect();
        let tree = MerkleTree::<D>::new(&leaves)?;
        debug!(rows = rows.len(), columns = width, "Committed interleaved codeword");
        Ok(MerkleCommitment { rows, tree })
    }

    fn root(&self, handle: &Self::Handle) -> Digest32 {
        handle.tree.root()
    }

    fn codewords<'h>(&self, handle: &'h Self::Handle) -> &'h [Vec<F>] {
        &handle.rows
    }

    fn open(&self, handle: &Self::Handle, position: usize) -> LigeroResult<ColumnOpening<F>> {
        let auth_path = handle.tree.generate_auth_path(position)?;
        Ok(ColumnOpening {
            position,
            values: column(&handle.rows, position),
            auth_path,
        })
    }

    fn verify_opening(&self, root: &Digest32, opening: &ColumnOpening<F>) -> bool {
        let leaf = serialize_field_slice(&opening.values);
        MerkleTree::<D>::verify_auth_path(root, &leaf, opening.position, &opening.auth_path)
    }
}
