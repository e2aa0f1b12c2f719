//! Atom pool consumed by selection queries.
//!
//! The pool is owned by the caller and rebuilt for every query; the engine only
//! reads it. Atoms refer to their residue by index, residues carry the chain,
//! model and structure names.

use std::collections::{BTreeSet, HashMap, HashSet};

/// Set of atoms, as indices into an [`AtomPool`].
pub type AtomSet = BTreeSet<usize>;

/// Identity of an atom that survives across pools (used by named selections).
pub type AtomUid = u64;

/// Secondary structure assignment of a residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecondaryStructure {
    Helix,
    Helix310,
    HelixPi,
    HelixLeft,
    Strand,
    Turn,
    Bend,
    Bridge,
    #[default]
    Coil,
}

impl SecondaryStructure {
    pub fn is_helix(&self) -> bool {
        matches!(
            self,
            Self::Helix | Self::Helix310 | Self::HelixPi | Self::HelixLeft
        )
    }

    pub fn is_strand(&self) -> bool {
        matches!(self, Self::Strand)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub name: String,
    pub id: i64,
    pub chain: String,
    pub model: String,
    pub structure: String,
    pub secondary_structure: SecondaryStructure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub uid: AtomUid,
    /// serial number, matched by `atomid`
    pub number: i64,
    pub name: String,
    /// element / atom type, matched by `type`
    pub element: String,
    pub residue: usize,
    pub position: [f64; 3],
    pub is_ligand: bool,
}

/// Ordered collection of atoms with their residues and bond graph.
#[derive(Debug, Clone, Default)]
pub struct AtomPool {
    atoms: Vec<Atom>,
    residues: Vec<Residue>,
    bonds: Vec<Vec<usize>>,
}

impl AtomPool {
    /// Build a pool from raw parts. Bonds are pairs of atom indices; they are
    /// stored symmetrically and pairs referring to missing atoms are ignored.
    pub fn new(atoms: Vec<Atom>, residues: Vec<Residue>, bonds: &[(usize, usize)]) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for &(a, b) in bonds {
            if a < atoms.len() && b < atoms.len() && a != b {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }
        Self {
            atoms,
            residues,
            bonds: adjacency,
        }
    }

    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, idx: usize) -> &Atom {
        &self.atoms[idx]
    }

    pub fn residue_of(&self, idx: usize) -> &Residue {
        &self.residues[self.atoms[idx].residue]
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// Atoms bonded to `idx`.
    pub fn bonded(&self, idx: usize) -> &[usize] {
        &self.bonds[idx]
    }

    /// Every atom of the pool.
    pub fn all(&self) -> AtomSet {
        (0..self.atoms.len()).collect()
    }

    /// Indices of the atoms whose uid is in `uids`.
    pub fn find_uids<'a>(&'a self, uids: &'a HashSet<AtomUid>) -> impl Iterator<Item = usize> + 'a {
        self.atoms
            .iter()
            .enumerate()
            .filter(move |(_, a)| uids.contains(&a.uid))
            .map(|(i, _)| i)
    }

    /// Bonds with both ends in `set`, each reported once as `(low, high)`.
    pub fn bonds_within(&self, set: &AtomSet) -> Vec<(usize, usize)> {
        set.iter()
            .flat_map(|&a| {
                self.bonds[a]
                    .iter()
                    .filter(move |&&b| a < b && set.contains(&b))
                    .map(move |&b| (a, b))
            })
            .collect()
    }

    /// Unique names of the structures owning the atoms of `set`.
    pub fn structures_of(&self, set: &AtomSet) -> BTreeSet<&str> {
        set.iter()
            .map(|&i| self.residue_of(i).structure.as_str())
            .collect()
    }

    pub fn uids_of<'a>(&'a self, set: &'a AtomSet) -> impl Iterator<Item = AtomUid> + 'a {
        set.iter().map(|&i| self.atoms[i].uid)
    }
}

/// Incremental pool construction following the structure → model → chain →
/// residue → atom hierarchy. Atom uids and serial numbers are assigned in
/// insertion order starting at 1 unless set explicitly.
#[derive(Debug, Default)]
pub struct PoolBuilder {
    atoms: Vec<Atom>,
    residues: Vec<Residue>,
    bonds: Vec<(usize, usize)>,
    structure: String,
    model: String,
    chain: String,
    residue_lookup: HashMap<(String, String, String, i64, String), usize>,
    current_residue: Option<usize>,
}

impl PoolBuilder {
    pub fn structure(mut self, name: &str) -> Self {
        self.structure = name.to_string();
        self.current_residue = None;
        self
    }

    pub fn model(mut self, name: &str) -> Self {
        self.model = name.to_string();
        self.current_residue = None;
        self
    }

    pub fn chain(mut self, name: &str) -> Self {
        self.chain = name.to_string();
        self.current_residue = None;
        self
    }

    /// Open (or re-open) the residue `name id` in the current chain.
    pub fn residue(mut self, name: &str, id: i64) -> Self {
        let key = (
            self.structure.clone(),
            self.model.clone(),
            self.chain.clone(),
            id,
            name.to_string(),
        );
        let idx = match self.residue_lookup.get(&key) {
            Some(&idx) => idx,
            None => {
                self.residues.push(Residue {
                    name: name.to_string(),
                    id,
                    chain: self.chain.clone(),
                    model: self.model.clone(),
                    structure: self.structure.clone(),
                    secondary_structure: SecondaryStructure::default(),
                });
                let idx = self.residues.len() - 1;
                self.residue_lookup.insert(key, idx);
                idx
            }
        };
        self.current_residue = Some(idx);
        self
    }

    /// Set the secondary structure of the current residue.
    pub fn secondary_structure(mut self, ss: SecondaryStructure) -> Self {
        if let Some(idx) = self.current_residue {
            self.residues[idx].secondary_structure = ss;
        }
        self
    }

    /// Add an atom to the current residue. A residue named `UNK 0` is opened
    /// when none is current.
    pub fn atom(self, name: &str, element: &str, position: [f64; 3]) -> Self {
        let number = self.atoms.len() as i64 + 1;
        self.atom_with_number(name, element, number, position)
    }

    pub fn atom_with_number(mut self, name: &str, element: &str, number: i64, position: [f64; 3]) -> Self {
        if self.current_residue.is_none() {
            self = self.residue("UNK", 0);
        }
        let residue = self.current_residue.unwrap_or_default();
        self.atoms.push(Atom {
            uid: self.atoms.len() as AtomUid + 1,
            number,
            name: name.to_string(),
            element: element.to_string(),
            residue,
            position,
            is_ligand: false,
        });
        self
    }

    /// Flag the last added atom as part of a ligand.
    pub fn ligand(mut self) -> Self {
        if let Some(atom) = self.atoms.last_mut() {
            atom.is_ligand = true;
        }
        self
    }

    /// Bond two atoms by insertion index.
    pub fn bond(mut self, a: usize, b: usize) -> Self {
        self.bonds.push((a, b));
        self
    }

    /// Index the next added atom will get.
    pub fn next_index(&self) -> usize {
        self.atoms.len()
    }

    pub fn build(self) -> AtomPool {
        AtomPool::new(self.atoms, self.residues, &self.bonds)
    }
}
