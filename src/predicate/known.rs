//! Residue and atom classification tables used by the `protein`, `nucleic`,
//! `backbone`, `water`, `ions`, ... keywords.

use crate::atom::AtomPool;

/// Residue names recognized as amino acids (CHARMM, PDB, GROMACS and AMBER
/// force-field variants).
pub const PROTEIN_RESIDUES: &[&str] = &[
    // CHARMM
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HSD", "HSE", "HSP", "ILE", "LEU",
    "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", "ALAD",
    // PDB
    "HIS", "MSE",
    // GROMACS oplsaa
    "ARGN", "ASPH", "CYS2", "CYSH", "QLN", "PGLU", "GLUH", "HIS1", "HISD", "HISE", "HISH", "LYSH",
    // GROMACS gromos53a6
    "ASN1", "CYS1", "HISA", "HISB", "HIS2",
    // GROMACS amber03
    "HID", "HIE", "HIP", "ORN", "DAB", "LYN", "HYP", "CYM", "CYX", "ASH", "GLH", "ACE", "NME",
    // GROMACS amber99sb-star-ildn termini
    "NALA", "NGLY", "NSER", "NTHR", "NLEU", "NILE", "NVAL", "NASN", "NGLN", "NARG", "NHID",
    "NHIE", "NHIP", "NTRP", "NPHE", "NTYR", "NGLU", "NASP", "NLYS", "NPRO", "NCYS", "NCYX",
    "NMET", "CALA", "CGLY", "CSER", "CTHR", "CLEU", "CILE", "CVAL", "CASF", "CASN", "CGLN",
    "CARG", "CHID", "CHIE", "CHIP", "CTRP", "CPHE", "CTYR", "CGLU", "CASP", "CLYS", "CPRO",
    "CCYS", "CCYX", "CMET", "CME", "ASF",
];

pub const NUCLEIC_RESIDUES: &[&str] = &[
    "ADE", "URA", "CYT", "GUA", "THY", "DA", "DC", "DG", "DT", "RA", "RU", "RG", "RC", "A", "T",
    "U", "C", "G", "DA5", "DC5", "DG5", "DT5", "DA3", "DC3", "DG3", "DT3", "RA5", "RU5", "RG5",
    "RC5", "RA3", "RU3", "RG3", "RC3",
];

pub const BACKBONE_ATOMS: &[&str] = &["N", "C", "CA", "O"];

pub const NUCLEIC_BACKBONE_ATOMS: &[&str] = &["P", "C5'", "C3'", "O3'", "O5'"];

pub const NUCLEIC_BASE_ATOMS: &[&str] = &[
    "N9", "N7", "C8", "C5", "C4", "N3", "C2", "N1", "C6", "O6", "N2", "N6", "O2", "N4", "O4",
    "C5M",
];

pub const NUCLEIC_SUGAR_ATOMS: &[&str] = &["C1'", "C2'", "C3'", "C4'", "O4'"];

/// Matched case-insensitively.
pub const WATER_RESIDUES: &[&str] = &["HOH", "WAT", "SOL", "TIP3", "TP3M", "SPC", "H2O", "TIP"];

/// Two-letter atom name prefixes of metal ions.
const ION_NAMES: &[&str] = &[
    "AL", "AS", "AU", "BE", "BR", "CO", "CU", "EU", "FE", "GD", "IR", "MG", "MN", "MO", "NI", "PT",
    "RH", "RU", "SE", "TA", "ZN",
];

const SINGLE_LETTER_IONS: &[&str] = &["I", "F", "K", "V", "S"];

const ION_RESIDUES: &[&str] = &["PO4", "SOD", "SO4", "NH4"];

/// Residues whose `HG*` atoms are mercury.
const MERCURY_RESIDUES: &[&str] = &["CMH", "EMC", "MBO", "MMC", "HGB", "BE7", "PMB"];

/// Residues whose `CL*` atoms are chlorine.
const CHLORINE_RESIDUES: &[&str] = &[
    "0QE", "CPT", "DCE", "EAA", "IMN", "OCZ", "OMY", "OMZ", "UN9", "1N1", "2T8", "393", "3MY",
    "BMU", "CLM", "CP6", "DB8", "DIF", "EFZ", "LUR", "RDC", "UCL", "XMM", "HLT", "IRE", "LCP",
    "PCI", "VGH",
];

const HYDROGEN: &str = "H";
const CALCIUM: &str = "CA";

pub fn is_protein_residue(name: &str) -> bool {
    PROTEIN_RESIDUES.contains(&name)
}

pub fn is_nucleic_residue(name: &str) -> bool {
    NUCLEIC_RESIDUES.contains(&name)
}

pub fn is_water_residue(name: &str) -> bool {
    WATER_RESIDUES.iter().any(|w| w.eq_ignore_ascii_case(name))
}

pub fn is_protein(pool: &AtomPool, idx: usize) -> bool {
    is_protein_residue(&pool.residue_of(idx).name)
}

pub fn is_nucleic(pool: &AtomPool, idx: usize) -> bool {
    is_nucleic_residue(&pool.residue_of(idx).name)
}

pub fn is_water(pool: &AtomPool, idx: usize) -> bool {
    is_water_residue(&pool.residue_of(idx).name)
}

/// Whether a hydrogen is attached to a protein or nucleic backbone atom.
fn is_bonded_to_backbone(pool: &AtomPool, idx: usize) -> bool {
    pool.bonded(idx).iter().any(|&other| {
        let name = pool.atom(other).name.as_str();
        BACKBONE_ATOMS.contains(&name) || NUCLEIC_BACKBONE_ATOMS.contains(&name)
    })
}

/// Protein backbone: N, CA, C, O of amino acids (a calcium typed `CA` is not
/// backbone) plus the hydrogens bonded to them.
pub fn is_backbone(pool: &AtomPool, idx: usize) -> bool {
    if !is_protein(pool, idx) {
        return false;
    }
    let atom = pool.atom(idx);
    match atom.element.as_str() {
        HYDROGEN => is_bonded_to_backbone(pool, idx),
        CALCIUM => false,
        _ => BACKBONE_ATOMS.contains(&atom.name.as_str()),
    }
}

pub fn is_sidechain(pool: &AtomPool, idx: usize) -> bool {
    is_protein(pool, idx) && !is_backbone(pool, idx)
}

pub fn is_nucleic_backbone(pool: &AtomPool, idx: usize) -> bool {
    is_nucleic(pool, idx) && NUCLEIC_BACKBONE_ATOMS.contains(&pool.atom(idx).name.as_str())
}

pub fn is_nucleic_base(pool: &AtomPool, idx: usize) -> bool {
    is_nucleic(pool, idx) && NUCLEIC_BASE_ATOMS.contains(&pool.atom(idx).name.as_str())
}

pub fn is_nucleic_sugar(pool: &AtomPool, idx: usize) -> bool {
    is_nucleic(pool, idx) && NUCLEIC_SUGAR_ATOMS.contains(&pool.atom(idx).name.as_str())
}

/// Ions are recognized from the atom name, with a few residue based
/// exceptions for mercury and chlorine containing compounds.
pub fn is_ion(pool: &AtomPool, idx: usize) -> bool {
    let name = pool.atom(idx).name.as_str();
    let residue = pool.residue_of(idx).name.as_str();

    match name.chars().count() {
        0 => false,
        1 => SINGLE_LETTER_IONS.contains(&name),
        _ => {
            let prefix: String = name.chars().take(2).collect::<String>().to_uppercase();
            ION_NAMES.contains(&prefix.as_str())
                || prefix == residue
                || ION_RESIDUES.contains(&residue)
                || (prefix == "HG" && MERCURY_RESIDUES.contains(&residue))
                || (prefix == "CL" && CHLORINE_RESIDUES.contains(&residue))
        }
    }
}
