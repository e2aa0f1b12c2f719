pub mod known;

use std::fmt::{self, Display};

use itertools::Itertools;

use crate::atom::{AtomPool, SecondaryStructure};

/// Leaf of a selection expression: a test applied to each candidate atom
/// independently (or, for `InSphere`, a spatial query over the candidates).
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    Nothing,
    Field { field: Field, patterns: Vec<Pattern> },
    ResidueId(Vec<IdRange>),
    AtomId(Vec<IdRange>),
    SecondaryStructure(SsKind),
    Property { axis: Axis, op: CmpOp, value: f64 },
    Known(KnownSet),
    InSphere { center: [f64; 3], radius: f64 },
}

/// String attribute of an atom (or of its residue) matched by name patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AtomName,
    AtomType,
    ResidueName,
    ChainName,
    ModelName,
    /// Written as the bare structure name.
    StructureName,
    /// Membership in a named selection, written as the bare selection name.
    Selection,
}

impl Field {
    /// Keyword introducing the field, `None` for fields written as a bare
    /// dynamic keyword.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Field::AtomName => Some("name"),
            Field::AtomType => Some("type"),
            Field::ResidueName => Some("resname"),
            Field::ChainName => Some("chain"),
            Field::ModelName => Some("model"),
            Field::StructureName | Field::Selection => None,
        }
    }

    /// Value of this field for atom `idx`. Selection membership is not an atom
    /// attribute and has no value.
    pub fn value<'p>(&self, pool: &'p AtomPool, idx: usize) -> Option<&'p str> {
        let atom = pool.atom(idx);
        match self {
            Field::AtomName => Some(atom.name.as_str()),
            Field::AtomType => Some(atom.element.as_str()),
            Field::ResidueName => Some(pool.residue_of(idx).name.as_str()),
            Field::ChainName => Some(pool.residue_of(idx).chain.as_str()),
            Field::ModelName => Some(pool.residue_of(idx).model.as_str()),
            Field::StructureName => Some(pool.residue_of(idx).structure.as_str()),
            Field::Selection => None,
        }
    }
}

/// Exact or prefix (`CA*`) string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Exact(String),
    Prefix(String),
}

impl Pattern {
    /// Everything before the first `*` is the prefix.
    pub fn parse(s: &str) -> Self {
        match s.find('*') {
            Some(pos) => Pattern::Prefix(s[..pos].to_string()),
            None => Pattern::Exact(s.to_string()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(s) => s == value,
            Pattern::Prefix(p) => value.starts_with(p.as_str()),
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(s) => write!(f, "{}", s),
            Pattern::Prefix(p) => write!(f, "{}*", p),
        }
    }
}

/// Residue or atom id: a single id or an inclusive `lower:upper` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdRange {
    Exact(i64),
    Inclusive(i64, i64),
}

impl IdRange {
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(id) = s.parse::<i64>() {
            return Some(IdRange::Exact(id));
        }
        let (lower, upper) = s.split_once(':')?;
        Some(IdRange::Inclusive(lower.parse().ok()?, upper.parse().ok()?))
    }

    pub fn contains(&self, id: i64) -> bool {
        match *self {
            IdRange::Exact(x) => x == id,
            IdRange::Inclusive(lower, upper) => lower <= id && id <= upper,
        }
    }
}

impl Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdRange::Exact(x) => write!(f, "{}", x),
            IdRange::Inclusive(lower, upper) => write!(f, "{}:{}", lower, upper),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SsKind {
    Helix,
    Sheet,
    Coil,
}

impl SsKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "helix" | "H" => Some(SsKind::Helix),
            "sheet" | "S" => Some(SsKind::Sheet),
            "coil" | "C" => Some(SsKind::Coil),
            _ => None,
        }
    }

    pub fn matches(&self, ss: SecondaryStructure) -> bool {
        match self {
            SsKind::Helix => ss.is_helix(),
            SsKind::Sheet => ss.is_strand(),
            SsKind::Coil => !ss.is_helix() && !ss.is_strand(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SsKind::Helix => "helix",
            SsKind::Sheet => "sheet",
            SsKind::Coil => "coil",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }

    pub fn of(&self, position: &[f64; 3]) -> f64 {
        match self {
            Axis::X => position[0],
            Axis::Y => position[1],
            Axis::Z => position[2],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    /// Longest symbols first, so that `<=` is never read as `<`.
    pub const SYMBOLS: [(&'static str, CmpOp); 6] = [
        ("<=", CmpOp::Le),
        (">=", CmpOp::Ge),
        ("==", CmpOp::Eq),
        ("!=", CmpOp::Ne),
        ("<", CmpOp::Lt),
        (">", CmpOp::Gt),
    ];

    pub fn from_symbol(s: &str) -> Option<Self> {
        Self::SYMBOLS
            .iter()
            .find(|(sym, _)| *sym == s)
            .map(|(_, op)| *op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }

    /// Operator used when the operands of a comparison are written in reverse
    /// order (`prop 5 < x`). `<` and `>=` map onto each other, as do `>` and
    /// `<=`.
    pub fn mirrored(&self) -> Self {
        match self {
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Ge => CmpOp::Lt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Eq => CmpOp::Eq,
            CmpOp::Ne => CmpOp::Ne,
        }
    }

    pub fn compare(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
        }
    }
}

/// Built-in atom classes backed by the tables in [`known`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownSet {
    Protein,
    Nucleic,
    Backbone,
    Sidechain,
    NucleicBackbone,
    NucleicBase,
    NucleicSugar,
    Water,
    Ions,
    Ligand,
}

impl KnownSet {
    pub const ALL: [KnownSet; 10] = [
        KnownSet::Protein,
        KnownSet::Nucleic,
        KnownSet::Backbone,
        KnownSet::Sidechain,
        KnownSet::NucleicBackbone,
        KnownSet::NucleicBase,
        KnownSet::NucleicSugar,
        KnownSet::Water,
        KnownSet::Ions,
        KnownSet::Ligand,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            KnownSet::Protein => "protein",
            KnownSet::Nucleic => "nucleic",
            KnownSet::Backbone => "backbone",
            KnownSet::Sidechain => "sidechain",
            KnownSet::NucleicBackbone => "nucleicbackbone",
            KnownSet::NucleicBase => "nucleicbase",
            KnownSet::NucleicSugar => "nucleicsugar",
            KnownSet::Water => "water",
            KnownSet::Ions => "ions",
            KnownSet::Ligand => "ligand",
        }
    }

    pub fn contains(&self, pool: &AtomPool, idx: usize) -> bool {
        match self {
            KnownSet::Protein => known::is_protein(pool, idx),
            KnownSet::Nucleic => known::is_nucleic(pool, idx),
            KnownSet::Backbone => known::is_backbone(pool, idx),
            KnownSet::Sidechain => known::is_sidechain(pool, idx),
            KnownSet::NucleicBackbone => known::is_nucleic_backbone(pool, idx),
            KnownSet::NucleicBase => known::is_nucleic_base(pool, idx),
            KnownSet::NucleicSugar => known::is_nucleic_sugar(pool, idx),
            KnownSet::Water => known::is_water(pool, idx),
            KnownSet::Ions => known::is_ion(pool, idx),
            KnownSet::Ligand => pool.atom(idx).is_ligand,
        }
    }
}

impl Predicate {
    /// Test a single atom. `None` for predicates that cannot be decided from
    /// the atom alone (selection membership, sphere queries) and are resolved
    /// by the evaluator.
    pub fn test_atom(&self, pool: &AtomPool, idx: usize) -> Option<bool> {
        let atom = pool.atom(idx);
        let res = match self {
            Predicate::All => true,
            Predicate::Nothing => false,
            Predicate::Field { field, patterns } => {
                let value = field.value(pool, idx)?;
                patterns.iter().any(|p| p.matches(value))
            }
            Predicate::ResidueId(ranges) => {
                let id = pool.residue_of(idx).id;
                ranges.iter().any(|r| r.contains(id))
            }
            Predicate::AtomId(ranges) => ranges.iter().any(|r| r.contains(atom.number)),
            Predicate::SecondaryStructure(kind) => {
                kind.matches(pool.residue_of(idx).secondary_structure)
            }
            Predicate::Property { axis, op, value } => op.compare(axis.of(&atom.position), *value),
            Predicate::Known(set) => set.contains(pool, idx),
            Predicate::InSphere { .. } => return None,
        };
        Some(res)
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::All => write!(f, "all"),
            Predicate::Nothing => write!(f, "nothing"),
            Predicate::Field { field, patterns } => match field.keyword() {
                Some(kw) => write!(f, "{} {}", kw, patterns.iter().join(" ")),
                // dynamic keywords take no values, one keyword per name
                None if patterns.len() == 1 => write!(f, "{}", patterns[0]),
                None => write!(f, "({})", patterns.iter().join(" or ")),
            },
            Predicate::ResidueId(ranges) => write!(f, "resid {}", ranges.iter().join(" ")),
            Predicate::AtomId(ranges) => write!(f, "atomid {}", ranges.iter().join(" ")),
            Predicate::SecondaryStructure(kind) => write!(f, "ss {}", kind.as_str()),
            Predicate::Property { axis, op, value } => {
                write!(f, "prop {} {} {}", axis.as_str(), op.symbol(), value)
            }
            Predicate::Known(set) => write!(f, "{}", set.keyword()),
            Predicate::InSphere { center, radius } => write!(
                f,
                "insphere {} {} {} {}",
                center[0], center[1], center[2], radius
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_uses_text_before_first_star() {
        assert_eq!(Pattern::parse("C*"), Pattern::Prefix("C".into()));
        assert_eq!(Pattern::parse("C*A"), Pattern::Prefix("C".into()));
        assert_eq!(Pattern::parse("CA"), Pattern::Exact("CA".into()));
        assert!(Pattern::parse("C*").matches("CB"));
        assert!(!Pattern::parse("C*").matches("NC"));
        assert!(Pattern::parse("*").matches("anything"));
        assert!(!Pattern::parse("CA").matches("CAB"));
    }

    #[test]
    fn ranges() {
        assert_eq!(IdRange::parse("12"), Some(IdRange::Exact(12)));
        assert_eq!(IdRange::parse("-3"), Some(IdRange::Exact(-3)));
        assert_eq!(IdRange::parse("10:20"), Some(IdRange::Inclusive(10, 20)));
        assert_eq!(IdRange::parse("10:"), None);
        assert_eq!(IdRange::parse("a:b"), None);
        assert_eq!(IdRange::parse("1:2:3"), None);

        let r = IdRange::Inclusive(10, 20);
        assert!(r.contains(10));
        assert!(r.contains(20));
        assert!(!r.contains(21));
        assert!(!IdRange::Inclusive(5, 1).contains(3));
    }

    #[test]
    fn mirrored_operators() {
        assert_eq!(CmpOp::Lt.mirrored(), CmpOp::Ge);
        assert_eq!(CmpOp::Gt.mirrored(), CmpOp::Le);
        assert_eq!(CmpOp::Eq.mirrored(), CmpOp::Eq);
        for (_, op) in CmpOp::SYMBOLS {
            assert_eq!(op.mirrored().mirrored(), op);
            assert_eq!(CmpOp::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn secondary_structure_families() {
        use SecondaryStructure::*;
        assert!(SsKind::Helix.matches(Helix310));
        assert!(SsKind::Sheet.matches(Strand));
        assert!(SsKind::Coil.matches(Turn));
        assert!(!SsKind::Coil.matches(HelixPi));
        assert_eq!(SsKind::parse("H"), Some(SsKind::Helix));
        assert_eq!(SsKind::parse("Helix"), None);
    }

    #[test]
    fn display() {
        let p = Predicate::Field {
            field: Field::AtomName,
            patterns: vec![Pattern::parse("CA"), Pattern::parse("N*")],
        };
        assert_eq!(p.to_string(), "name CA N*");
        let p = Predicate::Property {
            axis: Axis::Z,
            op: CmpOp::Le,
            value: -2.5,
        };
        assert_eq!(p.to_string(), "prop z <= -2.5");
        assert_eq!(
            Predicate::ResidueId(vec![IdRange::Exact(3), IdRange::Inclusive(5, 9)]).to_string(),
            "resid 3 5:9"
        );
        assert_eq!(Predicate::Known(KnownSet::NucleicBase).to_string(), "nucleicbase");
    }
}
