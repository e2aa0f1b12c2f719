//! End-to-end selection scenarios over a small ALA-GLY dipeptide plus one
//! water molecule.

use molsel::{AtomPool, AtomSet, QuerySession, SecondaryStructure};

/// ALA 1: N CA C O CB (0-4), GLY 2: N CA C O (5-8), HOH 3: O (9).
fn dipeptide() -> AtomPool {
    AtomPool::builder()
        .structure("dipep")
        .model("0")
        .chain("A")
        .residue("ALA", 1)
        .secondary_structure(SecondaryStructure::Helix)
        .atom("N", "N", [0.0, 0.0, 0.0])
        .atom("CA", "C", [1.5, 0.0, 0.0])
        .atom("C", "C", [3.0, 0.0, 0.0])
        .atom("O", "O", [3.0, 1.2, 0.0])
        .atom("CB", "C", [1.5, 1.5, 0.0])
        .residue("GLY", 2)
        .secondary_structure(SecondaryStructure::Strand)
        .atom("N", "N", [4.5, 0.0, 0.0])
        .atom("CA", "C", [6.0, 0.0, 0.0])
        .atom("C", "C", [7.5, 0.0, 0.0])
        .atom("O", "O", [7.5, 1.2, 0.0])
        .chain("W")
        .residue("HOH", 3)
        .atom("O", "O", [20.0, 0.0, 0.0])
        .bond(0, 1)
        .bond(1, 2)
        .bond(2, 3)
        .bond(1, 4)
        .bond(2, 5)
        .bond(5, 6)
        .bond(6, 7)
        .bond(7, 8)
        .build()
}

fn select(query: &str) -> Vec<usize> {
    let pool = dipeptide();
    match molsel::evaluate(query, &pool) {
        Ok(set) => set.into_iter().collect(),
        Err(e) => panic!("query '{}' failed: {}", query, e),
    }
}

#[test]
fn all_and_empty_selections() {
    assert_eq!(select("all"), (0..10).collect::<Vec<_>>());
    assert!(select("nothing").is_empty());
    assert!(select("empty").is_empty());
    assert!(select("around 5 nothing").is_empty());
    assert!(select("protein and nothing").is_empty());
}

#[test]
fn known_sets() {
    assert_eq!(select("protein"), (0..9).collect::<Vec<_>>());
    assert_eq!(select("water"), vec![9]);
    assert_eq!(select("not protein"), vec![9]);
    assert_eq!(select("backbone"), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    assert_eq!(select("sidechain"), vec![4]);
    assert!(select("nucleic").is_empty());
    assert!(select("ions or ligand").is_empty());
}

#[test]
fn field_matches() {
    assert_eq!(select("name CA"), vec![1, 6]);
    assert_eq!(select("name CA CB"), vec![1, 4, 6]);
    assert_eq!(select("name C*"), vec![1, 2, 4, 6, 7]);
    assert_eq!(select("type O"), vec![3, 8, 9]);
    assert_eq!(select("resname GLY"), vec![5, 6, 7, 8]);
    assert_eq!(select("chain W"), vec![9]);
    assert_eq!(select("model 0"), (0..10).collect::<Vec<_>>());
    assert!(select("name ca").is_empty());
}

#[test]
fn id_ranges_are_inclusive() {
    assert_eq!(select("resid 1:2"), (0..9).collect::<Vec<_>>());
    assert_eq!(select("resid 2"), vec![5, 6, 7, 8]);
    assert_eq!(select("resid 3 1"), vec![0, 1, 2, 3, 4, 9]);
    assert_eq!(select("atomid 1 3:4"), vec![0, 2, 3]);
    assert_eq!(select("atomid 10:10"), vec![9]);
}

#[test]
fn precedence_and_grouping() {
    let flat = select("name CA and resname ALA or resname GLY");
    assert_eq!(flat, select("(name CA and resname ALA) or resname GLY"));
    assert_eq!(flat, vec![1, 5, 6, 7, 8]);
    assert_eq!(select("name CA and (resname ALA or resname GLY)"), vec![1, 6]);
    assert_eq!(select("not name CA and protein"), vec![0, 2, 3, 4, 5, 7, 8]);
}

#[test]
fn byres_selects_whole_residues() {
    assert_eq!(select("byres name CB"), vec![0, 1, 2, 3, 4]);
    assert_eq!(select("byres (name N and resid 2)"), vec![5, 6, 7, 8]);
}

#[test]
fn spatial_queries() {
    assert_eq!(select("around 1.6 name CB"), vec![1, 3, 4]);
    assert_eq!(select("within 1.6 name CB"), vec![1, 3, 4]);
    assert_eq!(select("around 2 water"), vec![9]);
    assert_eq!(select("insphere 6 0 0 1.5"), vec![5, 6, 7]);
    assert!(select("around 0.0001 name CB").is_empty());
}

#[test]
fn properties() {
    assert_eq!(select("prop x >= 6"), vec![6, 7, 8, 9]);
    assert_eq!(select("prop 6 < x"), vec![6, 7, 8, 9]);
    assert_eq!(select("prop y>1"), vec![3, 4, 8]);
    assert_eq!(select("prop x == 7.5 and prop y != 0"), vec![8]);
}

#[test]
fn secondary_structure() {
    assert_eq!(select("ss helix"), vec![0, 1, 2, 3, 4]);
    assert_eq!(select("ss S"), vec![5, 6, 7, 8]);
    assert_eq!(select("ss coil"), vec![9]);
}

#[test]
fn structures_and_selections_round_trip() {
    let pool = dipeptide();
    let mut session = QuerySession::default();
    session.add_structure("dipep").unwrap();

    let selected = session.evaluate("dipep and name CA", &pool).unwrap();
    assert_eq!(selected, [1, 6].into_iter().collect::<AtomSet>());
    assert_eq!(pool.structures_of(&selected).into_iter().collect::<Vec<_>>(), vec!["dipep"]);
    assert!(pool.bonds_within(&selected).is_empty());

    let name = session.unique_selection_name("calpha");
    assert_eq!(name, "calpha_2");
    session.define_selection_from(&name, &pool, &selected).unwrap();
    // byres takes everything to its right
    assert_eq!(
        session.evaluate("byres calpha_2 and backbone", &pool).unwrap(),
        (0..9).collect::<AtomSet>()
    );
    assert_eq!(
        session.evaluate("(byres calpha_2) and sidechain", &pool).unwrap(),
        [4].into_iter().collect::<AtomSet>()
    );

    let chain = session.evaluate("resname ALA and backbone", &pool).unwrap();
    assert_eq!(pool.bonds_within(&chain), vec![(0, 1), (1, 2), (2, 3)]);
}

#[test]
fn evaluation_never_mutates_the_pool() {
    let pool = dipeptide();
    let before = format!("{:?}", pool);
    let _ = molsel::evaluate("byres around 3 name CB or not water", &pool).unwrap();
    assert_eq!(before, format!("{:?}", pool));
}

/// Five ALA residues (ids 1-5) followed by five GLY residues (ids 6-10),
/// `atoms_per_residue` atoms each.
fn ala_gly_chain(atoms_per_residue: usize) -> AtomPool {
    const NAMES: [&str; 4] = ["N", "CA", "C", "O"];
    (1..=10i64).fold(
        AtomPool::builder().structure("chain").chain("A"),
        |builder, id| {
            let resname = if id <= 5 { "ALA" } else { "GLY" };
            (0..atoms_per_residue).fold(builder.residue(resname, id), |builder, k| {
                let name = NAMES[k % NAMES.len()];
                builder.atom(name, &name[..1], [id as f64 * 4.0, k as f64, 0.0])
            })
        },
    )
    .build()
}

fn select_in(pool: &AtomPool, query: &str) -> Vec<usize> {
    match molsel::evaluate(query, pool) {
        Ok(set) => set.into_iter().collect(),
        Err(e) => panic!("query '{}' failed: {}", query, e),
    }
}

#[test]
fn resname_and_resid_range_one_atom_per_residue() {
    let pool = ala_gly_chain(1);
    assert_eq!(pool.len(), 10);
    assert_eq!(select_in(&pool, "resname ALA and resid 1:3"), vec![0, 1, 2]);
    assert!(select_in(&pool, "resname GLY and resid 1:3").is_empty());
}

#[test]
fn residue_ids_and_atom_ids_are_distinct() {
    let pool = ala_gly_chain(2);
    assert_eq!(pool.len(), 20);
    // residues 1-3 hold atoms 0-5
    assert_eq!(select_in(&pool, "resname ALA and resid 1:3"), (0..6).collect::<Vec<_>>());
    // atom serials 1-3 sit in residues 1 and 2
    assert_eq!(select_in(&pool, "atomid 1:3"), vec![0, 1, 2]);
    assert_eq!(select_in(&pool, "resid 6 and atomid 1:12"), vec![10, 11]);
    assert_eq!(select_in(&pool, "byres atomid 3"), vec![2, 3]);
}
