use pretty_assertions::assert_eq;
use tinycalc_core::{CellRef, ErrorKind, Sheet, Value};

fn cell(name: &str) -> CellRef {
    CellRef::parse(name).unwrap()
}

fn set(sheet: &mut Sheet, name: &str, input: &str) {
    sheet.set_cell(cell(name), input).unwrap();
}

/// Apply `edit` and report whether the value of `target` changed.
fn edit_reaches(sheet: &mut Sheet, target: &str, edit: (&str, &str)) -> bool {
    let before = sheet.value(cell(target));
    set(sheet, edit.0, edit.1);
    sheet.value(cell(target)) != before
}

#[test]
fn dirty_propagation_reaches_readers() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=B1");
    set(&mut sheet, "B1", "5");
    assert_eq!(sheet.value(cell("A1")), Value::Number(5.0));
    set(&mut sheet, "B1", "7");
    assert_eq!(sheet.value(cell("A1")), Value::Number(7.0));
}

#[test]
fn self_reference_is_a_cycle() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=A1");
    assert_eq!(sheet.value(cell("A1")), Value::Error(ErrorKind::CyclicReference));
}

#[test]
fn mutual_reference_is_a_cycle() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=B1");
    set(&mut sheet, "B1", "=A1");
    assert_eq!(sheet.value(cell("A1")), Value::Error(ErrorKind::CyclicReference));
    assert_eq!(sheet.value(cell("B1")), Value::Error(ErrorKind::CyclicReference));

    let mut sheet = Sheet::new();
    set(&mut sheet, "C1", "=D1+1");
    set(&mut sheet, "D1", "=E1+1");
    set(&mut sheet, "E1", "=C1+1");
    for name in ["C1", "D1", "E1"] {
        assert_eq!(
            sheet.value(cell(name)),
            Value::Error(ErrorKind::CyclicReference),
            "{name}"
        );
    }
}

#[test]
fn aggregates_skip_empty_cells() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "4");
    set(&mut sheet, "A3", "8");
    set(&mut sheet, "B1", "=SUM(A1:A3)");
    set(&mut sheet, "B2", "=COUNT(A1:A3)");
    set(&mut sheet, "B3", "=AVG(A1:A3)");
    assert_eq!(sheet.value(cell("B1")), Value::Number(12.0));
    assert_eq!(sheet.value(cell("B2")), Value::Number(2.0));
    assert_eq!(sheet.value(cell("B3")), Value::Number(6.0));

    // Writing into the empty cell of the block re-triggers the aggregates.
    set(&mut sheet, "A2", "3");
    assert_eq!(sheet.value(cell("B1")), Value::Number(15.0));
    assert_eq!(sheet.value(cell("B2")), Value::Number(3.0));
    assert_eq!(sheet.value(cell("B3")), Value::Number(5.0));
}

#[test]
fn plus_concatenates_strings() {
    let sheet = Sheet::new();
    assert_eq!(sheet.evaluate_formula(r#""1"+"2""#), Value::String("12".into()));
    assert_eq!(sheet.evaluate_formula("1+2"), Value::Number(3.0));
    assert_eq!(sheet.evaluate_formula(r#""1"+2"#), Value::String("12".into()));
}

#[test]
fn division_by_zero() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=5/0");
    set(&mut sheet, "A2", "=5%0");
    set(&mut sheet, "A3", "=A1+1");
    for name in ["A1", "A2", "A3"] {
        assert_eq!(sheet.value(cell(name)), Value::Error(ErrorKind::DivideByZero));
    }
}

#[test]
fn reassignment_replaces_edges() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "B1", "1");
    set(&mut sheet, "C1", "2");
    set(&mut sheet, "D1", "3");
    set(&mut sheet, "A1", "=B1+C1");
    assert_eq!(sheet.value(cell("A1")), Value::Number(3.0));

    set(&mut sheet, "A1", "=D1");
    assert_eq!(sheet.value(cell("A1")), Value::Number(3.0));
    assert!(!edit_reaches(&mut sheet, "A1", ("B1", "100")));
    assert!(!edit_reaches(&mut sheet, "A1", ("C1", "100")));
    assert!(edit_reaches(&mut sheet, "A1", ("D1", "9")));
    assert_eq!(sheet.value(cell("A1")), Value::Number(9.0));

    let store = sheet.store();
    let a1 = store.id_of(cell("A1")).unwrap();
    let b1 = store.id_of(cell("B1")).unwrap();
    let d1 = store.id_of(cell("D1")).unwrap();
    assert_eq!(store.cell(a1).reads(), &[d1]);
    assert!(store.cell(b1).read_by().is_empty());
}

#[test]
fn edges_stay_mirrored_through_edits() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=SUM(B1:B3)+C1");
    set(&mut sheet, "C1", "=B2*2");
    set(&mut sheet, "A1", "=C1");
    set(&mut sheet, "B2", "");
    set(&mut sheet, "C1", "=C1");

    let store = sheet.store();
    for (id, c) in store.iter() {
        for &target in c.reads() {
            assert!(store.cell(target).read_by().contains(&id));
        }
        for &reader in c.read_by() {
            assert!(store.cell(reader).reads().contains(&id));
        }
        assert!(!c.is_dirty(), "{} left dirty", c.at());
    }
}

#[test]
fn save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("round-trip.sheet");

    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "'Item");
    set(&mut sheet, "B1", "'Cost");
    set(&mut sheet, "A2", "rent");
    set(&mut sheet, "B2", "1200");
    set(&mut sheet, "A3", "food");
    set(&mut sheet, "B3", "=B2/4");
    set(&mut sheet, "B4", "=SUM(B2:B3)");
    set(&mut sheet, "C4", "=IF(B4>1000, \"over\", \"ok\")");
    set(&mut sheet, "D1", "=D2");
    set(&mut sheet, "D2", "=D1");
    sheet.save_as(&path).unwrap();

    let mut loaded = Sheet::new();
    loaded.load_file(&path).unwrap();

    let names: Vec<String> = (0..4)
        .flat_map(|row| (0..4).map(move |col| (col, row)))
        .filter_map(|(col, row)| CellRef::new(col, row))
        .map(|at| at.to_string())
        .collect();
    for name in &names {
        let at = cell(name);
        assert_eq!(loaded.content(at), sheet.content(at), "content of {name}");
        assert_eq!(loaded.value(at), sheet.value(at), "value of {name}");
    }
    assert_eq!(loaded.value(cell("B4")), Value::Number(1500.0));
    assert_eq!(loaded.value(cell("C4")).as_str(), Some("over"));
}
