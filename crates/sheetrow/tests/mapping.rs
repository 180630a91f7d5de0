use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use sheetrow::{
    CellErrorKind, CellValue, Constraint, DateLocale, DateSystem, FailureKind, MapError,
    MapperConfig, MemoryTable, Record, Schema, TableExt, cell_enum,
};

#[derive(Debug, Default, PartialEq)]
struct Person {
    name: String,
    age: i32,
}

impl Record for Person {
    fn schema() -> Schema<Self> {
        Schema::<Self>::builder()
            .field("name", |p| &mut p.name)
            .column("Name")
            .field("age", |p| &mut p.age)
            .column("Age")
            .build()
    }
}

fn people() -> MemoryTable {
    MemoryTable::builder("People")
        .headers(["Name", "Age"])
        .row(["Alice", "30"])
        .row(["Bob", "notanumber"])
        .build()
        .expect("table builds")
}

#[test]
fn enumerate_reports_the_bad_cell() {
    let failures = people()
        .validate_records::<Person>()
        .expect("bindings resolve");
    assert_eq!(failures.len(), 1);
    let failure = &failures[0];
    assert_eq!(failure.kind, FailureKind::Coercion);
    assert_eq!(failure.column, "Age");
    assert_eq!(failure.field, "age");
    assert_eq!(failure.expected, "i32");
    assert_eq!(failure.value, CellValue::from("notanumber"));
    assert_eq!(failure.cell.row, 3);
    assert_eq!(failure.cell.to_string(), "B3");
}

#[test]
fn materialize_swallows_failures_and_fires_callback() {
    let table = people();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let records = table
        .mapper::<Person>()
        .configure(move |cfg| {
            cfg.on_row(move |p: &Person, row| sink.lock().unwrap().push((p.name.clone(), row)));
        })
        .to_vec()
        .expect("no throw flags set");

    assert_eq!(
        records,
        [
            Person {
                name: "Alice".into(),
                age: 30
            },
            Person {
                name: "Bob".into(),
                age: 0
            },
        ]
    );
    assert_eq!(
        *seen.lock().unwrap(),
        [("Alice".to_string(), 2), ("Bob".to_string(), 3)]
    );
}

#[test]
fn cast_flag_raises_rendered_message_and_stops() {
    let table = people();
    let seen = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&seen);
    let mut mapper = table.mapper::<Person>().configure(move |cfg| {
        cfg.throw_on_cast_failure = true;
        cfg.cast_error_template = "{field}@{cell}: '{value}' is not {expected}".into();
        cfg.on_row(move |_, _| *sink.lock().unwrap() += 1);
    });

    let results: Vec<_> = mapper.rows().expect("bindings resolve").collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.to_string(), "age@B3: 'notanumber' is not i32");
    match err {
        MapError::Cast { failure, .. } => assert_eq!(failure.column, "Age"),
        other => panic!("expected cast error, got {other:?}"),
    }
    // only the successful row reached the callback
    assert_eq!(*seen.lock().unwrap(), 1);
}

#[test]
fn to_vec_propagates_the_first_raised_failure() {
    let table = people();
    let err = table
        .mapper::<Person>()
        .with_config(MapperConfig::strict())
        .to_vec()
        .unwrap_err();
    assert!(matches!(err, MapError::Cast { .. }));
    assert_eq!(
        err.to_string(),
        "cannot convert 'notanumber' at B3 (column 'Age') to i32 for field 'age': \
         `notanumber` cannot be read as the target type"
    );
}

#[derive(Debug, Default)]
struct Adult {
    name: String,
    age: u32,
    city: String,
}

impl Record for Adult {
    fn schema() -> Schema<Self> {
        Schema::<Self>::builder()
            .field("name", |p| &mut p.name)
            .column("Name")
            .field("age", |p| &mut p.age)
            .column("Age")
            .constraint(Constraint::min(18.0))
            .field("city", |p| &mut p.city)
            .column("City")
            .constraint(Constraint::required())
            .build()
    }
}

fn adults() -> MemoryTable {
    MemoryTable::builder("Adults")
        .headers(["Name", "Age", "City"])
        .row([CellValue::from("Ann"), CellValue::Int(40), CellValue::from("Oslo")])
        .row([CellValue::from("Tim"), CellValue::Int(12), CellValue::Empty])
        .row([CellValue::from("Liv"), CellValue::from("x"), CellValue::Empty])
        .build()
        .expect("table builds")
}

#[test]
fn enumerate_keeps_going_after_each_failure() {
    let failures = adults().validate_records::<Adult>().expect("resolves");
    let summary: Vec<_> = failures
        .iter()
        .map(|f| (f.kind, f.cell.to_string()))
        .collect();
    assert_eq!(
        summary,
        [
            (FailureKind::Constraint, "B3".to_string()),
            (FailureKind::Constraint, "C3".to_string()),
            (FailureKind::Coercion, "B4".to_string()),
            (FailureKind::Constraint, "C4".to_string()),
        ]
    );
    assert_eq!(failures[0].reason, "12 is below the minimum of 18");
    assert_eq!(failures[1].reason, "value is required");
}

#[test]
fn materialize_stops_the_row_at_first_failure() {
    let records = adults().to_records::<Adult>().expect("swallowed");
    assert_eq!(records.len(), 3);
    // age was assigned before its constraint failed; city was never reached
    assert_eq!(records[1].age, 12);
    assert_eq!(records[1].city, "");
    assert_eq!(records[2].name, "Liv");
}

#[test]
fn validation_flag_is_independent_of_cast_flag() {
    let table = adults();
    let err = table
        .mapper::<Adult>()
        .configure(|cfg| cfg.throw_on_validation_failure = true)
        .to_vec()
        .unwrap_err();
    let MapError::Validation { message, failure } = err else {
        panic!("expected validation error");
    };
    assert_eq!(failure.field, "age");
    assert_eq!(
        message,
        "'12' at B3 (column 'Age') is not valid for field 'age': 12 is below the minimum of 18"
    );
}

#[test]
fn totals_row_is_never_mapped() {
    let table = MemoryTable::builder("People")
        .anchor(5, 3)
        .headers(["Name", "Age"])
        .row(["Alice", "30"])
        .totals([CellValue::from("Total"), CellValue::Int(30)])
        .build()
        .expect("table builds");
    let records = table.to_records::<Person>().expect("maps");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Alice");
}

#[test]
fn headerless_configuration_maps_the_first_row() {
    let table = people();
    let records = table
        .mapper::<Person>()
        .configure(|cfg| cfg.has_header_row = false)
        .to_vec()
        .expect("swallowed");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].name, "Name");
}

#[test]
fn empty_table_yields_nothing() {
    let table = MemoryTable::builder("People")
        .headers(["Name", "Age"])
        .build()
        .expect("header-only table builds");
    let mut mapper = table.mapper::<Person>();
    assert!(mapper.is_empty());
    assert_eq!(mapper.rows().expect("resolves").count(), 0);
    assert!(mapper.validate().expect("resolves").is_empty());
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Status {
    #[default]
    Active = 1,
    OnLeave = 2,
    Retired = 3,
}

cell_enum!(Status { Active, OnLeave, Retired });

#[derive(Debug, Default)]
struct Staff {
    id: u16,
    status: Status,
    hired: NaiveDate,
    rate: Option<f64>,
    remote: bool,
}

impl Record for Staff {
    fn schema() -> Schema<Self> {
        Schema::<Self>::builder()
            .field("id", |s| &mut s.id)
            .index(1)
            .field("status", |s| &mut s.status)
            .field("hired", |s| &mut s.hired)
            .column("Hire date")
            .field("rate", |s| &mut s.rate)
            .column("Rate")
            .constraint(Constraint::range(0.0, 500.0))
            .field("remote", |s| &mut s.remote)
            .column("Remote")
            .optional()
            .build()
    }

    fn configure(config: &mut MapperConfig<Self>) {
        config.date_locale = DateLocale::en_gb();
        config.throw_on_cast_failure = true;
    }
}

#[test]
fn typed_fields_convert_through_every_rule() {
    let table = MemoryTable::builder("Staff")
        .headers(["ID", "status", "HIRE DATE", "Rate"])
        .row([
            CellValue::Int(7),
            CellValue::from("onleave"),
            CellValue::from("03/02/2021"),
            CellValue::Number(42.5),
        ])
        .row([
            CellValue::from("8"),
            CellValue::Int(3),
            CellValue::Number(45306.0),
            CellValue::Empty,
        ])
        .build()
        .expect("table builds");

    let staff = table.to_records::<Staff>().expect("every cell converts");
    assert_eq!(staff[0].id, 7);
    assert_eq!(staff[0].status, Status::OnLeave);
    assert_eq!(staff[0].hired, NaiveDate::from_ymd_opt(2021, 2, 3).unwrap());
    assert_eq!(staff[0].rate, Some(42.5));
    assert!(!staff[0].remote);

    assert_eq!(staff[1].id, 8);
    assert_eq!(staff[1].status, Status::Retired);
    assert_eq!(staff[1].hired, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(staff[1].rate, None);
}

#[test]
fn record_defaults_apply_before_caller_configurator() {
    let table = MemoryTable::builder("Staff")
        .headers(["ID", "status", "Hire date", "Rate"])
        .row([
            CellValue::Int(1),
            CellValue::from("Unknown"),
            CellValue::from("2021-01-01"),
            CellValue::Empty,
        ])
        .build()
        .expect("table builds");

    let err = table.to_records::<Staff>().unwrap_err();
    let failure = err.failure().expect("cell payload");
    assert_eq!(failure.expected, "Status");
    assert_eq!(failure.reason, "`Unknown` does not name a variant");

    let relaxed = table
        .mapper::<Staff>()
        .configure(|cfg| cfg.throw_on_cast_failure = false)
        .to_vec()
        .expect("caller override wins");
    assert_eq!(relaxed[0].status, Status::Active);
}

#[test]
fn date_system_changes_serial_interpretation() {
    let table = MemoryTable::builder("Staff")
        .headers(["ID", "status", "Hire date", "Rate"])
        .row([
            CellValue::Int(1),
            CellValue::Int(1),
            CellValue::Number(0.0),
            CellValue::Empty,
        ])
        .build()
        .expect("table builds");
    let staff = table
        .mapper::<Staff>()
        .configure(|cfg| cfg.date_system = DateSystem::Excel1904)
        .to_vec()
        .expect("converts");
    assert_eq!(staff[0].hired, NaiveDate::from_ymd_opt(1904, 1, 1).unwrap());
}

#[test]
fn error_cells_and_overflow_are_coercion_failures() {
    let table = MemoryTable::builder("Staff")
        .headers(["ID", "status", "Hire date", "Rate"])
        .row([
            CellValue::Int(70_000),
            CellValue::Error(CellErrorKind::Na),
            CellValue::from("2021-01-01"),
            CellValue::Number(900.0),
        ])
        .build()
        .expect("table builds");
    let failures = table.validate_records::<Staff>().expect("resolves");
    let reasons: Vec<_> = failures.iter().map(|f| f.reason.as_str()).collect();
    assert_eq!(
        reasons,
        [
            "70000 is out of range for the target type",
            "cell holds error value #N/A",
            "900 is above the maximum of 500",
        ]
    );
}

#[derive(Debug, Default)]
struct Bin {
    code: String,
}

impl Record for Bin {
    fn schema() -> Schema<Self> {
        Schema::<Self>::builder()
            .field("code", |b| &mut b.code)
            .constraint(Constraint::pattern(r"\d|\d\d").expect("valid pattern"))
            .build()
    }
}

#[test]
fn pattern_with_alternation_accepts_the_longer_branch() {
    let table = MemoryTable::builder("Bins")
        .headers(["code"])
        .row(["42"])
        .row(["7"])
        .row(["123"])
        .build()
        .expect("table builds");

    let failures = table.validate_records::<Bin>().expect("resolves");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].cell.to_string(), "A4");
    assert_eq!(failures[0].reason, r"`123` does not match pattern `\d|\d\d`");

    let mut strict = table.mapper::<Bin>().with_config(MapperConfig::strict());
    let mut rows = strict.rows().expect("resolves");
    assert_eq!(rows.next().expect("row 2").expect("42 matches").code, "42");
    assert_eq!(rows.next().expect("row 3").expect("7 matches").code, "7");
    assert!(matches!(rows.next(), Some(Err(MapError::Validation { .. }))));
}
