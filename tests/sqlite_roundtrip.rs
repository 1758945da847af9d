use rusqlite::named_params;

use sqlgen::datatype::{ColumnSpec, Timestamp, Value};
use sqlgen::expr::CompareExpr;
use sqlgen::persist::{RowControl, SqliteExecutor, SqliteTable};
use sqlgen::row;
use sqlgen::table::{Col, ColumnDef, InsertMode, Table};

struct Fixture {
    table: Table,
    id: Col<i64>,
    c1: Col<f64>,
    c2: Col<String>,
    c3: Col<Timestamp>,
}

impl Fixture {
    fn new() -> Self {
        let mut table = Table::new("T1");
        let id = table.register(
            ColumnDef::<i64>::new("ID").spec(ColumnSpec::PRIMARY_KEY | ColumnSpec::AUTOINCREMENT),
        );
        let c1 = table.register(ColumnDef::<f64>::new("C1"));
        let c2 = table.register(ColumnDef::<String>::new("C2"));
        let c3 = table.register(ColumnDef::<Timestamp>::new("C3"));
        Fixture { table, id, c1, c2, c3 }
    }
}

#[test]
fn create_insert_select_roundtrip() {
    let db = SqliteExecutor::open_in_memory().expect("in-memory database");
    let fixture = Fixture::new();
    let mut binding = SqliteTable::new(fixture.table, &db);

    binding.create_table().expect("create should succeed");

    binding
        .table_mut()
        .add_row(row![0i64, 1.23, "XXX", Timestamp::from(1631730839)])
        .expect("row should be accepted");
    binding
        .table_mut()
        .add_row(row![0i64, 4.56, "YYY", Timestamp::from(1631730840)])
        .expect("row should be accepted");
    binding
        .insert_rows(InsertMode::Literal)
        .expect("insert should succeed");

    // The buffers fed the INSERT; selection refills them from the database.
    binding.table_mut().clear_rows();
    let mut seen = Vec::new();
    let ingested = binding
        .select_rows(&[], &[], &CompareExpr::empty(), &[], 0, 0, |row| {
            seen.push(row)
        })
        .expect("select should succeed");
    assert_eq!(ingested, 2);
    assert_eq!(seen, vec![0, 1]);

    let table = binding.table();
    assert_eq!(
        table.col(fixture.id).column().rows(),
        &[Value::Integer(1), Value::Integer(2)],
        "autoincrement assigned the keys"
    );
    assert_eq!(
        table.col(fixture.c1).column().rows(),
        &[Value::Real(1.23), Value::Real(4.56)]
    );
    assert_eq!(
        table.col(fixture.c2).column().rows(),
        &[
            Value::Text("XXX".to_owned()),
            Value::Text("YYY".to_owned()),
        ]
    );
    assert_eq!(
        table.col(fixture.c3).column().rows(),
        &[
            Value::Datetime(Timestamp(1631730839)),
            Value::Datetime(Timestamp(1631730840)),
        ]
    );
}

#[test]
fn projected_select_ingests_only_named_columns() {
    let db = SqliteExecutor::open_in_memory().expect("in-memory database");
    let fixture = Fixture::new();
    let mut binding = SqliteTable::new(fixture.table, &db);

    binding.create_table().expect("create should succeed");
    binding
        .table_mut()
        .add_row(row![0i64, 1.23, "XXX", Timestamp::EPOCH])
        .expect("row should be accepted");
    binding
        .insert_rows(InsertMode::Literal)
        .expect("insert should succeed");
    binding.table_mut().clear_rows();

    // Render first, run after, so the projection borrow ends before the
    // ingesting pass takes the table mutably.
    let sql = {
        let table = binding.table();
        table.sql_rows_select(
            &[table.col(fixture.c1), table.col(fixture.c2)],
            &[],
            &CompareExpr::empty(),
            &[],
            0,
            0,
        )
    };
    let ingested = binding.run_select(&sql, |_| {}).expect("select should succeed");
    assert_eq!(ingested, 1);

    let table = binding.table();
    assert_eq!(table.col(fixture.id).column().rows_count(), 0);
    assert_eq!(table.col(fixture.c1).column().rows(), &[Value::Real(1.23)]);
    assert_eq!(
        table.col(fixture.c2).column().rows(),
        &[Value::Text("XXX".to_owned())]
    );
}

#[test]
fn count_reports_the_row_total() {
    let db = SqliteExecutor::open_in_memory().expect("in-memory database");
    let fixture = Fixture::new();
    let mut binding = SqliteTable::new(fixture.table, &db);

    binding.create_table().expect("create should succeed");
    for i in 0..5i64 {
        binding
            .table_mut()
            .add_row(row![0i64, i as f64, format!("row {i}"), Timestamp::EPOCH])
            .expect("row should be accepted");
    }
    binding
        .insert_rows(InsertMode::Literal)
        .expect("insert should succeed");

    let inner = binding
        .table()
        .sql_rows_select(&[], &[], &CompareExpr::empty(), &[], 0, 0);
    let mut counted = None;
    binding
        .count_rows(&inner, |count| counted = Some(count))
        .expect("count should succeed");
    assert_eq!(counted, Some(5));
}

#[test]
fn parameter_insert_binds_named_placeholders() {
    let db = SqliteExecutor::open_in_memory().expect("in-memory database");
    let fixture = Fixture::new();
    let mut binding = SqliteTable::new(fixture.table, &db);

    binding.create_table().expect("create should succeed");
    binding
        .table_mut()
        .add_row(row![0i64, 0.0, "", Timestamp::EPOCH])
        .expect("row should be accepted");
    let sql = binding.table().sql_rows_insert(InsertMode::Parameter);
    assert_eq!(
        sql.as_str(),
        "INSERT INTO T1 (\n\
         C1,\n\
         C2,\n\
         C3\n\
         )\n\
         VALUES (\n\
         :C1_0,\n\
         :C2_0,\n\
         :C3_0\n\
         );"
    );

    db.connection()
        .execute(
            sql.as_str(),
            named_params! {
                ":C1_0": 9.99,
                ":C2_0": "ZZZ",
                ":C3_0": 1631730839i64,
            },
        )
        .expect("bound insert should succeed");

    binding.table_mut().clear_rows();
    let ingested = binding
        .select_rows(&[], &[], &CompareExpr::empty(), &[], 0, 0, |_| {})
        .expect("select should succeed");
    assert_eq!(ingested, 1);
    let table = binding.table();
    assert_eq!(table.col(fixture.c1).column().rows(), &[Value::Real(9.99)]);
    assert_eq!(
        table.col(fixture.c2).column().rows(),
        &[Value::Text("ZZZ".to_owned())]
    );
}

#[test]
fn update_and_delete_affect_matching_rows() {
    let db = SqliteExecutor::open_in_memory().expect("in-memory database");
    let fixture = Fixture::new();
    let mut binding = SqliteTable::new(fixture.table, &db);

    binding.create_table().expect("create should succeed");
    binding
        .table_mut()
        .add_row(row![0i64, 1.23, "XXX", Timestamp::EPOCH])
        .expect("row should be accepted");
    binding
        .table_mut()
        .add_row(row![0i64, 4.56, "YYY", Timestamp::EPOCH])
        .expect("row should be accepted");
    binding
        .insert_rows(InsertMode::Literal)
        .expect("insert should succeed");

    // Rewrite the first stored row with fresh buffered values.
    binding.table_mut().clear_rows();
    binding
        .table_mut()
        .add_row(row![0i64, 7.77, "UPDATED", Timestamp::from(1631730839)])
        .expect("row should be accepted");
    let condition = binding.table().col(fixture.id).eq(1i64);
    binding
        .update_rows(&condition, 0, 0)
        .expect("update should succeed");

    binding.table_mut().clear_rows();
    let sql = {
        let table = binding.table();
        table.sql_rows_select(
            &[],
            &[],
            &table.col(fixture.id).eq(1i64),
            &[],
            0,
            0,
        )
    };
    binding.run_select(&sql, |_| {}).expect("select should succeed");
    {
        let table = binding.table();
        assert_eq!(table.col(fixture.c1).column().rows(), &[Value::Real(7.77)]);
        assert_eq!(
            table.col(fixture.c2).column().rows(),
            &[Value::Text("UPDATED".to_owned())]
        );
    }

    // Deleting by condition leaves the other row in place.
    let condition = binding.table().col(fixture.c1).gt(5.0f64);
    binding
        .delete_rows(&condition, 0, 0)
        .expect("delete should succeed");

    let inner = binding
        .table()
        .sql_rows_select(&[], &[], &CompareExpr::empty(), &[], 0, 0);
    let mut counted = None;
    binding
        .count_rows(&inner, |count| counted = Some(count))
        .expect("count should succeed");
    assert_eq!(counted, Some(1));
}

#[test]
fn query_callback_can_abort_iteration() {
    let db = SqliteExecutor::open_in_memory().expect("in-memory database");
    let fixture = Fixture::new();
    let mut binding = SqliteTable::new(fixture.table, &db);

    binding.create_table().expect("create should succeed");
    for i in 0..3i64 {
        binding
            .table_mut()
            .add_row(row![0i64, i as f64, format!("row {i}"), Timestamp::EPOCH])
            .expect("row should be accepted");
    }
    binding
        .insert_rows(InsertMode::Literal)
        .expect("insert should succeed");

    let sql = binding
        .table()
        .sql_rows_select(&[], &[], &CompareExpr::empty(), &[], 0, 0);
    let mut calls = 0;
    db.execute_query(&sql, |columns, cells, names| {
        assert_eq!(columns, 4);
        assert_eq!(cells.len(), 4);
        assert_eq!(names[0], "ID");
        calls += 1;
        RowControl::Abort
    })
    .expect("query should succeed");
    assert_eq!(calls, 1, "the first abort stops iteration");
}

#[test]
fn drop_table_removes_the_table() {
    let db = SqliteExecutor::open_in_memory().expect("in-memory database");
    let fixture = Fixture::new();
    let binding = SqliteTable::new(fixture.table, &db);

    binding.create_table().expect("create should succeed");
    binding.drop_table().expect("drop should succeed");

    let sql = binding
        .table()
        .sql_rows_select(&[], &[], &CompareExpr::empty(), &[], 0, 0);
    assert!(
        db.execute_query(&sql, |_, _, _| RowControl::Continue).is_err(),
        "querying a dropped table must fail"
    );
}
