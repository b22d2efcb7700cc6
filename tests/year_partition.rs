mod common;

use common::{placeholder_file, sales_table, StaticStrategy};
use mdbshift::table::{CellValue, Table};
use mdbshift::{AccessReader, YearPartitioner};
use tempfile::tempdir;

fn reader_with(tables: Vec<(&str, Table)>) -> AccessReader {
    AccessReader::with_strategies(vec![Box::new(StaticStrategy::new("static", tables))])
}

#[test]
fn summary_of_sales_fixture() {
    let dir = tempdir().expect("tempdir");
    let file = placeholder_file(dir.path(), "legacy.mdb");
    let reader = reader_with(vec![("SALES", sales_table())]);
    let partitioner = YearPartitioner::new(&reader);

    let summary = partitioner
        .summarize_table(&file, "SALES")
        .expect("summarize");
    assert_eq!(summary.available_years, vec![2008, 2009]);
    assert_eq!(summary.row_count, 3);
    assert_eq!(summary.column_count, 3);
    assert_eq!(summary.year_range, "2008-2009");
    assert_eq!(summary.skipped_rows, 0);
}

#[test]
fn read_one_year_returns_exactly_matching_rows() {
    let dir = tempdir().expect("tempdir");
    let file = placeholder_file(dir.path(), "legacy.mdb");
    let reader = reader_with(vec![("SALES", sales_table())]);
    let partitioner = YearPartitioner::new(&reader);

    let partition = partitioner
        .read_year(&file, "SALES", 2008)
        .expect("read year");
    assert_eq!(partition.row_count(), 2);
    let idx = partition.column_index("N_ANIO").expect("year column");
    for row in partition.rows() {
        assert_eq!(row[idx], CellValue::Int(2008));
    }
}

#[test]
fn partitions_reconstruct_rows_with_valid_years() {
    let mut table = Table::new(vec!["ID".to_string(), "N_ANIO".to_string()]).unwrap();
    let years = [2008, 2009, 2008, 2010, 2009, 2008];
    for (id, year) in years.iter().enumerate() {
        table
            .push_row(vec![CellValue::Int(id as i64), CellValue::Int(*year as i64)])
            .unwrap();
    }
    // Defective rows: excluded from the summary and from every partition.
    table
        .push_row(vec![CellValue::Int(99), CellValue::Null])
        .unwrap();
    table
        .push_row(vec![
            CellValue::Int(100),
            CellValue::Text("unknown".to_string()),
        ])
        .unwrap();

    let dir = tempdir().expect("tempdir");
    let file = placeholder_file(dir.path(), "legacy.mdb");
    let reader = reader_with(vec![("T", table)]);
    let partitioner = YearPartitioner::new(&reader);

    let summary = partitioner.summarize_table(&file, "T").expect("summarize");
    assert_eq!(summary.available_years, vec![2008, 2009, 2010]);
    assert_eq!(summary.row_count, 8);
    assert_eq!(summary.skipped_rows, 2);

    let mut reconstructed = 0;
    for year in &summary.available_years {
        let partition = partitioner.read_year(&file, "T", *year).expect("read year");
        reconstructed += partition.row_count();
    }
    assert_eq!(reconstructed, years.len());
}

#[test]
fn year_values_parse_across_cell_types() {
    let mut table = Table::new(vec!["N_ANIO".to_string()]).unwrap();
    table.push_row(vec![CellValue::Int(2008)]).unwrap();
    table.push_row(vec![CellValue::Float(2009.0)]).unwrap();
    table
        .push_row(vec![CellValue::Text("2010".to_string())])
        .unwrap();
    table.push_row(vec![CellValue::Float(2010.5)]).unwrap();

    let dir = tempdir().expect("tempdir");
    let file = placeholder_file(dir.path(), "legacy.mdb");
    let reader = reader_with(vec![("T", table)]);
    let partitioner = YearPartitioner::new(&reader);

    let summary = partitioner.summarize_table(&file, "T").expect("summarize");
    assert_eq!(summary.available_years, vec![2008, 2009, 2010]);
    assert_eq!(summary.skipped_rows, 1);
}

#[test]
fn missing_year_column_is_annotated_not_fatal() {
    let mut no_year = Table::new(vec!["ID".to_string()]).unwrap();
    no_year.push_row(vec![CellValue::Int(1)]).unwrap();

    let dir = tempdir().expect("tempdir");
    let file = placeholder_file(dir.path(), "legacy.mdb");
    let reader = reader_with(vec![("GOOD", sales_table()), ("BAD", no_year)]);
    let partitioner = YearPartitioner::new(&reader);

    let summary = partitioner.summarize(&file).expect("summarize file");
    assert_eq!(summary.tables.len(), 2);

    let good = &summary.tables["GOOD"];
    assert!(good.error.is_none());
    assert_eq!(good.available_years, vec![2008, 2009]);

    let bad = &summary.tables["BAD"];
    let error = bad.error.as_deref().expect("error annotation");
    assert!(error.contains("N_ANIO"));
    assert!(bad.available_years.is_empty());
}

#[test]
fn read_year_with_no_matches_is_empty_not_error() {
    let dir = tempdir().expect("tempdir");
    let file = placeholder_file(dir.path(), "legacy.mdb");
    let reader = reader_with(vec![("SALES", sales_table())]);
    let partitioner = YearPartitioner::new(&reader);

    let partition = partitioner
        .read_year(&file, "SALES", 1999)
        .expect("read year");
    assert!(partition.is_empty());
    assert_eq!(partition.column_count(), 3);
}

#[test]
fn custom_year_column_is_honored() {
    let mut table = Table::new(vec!["YEAR_OF".to_string()]).unwrap();
    table.push_row(vec![CellValue::Int(1995)]).unwrap();

    let dir = tempdir().expect("tempdir");
    let file = placeholder_file(dir.path(), "legacy.mdb");
    let reader = reader_with(vec![("T", table)]);
    let partitioner = YearPartitioner::with_year_column(&reader, "YEAR_OF");

    let summary = partitioner.summarize_table(&file, "T").expect("summarize");
    assert_eq!(summary.available_years, vec![1995]);
}
