use std::fs;

use finsheet_tools::io::{audit_json, excel_read, excel_write};
use finsheet_tools::model::{CellValue, Table};
use finsheet_tools::normalize::ColumnType;
use finsheet_tools::pipeline::{self, AUDIT_SHEET, CleanPlan, DATA_SHEET};
use finsheet_tools::reconcile::process_financial_table;
use finsheet_tools::ToolError;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::tempdir;

fn text(value: &str) -> CellValue {
    CellValue::from(value)
}

fn source_table() -> Table {
    Table::from_rows(
        [" Company ", "Revenue ", "EBITDA", "Phone", "Founded", "Sectors"],
        vec![
            vec![
                text("Acme"),
                text("CAD (100)"),
                text("LTM 50"),
                text("(416) 555-0199"),
                text("Mar-21"),
                text("- Retail - Food"),
            ],
            vec![
                text("Globex"),
                CellValue::Number(250.0),
                text("N/A"),
                text("N/A"),
                text("2020-06-30"),
                text("Energy"),
            ],
        ],
    )
    .expect("source table built")
}

#[test]
fn excel_roundtrip_preserves_table() {
    let table = Table::from_rows(
        ["Name", "Value", "Comment"],
        vec![
            vec![text("first"), CellValue::Number(1.5), CellValue::Missing],
            vec![text("second"), CellValue::Number(-2.0), text("checked")],
        ],
    )
    .expect("table built");

    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("table.xlsx");
    excel_write::write_tables(&xlsx_path, &[("Sheet1", &table)]).expect("Excel written");
    let restored = excel_read::read_table(&xlsx_path, None).expect("Excel read");

    assert_eq!(table, restored);
}

#[test]
fn missing_sheet_is_reported() {
    let table = Table::new(["Name"]).expect("table built");
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("table.xlsx");
    excel_write::write_tables(&xlsx_path, &[("Sheet1", &table)]).expect("Excel written");

    let error = excel_read::read_table(&xlsx_path, Some("Other")).expect_err("sheet missing");
    assert!(matches!(error, ToolError::MissingSheet(name) if name == "Other"));
}

#[test]
fn clean_workbook_writes_data_and_audit_sheets() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.xlsx");
    let output = temp_dir.path().join("output.xlsx");
    let audit_path = temp_dir.path().join("audit.json");
    excel_write::write_tables(&input, &[("Raw", &source_table())]).expect("input written");

    let plan = CleanPlan {
        financial_columns: vec!["Revenue".to_string(), "EBITDA".to_string()],
        phone_columns: vec!["Phone".to_string()],
        date_columns: vec!["Founded".to_string()],
        dash_columns: vec!["Sectors".to_string()],
        audit_json: Some(audit_path.clone()),
        ..CleanPlan::default()
    };

    let summary = pipeline::clean_workbook(&input, &output, &plan).expect("workbook cleaned");
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.audited_cells, 3);
    assert_eq!(summary.migrated_cells, 1);

    let data = excel_read::read_table(&output, Some(DATA_SHEET)).expect("data sheet read");
    assert_eq!(
        data.columns(),
        [
            "Company",
            "Revenue",
            "EBITDA",
            "Phone",
            "Founded",
            "Sectors",
            "Notes",
            "LTM EBITDA"
        ]
    );
    let revenue = data
        .get(0, "Revenue")
        .and_then(CellValue::as_number)
        .expect("revenue number");
    assert!((revenue + 73.0).abs() < 1e-9);
    assert_eq!(data.get(0, "LTM EBITDA"), Some(&CellValue::Number(50.0)));
    assert_eq!(data.get(0, "Phone"), Some(&text("4165550199")));
    assert_eq!(data.get(0, "Founded"), Some(&text("2021-03-01")));
    assert_eq!(data.get(0, "Sectors"), Some(&text("Retail, Food")));
    assert_eq!(
        data.get(0, "Notes"),
        Some(&text(
            "Revenue: CAD; originally stored as CAD; EBITDA: LTM"
        ))
    );
    assert_eq!(data.get(1, "EBITDA"), Some(&CellValue::Missing));
    assert_eq!(data.get(1, "Phone"), Some(&CellValue::Missing));

    let audit_sheet = excel_read::read_table(&output, Some(AUDIT_SHEET)).expect("audit sheet read");
    assert_eq!(audit_sheet.len(), 3);

    let audit = audit_json::read_audit_json(&audit_path).expect("audit JSON read");
    assert_eq!(audit.len(), 3);
    assert_eq!(audit.records()[1].column_name, "EBITDA");
    assert_eq!(
        audit.records()[1].migrated_to_column.as_deref(),
        Some("LTM EBITDA")
    );
}

#[test]
fn audit_json_uses_audit_column_names() {
    let mut table = Table::from_rows(["EBITDA"], vec![vec![text("LTM 5")]]).expect("table built");
    let (_, audit) = process_financial_table(&mut table, &["EBITDA"], 0.73).expect("reconciled");

    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("audit.json");
    audit_json::write_audit_json(&path, &audit).expect("audit written");

    let written = fs::read_to_string(&path).expect("audit file read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("JSON parsed");
    let record = &parsed[0];
    assert_eq!(record["Row Index"], 0);
    assert_eq!(record["Old Value"], "LTM 5");
    assert_eq!(record["New Value"], 5.0);
    assert_eq!(record["Notes Added"], "EBITDA: LTM");
    assert_eq!(record["Migrated To Column"], "LTM EBITDA");
}

#[test]
fn plan_loads_from_json_with_defaults() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("plan.json");
    let plan_json = serde_json::json!({
        "financial_columns": ["Revenue"],
        "column_types": [["Units", "integer"]],
        "reconcile": { "cad_to_usd_rate": 0.75, "audit_notes": "carry-over" }
    });
    fs::write(&path, plan_json.to_string()).expect("plan written");

    let plan = CleanPlan::from_json_file(&path).expect("plan loaded");

    assert_eq!(plan.financial_columns, vec!["Revenue".to_string()]);
    assert_eq!(
        plan.column_types,
        vec![("Units".to_string(), ColumnType::Integer)]
    );
    assert_eq!(plan.reconcile.cad_to_usd_rate, 0.75);
    assert_eq!(plan.reconcile.notes_column, "Notes");
    assert_eq!(
        plan.reconcile.audit_notes,
        finsheet_tools::reconcile::AuditNotesPolicy::CarryOver
    );
    assert_eq!(plan.reconcile.targets.resolve("ltm"), Some("LTM EBITDA"));
}

#[test]
fn headers_differing_only_in_case_are_rejected_before_writing() {
    let table = Table::new(["Notes", "notes"]).expect("table built");
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("table.xlsx");

    let error = excel_write::write_tables(&xlsx_path, &[("Sheet1", &table)])
        .expect_err("clashing headers rejected");

    assert!(matches!(error, ToolError::DuplicateColumn(ref name) if name == "notes"));
    assert!(!xlsx_path.exists());
}

#[test]
fn clean_workbook_reuses_lowercase_notes_column() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.xlsx");
    let output = temp_dir.path().join("output.xlsx");
    let source = Table::from_rows(
        ["Company", "Revenue", "notes"],
        vec![vec![text("Acme"), text("CAD 100"), text("reviewed")]],
    )
    .expect("source table built");
    excel_write::write_tables(&input, &[("Raw", &source)]).expect("input written");

    let plan = CleanPlan {
        financial_columns: vec!["Revenue".to_string()],
        ..CleanPlan::default()
    };
    pipeline::clean_workbook(&input, &output, &plan).expect("workbook cleaned");

    let data = excel_read::read_table(&output, Some(DATA_SHEET)).expect("data sheet read");
    assert_eq!(data.columns(), ["Company", "Revenue", "notes"]);
    assert_eq!(
        data.get(0, "notes"),
        Some(&text("reviewed; Revenue: CAD; originally stored as CAD"))
    );
}

#[test]
fn date_formatted_cells_are_read_as_iso_text() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("dates.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Founded").expect("header written");
    worksheet.write_string(0, 1, "Closed").expect("header written");
    let founded = ExcelDateTime::from_ymd(2021, 3, 1).expect("valid date");
    let closed = ExcelDateTime::from_ymd(2023, 1, 15)
        .and_then(|date| date.and_hms(8, 30, 0))
        .expect("valid datetime");
    worksheet
        .write_datetime_with_format(1, 0, &founded, &Format::new().set_num_format("yyyy-mm-dd"))
        .expect("date written");
    worksheet
        .write_datetime_with_format(
            1,
            1,
            &closed,
            &Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        )
        .expect("datetime written");
    workbook.save(&xlsx_path).expect("workbook saved");

    let table = excel_read::read_table(&xlsx_path, None).expect("Excel read");

    assert_eq!(table.get(0, "Founded"), Some(&text("2021-03-01")));
    assert_eq!(table.get(0, "Closed"), Some(&text("2023-01-15 08:30:00")));
}
