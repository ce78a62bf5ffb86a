//! CSV export of derived tables and collapse borders.

use pf_derive::{BorderPoint, DerivedField, DerivedRow, DerivedTable};
use pf_core::Field;

fn push_cell(line: &mut String, cell: &str) {
    if !line.is_empty() {
        line.push(',');
    }
    if cell.contains([',', '"', '\n', '\r']) {
        line.push('"');
        line.push_str(&cell.replace('"', "\"\""));
        line.push('"');
    } else {
        line.push_str(cell);
    }
}

fn value_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn regime_cell(row: &DerivedRow) -> &'static str {
    row.regime.map(|r| r.label()).unwrap_or_default()
}

/// Column headers: source file, record fields, derived fields, regime.
pub fn table_header(table: &DerivedTable) -> Vec<&'static str> {
    let mut header = vec!["file"];
    header.extend(table.schema.fields().iter().map(|f| f.label()));
    header.extend(DerivedField::ALL.iter().map(|f| f.label()));
    header.push("regime");
    header
}

/// Whole table as CSV. Missing values are empty cells.
pub fn table_to_csv(table: &DerivedTable) -> String {
    let mut csv = String::new();
    let mut line = String::new();
    for cell in table_header(table) {
        push_cell(&mut line, cell);
    }
    csv.push_str(&line);
    csv.push('\n');

    for row in &table.rows {
        line.clear();
        push_cell(&mut line, &row.record.source);
        for value in row.record.values() {
            push_cell(&mut line, &value_cell(*value));
        }
        for field in DerivedField::ALL {
            push_cell(&mut line, &value_cell(row.get(field)));
        }
        push_cell(&mut line, regime_cell(row));
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

/// Collapse conditions as CSV, one line per border point.
pub fn borders_to_csv(table: &DerivedTable, points: &[BorderPoint]) -> String {
    let mut csv = String::from(
        "file,initial velocity (m/s),magma temperature (C),mass fraction water added,\
         mass flux (kg/s),calculated height (km),vent equivalent init (m),Ri,\
         height jump (km),jump threshold (km),regime\n",
    );
    for point in points {
        let Some(row) = point.resolve(table) else {
            continue;
        };
        let mut line = String::new();
        push_cell(&mut line, &row.record.source);
        push_cell(&mut line, &point.velocity_mps.to_string());
        push_cell(&mut line, &point.temperature_c.to_string());
        push_cell(&mut line, &point.water_fraction.to_string());
        push_cell(&mut line, &value_cell(row.net_mass_flux));
        push_cell(&mut line, &value_cell(row.record.get(Field::PlumeHeight)));
        push_cell(&mut line, &value_cell(row.adjusted_vent_diameter));
        push_cell(&mut line, &value_cell(row.richardson));
        push_cell(&mut line, &point.jump_km.to_string());
        push_cell(&mut line, &point.threshold_km.to_string());
        push_cell(&mut line, regime_cell(row));
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{RunRecord, Schema};
    use pf_derive::Regime;

    fn row(source: &str, regime: Option<Regime>) -> DerivedRow {
        let mut values = vec![None; Field::BASE_WIDTH];
        values[Field::VentDiameter.index()] = Some(50.0);
        values[Field::PlumeHeight.index()] = Some(20.5);
        DerivedRow {
            record: RunRecord::from_values(source, Schema::BASE, values),
            net_mass_flux: Some(1.0e8),
            adjusted_vent_diameter: Some(33.5),
            dry_plume_height: None,
            delta_height: None,
            delta_sparks_height: None,
            density_ratio: None,
            reduced_gravity: None,
            richardson: Some(0.25),
            regime,
        }
    }

    fn table(rows: Vec<DerivedRow>) -> DerivedTable {
        DerivedTable {
            schema: Schema::BASE,
            dry_mixture_density: 2400.0,
            rows,
            unclassified: vec![],
        }
    }

    #[test]
    fn header_and_row_widths_match() {
        let t = table(vec![row("run1.txt", Some(Regime::Undetermined)), row("run2.txt", None)]);
        let csv = table_to_csv(&t);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);

        let width = table_header(&t).len();
        assert_eq!(width, 1 + 16 + 8 + 1);
        for line in &lines {
            assert_eq!(line.split(',').count(), width);
        }
        assert!(lines[0].starts_with("file,relative humidity (%),"));
        assert!(lines[0].ends_with(",Ri,regime"));
        assert!(lines[1].starts_with("run1.txt,,,,50,"));
        assert!(lines[1].ends_with(",dry"));
        // Unclassified rows leave the regime cell empty.
        assert!(lines[2].ends_with(','));
    }

    #[test]
    fn awkward_source_names_are_quoted() {
        let t = table(vec![row("a,\"b\".txt", None)]);
        let csv = table_to_csv(&t);
        assert!(csv.lines().nth(1).unwrap().starts_with("\"a,\"\"b\"\".txt\","));
    }

    #[test]
    fn borders_csv_resolves_rows() {
        let t = table(vec![row("run1.txt", Some(Regime::Collapsing))]);
        let points = [
            BorderPoint {
                row: 0,
                velocity_mps: 100.0,
                temperature_c: 900.0,
                water_fraction: 0.3,
                jump_km: 12.5,
                threshold_km: 4.0,
            },
            BorderPoint {
                row: 9,
                velocity_mps: 100.0,
                temperature_c: 900.0,
                water_fraction: 0.3,
                jump_km: 1.0,
                threshold_km: 0.5,
            },
        ];
        let csv = borders_to_csv(&t, &points);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "run1.txt,100,900,0.3,100000000,20.5,33.5,0.25,12.5,4,collapsing");
    }
}
