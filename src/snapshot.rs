use crate::model::{is_blank_row, AttendanceRecord, Student};
use crate::store::{RecordStore, Sheet, SheetWrite, StoreError, Table};
use std::collections::HashMap;

/// Both tables as read for one request, with the versions they were read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub roster: Vec<Student>,
    pub roster_version: u64,
    pub attendance: Vec<AttendanceRecord>,
    pub attendance_version: u64,
}

impl Snapshot {
    pub fn load<S: RecordStore + ?Sized>(store: &mut S) -> Result<Self, StoreError> {
        let students = store.read_all(Table::Students)?;
        let attendance = store.read_all(Table::Attendance)?;
        let roster = decode_rows(Table::Students, &students, Student::from_row)?;
        let mut records = decode_rows(Table::Attendance, &attendance, AttendanceRecord::from_row)?;
        resolve_names(&roster, &mut records);
        Ok(Self {
            roster,
            roster_version: students.version,
            attendance: records,
            attendance_version: attendance.version,
        })
    }

    pub fn student_by_name(&self, name: &str) -> Option<&Student> {
        self.roster.iter().find(|s| s.name == name)
    }

    pub fn roster_write(&self, roster: &[Student]) -> SheetWrite {
        SheetWrite {
            table: Table::Students,
            rows: roster.iter().map(Student::to_row).collect(),
            expected_version: self.roster_version,
        }
    }

    pub fn attendance_write(&self, attendance: &[AttendanceRecord]) -> SheetWrite {
        SheetWrite {
            table: Table::Attendance,
            rows: attendance.iter().map(AttendanceRecord::to_row).collect(),
            expected_version: self.attendance_version,
        }
    }
}

fn decode_rows<T>(
    table: Table,
    sheet: &Sheet,
    parse: fn(&[String]) -> Result<T, String>,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::with_capacity(sheet.rows.len());
    for (idx, row) in sheet.rows.iter().enumerate() {
        if is_blank_row(row) {
            continue;
        }
        let value = parse(row).map_err(|message| StoreError::Malformed {
            table: table.worksheet(),
            row: idx,
            message,
        })?;
        out.push(value);
    }
    Ok(out)
}

/// Attendance rows carry a copy of the name; the roster is authoritative.
fn resolve_names(roster: &[Student], records: &mut [AttendanceRecord]) {
    let by_id: HashMap<i64, &str> = roster.iter().map(|s| (s.id, s.name.as_str())).collect();
    for record in records.iter_mut() {
        if let Some(name) = by_id.get(&record.student_id) {
            if record.student_name != *name {
                record.student_name = name.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Row};

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn load_skips_blank_rows_and_resolves_names() {
        let mut store = MemoryStore::new();
        store
            .replace_all(
                Table::Students,
                vec![
                    row(&["1.0", "Ada Lovelace", "2.0", "2024-01-02"]),
                    row(&["", "", "", ""]),
                ],
                0,
            )
            .expect("seed students");
        store
            .replace_all(
                Table::Attendance,
                vec![
                    row(&["2024-03-01 00:00:00", "1", "Ada"]),
                    row(&["2024-03-02", "9", "Ghost"]),
                ],
                0,
            )
            .expect("seed attendance");

        let snap = Snapshot::load(&mut store).expect("load");
        assert_eq!(snap.roster.len(), 1);
        assert_eq!(snap.roster_version, 1);
        assert_eq!(snap.attendance[0].student_name, "Ada Lovelace");
        assert_eq!(snap.attendance[1].student_name, "Ghost");
    }

    #[test]
    fn malformed_row_reports_table_and_index() {
        let mut store = MemoryStore::new();
        store
            .replace_all(Table::Attendance, vec![row(&["yesterday", "1", "Ada"])], 0)
            .expect("seed");
        match Snapshot::load(&mut store) {
            Err(StoreError::Malformed { table, row, .. }) => {
                assert_eq!(table, "Attendance");
                assert_eq!(row, 0);
            }
            other => panic!("expected malformed error, got {:?}", other),
        }
    }
}
