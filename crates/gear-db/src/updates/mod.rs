//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. The builder output is serialized
//! as the audit `detail` payload (changed fields only).

pub mod course;
pub mod lead;
pub mod lesson;
pub mod student;

/// Accumulates `col = ?N` clauses and their bind values.
#[derive(Debug, Default)]
pub(crate) struct SetClauses {
    sets: Vec<String>,
    params: Vec<libsql::Value>,
}

impl SetClauses {
    pub(crate) fn push(&mut self, column: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    pub(crate) fn push_opt(&mut self, column: &str, value: Option<&str>) {
        self.push(column, crate::helpers::opt_value(value));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Finish as `UPDATE {table} SET .. WHERE id = ?N`.
    pub(crate) fn into_update(mut self, table: &str, id: &str) -> (String, Vec<libsql::Value>) {
        self.params.push(id.into());
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{}",
            self.sets.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_placeholders_in_order() {
        let mut sets = SetClauses::default();
        sets.push("name", "Ana");
        sets.push_opt("email", None);
        let (sql, params) = sets.into_update("students", "stu-1");
        assert_eq!(sql, "UPDATE students SET name = ?1, email = ?2 WHERE id = ?3");
        assert_eq!(params.len(), 3);
        assert!(matches!(params[1], libsql::Value::Null));
    }
}
