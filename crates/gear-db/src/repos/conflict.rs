//! Conflict detection records: sweeps lessons for shared resources over
//! overlapping windows and tracks their resolution.

use chrono::Utc;

use gear_core::entities::ConflictDetection;
use gear_core::enums::{AuditAction, ConflictKind, EntityType};
use gear_core::ids::PREFIX_CONFLICT;

use crate::error::DatabaseError;
use crate::helpers::{
    collect_rows, get_bool, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime,
    ts,
};
use crate::service::GearService;

const SELECT_COLS: &str =
    "id, lesson_id, kind, conflicting_lesson_id, resolved, resolved_at, notes, detected_at";

fn row_to_conflict(row: &libsql::Row) -> Result<ConflictDetection, DatabaseError> {
    Ok(ConflictDetection {
        id: row.get(0)?,
        lesson_id: row.get(1)?,
        kind: parse_enum(&row.get::<String>(2)?)?,
        conflicting_lesson_id: row.get(3)?,
        resolved: get_bool(row, 4)?,
        resolved_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        notes: get_opt_string(row, 6)?,
        detected_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl GearService {
    /// Record a conflict for every other lesson sharing a resource with one of
    /// `lesson_ids` over an overlapping window.
    ///
    /// Existing `(lesson, kind, conflicting_lesson)` records are left alone.
    /// Returns the number of records created. Unknown ids are skipped.
    pub async fn detect_conflicts(&self, lesson_ids: &[String]) -> Result<u32, DatabaseError> {
        let mut created = 0;
        for lesson_id in lesson_ids {
            let lesson = match self.get_lesson(lesson_id).await {
                Ok(lesson) => lesson,
                Err(DatabaseError::NoResult) => {
                    tracing::warn!(lesson = %lesson_id, "conflict sweep skipped unknown lesson");
                    continue;
                }
                Err(e) => return Err(e),
            };

            for kind in ConflictKind::ALL {
                let Some(resource_id) = lesson.resource(kind) else {
                    continue;
                };
                let mut rows = self
                    .db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT id FROM lessons
                             WHERE {} = ?1 AND start_time < ?2 AND end_time > ?3 AND id != ?4
                             ORDER BY start_time",
                            kind.column()
                        ),
                        libsql::params![
                            resource_id,
                            ts(lesson.end_time),
                            ts(lesson.start_time),
                            lesson.id.as_str()
                        ],
                    )
                    .await?;

                let mut others = Vec::new();
                while let Some(row) = rows.next().await? {
                    others.push(row.get::<String>(0)?);
                }

                for other in others {
                    if self.insert_conflict(&lesson.id, kind, &other).await? {
                        created += 1;
                    }
                }
            }
        }
        tracing::info!(checked = lesson_ids.len(), created, "conflict sweep finished");
        Ok(created)
    }

    async fn insert_conflict(
        &self,
        lesson_id: &str,
        kind: ConflictKind,
        conflicting_lesson_id: &str,
    ) -> Result<bool, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CONFLICT).await?;
        let inserted = self
            .db()
            .conn()
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO conflict_detections ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, 0, NULL, NULL, ?5)"
                ),
                libsql::params![
                    id.as_str(),
                    lesson_id,
                    kind.as_str(),
                    conflicting_lesson_id,
                    ts(now)
                ],
            )
            .await?;
        if inserted == 0 {
            return Ok(false);
        }
        self.audit(
            EntityType::Conflict,
            &id,
            AuditAction::Created,
            Some(serde_json::json!({
                "lesson_id": lesson_id,
                "kind": kind.as_str(),
                "conflicting_lesson_id": conflicting_lesson_id,
            })),
            now,
        )
        .await?;
        Ok(true)
    }

    pub async fn get_conflict(&self, id: &str) -> Result<ConflictDetection, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM conflict_detections WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_conflict(&row)
    }

    /// Mark a conflict resolved. Resolving twice keeps the first timestamp.
    pub async fn resolve_conflict(
        &self,
        id: &str,
        notes: Option<&str>,
    ) -> Result<ConflictDetection, DatabaseError> {
        let current = self.get_conflict(id).await?;
        if current.resolved {
            return Ok(current);
        }
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE conflict_detections SET resolved = 1, resolved_at = ?1, notes = ?2
                 WHERE id = ?3",
                libsql::params![ts(now), notes, id],
            )
            .await?;
        self.audit(EntityType::Conflict, id, AuditAction::Updated, None, now)
            .await?;
        Ok(ConflictDetection {
            resolved: true,
            resolved_at: Some(now),
            notes: notes.map(String::from),
            ..current
        })
    }

    /// Newest detections first.
    pub async fn list_conflicts(
        &self,
        unresolved_only: bool,
        limit: u32,
    ) -> Result<Vec<ConflictDetection>, DatabaseError> {
        let filter = if unresolved_only { "WHERE resolved = 0" } else { "" };
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM conflict_detections {filter}
                     ORDER BY detected_at DESC, rowid DESC LIMIT {limit}"
                ),
                (),
            )
            .await?;
        collect_rows(rows, row_to_conflict).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{at, make_student, test_service};

    /// Insert a lesson directly, bypassing the booking checks, the way an
    /// import would.
    async fn raw_lesson(
        svc: &GearService,
        id: &str,
        student_id: &str,
        instructor_id: Option<&str>,
        day: u32,
        hour: u32,
    ) {
        svc.db()
            .conn()
            .execute(
                "INSERT INTO lessons (id, student_id, instructor_id, lesson_type, start_time,
                                      end_time, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 'driving', ?4, ?5, 'scheduled', ?4, ?4)",
                libsql::params![
                    id,
                    student_id,
                    instructor_id,
                    ts(at(day, hour)),
                    ts(at(day, hour + 1))
                ],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sweep_creates_each_record_once() {
        let svc = test_service().await;
        let student = make_student(&svc, "Sam").await;
        let ins = svc.create_instructor("Pat", None, None).await.unwrap();
        raw_lesson(&svc, "lsn-a", &student.id, Some(&ins.id), 6, 9).await;
        raw_lesson(&svc, "lsn-b", &student.id, Some(&ins.id), 6, 9).await;
        raw_lesson(&svc, "lsn-c", &student.id, Some(&ins.id), 6, 10).await;

        let ids = vec!["lsn-a".to_string(), "lsn-b".to_string(), "lsn-c".to_string()];
        assert_eq!(svc.detect_conflicts(&ids).await.unwrap(), 2);
        assert_eq!(svc.detect_conflicts(&ids).await.unwrap(), 0);

        let all = svc.list_conflicts(false, 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|c| c.kind == ConflictKind::Instructor));
    }

    #[tokio::test]
    async fn lessons_without_resources_never_conflict() {
        let svc = test_service().await;
        let student = make_student(&svc, "Sam").await;
        raw_lesson(&svc, "lsn-a", &student.id, None, 6, 9).await;
        raw_lesson(&svc, "lsn-b", &student.id, None, 6, 9).await;
        let ids = vec!["lsn-a".to_string(), "missing".to_string()];
        assert_eq!(svc.detect_conflicts(&ids).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn resolve_hides_from_unresolved_listing() {
        let svc = test_service().await;
        let student = make_student(&svc, "Sam").await;
        let ins = svc.create_instructor("Pat", None, None).await.unwrap();
        raw_lesson(&svc, "lsn-a", &student.id, Some(&ins.id), 6, 9).await;
        raw_lesson(&svc, "lsn-b", &student.id, Some(&ins.id), 6, 9).await;
        svc.detect_conflicts(&["lsn-a".to_string()]).await.unwrap();

        let open = svc.list_conflicts(true, 10).await.unwrap();
        assert_eq!(open.len(), 1);
        let resolved = svc
            .resolve_conflict(&open[0].id, Some("moved to vehicle 2"))
            .await
            .unwrap();
        assert!(resolved.resolved);
        assert!(svc.list_conflicts(true, 10).await.unwrap().is_empty());
        assert_eq!(
            svc.get_conflict(&open[0].id).await.unwrap().notes.as_deref(),
            Some("moved to vehicle 2")
        );
    }
}
