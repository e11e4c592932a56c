//! Shared test utilities for gear-db unit tests.

pub(crate) mod helpers {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::GearDb;
    use crate::documents::DocumentStore;
    use crate::repos::lesson::NewLesson;
    use crate::repos::student::NewStudent;
    use crate::service::GearService;
    use gear_core::entities::Student;
    use gear_core::enums::LessonType;

    /// Create an in-memory GearService with documents disabled.
    pub async fn test_service() -> GearService {
        let db = GearDb::open_local(":memory:").await.unwrap();
        GearService::from_db(db, DocumentStore::disabled())
    }

    /// Create an in-memory GearService writing documents to a temp dir.
    pub async fn test_service_with_documents(dir: std::path::PathBuf) -> GearService {
        let db = GearDb::open_local(":memory:").await.unwrap();
        GearService::from_db(db, DocumentStore::new(dir).unwrap())
    }

    /// Fixed reference time used by time-sensitive tests.
    pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, day, hour, 0, 0).unwrap()
    }

    pub async fn make_student(svc: &GearService, first: &str) -> Student {
        svc.create_student(NewStudent {
            first_name: first.into(),
            last_name: "Tester".into(),
            email: Some(format!("{}@example.com", first.to_lowercase())),
            phone: Some("+15550100".into()),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    /// A one-hour driving lesson starting at `start`.
    pub fn lesson_at(student_id: &str, start: DateTime<Utc>) -> NewLesson {
        NewLesson {
            student_id: student_id.into(),
            lesson_type: LessonType::Driving,
            start_time: start,
            end_time: Some(start + Duration::hours(1)),
            ..Default::default()
        }
    }
}
