//! Completion certificates and ministry submissions, rendered into the
//! document store.

use chrono::{DateTime, Utc};

use gear_core::audit_detail::DocumentGeneratedDetail;
use gear_core::entities::{Certificate, Enrollment, MinistrySubmission};
use gear_core::enums::{AuditAction, CertificateStatus, EntityType, SubmissionStatus};
use gear_core::ids::{PREFIX_CERTIFICATE, PREFIX_MINISTRY_SUBMISSION};
use gear_core::render::{csv, pdf};

use crate::documents::{CERTIFICATES_DIR, MINISTRY_DIR};
use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, parse_datetime, parse_enum, parse_optional_datetime, ts,
};
use crate::service::GearService;

const CERTIFICATE_COLS: &str = "id, enrollment_id, number, status, file_path, issued_at, created_at";

const SUBMISSION_COLS: &str =
    "id, enrollment_id, status, file_path, submitted_at, external_reference, created_at";

fn row_to_certificate(row: &libsql::Row) -> Result<Certificate, DatabaseError> {
    Ok(Certificate {
        id: row.get(0)?,
        enrollment_id: row.get(1)?,
        number: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        file_path: get_opt_string(row, 4)?,
        issued_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn row_to_submission(row: &libsql::Row) -> Result<MinistrySubmission, DatabaseError> {
    Ok(MinistrySubmission {
        id: row.get(0)?,
        enrollment_id: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        file_path: get_opt_string(row, 3)?,
        submitted_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        external_reference: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

/// Certificate number for an enrollment issued at `at`.
fn certificate_number(enrollment_id: &str, at: DateTime<Utc>) -> String {
    format!("CERT-{enrollment_id}-{}", at.format("%Y%m%d%H%M%S"))
}

impl GearService {
    /// Student display name and course name printed on documents.
    async fn document_names(&self, enrollment: &Enrollment) -> Result<(String, String), DatabaseError> {
        let student = self.get_student(&enrollment.student_id).await?;
        let course = match self.get_course(&enrollment.course_id).await {
            Ok(course) => course.name,
            Err(DatabaseError::NoResult) => String::new(),
            Err(e) => return Err(e),
        };
        Ok((student.full_name(), course))
    }

    pub async fn get_certificate(&self, enrollment_id: &str) -> Result<Certificate, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {CERTIFICATE_COLS} FROM certificates WHERE enrollment_id = ?1"),
                [enrollment_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_certificate(&row)
    }

    async fn get_or_create_certificate(
        &self,
        enrollment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Certificate, DatabaseError> {
        match self.get_certificate(enrollment_id).await {
            Err(DatabaseError::NoResult) => {}
            other => return other,
        }
        let id = self.db().generate_id(PREFIX_CERTIFICATE).await?;
        let number = certificate_number(enrollment_id, now);
        self.db()
            .conn()
            .execute(
                "INSERT INTO certificates (id, enrollment_id, number, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    id.as_str(),
                    enrollment_id,
                    number.as_str(),
                    CertificateStatus::Pending.as_str(),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::Certificate, &id, AuditAction::Created, None, now)
            .await?;
        Ok(Certificate {
            id,
            enrollment_id: enrollment_id.to_string(),
            number,
            status: CertificateStatus::Pending,
            file_path: None,
            issued_at: None,
            created_at: now,
        })
    }

    /// Render and store completion certificates. Returns how many were issued.
    ///
    /// Certificates already issued with a file on disk are skipped, as are
    /// unknown enrollment ids.
    pub async fn issue_certificates(&self, enrollment_ids: &[String]) -> Result<u32, DatabaseError> {
        let mut issued = 0;
        for enrollment_id in enrollment_ids {
            let enrollment = match self.get_enrollment(enrollment_id).await {
                Ok(enrollment) => enrollment,
                Err(DatabaseError::NoResult) => {
                    tracing::warn!(enrollment = %enrollment_id, "unknown enrollment, no certificate");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let now = Utc::now();
            let certificate = self.get_or_create_certificate(&enrollment.id, now).await?;
            if certificate.status == CertificateStatus::Issued
                && certificate
                    .file_path
                    .as_deref()
                    .is_some_and(|path| self.documents().exists(path))
            {
                continue;
            }

            let (student_name, course_name) = self.document_names(&enrollment).await?;
            let bytes = pdf::render_certificate(&student_name, &course_name, &enrollment.id, now);
            let file_path = self.documents().save(
                CERTIFICATES_DIR,
                &format!("certificate-{}.pdf", enrollment.id),
                &bytes,
            )?;
            self.db()
                .conn()
                .execute(
                    "UPDATE certificates SET status = ?1, file_path = ?2, issued_at = ?3 WHERE id = ?4",
                    libsql::params![
                        CertificateStatus::Issued.as_str(),
                        file_path.as_str(),
                        ts(now),
                        certificate.id.as_str()
                    ],
                )
                .await?;
            self.audit(
                EntityType::Certificate,
                &certificate.id,
                AuditAction::Generated,
                Some(serde_json::to_value(DocumentGeneratedDetail {
                    file_path,
                    bytes: bytes.len() as u64,
                })?),
                now,
            )
            .await?;
            issued += 1;
        }
        tracing::info!(issued, requested = enrollment_ids.len(), "certificates issued");
        Ok(issued)
    }

    pub async fn get_ministry_submission(
        &self,
        enrollment_id: &str,
    ) -> Result<MinistrySubmission, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SUBMISSION_COLS} FROM ministry_submissions WHERE enrollment_id = ?1"
                ),
                [enrollment_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_submission(&row)
    }

    async fn get_or_create_submission(
        &self,
        enrollment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<MinistrySubmission, DatabaseError> {
        match self.get_ministry_submission(enrollment_id).await {
            Err(DatabaseError::NoResult) => {}
            other => return other,
        }
        let id = self.db().generate_id(PREFIX_MINISTRY_SUBMISSION).await?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO ministry_submissions (id, enrollment_id, status, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    id.as_str(),
                    enrollment_id,
                    SubmissionStatus::Pending.as_str(),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::MinistrySubmission, &id, AuditAction::Created, None, now)
            .await?;
        Ok(MinistrySubmission {
            id,
            enrollment_id: enrollment_id.to_string(),
            status: SubmissionStatus::Pending,
            file_path: None,
            submitted_at: None,
            external_reference: None,
            created_at: now,
        })
    }

    /// Write the ministry report for each enrollment and mark it submitted.
    ///
    /// Resubmitting rewrites the report and keeps the first external reference.
    pub async fn submit_ministry(&self, enrollment_ids: &[String]) -> Result<u32, DatabaseError> {
        let mut submitted = 0;
        for enrollment_id in enrollment_ids {
            let enrollment = match self.get_enrollment(enrollment_id).await {
                Ok(enrollment) => enrollment,
                Err(DatabaseError::NoResult) => {
                    tracing::warn!(enrollment = %enrollment_id, "unknown enrollment, not submitted");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let now = Utc::now();
            let submission = self.get_or_create_submission(&enrollment.id, now).await?;
            let (student_name, course_name) = self.document_names(&enrollment).await?;
            let report =
                csv::render_ministry_submission(&enrollment.id, &student_name, &course_name, now);
            let file_path = self.documents().save(
                MINISTRY_DIR,
                &format!("ministry-submission-{}.csv", enrollment.id),
                report.as_bytes(),
            )?;
            let reference = submission
                .external_reference
                .unwrap_or_else(|| format!("SUB-{}", enrollment.id));
            self.db()
                .conn()
                .execute(
                    "UPDATE ministry_submissions
                     SET status = ?1, file_path = ?2, submitted_at = ?3, external_reference = ?4
                     WHERE id = ?5",
                    libsql::params![
                        SubmissionStatus::Submitted.as_str(),
                        file_path.as_str(),
                        ts(now),
                        reference.as_str(),
                        submission.id.as_str()
                    ],
                )
                .await?;
            self.audit(
                EntityType::MinistrySubmission,
                &submission.id,
                AuditAction::Generated,
                Some(serde_json::to_value(DocumentGeneratedDetail {
                    file_path,
                    bytes: report.len() as u64,
                })?),
                now,
            )
            .await?;
            submitted += 1;
        }
        tracing::info!(submitted, requested = enrollment_ids.len(), "ministry submissions written");
        Ok(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::course::NewCourse;
    use crate::repos::enrollment::NewEnrollment;
    use crate::test_support::helpers::{make_student, test_service, test_service_with_documents};
    use gear_core::enums::CourseType;
    use pretty_assertions::assert_eq;

    async fn enrollment(svc: &GearService) -> Enrollment {
        let student = make_student(svc, "Priya").await;
        let course = svc
            .create_course(NewCourse {
                name: "BDE, Full".into(),
                course_type: CourseType::Bde,
                description: None,
                hours: 40,
                price_cents: 89_900,
                display_order: 0,
                active: true,
            })
            .await
            .unwrap();
        svc.create_enrollment(NewEnrollment {
            student_id: student.id,
            course_id: course.id,
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn issues_pdf_once() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = test_service_with_documents(tmp.path().to_path_buf()).await;
        let enr = enrollment(&svc).await;
        let ids = vec![enr.id.clone(), "enr-missing".to_string()];

        assert_eq!(svc.issue_certificates(&ids).await.unwrap(), 1);
        let cert = svc.get_certificate(&enr.id).await.unwrap();
        assert_eq!(cert.status, CertificateStatus::Issued);
        assert!(cert.number.starts_with(&format!("CERT-{}-", enr.id)));
        let path = cert.file_path.clone().unwrap();
        assert_eq!(path, format!("certificates/certificate-{}.pdf", enr.id));
        let bytes = std::fs::read(svc.documents().resolve(&path)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(String::from_utf8_lossy(&bytes).contains("Student: Priya Tester"));

        assert_eq!(svc.issue_certificates(&ids).await.unwrap(), 0);
        assert_eq!(svc.get_certificate(&enr.id).await.unwrap().number, cert.number);
    }

    #[tokio::test]
    async fn missing_file_is_reissued() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = test_service_with_documents(tmp.path().to_path_buf()).await;
        let enr = enrollment(&svc).await;
        let ids = vec![enr.id.clone()];
        svc.issue_certificates(&ids).await.unwrap();
        let path = svc.get_certificate(&enr.id).await.unwrap().file_path.unwrap();
        std::fs::remove_file(svc.documents().resolve(&path)).unwrap();

        assert_eq!(svc.issue_certificates(&ids).await.unwrap(), 1);
        assert!(svc.documents().exists(&path));
    }

    #[tokio::test]
    async fn ministry_report_is_csv_with_reference() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = test_service_with_documents(tmp.path().to_path_buf()).await;
        let enr = enrollment(&svc).await;
        let ids = vec![enr.id.clone()];

        assert_eq!(svc.submit_ministry(&ids).await.unwrap(), 1);
        let submission = svc.get_ministry_submission(&enr.id).await.unwrap();
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert_eq!(submission.external_reference, Some(format!("SUB-{}", enr.id)));
        let path = submission.file_path.unwrap();
        let report = std::fs::read_to_string(svc.documents().resolve(&path)).unwrap();
        let mut lines = report.lines();
        assert_eq!(lines.next(), Some("enrollment_id,student,course,submitted_at"));
        assert!(
            lines
                .next()
                .unwrap()
                .starts_with(&format!("{},Priya Tester,\"BDE, Full\",", enr.id))
        );

        // Resubmission keeps the row and reference.
        assert_eq!(svc.submit_ministry(&ids).await.unwrap(), 1);
        assert_eq!(
            svc.get_ministry_submission(&enr.id).await.unwrap().external_reference,
            Some(format!("SUB-{}", enr.id))
        );
    }

    #[tokio::test]
    async fn disabled_store_fails_the_batch() {
        let svc = test_service().await;
        let enr = enrollment(&svc).await;
        let err = svc.issue_certificates(&[enr.id]).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }
}
