//! End-to-end store flows: website intake through conversion, enrollment,
//! booking, billing and the audit trail.

use chrono::{Duration, TimeZone, Utc};

use gear_core::enums::{
    AuditAction, CourseType, EnrollmentStatus, EntityType, InvoiceStatus, LeadStatus,
};
use gear_core::forms::ContactForm;
use gear_db::error::DatabaseError;
use gear_db::repos::audit::AuditFilter;
use gear_db::repos::billing::{NewInvoice, StripeEvent, StripeOutcome};
use gear_db::repos::course::NewCourse;
use gear_db::repos::enrollment::NewEnrollment;
use gear_db::repos::lesson::{NewLesson, UNPAID_LESSON_CAP};
use gear_db::service::{GearService, ServiceSettings};

async fn test_service() -> GearService {
    GearService::new_local(":memory:", None, ServiceSettings::default())
        .await
        .unwrap()
}

fn hour_lesson(student_id: &str, day: u32, hour: u32) -> NewLesson {
    NewLesson {
        student_id: student_id.into(),
        start_time: Utc.with_ymd_and_hms(2026, 9, day, hour, 0, 0).unwrap(),
        ..Default::default()
    }
}

#[tokio::test]
async fn website_lead_becomes_paying_student() {
    let svc = test_service().await;

    let lead = svc
        .capture_website_lead(ContactForm {
            name: "Morgan Reyes".into(),
            email: "morgan@example.com".into(),
            phone: Some("+15550177".into()),
            subject: Some("BDE course".into()),
            message: None,
        })
        .await
        .unwrap();
    let student = svc.convert_lead(&lead.id).await.unwrap();
    assert_eq!(student.lead_id.as_deref(), Some(lead.id.as_str()));
    assert_eq!(svc.get_lead(&lead.id).await.unwrap().status, LeadStatus::Converted);

    let course = svc
        .create_course(NewCourse {
            name: "Beginner Driver Education".into(),
            course_type: CourseType::Bde,
            description: None,
            hours: 40,
            price_cents: 89_900,
            display_order: 1,
            active: true,
        })
        .await
        .unwrap();
    let enrollment = svc
        .create_enrollment(NewEnrollment {
            student_id: student.id.clone(),
            course_id: course.id.clone(),
            balance_cents: course.price_cents,
            ..Default::default()
        })
        .await
        .unwrap();

    // Unpaid students hit the cap.
    for hour in 0..UNPAID_LESSON_CAP {
        let hour = u32::try_from(hour).unwrap();
        svc.schedule_lesson(hour_lesson(&student.id, 1, 8 + hour))
            .await
            .unwrap();
    }
    let capped = svc.schedule_lesson(hour_lesson(&student.id, 2, 8)).await;
    assert!(matches!(capped, Err(DatabaseError::Policy(_))));

    // Paying the invoice through Stripe does not flip the enrollment by itself.
    let invoice = svc
        .create_invoice(NewInvoice {
            student_id: student.id.clone(),
            enrollment_id: Some(enrollment.id.clone()),
            total_cents: course.price_cents,
            status: Some(InvoiceStatus::Issued),
            ..Default::default()
        })
        .await
        .unwrap();
    let event: StripeEvent = serde_json::from_value(serde_json::json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_42", "metadata": { "invoice_id": invoice.id } } }
    }))
    .unwrap();
    assert!(matches!(
        svc.apply_stripe_event(&event).await.unwrap(),
        StripeOutcome::InvoicePaid { payment_recorded: true, .. }
    ));
    assert!(!svc.has_paid_enrollment(&student.id).await.unwrap());

    svc.set_enrollment_status(&enrollment.id, EnrollmentStatus::Paid)
        .await
        .unwrap();
    svc.schedule_lesson(hour_lesson(&student.id, 2, 8))
        .await
        .unwrap();

    let summary = svc.dashboard(Utc::now()).await.unwrap();
    assert_eq!(summary.kpis.total_students, 1);
    assert_eq!(summary.recent_payments.len(), 1);
}

#[tokio::test]
async fn mutations_are_audited() {
    let svc = test_service().await;
    let lead = svc
        .capture_website_lead(ContactForm {
            name: "Sam".into(),
            email: "sam@example.com".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    svc.set_lead_status(&lead.id, LeadStatus::Contacted)
        .await
        .unwrap();

    let entries = svc
        .query_audit(&AuditFilter {
            entity_type: Some(EntityType::Lead),
            entity_id: Some(lead.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
    assert!(actions.contains(&AuditAction::Created));
    assert!(actions.contains(&AuditAction::StatusChanged));
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("gearbox.db");
    let path = path.to_str().unwrap();

    let svc = GearService::new_local(path, Some(tmp.path().join("docs")), ServiceSettings::default())
        .await
        .unwrap();
    let lead = svc
        .capture_website_lead(ContactForm {
            name: "Kai".into(),
            email: "kai@example.com".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    drop(svc);

    let reopened = GearService::new_local(path, None, ServiceSettings::default())
        .await
        .unwrap();
    let again = reopened.get_lead(&lead.id).await.unwrap();
    assert_eq!(again.email.as_deref(), Some("kai@example.com"));
    assert!(again.created_at <= Utc::now() + Duration::seconds(1));
}
