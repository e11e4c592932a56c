use chrono::{DateTime, Duration, NaiveTime, Utc};
use gear_core::enums::{Channel, CourseType, DeliveryMode, LessonType, ModuleType, PlanFrequency};
use gear_db::repos::billing::NewInvoice;
use gear_db::repos::comms::NewTemplate;
use gear_db::repos::course::{NewCourse, NewCourseSession, NewPaymentPlan};
use gear_db::repos::enrollment::NewEnrollment;
use gear_db::repos::lead::NewLead;
use gear_db::repos::lesson::NewLesson;
use gear_db::repos::marketing::{NewBlogPost, NewTestimonial};
use gear_db::repos::staff::NewStaffUser;
use gear_db::repos::student::NewStudent;
use gear_db::service::GearService;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SeedArgs;
use crate::context::AppContext;
use crate::output::output;

/// IDs of the records a seed run created.
#[derive(Debug, Serialize)]
pub struct SeedReport {
    pub staff_user: String,
    pub instructor: String,
    pub vehicle: String,
    pub course: String,
    pub session: String,
    pub student: String,
    pub enrollment: String,
    pub lesson: String,
    pub invoice: String,
    pub lead: String,
}

/// Handle `gearbox seed`.
pub async fn handle(args: &SeedArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !args.force && !ctx.service.list_students(1).await?.is_empty() {
        anyhow::bail!("database already has students; pass --force to seed anyway");
    }
    let report = seed_demo(&ctx.service, Utc::now()).await?;
    tracing::info!(student = %report.student, "demo data seeded");
    output(&report, flags.format)
}

/// Create a small, self-consistent demo school.
pub async fn seed_demo(service: &GearService, now: DateTime<Utc>) -> anyhow::Result<SeedReport> {
    let admin = service
        .create_staff_user(NewStaffUser {
            full_name: Some("Office Admin".into()),
            email: Some("office@example.com".into()),
            role: gear_core::enums::StaffRole::Admin,
            ..NewStaffUser::staff(format!("admin-{}", now.timestamp()))
        })
        .await?;
    let instructor = service
        .create_instructor("Dana Instructor", Some("dana@example.com"), Some("+15550100"))
        .await?;
    let vehicle = service
        .create_vehicle("Corolla #1", Some("GBX 101"), Some("automatic"))
        .await?;
    service
        .create_classroom("Main classroom", Some("Head office"), Some(24))
        .await?;

    let course = service
        .create_course(NewCourse {
            name: "Beginner Driver Education".into(),
            course_type: CourseType::Bde,
            description: Some("20 hours in class, 10 in car, 10 of homework.".into()),
            hours: 40,
            price_cents: 129_900,
            display_order: 1,
            active: true,
        })
        .await?;
    for (sequence, (title, module_type, hours)) in [
        ("Rules of the road", ModuleType::Theory, 20),
        ("Home assignments", ModuleType::Homework, 10),
        ("In-car sessions", ModuleType::Driving, 10),
    ]
    .into_iter()
    .enumerate()
    {
        let sequence = u32::try_from(sequence + 1)?;
        service
            .add_course_module(&course.id, title, module_type, sequence, hours)
            .await?;
    }
    let start_date = now.date_naive() + Duration::days(7);
    let session = service
        .create_course_session(NewCourseSession {
            course_id: course.id.clone(),
            delivery_mode: DeliveryMode::InClass,
            location: Some("Head office".into()),
            start_date,
            end_date: start_date + Duration::days(14),
            capacity: 24,
        })
        .await?;
    let plan = service
        .create_payment_plan(NewPaymentPlan {
            course_id: Some(course.id.clone()),
            name: "Three monthly payments".into(),
            frequency: PlanFrequency::Monthly,
            installments: 3,
            total_cents: course.price_cents,
        })
        .await?;

    let student = service
        .create_student(NewStudent {
            first_name: "Sam".into(),
            last_name: "Learner".into(),
            email: Some("sam@example.com".into()),
            phone: Some("+15550101".into()),
            ..NewStudent::default()
        })
        .await?;
    let enrollment = service
        .create_enrollment(NewEnrollment {
            student_id: student.id.clone(),
            course_id: course.id.clone(),
            session_id: Some(session.id.clone()),
            payment_plan_id: Some(plan.id.clone()),
            balance_cents: course.price_cents,
        })
        .await?;
    service
        .apply_payment_plan(&enrollment.id, &plan.id, start_date)
        .await?;

    let tomorrow_afternoon = (now.date_naive() + Duration::days(1))
        .and_time(NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default())
        .and_utc();
    let lesson = service
        .schedule_lesson(NewLesson {
            student_id: student.id.clone(),
            enrollment_id: Some(enrollment.id.clone()),
            instructor_id: Some(instructor.id.clone()),
            vehicle_id: Some(vehicle.id.clone()),
            lesson_type: LessonType::Driving,
            start_time: tomorrow_afternoon,
            ..NewLesson::default()
        })
        .await?;

    let invoice = service
        .create_invoice(NewInvoice {
            student_id: student.id.clone(),
            enrollment_id: Some(enrollment.id.clone()),
            total_cents: course.price_cents,
            issued_on: Some(now.date_naive()),
            due_on: Some(start_date),
            ..NewInvoice::default()
        })
        .await?;

    let lead = service
        .create_lead(NewLead {
            first_name: "Jo".into(),
            last_name: "Prospect".into(),
            email: Some("jo@example.com".into()),
            source: Some("Walk-in".into()),
            interest: Some("G2 test prep".into()),
            ..NewLead::default()
        })
        .await?;

    service
        .create_template(NewTemplate {
            name: "Welcome".into(),
            channel: Channel::Email,
            subject: Some("Welcome to driving school".into()),
            body: "Thanks for enrolling. See you in class!".into(),
        })
        .await?;
    service
        .create_testimonial(NewTestimonial {
            name: "Priya".into(),
            quote: "Passed my G2 on the first try.".into(),
            rating: 5,
            display_order: 1,
            published: true,
        })
        .await?;
    service
        .create_blog_post(NewBlogPost {
            title: "Five tips for your road test".into(),
            excerpt: Some("What examiners look for.".into()),
            body: "Check your mirrors, signal early, and keep a safe following distance.".into(),
            author: Some("Dana Instructor".into()),
            published: true,
        })
        .await?;

    Ok(SeedReport {
        staff_user: admin.id,
        instructor: instructor.id,
        vehicle: vehicle.id,
        course: course.id,
        session: session.id,
        student: student.id,
        enrollment: enrollment.id,
        lesson: lesson.id,
        invoice: invoice.id,
        lead: lead.id,
    })
}
