use gear_core::enums::DocumentType;
use gear_db::repos::student::NewStudent;
use gear_db::updates::student::StudentUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StudentCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox student`.
pub async fn handle(
    action: &StudentCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        StudentCommands::Create {
            first_name,
            last_name,
            email,
            phone,
            address,
            date_of_birth,
            license_number,
            preferred_location,
        } => {
            let student = service
                .create_student(NewStudent {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    email: email.clone(),
                    phone: phone.clone(),
                    address: address.clone(),
                    date_of_birth: *date_of_birth,
                    license_number: license_number.clone(),
                    preferred_location: preferred_location.clone(),
                    ..NewStudent::default()
                })
                .await?;
            output(&student, flags.format)
        }
        StudentCommands::Register { email } => {
            output(&service.register_student(email).await?, flags.format)
        }
        StudentCommands::Get { id } => {
            let student = service.get_student(id).await?;
            let enrollments = service
                .list_enrollments(Some(id), None, ctx.default_limit())
                .await?;
            let documents = service.list_student_documents(id).await?;
            output(
                &json!({
                    "student": student,
                    "enrollments": enrollments,
                    "documents": documents,
                    "paid_in_full": service.has_paid_enrollment(id).await?,
                }),
                flags.format,
            )
        }
        StudentCommands::List { search, limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            let students = match search {
                Some(query) => service.search_students(query, limit).await?,
                None => service.list_students(limit).await?,
            };
            output(&students, flags.format)
        }
        StudentCommands::Update {
            id,
            first_name,
            last_name,
            email,
            phone,
            address,
            license_number,
            license_issued_on,
        } => {
            let mut update = StudentUpdateBuilder::new();
            if let Some(value) = first_name {
                update = update.first_name(value);
            }
            if let Some(value) = last_name {
                update = update.last_name(value);
            }
            if email.is_some() {
                update = update.email(email.clone());
            }
            if phone.is_some() {
                update = update.phone(phone.clone());
            }
            if address.is_some() {
                update = update.address(address.clone());
            }
            if license_number.is_some() {
                update = update.license_number(license_number.clone());
            }
            if license_issued_on.is_some() {
                update = update.license_issued_on(*license_issued_on);
            }
            output(&service.update_student(id, update.build()).await?, flags.format)
        }
        StudentCommands::AddDocument {
            id,
            document_type,
            path,
        } => {
            let document_type = parse_enum::<DocumentType>(document_type, "document type")?;
            output(
                &service.add_student_document(id, document_type, path).await?,
                flags.format,
            )
        }
        StudentCommands::VerifyDocument { document_id } => output(
            &service.verify_student_document(document_id).await?,
            flags.format,
        ),
        StudentCommands::Documents { id } => {
            output(&service.list_student_documents(id).await?, flags.format)
        }
    }
}
