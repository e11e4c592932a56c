use gear_core::enums::{InvoiceStatus, PaymentMethod, PaymentStatus};
use gear_db::error::DatabaseError;
use gear_db::repos::billing::{NewInvoice, NewPayment};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::InvoiceCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_amount, parse_enum, parse_opt_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox invoice`.
pub async fn handle(
    action: &InvoiceCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        InvoiceCommands::Create {
            student,
            enrollment,
            number,
            total,
            currency,
            status,
            issued_on,
            due_on,
        } => {
            let invoice = service
                .create_invoice(NewInvoice {
                    number: number.clone(),
                    student_id: student.clone(),
                    enrollment_id: enrollment.clone(),
                    status: parse_opt_enum::<InvoiceStatus>(status.as_deref(), "status")?,
                    total_cents: parse_amount(total, "total")?,
                    currency: currency.clone(),
                    issued_on: *issued_on,
                    due_on: *due_on,
                })
                .await?;
            output(&invoice, flags.format)
        }
        InvoiceCommands::Get { id_or_number } => {
            let invoice = match service.get_invoice(id_or_number).await {
                Ok(invoice) => invoice,
                Err(DatabaseError::NoResult) => service.get_invoice_by_number(id_or_number).await?,
                Err(error) => return Err(error.into()),
            };
            let payments = service.list_payments(&invoice.id).await?;
            output(
                &json!({ "invoice": invoice, "payments": payments }),
                flags.format,
            )
        }
        InvoiceCommands::List {
            student,
            status,
            limit,
        } => {
            let status = parse_opt_enum::<InvoiceStatus>(status.as_deref(), "status")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(
                &service
                    .list_invoices(student.as_deref(), status, limit)
                    .await?,
                flags.format,
            )
        }
        InvoiceCommands::Status { id, status } => {
            let status = parse_enum::<InvoiceStatus>(status, "status")?;
            output(&service.set_invoice_status(id, status).await?, flags.format)
        }
        InvoiceCommands::Pay {
            id,
            amount,
            method,
            reference,
            paid_at,
        } => {
            let payment = service
                .record_payment(NewPayment {
                    invoice_id: id.clone(),
                    amount_cents: parse_amount(amount, "amount")?,
                    method: parse_enum::<PaymentMethod>(method, "payment method")?,
                    status: PaymentStatus::Completed,
                    reference: reference.clone(),
                    paid_at: *paid_at,
                })
                .await?;
            output(&payment, flags.format)
        }
        InvoiceCommands::Payments { id } => {
            output(&service.list_payments(id).await?, flags.format)
        }
    }
}
