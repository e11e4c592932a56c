//! Invoices, payments and Stripe webhook events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use gear_core::audit_detail::StatusChangedDetail;
use gear_core::entities::{Invoice, Payment};
use gear_core::enums::{AuditAction, EntityType, InvoiceStatus, PaymentMethod, PaymentStatus};
use gear_core::ids::{PREFIX_INVOICE, PREFIX_PAYMENT};

use crate::error::{DatabaseError, map_unique};
use crate::helpers::{
    collect_rows, date_param, datetime_param, get_opt_string, parse_datetime, parse_enum,
    parse_optional_date, parse_optional_datetime, ts,
};
use crate::service::GearService;

const INVOICE_COLS: &str = "id, number, student_id, enrollment_id, status, total_cents, currency, \
     issued_on, due_on, stripe_payment_intent, stripe_checkout_session, created_at, updated_at";

pub(crate) const PAYMENT_COLS: &str =
    "id, invoice_id, amount_cents, method, status, reference, paid_at, created_at";

#[derive(Debug, Clone, Default)]
pub struct NewInvoice {
    /// Generated as `INV-{YYYYmmdd}-{hex}` when absent.
    pub number: Option<String>,
    pub student_id: String,
    pub enrollment_id: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub total_cents: i64,
    /// Falls back to the configured currency.
    pub currency: Option<String>,
    pub issued_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// The parts of a Stripe event the back office reads.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    fn object_str(&self, key: &str) -> Option<&str> {
        self.data
            .object
            .get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
    }

    fn invoice_id(&self) -> Option<&str> {
        self.data
            .object
            .get("metadata")
            .and_then(|m| m.get("invoice_id"))
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// What applying a Stripe event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeOutcome {
    /// The invoice is now paid. `payment_recorded` is false when a payment
    /// for the same intent already existed.
    InvoicePaid {
        invoice_id: String,
        payment_recorded: bool,
    },
    Ignored(String),
}

fn row_to_invoice(row: &libsql::Row) -> Result<Invoice, DatabaseError> {
    Ok(Invoice {
        id: row.get(0)?,
        number: row.get(1)?,
        student_id: row.get(2)?,
        enrollment_id: get_opt_string(row, 3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        total_cents: row.get(5)?,
        currency: row.get(6)?,
        issued_on: parse_optional_date(get_opt_string(row, 7)?.as_deref())?,
        due_on: parse_optional_date(get_opt_string(row, 8)?.as_deref())?,
        stripe_payment_intent: get_opt_string(row, 9)?,
        stripe_checkout_session: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

pub(crate) fn row_to_payment(row: &libsql::Row) -> Result<Payment, DatabaseError> {
    Ok(Payment {
        id: row.get(0)?,
        invoice_id: row.get(1)?,
        amount_cents: row.get(2)?,
        method: parse_enum(&row.get::<String>(3)?)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        reference: get_opt_string(row, 5)?,
        paid_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl GearService {
    pub async fn create_invoice(&self, new: NewInvoice) -> Result<Invoice, DatabaseError> {
        if new.total_cents < 0 {
            return Err(DatabaseError::Validation(
                "invoice total must not be negative".into(),
            ));
        }
        let now = Utc::now();
        let number = match new.number.filter(|n| !n.trim().is_empty()) {
            Some(number) => number.trim().to_string(),
            None => format!(
                "INV-{}-{}",
                now.format("%Y%m%d"),
                self.db().random_hex(3).await?
            ),
        };
        let currency = new
            .currency
            .unwrap_or_else(|| self.settings().currency.clone())
            .to_lowercase();
        let status = new.status.unwrap_or(InvoiceStatus::Draft);
        let id = self.db().generate_id(PREFIX_INVOICE).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO invoices ({INVOICE_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, NULL, ?10, ?11)"
                ),
                libsql::params![
                    id.as_str(),
                    number.as_str(),
                    new.student_id.as_str(),
                    new.enrollment_id.as_deref(),
                    status.as_str(),
                    new.total_cents,
                    currency.as_str(),
                    date_param(new.issued_on),
                    date_param(new.due_on),
                    ts(now),
                    ts(now)
                ],
            )
            .await
            .map_err(|e| map_unique(e, "number", &number))?;

        self.audit(EntityType::Invoice, &id, AuditAction::Created, None, now)
            .await?;
        tracing::debug!(invoice = %id, %number, "invoice created");

        Ok(Invoice {
            id,
            number,
            student_id: new.student_id,
            enrollment_id: new.enrollment_id,
            status,
            total_cents: new.total_cents,
            currency,
            issued_on: new.issued_on,
            due_on: new.due_on,
            stripe_payment_intent: None,
            stripe_checkout_session: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Invoice, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {INVOICE_COLS} FROM invoices WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_invoice(&row)
    }

    pub async fn get_invoice_by_number(&self, number: &str) -> Result<Invoice, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {INVOICE_COLS} FROM invoices WHERE number = ?1"),
                [number],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_invoice(&row)
    }

    /// Newest first, optionally narrowed to one student and/or status.
    pub async fn list_invoices(
        &self,
        student_id: Option<&str>,
        status: Option<InvoiceStatus>,
        limit: u32,
    ) -> Result<Vec<Invoice>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        if let Some(student_id) = student_id {
            params.push(student_id.into());
            conditions.push(format!("student_id = ?{}", params.len()));
        }
        if let Some(status) = status {
            params.push(status.as_str().into());
            conditions.push(format!("status = ?{}", params.len()));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {INVOICE_COLS} FROM invoices {where_clause}
                     ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        collect_rows(rows, row_to_invoice).await
    }

    /// Move an invoice along its lifecycle.
    pub async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<Invoice, DatabaseError> {
        let current = self.get_invoice(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(DatabaseError::InvalidState(format!(
                "invoice {id} cannot move from {} to {}",
                current.status, status
            )));
        }
        let now = Utc::now();
        self.write_invoice_status(id, status, now).await?;
        self.audit(
            EntityType::Invoice,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(StatusChangedDetail {
                from: current.status.as_str().into(),
                to: status.as_str().into(),
                reason: None,
            })?),
            now,
        )
        .await?;
        self.get_invoice(id).await
    }

    async fn write_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE invoices SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), ts(now), id],
            )
            .await?;
        Ok(())
    }

    pub async fn record_payment(&self, new: NewPayment) -> Result<Payment, DatabaseError> {
        if new.amount_cents <= 0 {
            return Err(DatabaseError::Validation(
                "payment amount must be positive".into(),
            ));
        }
        // Surfaces NoResult for an unknown invoice before the FK does.
        self.get_invoice(&new.invoice_id).await?;
        self.insert_payment(new).await
    }

    /// Insert without the amount check; Stripe records zero-total invoices too.
    async fn insert_payment(&self, new: NewPayment) -> Result<Payment, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_PAYMENT).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO payments ({PAYMENT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    new.invoice_id.as_str(),
                    new.amount_cents,
                    new.method.as_str(),
                    new.status.as_str(),
                    new.reference.as_deref(),
                    datetime_param(new.paid_at),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::Payment, &id, AuditAction::Created, None, now)
            .await?;
        tracing::info!(payment = %id, invoice = %new.invoice_id, amount = new.amount_cents, "payment recorded");

        Ok(Payment {
            id,
            invoice_id: new.invoice_id,
            amount_cents: new.amount_cents,
            method: new.method,
            status: new.status,
            reference: new.reference,
            paid_at: new.paid_at,
            created_at: now,
        })
    }

    pub async fn list_payments(&self, invoice_id: &str) -> Result<Vec<Payment>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {PAYMENT_COLS} FROM payments WHERE invoice_id = ?1
                     ORDER BY created_at, rowid"
                ),
                [invoice_id],
            )
            .await?;
        collect_rows(rows, row_to_payment).await
    }

    async fn payment_exists_for_reference(&self, reference: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT 1 FROM payments WHERE reference = ?1 LIMIT 1", [reference])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Apply a verified Stripe webhook event.
    ///
    /// Only `checkout.session.completed` and `payment_intent.succeeded` act;
    /// every other event, and events naming no known invoice, are ignored.
    /// Redelivered events never create a second payment for the same intent.
    pub async fn apply_stripe_event(
        &self,
        event: &StripeEvent,
    ) -> Result<StripeOutcome, DatabaseError> {
        let (intent, session) = match event.event_type.as_str() {
            "checkout.session.completed" => {
                (event.object_str("payment_intent"), event.object_str("id"))
            }
            "payment_intent.succeeded" => (event.object_str("id"), None),
            other => {
                tracing::debug!(event_type = other, "stripe event ignored");
                return Ok(StripeOutcome::Ignored(format!("unhandled event type {other}")));
            }
        };
        let Some(invoice_id) = event.invoice_id() else {
            return Ok(StripeOutcome::Ignored("no invoice_id in metadata".into()));
        };
        let invoice = match self.get_invoice(invoice_id).await {
            Ok(invoice) => invoice,
            Err(DatabaseError::NoResult) => {
                tracing::warn!(invoice = invoice_id, "stripe event for unknown invoice");
                return Ok(StripeOutcome::Ignored(format!("unknown invoice {invoice_id}")));
            }
            Err(e) => return Err(e),
        };

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE invoices SET status = ?1,
                     stripe_payment_intent = COALESCE(?2, stripe_payment_intent),
                     stripe_checkout_session = COALESCE(?3, stripe_checkout_session),
                     updated_at = ?4
                 WHERE id = ?5",
                libsql::params![InvoiceStatus::Paid.as_str(), intent, session, ts(now), invoice.id.as_str()],
            )
            .await?;
        if invoice.status != InvoiceStatus::Paid {
            self.audit(
                EntityType::Invoice,
                &invoice.id,
                AuditAction::StatusChanged,
                Some(serde_json::to_value(StatusChangedDetail {
                    from: invoice.status.as_str().into(),
                    to: InvoiceStatus::Paid.as_str().into(),
                    reason: Some(event.event_type.clone()),
                })?),
                now,
            )
            .await?;
        }

        let mut payment_recorded = false;
        if let Some(intent) = intent
            && !self.payment_exists_for_reference(intent).await?
        {
            self.insert_payment(NewPayment {
                invoice_id: invoice.id.clone(),
                amount_cents: invoice.total_cents,
                method: PaymentMethod::Stripe,
                status: PaymentStatus::Completed,
                reference: Some(intent.to_string()),
                paid_at: Some(now),
            })
            .await?;
            payment_recorded = true;
        }

        tracing::info!(invoice = %invoice.id, payment_recorded, "invoice paid via stripe");
        Ok(StripeOutcome::InvoicePaid {
            invoice_id: invoice.id,
            payment_recorded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{make_student, test_service};
    use pretty_assertions::assert_eq;

    async fn invoice_for(svc: &GearService, total_cents: i64) -> Invoice {
        let student = make_student(svc, "Ana").await;
        svc.create_invoice(NewInvoice {
            student_id: student.id,
            total_cents,
            status: Some(InvoiceStatus::Issued),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        serde_json::from_value(serde_json::json!({
            "type": event_type,
            "data": { "object": object }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn generated_number_and_default_currency() {
        let svc = test_service().await;
        let invoice = invoice_for(&svc, 129_900).await;
        let today = Utc::now().format("%Y%m%d").to_string();
        assert!(invoice.number.starts_with(&format!("INV-{today}-")));
        assert_eq!(invoice.number.len(), "INV-YYYYmmdd-".len() + 6);
        assert_eq!(invoice.currency, "cad");

        let by_number = svc.get_invoice_by_number(&invoice.number).await.unwrap();
        assert_eq!(by_number.id, invoice.id);
    }

    #[tokio::test]
    async fn duplicate_number_is_rejected() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        let new = NewInvoice {
            number: Some("INV-1".into()),
            student_id: student.id,
            ..Default::default()
        };
        svc.create_invoice(new.clone()).await.unwrap();
        let err = svc.create_invoice(new).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate { ref field, .. } if field == "number"));
    }

    #[tokio::test]
    async fn status_transitions_are_checked() {
        let svc = test_service().await;
        let invoice = invoice_for(&svc, 5_000).await;
        let paid = svc
            .set_invoice_status(&invoice.id, InvoiceStatus::Paid)
            .await
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        let err = svc
            .set_invoice_status(&invoice.id, InvoiceStatus::Draft)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn checkout_completed_marks_paid_once() {
        let svc = test_service().await;
        let invoice = invoice_for(&svc, 42_000).await;
        let completed = event(
            "checkout.session.completed",
            serde_json::json!({
                "id": "cs_test_1",
                "payment_intent": "pi_1",
                "metadata": { "invoice_id": invoice.id },
            }),
        );

        let outcome = svc.apply_stripe_event(&completed).await.unwrap();
        assert_eq!(
            outcome,
            StripeOutcome::InvoicePaid {
                invoice_id: invoice.id.clone(),
                payment_recorded: true
            }
        );
        let stored = svc.get_invoice(&invoice.id).await.unwrap();
        assert_eq!(stored.status, InvoiceStatus::Paid);
        assert_eq!(stored.stripe_payment_intent.as_deref(), Some("pi_1"));
        assert_eq!(stored.stripe_checkout_session.as_deref(), Some("cs_test_1"));

        // Stripe follows up with the intent event for the same payment.
        let succeeded = event(
            "payment_intent.succeeded",
            serde_json::json!({ "id": "pi_1", "metadata": { "invoice_id": invoice.id } }),
        );
        let again = svc.apply_stripe_event(&succeeded).await.unwrap();
        assert!(matches!(again, StripeOutcome::InvoicePaid { payment_recorded: false, .. }));

        let payments = svc.list_payments(&invoice.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount_cents, 42_000);
        assert_eq!(payments[0].method, PaymentMethod::Stripe);
        assert_eq!(payments[0].status, PaymentStatus::Completed);
        assert_eq!(
            svc.get_invoice(&invoice.id).await.unwrap().stripe_checkout_session.as_deref(),
            Some("cs_test_1")
        );
    }

    #[tokio::test]
    async fn zero_total_invoice_still_gets_stripe_payment() {
        let svc = test_service().await;
        let invoice = invoice_for(&svc, 0).await;
        let succeeded = event(
            "payment_intent.succeeded",
            serde_json::json!({ "id": "pi_free", "metadata": { "invoice_id": invoice.id } }),
        );

        let outcome = svc.apply_stripe_event(&succeeded).await.unwrap();
        assert!(matches!(outcome, StripeOutcome::InvoicePaid { payment_recorded: true, .. }));
        let payments = svc.list_payments(&invoice.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount_cents, 0);
        assert_eq!(payments[0].reference.as_deref(), Some("pi_free"));
    }

    #[tokio::test]
    async fn unrelated_or_unknown_events_are_ignored() {
        let svc = test_service().await;
        let refund = event("charge.refunded", serde_json::json!({ "id": "ch_1" }));
        assert!(matches!(
            svc.apply_stripe_event(&refund).await.unwrap(),
            StripeOutcome::Ignored(_)
        ));

        let unknown = event(
            "payment_intent.succeeded",
            serde_json::json!({ "id": "pi_9", "metadata": { "invoice_id": "inv-missing" } }),
        );
        assert!(matches!(
            svc.apply_stripe_event(&unknown).await.unwrap(),
            StripeOutcome::Ignored(_)
        ));

        let no_metadata = event("payment_intent.succeeded", serde_json::json!({ "id": "pi_9" }));
        assert!(matches!(
            svc.apply_stripe_event(&no_metadata).await.unwrap(),
            StripeOutcome::Ignored(_)
        ));
    }

    #[tokio::test]
    async fn manual_payment_requires_positive_amount() {
        let svc = test_service().await;
        let invoice = invoice_for(&svc, 10_000).await;
        let err = svc
            .record_payment(NewPayment {
                invoice_id: invoice.id.clone(),
                amount_cents: 0,
                method: PaymentMethod::Cash,
                status: PaymentStatus::Completed,
                reference: None,
                paid_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));

        svc.record_payment(NewPayment {
            invoice_id: invoice.id.clone(),
            amount_cents: 2_500,
            method: PaymentMethod::Cash,
            status: PaymentStatus::Completed,
            reference: Some("receipt 12".into()),
            paid_at: Some(Utc::now()),
        })
        .await
        .unwrap();
        assert_eq!(svc.list_payments(&invoice.id).await.unwrap().len(), 1);
        assert_eq!(
            svc.list_invoices(None, Some(InvoiceStatus::Issued), 10).await.unwrap().len(),
            1
        );
    }
}
