use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;

/// Invoice and payment commands.
#[derive(Clone, Debug, Subcommand)]
pub enum InvoiceCommands {
    /// Create an invoice.
    Create {
        #[arg(long)]
        student: String,
        #[arg(long)]
        enrollment: Option<String>,
        /// Generated when absent.
        #[arg(long)]
        number: Option<String>,
        /// Total, e.g. 1299.00
        #[arg(long)]
        total: String,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        issued_on: Option<NaiveDate>,
        #[arg(long)]
        due_on: Option<NaiveDate>,
    },
    /// Get an invoice by ID or number.
    Get { id_or_number: String },
    /// List invoices.
    List {
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Set an invoice's status.
    Status { id: String, status: String },
    /// Record a manual payment.
    Pay {
        id: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "cash")]
        method: String,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        paid_at: Option<DateTime<Utc>>,
    },
    /// List an invoice's payments.
    Payments { id: String },
}
