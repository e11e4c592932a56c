use chrono::NaiveDate;
use clap::Subcommand;

/// Student commands.
#[derive(Clone, Debug, Subcommand)]
pub enum StudentCommands {
    /// Create a student.
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        date_of_birth: Option<NaiveDate>,
        #[arg(long)]
        license_number: Option<String>,
        #[arg(long)]
        preferred_location: Option<String>,
    },
    /// Register a student from an email address alone.
    Register { email: String },
    /// Get a student by ID.
    Get { id: String },
    /// List or search students.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Update student fields.
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        license_number: Option<String>,
        #[arg(long)]
        license_issued_on: Option<NaiveDate>,
    },
    /// Attach an uploaded document.
    AddDocument {
        id: String,
        #[arg(long)]
        document_type: String,
        #[arg(long)]
        path: String,
    },
    /// Mark a document verified.
    VerifyDocument { document_id: String },
    /// List a student's documents.
    Documents { id: String },
}
