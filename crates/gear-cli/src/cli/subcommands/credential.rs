use clap::Subcommand;

/// Certificate commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CertificateCommands {
    /// Issue certificates for enrollments.
    Issue {
        #[arg(required = true)]
        enrollments: Vec<String>,
    },
    /// Show an enrollment's certificate.
    Get { enrollment: String },
}

/// Ministry submission commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MinistryCommands {
    /// Generate and submit reports for enrollments.
    Submit {
        #[arg(required = true)]
        enrollments: Vec<String>,
    },
    /// Show an enrollment's submission.
    Get { enrollment: String },
}
