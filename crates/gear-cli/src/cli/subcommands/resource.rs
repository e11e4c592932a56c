use clap::Subcommand;

/// Instructor, vehicle and classroom commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ResourceCommands {
    /// Add an instructor.
    AddInstructor {
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Add a vehicle.
    AddVehicle {
        name: String,
        #[arg(long)]
        plate: Option<String>,
        #[arg(long)]
        transmission: Option<String>,
    },
    /// Add a classroom.
    AddClassroom {
        name: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
    },
    /// List resources of one kind: instructor, vehicle, classroom.
    List {
        kind: String,
        #[arg(long)]
        all: bool,
    },
    /// Deactivate a resource.
    Deactivate { kind: String, id: String },
}
