use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Lead { action } => commands::lead::handle(&action, ctx, flags).await,
        Commands::Request { action } => commands::request::handle(&action, ctx, flags).await,
        Commands::Student { action } => commands::student::handle(&action, ctx, flags).await,
        Commands::Course { action } => commands::course::handle(&action, ctx, flags).await,
        Commands::Enrollment { action } => {
            commands::enrollment::handle(&action, ctx, flags).await
        }
        Commands::Lesson { action } => commands::lesson::handle(&action, ctx, flags).await,
        Commands::Resource { action } => commands::resource::handle(&action, ctx, flags).await,
        Commands::Invoice { action } => commands::invoice::handle(&action, ctx, flags).await,
        Commands::Certificate { action } => {
            commands::credential::handle_certificate(&action, ctx, flags).await
        }
        Commands::Ministry { action } => {
            commands::credential::handle_ministry(&action, ctx, flags).await
        }
        Commands::Comms { action } => commands::comms::handle(&action, ctx, flags).await,
        Commands::Scheduler { action } => commands::scheduler::handle(&action, ctx, flags).await,
        Commands::Notification { action } => {
            commands::notification::handle(&action, ctx, flags).await
        }
        Commands::Staff { action } => commands::staff::handle(&action, ctx, flags).await,
        Commands::Calendar { action } => commands::calendar::handle(&action, ctx, flags).await,
        Commands::Blog { action } => commands::blog::handle(&action, ctx, flags).await,
        Commands::Testimonial { action } => {
            commands::blog::handle_testimonial(&action, ctx, flags).await
        }
        Commands::Dashboard => commands::dashboard::handle(ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Serve(args) => commands::serve::handle(&args, ctx, flags).await,
        Commands::Seed(args) => commands::seed::handle(&args, ctx, flags).await,
        Commands::Init(_) | Commands::Schema(_) => {
            unreachable!("init/schema are pre-dispatched in main")
        }
    }
}
