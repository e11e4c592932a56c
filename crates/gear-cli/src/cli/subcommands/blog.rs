use clap::Subcommand;

/// Blog commands.
#[derive(Clone, Debug, Subcommand)]
pub enum BlogCommands {
    /// Create a post.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        publish: bool,
    },
    /// Publish a post.
    Publish { id: String },
    /// Unpublish a post.
    Unpublish { id: String },
    /// List published posts.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a published post with approved comments.
    Get { slug: String },
    /// Approve a comment.
    ApproveComment { id: String },
}

/// Testimonial commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TestimonialCommands {
    /// Add a testimonial.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quote: String,
        #[arg(long, default_value_t = 5)]
        rating: u8,
        #[arg(long, default_value_t = 0)]
        display_order: i64,
        #[arg(long)]
        draft: bool,
    },
    /// List published testimonials.
    List,
}
