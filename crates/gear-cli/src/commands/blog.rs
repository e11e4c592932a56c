use gear_db::repos::marketing::{NewBlogPost, NewTestimonial};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{BlogCommands, TestimonialCommands};
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox blog`.
pub async fn handle(
    action: &BlogCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        BlogCommands::Create {
            title,
            body,
            excerpt,
            author,
            publish,
        } => {
            let post = service
                .create_blog_post(NewBlogPost {
                    title: title.clone(),
                    excerpt: excerpt.clone(),
                    body: body.clone(),
                    author: author.clone(),
                    published: *publish,
                })
                .await?;
            output(&post, flags.format)
        }
        BlogCommands::Publish { id } => {
            output(&service.set_post_published(id, true).await?, flags.format)
        }
        BlogCommands::Unpublish { id } => {
            output(&service.set_post_published(id, false).await?, flags.format)
        }
        BlogCommands::List { limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&service.list_published_posts(limit).await?, flags.format)
        }
        BlogCommands::Get { slug } => {
            let post = service.get_published_post(slug).await?;
            let comments = service.list_approved_comments(&post.id).await?;
            output(&json!({ "post": post, "comments": comments }), flags.format)
        }
        BlogCommands::ApproveComment { id } => {
            service.approve_blog_comment(id).await?;
            output(&json!({ "approved": id }), flags.format)
        }
    }
}

/// Handle `gearbox testimonial`.
pub async fn handle_testimonial(
    action: &TestimonialCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        TestimonialCommands::Add {
            name,
            quote,
            rating,
            display_order,
            draft,
        } => {
            let testimonial = ctx
                .service
                .create_testimonial(NewTestimonial {
                    name: name.clone(),
                    quote: quote.clone(),
                    rating: *rating,
                    display_order: *display_order,
                    published: !draft,
                })
                .await?;
            output(&testimonial, flags.format)
        }
        TestimonialCommands::List => output(
            &ctx.service.list_published_testimonials().await?,
            flags.format,
        ),
    }
}
