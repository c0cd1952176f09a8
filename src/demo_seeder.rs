use crate::api::posts::{process_create_post, PostPayload};
use crate::db::post_repository::PostRepository;
use crate::error::AppError;

struct SamplePost {
    title: &'static str,
    body: &'static str,
    tags: &'static [&'static str],
    featured_image: &'static str,
}

const SAMPLE_POSTS: &[SamplePost] = &[
    SamplePost {
        title: "Welcome to RawSpill",
        body: "This is the first post on the blog. Expect thoughts and ideas about technology, design, and everything in between.\n\nThe site is served by a small Rust backend with MongoDB behind it.",
        tags: &["welcome", "introduction", "tech"],
        featured_image: "https://images.unsplash.com/photo-1499750310107-5fef28a66643?w=800",
    },
    SamplePost {
        title: "Building Modern Web Applications",
        body: "Web development has changed a lot over the years. Server rendering, static generation and small JSON APIs make fast, search-friendly sites easy to build.\n\nKey ingredients:\n• Server-side rendering\n• Static site generation\n• API routes\n• Optimized performance",
        tags: &["web development", "backend"],
        featured_image: "https://images.unsplash.com/photo-1498050108023-c5249f4df085?w=800",
    },
    SamplePost {
        title: "The Power of Minimalist Design",
        body: "Less is more. A minimalist approach focuses on what truly matters: content and the reader.\n\nBenefits of minimalist design:\n• Faster load times\n• Better focus on content\n• Easier navigation\n• Improved accessibility",
        tags: &["design", "minimalism", "ux"],
        featured_image: "https://images.unsplash.com/photo-1507238691740-187a5b1d37b8?w=800",
    },
];

/// Create the sample posts if the blog has no posts yet.
///
/// Returns the number of posts created. Posts go through the regular create
/// path, so slugs and excerpts are derived the same way as for admin writes.
pub async fn seed_demo_posts(
    repo: &dyn PostRepository,
    default_author: &str,
) -> Result<usize, AppError> {
    tracing::info!("Starting demo data seeding...");

    if !repo.list_all().await?.is_empty() {
        tracing::info!("Posts already exist, skipping demo seeding.");
        return Ok(0);
    }

    let mut created = 0;
    for sample in SAMPLE_POSTS {
        let request = PostPayload {
            title: Some(sample.title.to_string()),
            body: Some(sample.body.to_string()),
            tags: Some(sample.tags.iter().map(|t| t.to_string()).collect()),
            featured_image: Some(sample.featured_image.to_string()),
            published: Some(true),
            ..Default::default()
        };

        match process_create_post(repo, request, default_author).await {
            Ok(post) => {
                tracing::info!("Seeded post '{}'.", post.slug);
                created += 1;
            }
            Err(e) => tracing::error!("Failed to seed post '{}': {}", sample.title, e),
        }
    }

    tracing::info!("Demo data seeding completed.");
    Ok(created)
}
