use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use postboard_client::{FeedKind, ImageUpload, Page, Post, PostboardClient};

#[derive(Parser, Debug)]
#[command(name = "postboard", about = "Command line client for a postboard server")]
struct Cli {
    #[clap(short, long, env = "POSTBOARD_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    #[clap(long, env = "POSTBOARD_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    Register {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Login {
        /// Username or email.
        #[clap(long)]
        username: String,
        #[clap(long)]
        password: String,
    },
    /// Global feed.
    Index {
        #[clap(long)]
        page: Option<String>,
    },
    Group {
        slug: String,
        #[clap(long)]
        page: Option<String>,
    },
    Profile {
        username: String,
        #[clap(long)]
        page: Option<String>,
    },
    /// Posts by the authors you follow.
    Following {
        #[clap(long)]
        page: Option<String>,
    },
    GetPost {
        id: i64,
    },
    CreatePost {
        #[clap(long)]
        text: String,
        #[clap(long)]
        group: Option<i64>,
        #[clap(long)]
        image: Option<PathBuf>,
    },
    EditPost {
        id: i64,
        #[clap(long)]
        text: String,
        #[clap(long)]
        group: Option<i64>,
        #[clap(long)]
        image: Option<PathBuf>,
    },
    Comment {
        post_id: i64,
        #[clap(long)]
        text: String,
    },
    Follow {
        username: String,
    },
    Unfollow {
        username: String,
    },
}

fn read_image(path: Option<PathBuf>) -> anyhow::Result<Option<ImageUpload>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Some(ImageUpload::from_bytes(filename, &bytes)))
}

fn print_page(page: &Page<Post>) {
    println!(
        "Page {}/{} ({} posts)",
        page.number, page.total_pages, page.total_items
    );
    for post in &page.items {
        println!("- {post}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut client = PostboardClient::connect(&args.server)?;
    if let Some(path) = args.token_file {
        client = client.with_token_file(path);
    }

    match args.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            client.register(&username, &email, &password).await?;
            println!("Successfully registered!");
        }
        Command::Login { username, password } => {
            client.login(&username, &password).await?;
            println!("Successfully logged in!");
        }
        Command::Index { page } => {
            print_page(&client.feed(&FeedKind::Global, page.as_deref()).await?);
        }
        Command::Group { slug, page } => {
            print_page(&client.feed(&FeedKind::Group(slug), page.as_deref()).await?);
        }
        Command::Profile { username, page } => {
            let profile = client.profile(&username, page.as_deref()).await?;
            let marker = if profile.following { " (following)" } else { "" };
            println!(
                "{}{}: {} posts",
                profile.author.username, marker, profile.posts_count
            );
            print_page(&profile.page);
        }
        Command::Following { page } => {
            print_page(&client.feed(&FeedKind::Following, page.as_deref()).await?);
        }
        Command::GetPost { id } => {
            let detail = client.get_post(id).await?;
            println!("{} by {}", detail.post, detail.author.username);
            if let Some(group) = &detail.group {
                println!("group: {} ({})", group.title, group.slug);
            }
            if let Some(image) = &detail.post.image {
                println!("image: {image}");
            }
            println!("comments ({}):", detail.comments.len());
            for comment in &detail.comments {
                println!("  - {}", comment.text);
            }
        }
        Command::CreatePost { text, group, image } => {
            let location = client
                .create_post(&text, group, read_image(image)?)
                .await?;
            println!("Post created! See {location}");
        }
        Command::EditPost {
            id,
            text,
            group,
            image,
        } => {
            let location = client
                .edit_post(id, &text, group, read_image(image)?)
                .await?;
            println!("Post submitted. See {location}");
        }
        Command::Comment { post_id, text } => {
            client.comment(post_id, &text).await?;
            println!("Comment added!");
        }
        Command::Follow { username } => {
            client.follow(&username).await?;
            println!("Following {username}");
        }
        Command::Unfollow { username } => {
            client.unfollow(&username).await?;
            println!("Unfollowed {username}");
        }
    }

    Ok(())
}
