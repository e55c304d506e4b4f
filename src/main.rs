use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use tracker_client::config::loader;
use tracker_client::types::{Me, Membership, Project, Story, StoryType, Task};
use tracker_client::{OutputShape, Shaped, TrackerClient, auth};

#[derive(Parser)]
#[command(name = "tracker", version, about = "Pivotal Tracker command-line client")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project ID (overrides the config file).
    #[arg(short, long)]
    project: Option<String>,

    /// Output shape: `struct` prints summaries, `map` prints raw JSON.
    #[arg(short, long)]
    output: Option<OutputShape>,

    /// Enable debug logging to stderr.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stories in the project.
    Stories {
        /// Tracker search expression, e.g. `label:bug state:started`.
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// List stories for a user (defaults to the token's owner).
    MyWork {
        #[arg(short, long)]
        user: Option<String>,
    },
    /// List project memberships.
    Memberships {
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// List projects visible to the token.
    Projects,
    /// Show the authenticated user.
    Me,
    /// Create a story.
    AddStory {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// feature, bug, chore or release.
        #[arg(long, value_parser = parse_story_type)]
        story_type: Option<StoryType>,
    },
    /// Add a task to a story.
    AddTask {
        story_id: u64,
        description: String,
    },
    /// Set the labels of a story.
    AddLabels {
        story_id: u64,
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

fn parse_story_type(s: &str) -> Result<StoryType, String> {
    match s {
        "feature" => Ok(StoryType::Feature),
        "bug" => Ok(StoryType::Bug),
        "chore" => Ok(StoryType::Chore),
        "release" => Ok(StoryType::Release),
        other => Err(format!("unknown story type {other:?}")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    let config = loader::load_config(cli.config.as_deref())?;
    let token = auth::resolve_token(config.api_token.as_deref())?;
    let project_id = cli
        .project
        .clone()
        .or_else(|| config.project_id.clone())
        .unwrap_or_default();
    let shape = cli.output.unwrap_or_else(|| config.output_shape());

    let mut builder = TrackerClient::builder()
        .api_token(token)
        .project_id(project_id)
        .output_shape(shape);
    if let Some(base_url) = &config.base_url {
        builder = builder.base_url(base_url.clone());
    }
    let client = builder.build().context("creating Tracker client")?;

    let rt = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    rt.block_on(run(&client, cli.command))
}

async fn run(client: &TrackerClient, command: Commands) -> Result<()> {
    match command {
        Commands::Stories { filter } => {
            let stories = client
                .get_stories(filter.as_deref())
                .await
                .context("fetching stories")?;
            print_list(&stories, story_line)
        }
        Commands::MyWork { user } => {
            let stories = client
                .get_my_work(user.as_deref())
                .await
                .context("fetching my work")?;
            print_list(&stories, story_line)
        }
        Commands::Memberships { filter } => {
            let memberships = client
                .get_memberships(filter.as_deref())
                .await
                .context("fetching memberships")?;
            print_list(&memberships, membership_line)
        }
        Commands::Projects => {
            let projects = client.get_projects().await.context("fetching projects")?;
            print_list(&projects, project_line)
        }
        Commands::Me => {
            let me = client.get_me().await.context("fetching current user")?;
            print_one(&me, me_line)
        }
        Commands::AddStory {
            name,
            description,
            story_type,
        } => {
            let mut story = Story::new(name);
            story.description = description;
            story.story_type = story_type;
            let created = client.add_story(&story).await.context("creating story")?;
            print_one(&created, story_line)
        }
        Commands::AddTask {
            story_id,
            description,
        } => {
            let task = client
                .add_task(story_id, &description)
                .await
                .with_context(|| format!("adding task to story #{story_id}"))?;
            print_one(&task, task_line)
        }
        Commands::AddLabels { story_id, labels } => {
            let story = client
                .add_labels(story_id, &labels)
                .await
                .with_context(|| format!("labelling story #{story_id}"))?;
            print_one(&story, story_line)
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_list<T>(shaped: &Shaped<Vec<T>>, line: fn(&T) -> String) -> Result<()> {
    match shaped {
        Shaped::Struct(items) => {
            for item in items {
                println!("{}", line(item));
            }
            Ok(())
        }
        Shaped::Map(value) => print_json(value),
    }
}

fn print_one<T>(shaped: &Shaped<T>, line: fn(&T) -> String) -> Result<()> {
    match shaped {
        Shaped::Struct(item) => {
            println!("{}", line(item));
            Ok(())
        }
        Shaped::Map(value) => print_json(value),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("formatting JSON output")?;
    println!("{text}");
    Ok(())
}

fn id_column(id: Option<u64>) -> String {
    id.map_or_else(|| "-".to_owned(), |id| format!("#{id}"))
}

fn story_line(story: &Story) -> String {
    let state = story
        .current_state
        .map(|s| format!("{s:?}").to_lowercase())
        .unwrap_or_default();
    let labels = story.label_names().join(", ");
    let mut line = format!(
        "{:<12} {:<12} {}",
        id_column(story.id),
        state,
        story.name.as_deref().unwrap_or_default()
    );
    if !labels.is_empty() {
        line.push_str(&format!(" [{labels}]"));
    }
    line
}

fn task_line(task: &Task) -> String {
    let mark = if task.complete == Some(true) { "x" } else { " " };
    format!(
        "{:<12} [{mark}] {}",
        id_column(task.id),
        task.description.as_deref().unwrap_or_default()
    )
}

fn membership_line(membership: &Membership) -> String {
    let person = membership.person.as_ref();
    format!(
        "{:<12} {:<10} {} <{}>",
        id_column(person.and_then(|p| p.id)),
        membership
            .role
            .map(|r| format!("{r:?}").to_lowercase())
            .unwrap_or_default(),
        person.and_then(|p| p.name.as_deref()).unwrap_or_default(),
        person.and_then(|p| p.username.as_deref()).unwrap_or_default(),
    )
}

fn project_line(project: &Project) -> String {
    format!(
        "{:<12} {}",
        id_column(project.id),
        project.name.as_deref().unwrap_or_default()
    )
}

fn me_line(me: &Me) -> String {
    format!(
        "{} ({}) {}",
        me.name.as_deref().unwrap_or_default(),
        me.username.as_deref().unwrap_or_default(),
        me.email.as_deref().unwrap_or_default()
    )
}
