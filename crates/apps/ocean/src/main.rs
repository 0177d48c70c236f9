//! Ocean - command-line driver for the AI email workspace
//!
//! Each invocation builds a fresh workspace against the configured backend,
//! runs one workflow and prints the resulting state.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{error, info};
use mail::{
    BackendConfig, Category, ChatRole, DraftId, Email, EmailId, EntityStore, FilePromptStorage,
    HttpBackend, LogNotices, Workspace, WorkflowOutcome,
};

#[derive(Parser)]
#[command(name = "ocean")]
#[command(about = "AI email workspace", long_about = None)]
struct Cli {
    /// Backend base URL (overrides OCEAN_API_URL and ocean.json)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the inbox, optionally filtered
    Inbox {
        /// Free-text search over subject, sender and body
        #[arg(long)]
        query: Option<String>,

        /// Keep only these categories (repeatable)
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<Category>,
    },

    /// Categorize every email and extract action items
    Process,

    /// Ask the assistant a question
    Chat {
        query: String,

        /// Email to discuss
        #[arg(long)]
        email: Option<String>,
    },

    /// List saved drafts
    Drafts,

    /// Have the assistant draft a reply to an email
    Reply { email_id: String },
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).ok_or_else(|| {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category {:?} (expected one of: {})", s, names.join(", "))
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let backend_config = BackendConfig::load(cli.api_url.as_deref())?;
    info!("Using backend at {}", backend_config.base_url);
    let backend = HttpBackend::new(&backend_config.base_url)
        .with_context(|| format!("Invalid backend URL {}", backend_config.base_url))?;

    let workspace = Workspace::new(
        Arc::new(EntityStore::new()),
        Arc::new(backend),
        Arc::new(LogNotices),
        Arc::new(FilePromptStorage::default_location()?),
    );
    workspace.start().await;

    match cli.cmd {
        Command::Inbox { query, categories } => {
            load_inbox(&workspace).await?;
            let inbox = workspace.inbox_panel();
            if let Some(query) = query {
                inbox.set_query(query);
            }
            workspace.store().set_categories(categories.into_iter().collect());
            print_inbox(&workspace);
        }

        Command::Process => {
            load_inbox(&workspace).await?;
            if let WorkflowOutcome::Failed(e) = workspace.process_emails().await {
                bail!("Processing failed: {}", e);
            }
            print_inbox(&workspace);
        }

        Command::Chat { query, email } => {
            if let Some(id) = email {
                load_inbox(&workspace).await?;
                select_email(&workspace, &id)?;
            }
            let mut chat = workspace.chat_panel();
            chat.set_input(query);
            let draft = chat_result(Some(chat.submit().await))?;
            print_last_reply(&workspace);
            if let Some(id) = draft {
                print_draft(&workspace, &id);
            }
        }

        Command::Drafts => {
            let drafts = workspace.drafts_panel();
            if let WorkflowOutcome::Failed(e) = drafts.mount().await {
                bail!("Failed to load drafts: {}", e);
            }
            println!("{}", drafts.count_label());
            for draft in drafts.drafts().iter() {
                let edited = if draft.is_edited() { " (edited)" } else { "" };
                println!("  [{}] {}{}", draft.id, draft.subject, edited);
            }
        }

        Command::Reply { email_id } => {
            load_inbox(&workspace).await?;
            select_email(&workspace, &email_id)?;
            workspace.inbox_panel().generate_reply();

            // The chat panel picks the request up when it mounts
            let mut chat = workspace.chat_panel();
            let draft = chat_result(chat.mount().await)?;
            print_last_reply(&workspace);
            match draft {
                Some(id) => print_draft(&workspace, &id),
                None => println!("\n(no draft was created)"),
            }
        }
    }

    Ok(())
}

async fn load_inbox(workspace: &Workspace) -> Result<()> {
    match workspace.inbox_panel().mount().await {
        Some(WorkflowOutcome::Failed(e)) => bail!("Failed to load emails: {}", e),
        _ => Ok(()),
    }
}

fn select_email(workspace: &Workspace, id: &str) -> Result<()> {
    if !workspace.inbox_panel().select(&EmailId::new(id)) {
        bail!("No email with id {}", id);
    }
    Ok(())
}

fn print_inbox(workspace: &Workspace) {
    let view = workspace.inbox_panel().view();
    if view.is_inbox_empty() {
        println!("Inbox is empty");
        return;
    }
    if view.has_no_matches() {
        println!("No emails match the current filters ({} total)", view.total);
        return;
    }

    let now = Utc::now();
    println!("{} of {} emails", view.matched(), view.total);
    for email in &view.emails {
        print_email(email, now);
    }
}

fn print_email(email: &Email, now: chrono::DateTime<Utc>) {
    let category = email.category.map(|c| c.as_str()).unwrap_or("-");
    let unread = if email.is_read { " " } else { "*" };
    println!(
        "{} [{}] {:<12} {} | {} ({})",
        unread,
        email.id,
        category,
        email.display_sender(),
        email.subject,
        email.relative_time(now)
    );
    for item in &email.action_items {
        match &item.deadline {
            Some(deadline) => println!("      - {} (due {})", item.task, deadline),
            None => println!("      - {}", item.task),
        }
    }
}

/// The draft a chat exchange produced, or an error if the query never
/// got a real answer
fn chat_result(outcome: Option<WorkflowOutcome<Option<DraftId>>>) -> Result<Option<DraftId>> {
    match outcome {
        Some(WorkflowOutcome::Completed(draft)) => Ok(draft),
        Some(WorkflowOutcome::Failed(e)) => bail!("Chat query failed: {}", e),
        Some(WorkflowOutcome::Rejected(reason)) => bail!("Chat query was not sent: {:?}", reason),
        None => bail!("No pending chat query"),
    }
}

fn print_draft(workspace: &Workspace, id: &DraftId) {
    if let Some(draft) = workspace.store().draft(id) {
        println!("\n[{}] Subject: {}\n\n{}", draft.id, draft.subject, draft.body);
    }
}

fn print_last_reply(workspace: &Workspace) {
    let messages = workspace.store().chat_messages();
    if let Some(reply) = messages.iter().rev().find(|m| m.role == ChatRole::Assistant) {
        println!("{}", reply.content);
    }
}
