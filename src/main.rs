use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use flowsync::config::ClientConfig;
use flowsync::gql::http::HttpTransport;
use flowsync::store::{
    FileStorage, LoggingNavigator, LoginInput, RegisterInput, SessionStore, Workflow,
    WorkflowInput, WorkflowStore,
};

use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and save the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FLOWSYNC_PASSWORD")]
        password: String,
    },
    /// Create an account and save the session
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FLOWSYNC_PASSWORD")]
        password: String,

        #[arg(short, long)]
        name: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List workflows
    Workflows {
        /// Only workflows owned by the signed-in user
        #[arg(long)]
        mine: bool,

        /// Only public workflows
        #[arg(long)]
        public: bool,
    },
    /// Show one workflow
    Show { id: String },
    /// Create a workflow from a YAML or JSON file
    Create {
        #[arg(short, long)]
        file: String,
    },
    /// Update a workflow from a YAML or JSON file
    Update {
        id: String,

        #[arg(short, long)]
        file: String,
    },
    /// Delete a workflow
    Delete { id: String },
    /// Execute a workflow
    Execute {
        id: String,

        /// JSON input payload
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List executions for a workflow, or for the signed-in user
    Executions {
        #[arg(short, long)]
        workflow: Option<String>,
    },
}

fn print_workflows(workflows: &[Workflow]) {
    if workflows.is_empty() {
        println!("No workflows");
        return;
    }
    for wf in workflows {
        println!(
            "{}\t{}\t{}\truns={}{}",
            wf.id,
            wf.status,
            wf.name,
            wf.execution_count,
            if wf.is_public { "\tpublic" } else { "" }
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let config = ClientConfig::from_env()?;
    log::info!(
        "Using endpoint {} with state file {}",
        config.endpoint,
        config.state_file.display()
    );

    let transport = Arc::new(HttpTransport::new(&config)?);
    let storage = Arc::new(FileStorage::new(&config.state_file));
    let session = Arc::new(SessionStore::new(
        transport.clone(),
        Some(storage),
        Arc::new(LoggingNavigator),
    ));
    session.restore_auth();

    let workflows = WorkflowStore::new(transport, session.clone());

    match args.command {
        Commands::Login { email, password } => {
            session.login(LoginInput { email, password }).await?;
            if let Some(user) = session.user() {
                println!("Signed in as {} <{}>", user.name, user.email);
            }
        }
        Commands::Register {
            email,
            password,
            name,
        } => {
            session
                .register(RegisterInput {
                    email,
                    password,
                    name,
                })
                .await?;
            if let Some(user) = session.user() {
                println!("Registered {} <{}>", user.name, user.email);
            }
        }
        Commands::Logout => {
            session.logout();
            println!("Signed out");
        }
        Commands::Whoami => match session.user() {
            Some(user) => println!("{} <{}> ({}) id={}", user.name, user.email, user.role, user.id),
            None => println!("Not signed in"),
        },
        Commands::Workflows { mine, public } => {
            if mine {
                let user_id = session
                    .user_id()
                    .context("--mine requires a signed-in user")?;
                workflows.fetch_owned_by(&user_id).await?;
                print_workflows(&workflows.owned_workflows());
            } else {
                workflows.fetch_all().await?;
                if public {
                    print_workflows(&workflows.public_workflows());
                } else {
                    print_workflows(&workflows.workflows());
                }
            }
        }
        Commands::Show { id } => {
            workflows.fetch_one(&id).await?;
            match workflows.current_workflow() {
                Some(wf) => println!("{}", serde_json::to_string_pretty(&wf)?),
                None => println!("Workflow {} not found", id),
            }
        }
        Commands::Create { file } => {
            let input = WorkflowInput::load(&file)
                .map_err(|e| anyhow::anyhow!("failed to load {}: {}", file, e))?;
            let created = workflows.create(input).await?;
            println!("Created workflow {} ({})", created.id, created.name);
        }
        Commands::Update { id, file } => {
            let input = WorkflowInput::load(&file)
                .map_err(|e| anyhow::anyhow!("failed to load {}: {}", file, e))?;
            let updated = workflows.update(&id, input).await?;
            println!("Updated workflow {} ({})", updated.id, updated.status);
        }
        Commands::Delete { id } => {
            if workflows.delete(&id).await? {
                println!("Deleted workflow {}", id);
            } else {
                println!("Server did not confirm deletion of workflow {}", id);
            }
        }
        Commands::Execute { id, input } => {
            let input = input
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("--input must be valid JSON")?;
            let execution_id = workflows.execute(&id, input).await?;
            println!("Started execution {}", execution_id);
        }
        Commands::Executions { workflow } => {
            workflows.fetch_executions(workflow.as_deref()).await?;
            let executions = workflows.executions();
            if executions.is_empty() {
                println!("No executions");
            }
            for exec in executions {
                println!(
                    "{}\t{}\t{}\t{}{}",
                    exec.id,
                    exec.workflow_id,
                    exec.status,
                    exec.created_at.to_rfc3339(),
                    exec.error_message
                        .map(|m| format!("\t{}", m))
                        .unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
