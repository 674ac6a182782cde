use anyhow::Result;
use clap::Parser;
use paper_chat::{ChatMessage, ChatSession, Command, ProcessReport, RelayClient, Sender};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "paper-chat", about = "Upload a research paper and ask questions about it")]
struct Cli {
    /// Base URL of the relay server
    #[arg(long, env = "RELAY_URL", default_value = "http://localhost:4000")]
    server: String,

    /// PDF to upload before the conversation starts
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Number of passages the RAG service should retrieve per question
    #[arg(long)]
    top_k: Option<u32>,

    /// Model the RAG service should answer with
    #[arg(long)]
    model: Option<String>,

    /// Give up on a request after this many seconds (waits forever if unset)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let client = RelayClient::new(&cli.server, cli.timeout_secs.map(Duration::from_secs))?;

    match client.health().await {
        Ok(health) => log::info!("Relay at {} says: {}", client.base_url(), health),
        Err(e) => eprintln!("warning: relay at {} is not responding: {:#}", client.base_url(), e),
    }

    if let Some(pdf) = &cli.pdf {
        upload(&client, pdf).await;
    }

    let mut session = ChatSession::new().with_options(cli.top_k, cli.model.clone());

    println!("Ask the Paper. Type a question, /upload <path>, /history or /quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match Command::parse(&line) {
            Command::Quit => break,
            Command::History => {
                for message in session.messages() {
                    print_message(message);
                }
            }
            Command::Upload(None) => eprintln!("usage: /upload <path-to-pdf>"),
            Command::Upload(Some(path)) => upload(&client, &path).await,
            Command::Ask(question) => {
                if session.can_submit(&question) {
                    println!("  ...");
                    match session.send(&client, &question).await {
                        Ok(reply) => print_message(reply),
                        Err(e) => eprintln!("{}", e),
                    }
                }
            }
        }
    }

    Ok(())
}

async fn upload(client: &RelayClient, path: &Path) {
    match client.upload_pdf(path).await {
        Ok(report) => print_report(path, &report),
        Err(e) => eprintln!("Upload of {} failed: {:#}", path.display(), e),
    }
}

fn print_report(path: &Path, report: &ProcessReport) {
    if report.is_error() {
        eprintln!(
            "Upload of {} was rejected: {}",
            path.display(),
            report.message.as_deref().unwrap_or("unknown error")
        );
        return;
    }

    match (report.num_chunks, report.index_size) {
        (Some(chunks), Some(total)) => println!(
            "Processed {} into {} chunks ({} indexed in total)",
            path.display(),
            chunks,
            total
        ),
        _ => println!("Processed {}", path.display()),
    }
}

fn print_message(message: &ChatMessage) {
    let who = match message.sender() {
        Sender::User => "you",
        Sender::Assistant => "assistant",
    };
    println!(
        "[{}] {}: {}",
        message.timestamp().format("%H:%M:%S"),
        who,
        message.text()
    );
}
