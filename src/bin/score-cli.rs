use clap::{Parser, Subcommand};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

#[derive(Parser)]
#[command(name = "score-cli")]
#[command(about = "Client for the score board server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a score, e.g. `submit alice:100`
    Submit { text: String },
    /// Print the store document
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Submit { text } => {
            let body = utf8_percent_encode(&text, NON_ALPHANUMERIC).to_string();
            client.post(&cli.url).body(body).send().await?
        }
        Commands::List => client.get(&cli.url).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        eprintln!("Response: {}", text);
        std::process::exit(1);
    }
    println!("{}", text);
    Ok(())
}
