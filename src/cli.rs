use clap::Parser;

#[derive(Parser)]
#[command(
    name = "ytscribe",
    about = "Summarize YouTube videos from their transcripts with Gemini",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Address to serve the page on [default: 127.0.0.1:8501]
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Gemini model used for summaries [default: gemini-1.5-flash-002]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Preferred caption language [default: en]
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Submissions allowed per browsing session [default: 5]
    #[arg(short, long)]
    pub query_limit: Option<u32>,

    /// Minutes of inactivity before a session's quota starts over [default: 720]
    #[arg(long)]
    pub session_idle_minutes: Option<u64>,

    /// Show config and log locations on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
