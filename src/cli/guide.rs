//! Guide command implementation

use clap::Parser;

/// Where OpenAI API keys are created
pub const OPENAI_API_KEYS_URL: &str = "https://platform.openai.com/account/api-keys";

const GUIDE: &str = "\
Why need credentials?
  ouo uses the OpenAI API for completion and embedding, and Pinecone as a
  vector store to index and search documents. Neither is free. The code is
  open source and your credentials are not saved on the server.

  If you are a developer, you probably want to host ouo yourself and pass
  credentials as environment variables instead.

How to add credentials?
  1. Create an API key from OpenAI:
";

/// Arguments for the guide command
#[derive(Parser, Debug)]
pub struct GuideArgs {
    /// Open the OpenAI API keys page in the browser
    #[arg(long)]
    pub open: bool,
}

pub fn render() -> String {
    format!(
        "{}     {}\n  2. Save it with `ouoctl credentials set --openai-api-key sk-...`\n",
        GUIDE, OPENAI_API_KEYS_URL
    )
}

/// Run the guide command
pub async fn run(args: GuideArgs) -> anyhow::Result<()> {
    print!("{}", render());

    if args.open {
        if let Err(e) = open::that(OPENAI_API_KEYS_URL) {
            tracing::warn!(error = %e, "Failed to open browser");
            anyhow::bail!("Could not open {}: {}", OPENAI_API_KEYS_URL, e);
        }
    }

    Ok(())
}
