//! Credentials command implementation
//!
//! The "Add credentials" dialog: render the form, apply edits to the buffer and
//! press "Save changes".

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};

use crate::controller::SettingsController;
use crate::core::{mask_secret, CredentialField, FieldVisibility};

const DIALOG_TITLE: &str = "Add credentials";

const DIALOG_DESCRIPTION: &str = "We will need these credentials in order to make API calls to \
OpenAI. Your credentials are saved in a local cookie that expires in 7 days; \
they are never stored on the server.";

/// Arguments for the credentials command
#[derive(Parser, Debug, Default)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: Option<CredentialsCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CredentialsCommand {
    /// Show the credentials form with masked values
    Show {
        /// Include fields the form normally hides
        #[arg(long)]
        all: bool,
    },
    /// Set fields and save
    Set(SetArgs),
    /// Fill in the form interactively
    Edit {
        /// Also prompt for fields the form normally hides
        #[arg(long)]
        all: bool,
    },
    /// Remove the saved credentials cookie
    Clear,
}

#[derive(Parser, Debug, Default)]
pub struct SetArgs {
    /// OpenAI API key (sk-...)
    #[arg(long)]
    pub openai_api_key: Option<String>,

    /// Pinecone API key
    #[arg(long)]
    pub pinecone_api_key: Option<String>,

    /// Pinecone environment (e.g. us-west1-gcp)
    #[arg(long)]
    pub pinecone_environment: Option<String>,

    /// Pinecone index name
    #[arg(long)]
    pub pinecone_index: Option<String>,

    /// Discourse forum URL
    #[arg(long)]
    pub forum_url: Option<String>,

    /// Discord API key (coming soon)
    #[arg(long)]
    pub discord_api_key: Option<String>,

    /// Community identifier used by the backend
    #[arg(long)]
    pub community: Option<String>,
}

impl SetArgs {
    fn field_edits(&self) -> Vec<(CredentialField, &str)> {
        [
            (CredentialField::OpenAiApiKey, &self.openai_api_key),
            (CredentialField::PineconeApiKey, &self.pinecone_api_key),
            (CredentialField::PineconeEnvironment, &self.pinecone_environment),
            (CredentialField::PineconeIndex, &self.pinecone_index),
            (CredentialField::ForumUrl, &self.forum_url),
            (CredentialField::DiscordApiKey, &self.discord_api_key),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

/// Run the credentials command
pub async fn run(args: CredentialsArgs, controller: &mut SettingsController) -> anyhow::Result<()> {
    match args.command.unwrap_or(CredentialsCommand::Show { all: false }) {
        CredentialsCommand::Show { all } => {
            print!("{}", render_form(controller, all));
            Ok(())
        }
        CredentialsCommand::Set(set) => {
            apply_set(controller, &set)?;
            println!("Saved credentials.");
            Ok(())
        }
        CredentialsCommand::Edit { all } => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            let saved = run_form(controller, &mut stdin.lock(), &mut stdout, all)?;
            if saved {
                println!("Saved credentials.");
            } else {
                println!("Discarded changes.");
            }
            Ok(())
        }
        CredentialsCommand::Clear => {
            controller.store().clear()?;
            controller.load_initial_values();
            println!("Removed saved credentials.");
            Ok(())
        }
    }
}

/// Apply `set` flags to the form and save.
///
/// `--community` is written straight to the store since the form never edits it.
pub fn apply_set(controller: &mut SettingsController, args: &SetArgs) -> anyhow::Result<()> {
    let edits = args.field_edits();
    if edits.is_empty() && args.community.is_none() {
        anyhow::bail!("Nothing to set. Pass at least one field, e.g. --openai-api-key.");
    }

    for (field, _) in &edits {
        if field.visibility() == FieldVisibility::Disabled {
            anyhow::bail!("'{}' is disabled and cannot be edited yet.", field.label());
        }
    }

    if !edits.is_empty() {
        controller.load_initial_values();
        for (field, value) in edits {
            controller.update_field(field, value);
        }
        controller.save_credentials();
    }

    if let Some(community) = &args.community {
        let store = controller.store();
        let mut record = store.read();
        record.community = community.trim().to_string();
        store.write(&record)?;
        tracing::info!(community = %record.community, "Saved community");
    }

    controller.load_initial_values();
    tracing::debug!(refresh_enabled = controller.can_refresh(), "Applied credential edits");
    Ok(())
}

fn fields_for(all: bool) -> impl Iterator<Item = CredentialField> {
    CredentialField::all()
        .iter()
        .copied()
        .filter(move |f| all || f.visibility() != FieldVisibility::Hidden)
}

fn display_value(field: CredentialField, value: &str) -> String {
    if value.is_empty() {
        format!("({})", field.placeholder())
    } else if field.is_secret() {
        mask_secret(value)
    } else {
        value.to_string()
    }
}

/// Render the credentials form
pub fn render_form(controller: &SettingsController, all: bool) -> String {
    let mut out = String::new();
    out.push_str(DIALOG_TITLE);
    out.push('\n');
    out.push_str(DIALOG_DESCRIPTION);
    out.push_str("\n\n");

    let draft = controller.draft();
    for field in fields_for(all) {
        let disabled = if field.visibility() == FieldVisibility::Disabled {
            "  (disabled)"
        } else {
            ""
        };
        out.push_str(&format!(
            "  {:<30} {}{}\n",
            field.label(),
            display_value(field, draft.get(field)),
            disabled
        ));
    }

    let community = controller.persisted().community;
    out.push_str(&format!(
        "  {:<30} {}\n",
        "Community",
        if community.is_empty() { "(not set)" } else { community.as_str() }
    ));

    let state = controller.refresh_state();
    out.push('\n');
    if state.is_ready() {
        out.push_str("Refresh model: enabled\n");
    } else {
        out.push_str(&format!("Refresh model: disabled ({})\n", state.reason()));
    }
    out
}

/// Prompt for each editable field, then ask whether to save.
///
/// Empty input keeps the current value. Returns whether the form was saved.
pub fn run_form<R: BufRead, W: Write>(
    controller: &mut SettingsController,
    input: &mut R,
    output: &mut W,
    all: bool,
) -> io::Result<bool> {
    controller.load_initial_values();

    writeln!(output, "{}", DIALOG_TITLE)?;
    writeln!(output, "{}", DIALOG_DESCRIPTION)?;
    writeln!(output)?;

    let editable: Vec<CredentialField> = fields_for(all)
        .filter(|f| f.visibility() != FieldVisibility::Disabled)
        .collect();

    for field in editable {
        let current = controller.draft().get(field).to_string();
        write!(output, "{} [{}]: ", field.label(), display_value(field, &current))?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            break;
        };
        if !line.is_empty() {
            controller.update_field(field, line);
        }
    }

    write!(output, "Save changes? [y/N]: ")?;
    output.flush()?;
    let answer = read_line(input)?.unwrap_or_default();

    if matches!(answer.to_lowercase().as_str(), "y" | "yes") {
        controller.save_credentials();
        Ok(true)
    } else {
        controller.discard_changes();
        Ok(false)
    }
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
