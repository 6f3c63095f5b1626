use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cardigan")]
#[command(version, about = "Fill-in-the-blank card decks for chat", long_about = None)]
pub struct Cli {
    /// Deck to operate on (letters and digits, e.g. a team id)
    #[arg(short, long, env = "CARDIGAN_DECK")]
    pub deck: String,

    /// Id of the user sending the command
    #[arg(long, env = "CARDIGAN_USER_ID")]
    pub user_id: String,

    /// Display name of the user sending the command
    #[arg(long, env = "CARDIGAN_USER_NAME")]
    pub user_name: String,

    /// Session token; the first token a deck sees becomes its write token
    #[arg(long, env = "CARDIGAN_TOKEN", default_value = "")]
    pub token: String,

    /// Directory holding deck databases
    #[arg(long, env = "CARDIGAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory holding config.json
    #[arg(long, env = "CARDIGAN_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Pretty-print the JSON reply
    #[arg(long, conflicts_with = "plain")]
    pub pretty: bool,

    /// Print the reply as plain text instead of JSON
    #[arg(long)]
    pub plain: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Command text, e.g. `white a llama` or `deal P1 F2`. Empty draws a round.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub text: Vec<String>,
}

impl Cli {
    pub fn command_text(&self) -> String {
        self.text.join(" ")
    }
}
