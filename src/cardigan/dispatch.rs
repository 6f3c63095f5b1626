//! # Command dispatch
//!
//! Maps one line of chat command text onto a [`DeckApi`] call and turns the
//! outcome into a [`Reply`]. The first word picks the command:
//!
//! | text                         | command              |
//! |------------------------------|----------------------|
//! | *(empty)*                    | draw a random round  |
//! | `help`                       | usage                |
//! | `status`                     | card counts          |
//! | `search <text>`              | find cards           |
//! | `edit <id> <text>`           | replace a card's text|
//! | `deal [<id>...]`             | deal specific cards  |
//! | prompt synonym + text        | add a prompt card    |
//! | fill synonym + text          | add a fill card      |
//!
//! Adding and editing need read-write access; see [`crate::gate`].
//! Every outcome, failures included, becomes a reply.

use crate::api::{open_deck, CmdResult, DeckApi};
use crate::config::{CardiganConfig, StoreOptions};
use crate::error::{CardError, Result};
use crate::model::{Author, CardKind};
use crate::reply::Reply;
use crate::store::DeckStore;
use tracing::{debug, error, warn};

/// One inbound command, already lifted out of the transport.
#[derive(Debug, Clone)]
pub struct Request {
    pub deck_id: String,
    pub author: Author,
    pub credential: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Draw,
    Help,
    Status,
    Search(&'a str),
    Edit { id: &'a str, text: &'a str },
    Deal(Vec<&'a str>),
    Add { kind: CardKind, text: &'a str },
    Unknown(&'a str),
}

impl Command<'_> {
    pub fn is_mutating(&self) -> bool {
        matches!(self, Command::Edit { .. } | Command::Add { .. })
    }
}

fn split_first_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (text, ""),
    }
}

fn is_synonym(word: &str, synonyms: &[String]) -> bool {
    synonyms.iter().any(|s| s.eq_ignore_ascii_case(word))
}

pub fn parse_command<'a>(config: &CardiganConfig, text: &'a str) -> Command<'a> {
    let (word, rest) = split_first_word(text);
    if word.is_empty() {
        return Command::Draw;
    }

    match word.to_ascii_lowercase().as_str() {
        "help" => Command::Help,
        "status" => Command::Status,
        "search" => Command::Search(rest),
        "edit" => {
            let (id, text) = split_first_word(rest);
            Command::Edit { id, text }
        }
        "deal" => Command::Deal(
            rest.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .collect(),
        ),
        _ if is_synonym(word, &config.prompt_synonyms) => Command::Add {
            kind: CardKind::Prompt,
            text: rest,
        },
        _ if is_synonym(word, &config.fill_synonyms) => Command::Add {
            kind: CardKind::Fill,
            text: rest,
        },
        _ => Command::Unknown(word),
    }
}

/// Opens the request's deck and handles the command against it.
pub fn handle(options: &StoreOptions, config: &CardiganConfig, request: &Request) -> Reply {
    let result = open_deck(options, &request.deck_id)
        .and_then(|mut api| handle_with(&mut api, config, request));
    finish(result)
}

/// Handles a command against an already opened deck.
pub fn handle_with<S: DeckStore>(
    api: &mut DeckApi<S>,
    config: &CardiganConfig,
    request: &Request,
) -> Result<Reply> {
    let access = api.check_access(&request.credential)?;
    let command = parse_command(config, &request.text);
    debug!(?command, ?access, "Dispatching");

    if command.is_mutating() && !access.can_write() {
        warn!(author = %request.author.name, "Refused change on read-only deck");
        return Ok(Reply::ephemeral(
            "This deck is read-only for you. You can still draw, deal, search and check status.",
        ));
    }

    let reply = match command {
        Command::Draw => round_reply(api.draw_round()?),
        Command::Deal(ids) => round_reply(api.deal(&ids)?),
        Command::Help => Reply::ephemeral(help_text(config)),
        Command::Status => status_reply(api.status()?),
        Command::Search("") => Reply::ephemeral("Usage: search <text>"),
        Command::Search(term) => search_reply(api.search(term)?),
        Command::Edit { id: "", .. } | Command::Edit { text: "", .. } => {
            return Err(CardError::EmptyEdit)
        }
        Command::Edit { id, text } => message_reply(api.edit_card(id, text)?),
        Command::Add { kind, text } => {
            message_reply(api.add_card(kind, request.author.clone(), text)?)
        }
        Command::Unknown(word) => {
            debug!(word, "Unknown command");
            Reply::ephemeral("I don't understand that command.")
        }
    };
    Ok(reply)
}

fn finish(result: Result<Reply>) -> Reply {
    match result {
        Ok(reply) => reply,
        Err(err) => {
            if err.is_expected() {
                debug!(%err, "Command failed");
            } else {
                error!(%err, "Unexpected failure");
            }
            Reply::from_error(&err)
        }
    }
}

fn round_reply(result: CmdResult) -> Reply {
    match result.round {
        Some(round) => Reply::in_channel(round.text.clone()).with_raw(round),
        None => message_reply(result),
    }
}

fn message_text(result: &CmdResult) -> String {
    result
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn message_reply(result: CmdResult) -> Reply {
    Reply::in_channel(message_text(&result))
}

fn status_reply(result: CmdResult) -> Reply {
    let mut reply = Reply::in_channel(message_text(&result));
    if let Some(status) = result.status {
        let lines: Vec<String> = status
            .per_author
            .iter()
            .map(|t| {
                format!(
                    "{}: {} {}, {} {}",
                    t.name,
                    CardKind::Prompt.marker(),
                    t.prompts,
                    CardKind::Fill.marker(),
                    t.fills
                )
            })
            .collect();
        if !lines.is_empty() {
            reply = reply.with_attachment(lines.join("\n"));
        }
    }
    reply
}

fn search_reply(result: CmdResult) -> Reply {
    let header = message_text(&result);
    result
        .listed_cards
        .iter()
        .fold(Reply::ephemeral(header), |reply, card| {
            reply.with_attachment(format!("{}: {}", card.id_string(), card.text()))
        })
}

pub fn help_text(config: &CardiganConfig) -> String {
    let first = |list: &[String], fallback: &str| {
        list.first().cloned().unwrap_or_else(|| fallback.to_string())
    };
    let prompt = first(&config.prompt_synonyms, "prompt");
    let fill = first(&config.fill_synonyms, "fill");
    format!(
        "Usage:\n\
         • (nothing) - draw a random round\n\
         • {prompt} <text> - add a prompt card; write blanks as ___\n\
         • {fill} <text> - add a fill card\n\
         • deal [P<n>] [F<n>...] - deal specific cards, drawing the rest\n\
         • edit <id> <text> - change a card's text\n\
         • search <text> - find cards\n\
         • status - count cards\n\
         • help - this message"
    )
}
