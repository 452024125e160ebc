//! Line-oriented terminal front end.

use crate::doc_processor::UploadedFile;
use crate::llm::HostedModel;
use crate::session::{Session, SessionError};
use crate::store::models::{EntryKind, Sender, TranscriptMessage};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /faq <question> | <answer>   add a FAQ entry
  /pdf <path>                  extract a PDF into the knowledge base
  /docs                        list the knowledge base
  /help                        show this help
  /quit                        exit
Anything else is sent as a question.";

#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Faq { question: String, answer: String },
    Pdf(PathBuf),
    Docs,
    Help,
    Quit,
    Ask(String),
    Invalid(&'static str),
}

pub fn parse_line(line: &str) -> ConsoleCommand {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "/faq" => match rest.split_once('|') {
            Some((question, answer)) => ConsoleCommand::Faq {
                question: question.trim().to_string(),
                answer: answer.trim().to_string(),
            },
            None => ConsoleCommand::Invalid("usage: /faq <question> | <answer>"),
        },
        "/pdf" if rest.is_empty() => ConsoleCommand::Invalid("usage: /pdf <path>"),
        "/pdf" => ConsoleCommand::Pdf(PathBuf::from(rest)),
        "/docs" => ConsoleCommand::Docs,
        "/help" => ConsoleCommand::Help,
        "/quit" | "/exit" => ConsoleCommand::Quit,
        _ => ConsoleCommand::Ask(line.to_string()),
    }
}

fn render(message: &TranscriptMessage) -> String {
    match message.sender {
        Sender::User => format!("you> {}", message.text),
        Sender::Bot => format!("bot> {}", message.text),
    }
}

/// Run the REPL on stdin/stdout until EOF or `/quit`.
pub async fn run<M: HostedModel>(session: Session<M>) -> std::io::Result<()> {
    for message in session.messages() {
        println!("{}", render(&message));
    }
    let mut seen = session.message_count();
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let result = match parse_line(&line) {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            ConsoleCommand::Invalid(usage) => {
                println!("{usage}");
                Ok(())
            }
            ConsoleCommand::Docs => {
                for doc in session.documents() {
                    let tag = match doc.kind {
                        EntryKind::Faq => "faq",
                        EntryKind::PdfExtract => "pdf",
                    };
                    println!("  [{tag}] {}", doc.name);
                }
                Ok(())
            }
            ConsoleCommand::Faq { question, answer } => {
                session.add_faq(&question, &answer).map(|added| match added {
                    Some(entry) => println!("Added FAQ \"{}\".", entry.name),
                    None => println!("Both a question and an answer are required."),
                })
            }
            ConsoleCommand::Pdf(path) => match UploadedFile::from_path(&path) {
                Ok(file) => {
                    println!("bot> Analyzing {}...", file.name);
                    session.add_pdf(file).await.map(|_| ())
                }
                Err(err) => {
                    println!("Could not read {}: {err}", path.display());
                    Ok(())
                }
            },
            ConsoleCommand::Ask(question) => session.send_message(&question).await.map(|_| ()),
        };

        if let Err(SessionError::Busy) = result {
            println!("{}", SessionError::Busy);
        }

        for message in session.messages_since(seen) {
            if message.sender == Sender::Bot {
                println!("{}", render(&message));
            }
        }
        seen = session.message_count();
    }

    Ok(())
}
