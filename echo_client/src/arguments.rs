use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::{fmt::Display, net::SocketAddr};

pub fn parse_hex_digit(s: &str) -> anyhow::Result<u8> {
    u8::from_str_radix(s, 16).context("Failed to parse hex byte")
}

#[derive(Copy, Debug, Clone, Default, ValueEnum)]
pub enum Delimiter {
    #[default]
    Newline,
    CrLf,
    None,
}

impl Delimiter {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Delimiter::Newline => b"\n",
            Delimiter::CrLf => b"\r\n",
            Delimiter::None => b"",
        }
    }
}

impl Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

#[derive(Parser, Debug)]
#[command(author, version)]
pub struct Arguments {
    /// Echo server to connect to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub socket: SocketAddr,

    /// Delimiter appended to every line sent
    #[arg(short, long, default_value_t)]
    pub delimiter: Delimiter,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Send raw hex bytes once and print what comes back
    Hex {
        /// Bytes to send (hexadecimal)
        #[arg(num_args = 1.., value_delimiter = ' ', value_parser = parse_hex_digit)]
        bytes: Vec<u8>,
    },
    /// Send one line of text and print what comes back
    Send { text: String },
    /// Interactive prompt; each line is sent and its echo verified
    Repl,
}
