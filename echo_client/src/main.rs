use anyhow::Context;
use arguments::{Action, Arguments, Delimiter};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::io::{Read, Write};
use std::net::TcpStream;

mod arguments;

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    let mut stream =
        TcpStream::connect(args.socket).context("Failed to connect to echo server")?;

    match args.action {
        Action::Hex { bytes } => {
            let reply = roundtrip(&mut stream, &bytes)?;
            let hex = reply
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{hex}");
            verify(&bytes, &reply);
        }
        Action::Send { text } => {
            let bytes = with_delimiter(text.into_bytes(), args.delimiter);
            let reply = roundtrip(&mut stream, &bytes)?;
            print!("{}", String::from_utf8_lossy(&reply));
            verify(&bytes, &reply);
        }
        Action::Repl => {
            let mut rl = Editor::<()>::new()?;
            loop {
                match rl.readline(">> ") {
                    Ok(line) => {
                        rl.add_history_entry(line.as_str());
                        let bytes = with_delimiter(line.into_bytes(), args.delimiter);
                        let reply = roundtrip(&mut stream, &bytes)?;
                        print!("{}", String::from_utf8_lossy(&reply));
                        verify(&bytes, &reply);
                    }
                    Err(ReadlineError::Interrupted) => {
                        println!("CTRL-C");
                        break;
                    }
                    Err(ReadlineError::Eof) => {
                        println!("CTRL-D");
                        break;
                    }
                    Err(err) => {
                        println!("Error: {err:?}");
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

fn with_delimiter(mut bytes: Vec<u8>, delimiter: Delimiter) -> Vec<u8> {
    bytes.extend_from_slice(delimiter.as_bytes());
    bytes
}

/// Sends `bytes` and reads back exactly as many; an echo server returns
/// what it was sent, so anything short of that is a broken connection.
fn roundtrip<S: Read + Write>(stream: &mut S, bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    stream.write_all(bytes).context("Failed to send")?;
    let mut reply = vec![0; bytes.len()];
    stream
        .read_exact(&mut reply)
        .context("Connection closed before the full echo arrived")?;
    Ok(reply)
}

fn verify(sent: &[u8], reply: &[u8]) {
    if sent != reply {
        println!("(echo mismatch: sent {sent:02x?}, got {reply:02x?})");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Loops written bytes back to the reader, like the server does.
    #[derive(Default)]
    struct Loopback(VecDeque<u8>);

    impl Read for Loopback {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.0.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.0.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl Write for Loopback {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn roundtrip_returns_what_was_sent() {
        let mut stream = Loopback::default();
        let reply = roundtrip(&mut stream, b"ping").unwrap();
        assert_eq!(reply, b"ping");
    }

    /// Swallows writes and answers every read with EOF.
    struct Dead;

    impl Read for Dead {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for Dead {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn roundtrip_fails_when_connection_closes_early() {
        let mut stream = Dead;
        assert!(roundtrip(&mut stream, b"ping").is_err());
    }

    #[test]
    fn delimiters() {
        assert_eq!(with_delimiter(b"hi".to_vec(), Delimiter::Newline), b"hi\n");
        assert_eq!(
            with_delimiter(b"hi".to_vec(), Delimiter::CrLf),
            b"hi\r\n"
        );
        assert_eq!(with_delimiter(b"hi".to_vec(), Delimiter::None), b"hi");
    }
}
