use newsdesk_events::Message;
use std::io::{self, Write};

/// Line written once the screen manager has seen every co-editor finish.
pub const COMPLETION_LINE: &str = "DONE";

/// Render sink for the screen manager.
pub trait Screen {
    fn show(&mut self, message: &Message) -> io::Result<()>;

    /// Called exactly once, after the last message.
    fn finish(&mut self) -> io::Result<()>;
}

/// Renders one line per message, then [`COMPLETION_LINE`], to any writer.
pub struct WriteScreen<W: Write> {
    out: W,
}

impl<W: Write> WriteScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Screen for WriteScreen<W> {
    fn show(&mut self, message: &Message) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out, "{COMPLETION_LINE}")?;
        self.out.flush()
    }
}

// collects rendered lines in memory
impl Screen for Vec<String> {
    fn show(&mut self, message: &Message) -> io::Result<()> {
        self.push(message.to_string());
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.push(COMPLETION_LINE.to_string());
        Ok(())
    }
}

impl<S: Screen + ?Sized> Screen for &mut S {
    fn show(&mut self, message: &Message) -> io::Result<()> {
        (**self).show(message)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}
