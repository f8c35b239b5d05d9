/// Lines longer than this are dropped instead of growing the buffer forever.
pub const MAX_LINE_LEN: usize = 1024;

const LINE_TERMINATOR: u8 = b'\n';

/// Output of [`LineBuffer::next_line`].
#[derive(Debug, PartialEq)]
pub enum Line {
    /// A full line, without its terminator.
    Complete(Vec<u8>),
    /// Bytes thrown away because no terminator arrived within the limit.
    Overflow(Vec<u8>),
}

/// Accumulates arbitrarily fragmented reads and hands them out line by line.
pub struct LineBuffer {
    buffer: Vec<u8>,
    cursor: usize, // offset up to which `buffer` is known to hold no terminator
    max_len: usize,
    discarding: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_len.min(MAX_LINE_LEN)),
            cursor: 0,
            max_len,
            discarding: false,
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Pops the next line, if one is complete.
    ///
    /// Once an overflow has been reported, the rest of that line is skipped
    /// silently up to and including its terminator.
    pub fn next_line(&mut self) -> Option<Line> {
        loop {
            let Some(offset) = self.buffer[self.cursor..]
                .iter()
                .position(|&byte| byte == LINE_TERMINATOR)
            else {
                self.cursor = self.buffer.len();

                if self.buffer.len() <= self.max_len {
                    return None;
                }

                let dropped = std::mem::take(&mut self.buffer);
                self.cursor = 0;

                if self.discarding {
                    return None;
                }
                self.discarding = true;
                return Some(Line::Overflow(dropped));
            };

            let end = self.cursor + offset;
            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            line.pop();
            self.cursor = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }

            if line.len() > self.max_len {
                return Some(Line::Overflow(line));
            }

            return Some(Line::Complete(line));
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.discarding = false;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
