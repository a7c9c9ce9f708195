//! Byte spans of values inside JSON source text.
//!
//! `serde_json::Value` drops positions, so package.json code frames are built
//! by re-scanning the original text for the value at a key path.

/// Byte range `start..end` of the value reached by following `pointer`
/// (object keys or array indices) from the document root.
#[must_use]
pub fn value_span(source: &str, pointer: &[&str]) -> Option<(usize, usize)> {
    let mut scanner = Scanner {
        src: source.as_bytes(),
        pos: 0,
    };
    scanner.find(pointer)
}

struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        self.skip_ws();
        if self.peek()? == byte {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn find(&mut self, pointer: &[&str]) -> Option<(usize, usize)> {
        self.skip_ws();
        let Some((head, rest)) = pointer.split_first() else {
            return self.skip_value();
        };

        match self.peek()? {
            b'{' => {
                self.pos += 1;
                loop {
                    self.skip_ws();
                    if self.peek()? == b'}' {
                        return None;
                    }
                    let (start, end) = self.skip_string()?;
                    let key: String = serde_json::from_slice(&self.src[start..end]).ok()?;
                    self.expect(b':')?;
                    if key == *head {
                        return self.find(rest);
                    }
                    self.skip_value()?;
                    self.expect(b',')?;
                }
            }
            b'[' => {
                let index: usize = head.parse().ok()?;
                self.pos += 1;
                for i in 0.. {
                    self.skip_ws();
                    if self.peek()? == b']' {
                        return None;
                    }
                    if i == index {
                        return self.find(rest);
                    }
                    self.skip_value()?;
                    self.expect(b',')?;
                }
                None
            }
            _ => None,
        }
    }

    fn skip_string(&mut self) -> Option<(usize, usize)> {
        let start = self.pos;
        if self.peek()? != b'"' {
            return None;
        }
        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Some((start, self.pos));
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_value(&mut self) -> Option<(usize, usize)> {
        self.skip_ws();
        let start = self.pos;
        match self.peek()? {
            b'"' => self.skip_string(),
            open @ (b'{' | b'[') => {
                let close = if open == b'{' { b'}' } else { b']' };
                self.pos += 1;
                loop {
                    self.skip_ws();
                    if self.peek()? == close {
                        self.pos += 1;
                        return Some((start, self.pos));
                    }
                    if open == b'{' {
                        self.skip_string()?;
                        self.expect(b':')?;
                    }
                    self.skip_value()?;
                    self.skip_ws();
                    if self.peek()? == b',' {
                        self.pos += 1;
                    }
                }
            }
            _ => {
                while self
                    .peek()
                    .is_some_and(|b| !matches!(b, b',' | b'}' | b']') && !b.is_ascii_whitespace())
                {
                    self.pos += 1;
                }
                (self.pos > start).then_some((start, self.pos))
            }
        }
    }
}
