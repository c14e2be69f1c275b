enum Utf8ByteType {
    SingleByte,
    StartTwoByte,
    StartThreeByte,
    StartFourByte,
    Continuation,
    Invalid,
}

trait Utf8Byte {
    fn utf8_byte_type(&self) -> Utf8ByteType;
    fn utf8_is_continuation(&self) -> bool;
}

impl Utf8Byte for u8 {
    fn utf8_byte_type(&self) -> Utf8ByteType {
        let byte = *self;

        if byte & 0b10000000 == 0 {
            Utf8ByteType::SingleByte
        } else if byte & 0b11000000 == 0b10000000 {
            Utf8ByteType::Continuation
        } else if byte & 0b11100000 == 0b11000000 {
            Utf8ByteType::StartTwoByte
        } else if byte & 0b11110000 == 0b11100000 {
            Utf8ByteType::StartThreeByte
        } else if byte & 0b11111000 == 0b11110000 {
            Utf8ByteType::StartFourByte
        } else {
            Utf8ByteType::Invalid
        }
    }

    fn utf8_is_continuation(&self) -> bool {
        matches!(self.utf8_byte_type(), Utf8ByteType::Continuation)
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum Utf8DecoderStatus {
    Continuation,
    Done(char),
    Error,
}

/// Incremental decoder for one UTF-8 encoded character
#[derive(Debug, Eq, PartialEq)]
pub struct Utf8Decoder {
    codepoint: u32,
    remaining: u8,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self {
            codepoint: 0,
            remaining: 0,
        }
    }

    fn finish(&mut self) -> Utf8DecoderStatus {
        match char::from_u32(self.codepoint) {
            Some(c) => Utf8DecoderStatus::Done(c),
            None => Utf8DecoderStatus::Error,
        }
    }

    fn start(&mut self, value: u8, remaining: u8) -> Utf8DecoderStatus {
        self.codepoint = value as u32;
        self.remaining = remaining;

        if remaining == 0 {
            self.finish()
        } else {
            Utf8DecoderStatus::Continuation
        }
    }

    pub fn advance(&mut self, byte: u8) -> Utf8DecoderStatus {
        if self.remaining == 0 {
            return match byte.utf8_byte_type() {
                Utf8ByteType::SingleByte => self.start(byte, 0),
                Utf8ByteType::StartTwoByte => self.start(byte & 0x1f, 1),
                Utf8ByteType::StartThreeByte => self.start(byte & 0xf, 2),
                Utf8ByteType::StartFourByte => self.start(byte & 0x7, 3),
                Utf8ByteType::Continuation | Utf8ByteType::Invalid => Utf8DecoderStatus::Error,
            };
        }

        if !byte.utf8_is_continuation() {
            self.remaining = 0;
            return Utf8DecoderStatus::Error;
        }

        self.codepoint = (self.codepoint << 6) | (byte & 0x3f) as u32;
        self.remaining -= 1;

        if self.remaining == 0 {
            self.finish()
        } else {
            Utf8DecoderStatus::Continuation
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> Vec<Utf8DecoderStatus> {
        let mut decoder = Utf8Decoder::new();

        s.bytes().map(|b| decoder.advance(b)).collect()
    }

    #[test]
    fn ascii() {
        assert_eq!(decode("a"), [Utf8DecoderStatus::Done('a')]);
    }

    #[test]
    fn twobyte() {
        assert_eq!(
            decode("æ"),
            [Utf8DecoderStatus::Continuation, Utf8DecoderStatus::Done('æ')]
        );
    }

    #[test]
    fn threebyte() {
        assert_eq!(
            decode("€"),
            [
                Utf8DecoderStatus::Continuation,
                Utf8DecoderStatus::Continuation,
                Utf8DecoderStatus::Done('€')
            ]
        );
    }

    #[test]
    fn fourbyte() {
        let statuses = decode("😂");

        assert_eq!(statuses.len(), 4);
        assert_eq!(statuses[3], Utf8DecoderStatus::Done('😂'));
    }

    #[test]
    fn decoder_is_reusable() {
        let mut decoder = Utf8Decoder::new();

        for c in "aæb€".chars() {
            let mut buf = [0; 4];
            let status = c
                .encode_utf8(&mut buf)
                .bytes()
                .map(|b| decoder.advance(b))
                .last();

            assert_eq!(status, Some(Utf8DecoderStatus::Done(c)));
        }
    }

    #[test]
    fn invalid_start() {
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.advance(0b10000000), Utf8DecoderStatus::Error);
    }

    #[test]
    fn invalid_continuation() {
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.advance(0b11000011), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(0b00000000), Utf8DecoderStatus::Error);
        assert_eq!(decoder.advance(b'a'), Utf8DecoderStatus::Done('a'));
    }
}
