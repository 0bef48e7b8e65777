use super::*;

/// Newline-delimited frames capped at `MAX_MESSAGE_SIZE`. Unlike a bare
/// [`LinesCodec`], bytes left without a terminating newline when the pool
/// hangs up are discarded rather than handed out as a last frame.
#[derive(Debug)]
pub(super) struct FrameCodec(LinesCodec);

impl FrameCodec {
    pub(super) fn new() -> Self {
        Self(LinesCodec::new_with_max_length(MAX_MESSAGE_SIZE))
    }
}

impl Decoder for FrameCodec {
    type Item = String;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        self.0.decode(buf)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        if let Some(line) = self.0.decode(buf)? {
            return Ok(Some(line));
        }

        if !buf.is_empty() {
            debug!("Dropping {} bytes of unterminated frame at EOF", buf.len());
            buf.clear();
            self.0 = LinesCodec::new_with_max_length(MAX_MESSAGE_SIZE);
        }

        Ok(None)
    }
}
