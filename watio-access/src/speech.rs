//! Speech synthesis used by the text-to-speech preference.

/// Host speech synthesizer.
pub trait SpeechOutput {
    fn speak(&self, text: &str);
    /// Drop the current utterance and everything queued behind it.
    fn cancel(&self);
    fn is_speaking(&self) -> bool;
}

/// Synthesizer for hosts without speech support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl SpeechOutput for NoSpeech {
    fn speak(&self, _text: &str) {}

    fn cancel(&self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}
