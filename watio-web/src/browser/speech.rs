use crate::dom;
use watio_access::SpeechOutput;
use watio_access::constants::RECOGNITION_LANG;
use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance};

/// `window.speechSynthesis`, silent when the browser lacks it.
#[derive(Debug, Clone, Default)]
pub struct BrowserSpeech {
    synth: Option<SpeechSynthesis>,
}

impl BrowserSpeech {
    #[must_use]
    pub fn from_window() -> Self {
        Self {
            synth: dom::window().and_then(|win| win.speech_synthesis().ok()),
        }
    }

    #[must_use]
    pub const fn silent() -> Self {
        Self { synth: None }
    }
}

impl SpeechOutput for BrowserSpeech {
    fn speak(&self, text: &str) {
        let Some(synth) = &self.synth else {
            return;
        };
        match SpeechSynthesisUtterance::new_with_text(text) {
            Ok(utterance) => {
                utterance.set_lang(RECOGNITION_LANG);
                synth.speak(&utterance);
            }
            Err(err) => log::warn!("could not build utterance: {}", dom::js_error_message(&err)),
        }
    }

    fn cancel(&self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }

    fn is_speaking(&self) -> bool {
        self.synth.as_ref().is_some_and(SpeechSynthesis::speaking)
    }
}
