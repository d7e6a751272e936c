//! `SpeechRecognition` through `js_sys::Reflect`; the API is not part of
//! `web-sys`'s stable surface.
use crate::dom;
use js_sys::{Array, Function, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use watio_access::{
    RecognitionConfig, RecognitionError, RecognitionErrorKind, RecognitionEvent, SpeechRecognizer,
};

const CONSTRUCTORS: [&str; 2] = ["SpeechRecognition", "webkitSpeechRecognition"];

type EventSink = Rc<dyn Fn(RecognitionEvent)>;

struct EngineHandle {
    engine: JsValue,
    _handlers: Vec<Closure<dyn FnMut(JsValue)>>,
}

/// Browser speech recognition forwarding engine events to a sink.
#[derive(Clone)]
pub struct BrowserRecognizer {
    engine: Rc<RefCell<Option<EngineHandle>>>,
    sink: EventSink,
}

fn constructor() -> Option<Function> {
    let win = dom::window()?;
    CONSTRUCTORS.iter().find_map(|name| {
        Reflect::get(&win, &JsValue::from_str(name))
            .ok()
            .filter(|ctor| !ctor.is_undefined() && !ctor.is_null())
            .and_then(|ctor| ctor.dyn_into::<Function>().ok())
    })
}

fn call_method(target: &JsValue, name: &str) -> Result<(), JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    method.call0(target).map(|_| ())
}

fn set(target: &JsValue, name: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(name), value).map(|_| ())
}

/// Final transcript of the latest result in a `result` event.
fn latest_transcript(event: &JsValue) -> Option<String> {
    let results = Reflect::get(event, &JsValue::from_str("results")).ok()?;
    let len = Reflect::get(&results, &JsValue::from_str("length"))
        .ok()?
        .as_f64()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let last = (len as u32).checked_sub(1)?;
    let result = Reflect::get_u32(&results, last).ok()?;
    let best = Reflect::get_u32(&result, 0).ok()?;
    Reflect::get(&best, &JsValue::from_str("transcript"))
        .ok()?
        .as_string()
}

fn error_code(event: &JsValue) -> String {
    Reflect::get(event, &JsValue::from_str("error"))
        .ok()
        .and_then(|code| code.as_string())
        .unwrap_or_default()
}

impl BrowserRecognizer {
    pub fn new(sink: impl Fn(RecognitionEvent) + 'static) -> Self {
        Self {
            engine: Rc::new(RefCell::new(None)),
            sink: Rc::new(sink),
        }
    }

    fn handler(
        &self,
        map: impl Fn(&JsValue) -> Option<RecognitionEvent> + 'static,
    ) -> Closure<dyn FnMut(JsValue)> {
        let sink = Rc::clone(&self.sink);
        Closure::wrap(Box::new(move |event: JsValue| {
            if let Some(mapped) = map(&event) {
                sink(mapped);
            }
        }) as Box<dyn FnMut(JsValue)>)
    }

    fn create(&self, config: &RecognitionConfig) -> Result<EngineHandle, JsValue> {
        let ctor = constructor().ok_or_else(|| JsValue::from_str("no SpeechRecognition"))?;
        let engine: JsValue = Reflect::construct(&ctor, &Array::new())?.into();
        set(&engine, "lang", &JsValue::from_str(&config.lang))?;
        set(&engine, "continuous", &JsValue::from_bool(config.continuous))?;
        set(&engine, "interimResults", &JsValue::from_bool(config.interim_results))?;
        set(
            &engine,
            "maxAlternatives",
            &JsValue::from_f64(f64::from(config.max_alternatives)),
        )?;

        let handlers = vec![
            ("onstart", self.handler(|_| Some(RecognitionEvent::Started))),
            (
                "onresult",
                self.handler(|event| latest_transcript(event).map(RecognitionEvent::Result)),
            ),
            (
                "onerror",
                self.handler(|event| {
                    Some(RecognitionEvent::Error(RecognitionErrorKind::from_code(
                        &error_code(event),
                    )))
                }),
            ),
            ("onend", self.handler(|_| Some(RecognitionEvent::Ended))),
        ];
        for (name, handler) in &handlers {
            set(&engine, name, handler.as_ref())?;
        }
        Ok(EngineHandle {
            engine,
            _handlers: handlers.into_iter().map(|(_, handler)| handler).collect(),
        })
    }
}

impl SpeechRecognizer for BrowserRecognizer {
    fn is_available(&self) -> bool {
        constructor().is_some()
    }

    fn start(&self, config: &RecognitionConfig) -> Result<(), RecognitionError> {
        if !self.is_available() {
            return Err(RecognitionError::Unavailable);
        }
        let mut slot = self.engine.borrow_mut();
        if slot.is_none() {
            let created = self
                .create(config)
                .map_err(|err| RecognitionError::Start(dom::js_error_message(&err)))?;
            *slot = Some(created);
        }
        let Some(handle) = slot.as_ref() else {
            return Err(RecognitionError::Unavailable);
        };
        call_method(&handle.engine, "start")
            .map_err(|err| RecognitionError::Start(dom::js_error_message(&err)))
    }

    fn stop(&self) {
        if let Some(handle) = self.engine.borrow().as_ref()
            && let Err(err) = call_method(&handle.engine, "stop")
        {
            log::warn!("could not stop recognition: {}", dom::js_error_message(&err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_builds_report_unavailable() {
        let recognizer = BrowserRecognizer::new(|_| {});
        assert!(!recognizer.is_available());
        assert_eq!(
            recognizer.start(&RecognitionConfig::default()),
            Err(RecognitionError::Unavailable)
        );
    }
}
