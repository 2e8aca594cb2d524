use log::info;

use crate::i18n::Translator;
use crate::tracker::Tracker;

/// State handed to every pipeline stage.
///
/// Carries the active [`Tracker`], if any. Stages report through the helper
/// methods here; without a tracker they narrate through the log instead.
pub struct StageContext<'a> {
    tracker: Option<&'a mut Tracker>,
    translator: &'a Translator,
    pub debug: bool,
}

impl<'a> StageContext<'a> {
    pub fn new(tracker: Option<&'a mut Tracker>, translator: &'a Translator, debug: bool) -> Self {
        Self {
            tracker,
            translator,
            debug,
        }
    }

    pub fn has_tracker(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn tracker(&mut self) -> Option<&mut Tracker> {
        self.tracker.as_deref_mut()
    }

    pub fn translator(&self) -> &Translator {
        self.translator
    }

    pub fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.translator.t(key, params)
    }

    pub fn add(&mut self, key: &str, label_key: &str) {
        let label = self.translator.t(label_key, &[]);
        if let Some(tracker) = self.tracker() {
            tracker.add(key, &label);
        }
    }

    pub fn start(&mut self, key: &str, detail: &str) {
        match self.tracker() {
            Some(tracker) => tracker.start(key, detail),
            None => narrate(key, "started", detail),
        }
    }

    pub fn complete(&mut self, key: &str, detail: &str) {
        match self.tracker() {
            Some(tracker) => tracker.complete(key, detail),
            None => narrate(key, "done", detail),
        }
    }

    pub fn error(&mut self, key: &str, detail: &str) {
        match self.tracker() {
            Some(tracker) => tracker.error(key, detail),
            None => narrate(key, "failed", detail),
        }
    }

    pub fn skip(&mut self, key: &str, detail: &str) {
        match self.tracker() {
            Some(tracker) => tracker.skip(key, detail),
            None => narrate(key, "skipped", detail),
        }
    }
}

fn narrate(key: &str, status: &str, detail: &str) {
    if detail.is_empty() {
        info!("{key}: {status}");
    } else {
        info!("{key}: {status} ({detail})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::StepStatus;

    #[test]
    fn test_reports_into_tracker() {
        let translator = Translator::new("en").unwrap();
        let mut tracker = Tracker::new("Setup");
        {
            let mut ctx = StageContext::new(Some(&mut tracker), &translator, false);
            assert!(ctx.has_tracker());
            ctx.add("flatten", "steps.flatten");
            ctx.complete("flatten", "");
        }

        let step = tracker.step("flatten").unwrap();
        assert_eq!(step.label, "Flatten nested directory");
        assert_eq!(step.status, StepStatus::Done);
    }

    #[test]
    fn test_without_tracker_is_harmless() {
        let translator = Translator::new("en").unwrap();
        let mut ctx = StageContext::new(None, &translator, true);
        assert!(!ctx.has_tracker());
        ctx.add("fetch", "steps.fetch");
        ctx.start("fetch", "contacting");
        ctx.error("fetch", "boom");
        assert!(ctx.tracker().is_none());
    }
}
