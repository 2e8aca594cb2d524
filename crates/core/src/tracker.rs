//! Ordered step tracking for long running operations.
//!
//! A [`Tracker`] records named steps in insertion order, each with a
//! [`StepStatus`] and optional detail text. Every mutation renders a
//! [`TreeView`] and hands it to the attached [`TrackerObserver`], if any.
//! Observer failures are logged and otherwise ignored, so a broken terminal
//! never interrupts the work being tracked.

use std::fmt::{Display, Formatter};

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Running,
    Done,
    Error,
    Skipped,
}

impl StepStatus {
    /// Circle shown in front of the step label.
    pub fn glyph(self) -> char {
        match self {
            StepStatus::Done | StepStatus::Error => '●',
            StepStatus::Pending | StepStatus::Running | StepStatus::Skipped => '○',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub key: String,
    pub label: String,
    pub status: StepStatus,
    pub detail: String,
}

/// Receives a fresh render after every tracker mutation.
pub trait TrackerObserver {
    /// # Errors
    ///
    /// Any error is logged by the tracker and dropped.
    fn on_change(&mut self, view: &TreeView) -> std::io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub status: StepStatus,
    pub label: String,
    pub detail: Option<String>,
}

impl TreeLine {
    /// Pending steps are drawn de-emphasized.
    pub fn is_muted(&self) -> bool {
        self.status == StepStatus::Pending
    }
}

/// Presentation-neutral render of a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeView {
    pub title: String,
    pub lines: Vec<TreeLine>,
}

impl Display for TreeView {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(formatter, "{}", self.title)?;

        for (i, line) in self.lines.iter().enumerate() {
            let guide = if i + 1 == self.lines.len() {
                "└── "
            } else {
                "├── "
            };
            write!(formatter, "{guide}{} {}", line.status.glyph(), line.label)?;
            if let Some(detail) = &line.detail {
                write!(formatter, " ({detail})")?;
            }
            writeln!(formatter)?;
        }

        Ok(())
    }
}

pub struct Tracker {
    title: String,
    steps: Vec<Step>,
    observer: Option<Box<dyn TrackerObserver>>,
}

impl Tracker {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            steps: Vec::new(),
            observer: None,
        }
    }

    /// Attaches the observer notified on every mutation, replacing any
    /// previous one.
    pub fn attach(&mut self, observer: Box<dyn TrackerObserver>) {
        self.observer = Some(observer);
    }

    pub fn detach(&mut self) -> Option<Box<dyn TrackerObserver>> {
        self.observer.take()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, key: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.key == key)
    }

    /// Registers a pending step. Adding a key that already exists does nothing.
    pub fn add(&mut self, key: &str, label: &str) {
        if self.step(key).is_some() {
            return;
        }

        self.steps.push(Step {
            key: key.to_string(),
            label: label.to_string(),
            status: StepStatus::Pending,
            detail: String::new(),
        });
        self.refresh();
    }

    pub fn start(&mut self, key: &str, detail: &str) {
        self.update(key, StepStatus::Running, detail);
    }

    pub fn complete(&mut self, key: &str, detail: &str) {
        self.update(key, StepStatus::Done, detail);
    }

    pub fn error(&mut self, key: &str, detail: &str) {
        self.update(key, StepStatus::Error, detail);
    }

    pub fn skip(&mut self, key: &str, detail: &str) {
        self.update(key, StepStatus::Skipped, detail);
    }

    /// Replaces the detail text without changing the status.
    pub fn set_detail(&mut self, key: &str, detail: &str) {
        let status = self
            .step(key)
            .map_or(StepStatus::Pending, |step| step.status);
        self.update(key, status, detail);
    }

    pub fn render(&self) -> TreeView {
        TreeView {
            title: self.title.clone(),
            lines: self
                .steps
                .iter()
                .map(|step| {
                    // One row per step: multi-line details are folded.
                    let detail = step.detail.split_whitespace().collect::<Vec<_>>().join(" ");
                    TreeLine {
                        status: step.status,
                        label: step.label.clone(),
                        detail: (!detail.is_empty()).then_some(detail),
                    }
                })
                .collect(),
        }
    }

    fn update(&mut self, key: &str, status: StepStatus, detail: &str) {
        match self.steps.iter_mut().find(|step| step.key == key) {
            Some(step) => {
                step.status = status;
                if !detail.is_empty() {
                    step.detail = detail.to_string();
                }
            }
            None => self.steps.push(Step {
                key: key.to_string(),
                label: key.to_string(),
                status,
                detail: detail.to_string(),
            }),
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        if self.observer.is_none() {
            return;
        }

        let view = self.render();
        if let Some(observer) = self.observer.as_mut() {
            if let Err(e) = observer.on_change(&view) {
                debug!("Tracker observer failed to refresh: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingObserver {
        views: Rc<RefCell<Vec<TreeView>>>,
    }

    impl TrackerObserver for RecordingObserver {
        fn on_change(&mut self, view: &TreeView) -> std::io::Result<()> {
            self.views.borrow_mut().push(view.clone());
            Ok(())
        }
    }

    struct FailingObserver {
        calls: Rc<RefCell<usize>>,
    }

    impl TrackerObserver for FailingObserver {
        fn on_change(&mut self, _view: &TreeView) -> std::io::Result<()> {
            *self.calls.borrow_mut() += 1;
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_duplicate_add_keeps_one_entry() {
        let mut tracker = Tracker::new("Setup");
        tracker.add("fetch", "Fetch latest release");
        tracker.add("fetch", "Something else");

        assert_eq!(tracker.steps().len(), 1);
        assert_eq!(tracker.steps()[0].label, "Fetch latest release");
        assert_eq!(tracker.steps()[0].status, StepStatus::Pending);
    }

    #[test]
    fn test_unknown_key_is_created_on_transition() {
        let mut tracker = Tracker::new("Setup");
        tracker.complete("flatten", "");

        let step = tracker.step("flatten").unwrap();
        assert_eq!(step.label, "flatten");
        assert_eq!(step.status, StepStatus::Done);
    }

    #[test]
    fn test_empty_detail_keeps_previous_detail() {
        let mut tracker = Tracker::new("Setup");
        tracker.add("fetch", "Fetch");
        tracker.start("fetch", "contacting API");
        tracker.complete("fetch", "");

        let step = tracker.step("fetch").unwrap();
        assert_eq!(step.status, StepStatus::Done);
        assert_eq!(step.detail, "contacting API");

        tracker.error("fetch", "boom");
        assert_eq!(tracker.step("fetch").unwrap().detail, "boom");
    }

    #[test]
    fn test_insertion_order_survives_updates() {
        let mut tracker = Tracker::new("Setup");
        tracker.add("a", "A");
        tracker.add("b", "B");
        tracker.add("c", "C");
        tracker.complete("b", "");
        tracker.skip("a", "");

        let keys: Vec<&str> = tracker.steps().iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_observer_sees_every_mutation() {
        let views = Rc::new(RefCell::new(Vec::new()));
        let mut tracker = Tracker::new("Setup");
        tracker.attach(Box::new(RecordingObserver {
            views: Rc::clone(&views),
        }));

        tracker.add("fetch", "Fetch");
        tracker.add("fetch", "Fetch");
        tracker.start("fetch", "");
        tracker.complete("fetch", "done");

        let views = views.borrow();
        assert_eq!(views.len(), 3);
        assert_eq!(views[2].lines[0].status, StepStatus::Done);
        assert_eq!(views[2].lines[0].detail.as_deref(), Some("done"));
    }

    #[test]
    fn test_failing_observer_does_not_break_tracker() {
        let calls = Rc::new(RefCell::new(0));
        let mut tracker = Tracker::new("Setup");
        tracker.attach(Box::new(FailingObserver {
            calls: Rc::clone(&calls),
        }));

        tracker.add("fetch", "Fetch");
        tracker.complete("fetch", "ok");

        assert_eq!(*calls.borrow(), 2);
        assert_eq!(tracker.step("fetch").unwrap().status, StepStatus::Done);
    }

    #[test]
    fn test_render_marks_pending_as_muted() {
        let mut tracker = Tracker::new("Setup");
        tracker.add("fetch", "Fetch");
        tracker.add("extract", "Extract");
        tracker.complete("fetch", "  v1.0  ");

        let view = tracker.render();
        assert!(!view.lines[0].is_muted());
        assert_eq!(view.lines[0].detail.as_deref(), Some("v1.0"));
        assert!(view.lines[1].is_muted());
        assert_eq!(view.lines[1].detail, None);
    }

    #[test]
    fn test_plain_tree_text() {
        let mut tracker = Tracker::new("Setup");
        tracker.add("fetch", "Fetch");
        tracker.add("extract", "Extract");
        tracker.complete("fetch", "v1.0");

        assert_eq!(
            tracker.render().to_string(),
            "Setup\n├── ● Fetch (v1.0)\n└── ○ Extract\n"
        );
    }

    #[test]
    fn test_set_detail_keeps_status() {
        let mut tracker = Tracker::new("Setup");
        tracker.start("download", "");
        tracker.set_detail("download", "50%");

        let step = tracker.step("download").unwrap();
        assert_eq!(step.status, StepStatus::Running);
        assert_eq!(step.detail, "50%");
    }

    #[test]
    fn test_render_folds_multi_line_detail() {
        let mut tracker = Tracker::new("Setup");
        tracker.error("fetch", "Release fetch failed\n  Headers: {}\n\nBody: oops\n");

        let view = tracker.render();
        assert_eq!(
            view.lines[0].detail.as_deref(),
            Some("Release fetch failed Headers: {} Body: oops")
        );
        assert!(tracker.step("fetch").unwrap().detail.contains('\n'));
    }
}
