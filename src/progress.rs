use std::fmt;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Drop,
    DropConstant,
    Obfuscate,
    Scale,
    Rename,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Drop => "Dropping columns",
            Stage::DropConstant => "Dropping constant columns",
            Stage::Obfuscate => "Obfuscating columns",
            Stage::Scale => "Scaling columns",
            Stage::Rename => "Renaming columns",
        };
        f.write_str(name)
    }
}

/// Observer notified as the pipeline advances. Both hooks default to no-ops.
pub trait Progress: Sync {
    fn stage(&self, _stage: Stage) {}

    fn column(&self, _stage: Stage, _column: &str) {}
}

/// Observer that ignores every notification
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

#[cfg(test)]
impl Progress for Silent {}

/// Observer that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn stage(&self, stage: Stage) {
        tracing::info!("{stage}...");
    }

    fn column(&self, stage: Stage, column: &str) {
        tracing::debug!(?stage, column, "column processed");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every notification, for asserting on pipeline order
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub events: Mutex<Vec<(Stage, Option<String>)>>,
    }

    impl Progress for Recorder {
        fn stage(&self, stage: Stage) {
            self.events.lock().unwrap().push((stage, None));
        }

        fn column(&self, stage: Stage, column: &str) {
            self.events
                .lock()
                .unwrap()
                .push((stage, Some(column.to_string())));
        }
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Scale.to_string(), "Scaling columns");
    }

    #[test]
    fn test_recorder_captures_events() {
        let recorder = Recorder::default();
        recorder.stage(Stage::Drop);
        recorder.column(Stage::Drop, "notes");
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], (Stage::Drop, Some("notes".to_string())));
    }
}
