/// Progress events emitted while a system is being seeded.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A species starts being placed.
    SpeciesStart { name: String, molecules: u64 },
    /// One molecule (a chain, or the whole batch of a points species) is placed.
    MoleculePlaced,
    SpeciesFinish,
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
