//! Training and parsing drivers
//!
//! [`Trainer`] runs the oracle over gold sentences and trains the guide into
//! a [`TrainedModel`]. [`DeterministicParser`] parses with such a model, one
//! instance per worker thread.

pub mod deterministic;
pub mod encoding;
pub mod error;
pub mod model;
pub mod trainer;

pub use deterministic::{DeterministicParser, ParseStatistics};
pub use error::{ParserError, ParserResult};
pub use model::{ModelSummary, TrainedModel};
pub use trainer::{Trainer, TrainingStatistics};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::corpus::{read_sentences, Sentence};
    use std::io::Cursor;

    pub fn corpus() -> Vec<Sentence> {
        let text = "\
1\tJohn\t_\tN\tNNP\t_\t2\tSBJ\t_\t_
2\tsaw\t_\tV\tVBD\t_\t0\tROOT\t_\t_
3\tMary\t_\tN\tNNP\t_\t2\tOBJ\t_\t_
4\t.\t_\tP\t.\t_\t2\tP\t_\t_

1\tMary\t_\tN\tNNP\t_\t2\tSBJ\t_\t_
2\tsleeps\t_\tV\tVBZ\t_\t0\tROOT\t_\t_
3\t.\t_\tP\t.\t_\t2\tP\t_\t_
";
        read_sentences(Cursor::new(text)).unwrap()
    }

    /// A hearing is scheduled on the issue today .
    pub fn non_projective() -> Sentence {
        let text = "\
1\tA\t_\tD\tDT\t_\t2\tNMOD\t_\t_
2\thearing\t_\tN\tNN\t_\t3\tSBJ\t_\t_
3\tis\t_\tV\tVBZ\t_\t0\tROOT\t_\t_
4\tscheduled\t_\tV\tVBN\t_\t3\tVC\t_\t_
5\ton\t_\tP\tIN\t_\t2\tNMOD\t_\t_
6\tthe\t_\tD\tDT\t_\t7\tNMOD\t_\t_
7\tissue\t_\tN\tNN\t_\t5\tPMOD\t_\t_
8\ttoday\t_\tN\tNN\t_\t4\tTMP\t_\t_
9\t.\t_\tP\t.\t_\t3\tP\t_\t_
";
        read_sentences(Cursor::new(text)).unwrap().remove(0)
    }
}
