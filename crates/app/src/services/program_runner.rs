//! Program runner — runs a [`Program`] with its declared discipline.

use devhub_domain::error::DispatchError;
use devhub_domain::id::ProgramId;
use devhub_domain::program::{Discipline, Program};
use devhub_domain::report::ProgramReport;

use crate::dispatcher::Dispatcher;

/// Stateless use-case mapping a program's discipline onto the dispatcher.
#[derive(Clone)]
pub struct ProgramRunner {
    dispatcher: Dispatcher,
}

impl ProgramRunner {
    /// Create a runner driving the given dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Dispatch every message of `program`.
    ///
    /// [`Discipline::Parallel`] runs a batch, [`Discipline::Sequential`] runs a
    /// sequence. Nothing is swallowed: any failed message turns the whole run
    /// into an error identifying the failing message(s).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BatchFailed`] with the full batch report when a
    /// parallel message failed, or [`DispatchError::SequenceAborted`] when a
    /// sequential run stopped early.
    #[tracing::instrument(skip(self, program), fields(discipline = %program.discipline, messages = program.len()))]
    pub async fn run_program(&self, program: Program) -> Result<ProgramReport, DispatchError> {
        let program_id = ProgramId::new();
        let Program {
            messages,
            discipline,
        } = program;

        let deliveries = match discipline {
            Discipline::Parallel => {
                let report = self.dispatcher.dispatch_batch(messages).await;
                if !report.is_success() {
                    tracing::warn!(
                        %program_id,
                        failed = ?report.failed_indices(),
                        "parallel program failed"
                    );
                    return Err(DispatchError::BatchFailed(report));
                }
                report.deliveries
            }
            Discipline::Sequential => self.dispatcher.dispatch_sequence(messages).await?,
        };

        tracing::info!(%program_id, delivered = deliveries.len(), "program complete");
        Ok(ProgramReport {
            program_id,
            discipline,
            deliveries,
        })
    }
}
