use std::thread;

use crate::{
    decode::{DecodedVariant, Decoder, VariantRow},
    error::{Error, IntegrityError, Result},
    metadata::StudyMetadataSource,
};

/// Trait for types that consume decoded rows in parallel.
///
/// Each thread works on its own clone of the processor.
pub trait RowProcessor: Send + Clone {
    /// Process a single decoded row
    fn process_row(&mut self, decoded: DecodedVariant) -> Result<()>;

    /// Called with the counting mismatches a lenient policy tolerated in a batch
    ///
    /// Default implementation does nothing
    #[allow(unused_variables)]
    fn on_warnings(&mut self, warnings: Vec<IntegrityError>) -> Result<()> {
        Ok(())
    }

    /// Called when a thread finishes processing its batch
    /// Default implementation does nothing
    fn on_batch_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Set the thread ID for this processor
    ///
    /// Called once per thread, with the index of its batch.
    fn set_tid(&mut self, _tid: usize) {
        // Default implementation does nothing
    }
}

impl<M: StudyMetadataSource + Sync> Decoder<M> {
    /// Decode rows in parallel
    ///
    /// The rows are split into one contiguous batch per thread. Every thread
    /// decodes its batch with this decoder and hands the results to its own clone
    /// of `processor`; warnings are passed to the clone before
    /// [`RowProcessor::on_batch_complete`].
    ///
    /// # Arguments
    ///
    /// * `rows` - The rows to decode
    /// * `processor` - The processor to clone for each thread
    /// * `num_threads` - The number of threads to spawn (`0` uses all cores)
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If all rows were decoded and processed successfully
    /// * `Err(Error)` - The first error raised by a thread
    pub fn process_parallel<R, P>(&self, rows: &[R], processor: P, num_threads: usize) -> Result<()>
    where
        R: VariantRow + Sync,
        P: RowProcessor,
    {
        // Calculate the number of threads to use
        let num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads.min(num_cpus::get())
        };
        if rows.is_empty() {
            return Ok(());
        }
        let rows_per_thread = rows.len().div_ceil(num_threads);

        thread::scope(|scope| {
            let handles: Vec<_> = rows
                .chunks(rows_per_thread)
                .enumerate()
                .map(|(tid, batch)| {
                    let mut processor = processor.clone();
                    processor.set_tid(tid);
                    scope.spawn(move || -> Result<()> {
                        let mut warnings = Vec::new();
                        for row in batch {
                            let mut decoded = self.decode(row)?;
                            warnings.append(&mut decoded.warnings);
                            processor.process_row(decoded)?;
                        }
                        if !warnings.is_empty() {
                            processor.on_warnings(warnings)?;
                        }
                        processor.on_batch_complete()
                    })
                })
                .collect();

            for handle in handles {
                handle.join().map_err(|_| Error::ThreadPanic)??;
            }
            Ok(())
        })
    }
}
