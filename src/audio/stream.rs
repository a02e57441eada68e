use crossbeam_channel::bounded;
use std::thread;

use super::{SampleBlock, SampleSource};

/// Stream blocks from `source` into `on_block` on the calling thread
///
/// A producer thread reads the source and hands blocks over a bounded
/// channel, standing in for a sampling interrupt. `on_block` runs on the
/// caller's thread only, so the engine it drives is never shared between
/// threads. Returns the number of samples consumed.
///
/// An error from either side stops the stream; dropping the receiver makes
/// the producer exit on its next send.
pub fn run_stream<S, F>(mut source: S, capacity: usize, mut on_block: F) -> anyhow::Result<usize>
where
    S: SampleSource,
    F: FnMut(&SampleBlock) -> anyhow::Result<()>,
{
    thread::scope(|scope| {
        let (tx, rx) = bounded::<anyhow::Result<SampleBlock>>(capacity.max(1));

        scope.spawn(move || {
            loop {
                let item = match source.next_block() {
                    Ok(Some(block)) => Ok(block),
                    Ok(None) => break,
                    Err(e) => Err(e),
                };
                let failed = item.is_err();
                if tx.send(item).is_err() || failed {
                    break;
                }
            }
        });

        let mut consumed = 0usize;
        for item in rx.iter() {
            let block = item?;
            on_block(&block)?;
            consumed += block.len();
        }
        log::debug!("Stream finished after {} samples", consumed);
        Ok(consumed)
    })
}
