use lumina_vfs::VirtualFileStore;

use crate::apply::{AppliedAction, AppliedChange};
use crate::change::ChangeBlock;
use crate::parser::parse_change_block;
use crate::scan::{inner, scan_element, ElementScan};

/// Applies create/update blocks to the store as soon as they close in a
/// growing response.
///
/// Only the unconsumed tail is rescanned: the offset after the last closed
/// block, or the start of a block that is still open. Each [`push`] therefore
/// costs O(length of that tail), and a block is written whole or not at all.
/// Patch and delete blocks are left for the final pass over the full text.
///
/// [`push`]: IncrementalParser::push
#[derive(Debug, Default)]
pub struct IncrementalParser {
    buffer: String,
    scan_from: usize,
    applied: usize,
}

impl IncrementalParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and apply every change block that closed as a result.
    pub fn push(&mut self, fragment: &str, store: &mut VirtualFileStore) -> Vec<AppliedChange> {
        self.buffer.push_str(fragment);
        let applied: Vec<AppliedChange> = self
            .drain_closed_blocks()
            .into_iter()
            .filter_map(|block| Self::apply_streamed(block, store))
            .collect();
        self.applied += applied.len();
        applied
    }

    /// Full text received so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Number of blocks written to the store during streaming.
    pub fn applied_count(&self) -> usize {
        self.applied
    }

    pub fn into_buffer(self) -> String {
        self.buffer
    }

    fn drain_closed_blocks(&mut self) -> Vec<ChangeBlock> {
        let mut closed = Vec::new();
        loop {
            match scan_element(&self.buffer, "change", self.scan_from) {
                ElementScan::Closed(el) => {
                    self.scan_from = el.end;
                    match parse_change_block(inner(&self.buffer, &el)) {
                        Ok(block) => closed.push(block),
                        Err(reason) => log::debug!("Streaming: {}", reason),
                    }
                }
                ElementScan::Open(start) => {
                    self.scan_from = start;
                    break;
                }
                ElementScan::Absent(resume) => {
                    self.scan_from = resume;
                    break;
                }
            }
        }
        closed
    }

    fn apply_streamed(block: ChangeBlock, store: &mut VirtualFileStore) -> Option<AppliedChange> {
        if !block.action.writes_content() {
            log::debug!(
                "Deferring {:?} of {} to the final pass",
                block.action,
                block.file
            );
            return None;
        }
        let content = block.content?;
        let kind = store.write(&block.file, content);
        log::debug!("Streaming write {} ({:?})", block.file, kind);
        Some(AppliedChange {
            file: block.file,
            action: AppliedAction::from(kind),
            description: block.description.unwrap_or_default(),
        })
    }
}
