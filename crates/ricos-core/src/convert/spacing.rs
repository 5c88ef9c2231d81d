use crate::types::Block;

fn gap_before(block: &Block) -> usize {
    match block {
        Block::Heading { level: 2, .. } => 2,
        Block::Heading { .. } => 1,
        Block::Table { .. } | Block::Image { .. } => 1,
        _ => 0,
    }
}

fn gap_after(block: &Block) -> usize {
    match block {
        Block::OrderedList { .. } | Block::BulletedList { .. } => 1,
        Block::Table { .. } | Block::Image { .. } => 1,
        _ => 0,
    }
}

/// Enforces block-adjacency spacing. The normalizer owns all spacer
/// placement: input spacers (empty paragraphs included) are absorbed and
/// the gap between two blocks is recomputed as
/// `max(after(prev), before(next))`, which makes normalization idempotent.
/// No leading spacers; trailing spacers never materialize.
pub struct SpacingNormalizer {
    out: Vec<Block>,
    pending_after: usize,
}

impl SpacingNormalizer {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            pending_after: 0,
        }
    }

    pub fn push(&mut self, block: Block) {
        if block.is_spacer() {
            return;
        }
        if let Some(last) = self.out.last() {
            let mut before = gap_before(&block);
            // An image flowing straight into a section heading keeps a
            // single line of breathing room.
            if matches!(last, Block::Image { .. })
                && matches!(block, Block::Heading { level: 2, .. })
            {
                before = 1;
            }
            for _ in 0..self.pending_after.max(before) {
                self.out.push(Block::spacer());
            }
        }
        self.pending_after = gap_after(&block);
        self.out.push(block);
    }

    pub fn finish(self) -> Vec<Block> {
        self.out
    }
}

impl Default for SpacingNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-derives spacer placement for an assembled block sequence.
pub fn normalize_spacing(blocks: Vec<Block>) -> Vec<Block> {
    let mut normalizer = SpacingNormalizer::new();
    for block in blocks {
        normalizer.push(block);
    }
    normalizer.finish()
}
