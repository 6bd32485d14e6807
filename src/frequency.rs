use crate::{
    code_tree::TreeNode,
    constants::{ALPH_SIZE, PSEUDO_EOF},
    error::{HuffError, Result},
    ranked_queue::RankedQueue,
};

/// Occurrence count of every ordinary symbol. `PSEUDO_EOF` is not stored:
/// it always counts once.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FrequencyTable {
    counts: Box<[u64]>,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self { counts: vec![0; ALPH_SIZE].into_boxed_slice() }
    }
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: &[u64]) -> Result<Self> {
        if counts.len() != ALPH_SIZE {
            return Err(HuffError::InvalidArgument(format!(
                "expected {} counts, got {}", ALPH_SIZE, counts.len()
            )));
        }

        Ok(Self { counts: counts.into() })
    }

    #[inline(always)]
    pub fn increment(&mut self, symbol: usize) {
        self.counts[symbol] += 1;
    }

    #[inline(always)]
    pub fn count(&self, symbol: usize) -> u64 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&c| c != 0).count()
    }

    pub fn total_words(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// One leaf per present symbol in symbol order, then the `PSEUDO_EOF` leaf.
    pub fn to_queue(&self) -> Result<RankedQueue<TreeNode>> {
        let mut queue = RankedQueue::new();

        for (symbol, &count) in self.counts.iter().enumerate() {
            if count != 0 {
                queue.insert(TreeNode::leaf(symbol, count))?;
            }
        }
        queue.insert(TreeNode::leaf(PSEUDO_EOF, 1))?;

        Ok(queue)
    }
}

#[test]
fn test_queue_from_counts() {
    let mut freqs = FrequencyTable::new();
    for &b in b"AAABBC" {
        freqs.increment(b as usize);
    }

    assert_eq!(freqs.distinct_symbols(), 3);
    assert_eq!(freqs.total_words(), 6);
    assert_eq!(freqs.count(b'A' as usize), 3);
    assert_eq!(freqs.count(PSEUDO_EOF), 0);

    let mut queue = freqs.to_queue().unwrap();
    let mut order = Vec::new();
    while let Some(node) = queue.remove_front() {
        order.push(node.symbol().unwrap());
    }

    assert_eq!(order, vec![b'C' as usize, PSEUDO_EOF, b'B' as usize, b'A' as usize]);
}

#[test]
fn test_from_counts_wrong_length() {
    assert!(matches!(FrequencyTable::from_counts(&[1, 2, 3]), Err(HuffError::InvalidArgument(_))));
}
