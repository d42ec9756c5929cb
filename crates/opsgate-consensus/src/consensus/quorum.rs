//! Quorum rule for M-of-N admin votes

use opsgate_common::ConsensusError;

/// Fixed vote threshold for committing a pending value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumManager {
    threshold: usize,
}

impl QuorumManager {
    pub fn new(threshold: usize) -> Result<Self, ConsensusError> {
        if threshold == 0 {
            return Err(ConsensusError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_reached(&self, votes: usize) -> bool {
        votes >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_threshold_rejected() {
        assert_eq!(QuorumManager::new(0), Err(ConsensusError::InvalidThreshold(0)));
    }

    #[test]
    fn test_quorum_reached() {
        let quorum = QuorumManager::new(3).unwrap();
        assert!(!quorum.is_reached(2));
        assert!(quorum.is_reached(3));
        assert!(quorum.is_reached(5));
    }
}
