//! Migration branch lifecycle.

use super::{Git, VcsError};
use crate::patches::PatchReference;
use std::fmt;

/// Where a migration branch is in its lifecycle.
///
/// `Initial → BranchCreated → PatchesApplying → PatchesComplete → Pushed`.
/// Any failure moves to `Failed`, which is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchState {
    /// Nothing has been changed yet.
    Initial,

    /// The branch exists and is checked out.
    BranchCreated,

    /// Some, but not all, patches are applied.
    PatchesApplying {
        /// Number of patches applied so far.
        applied: usize,
    },

    /// Every patch is applied.
    PatchesComplete,

    /// The branch has been pushed upstream.
    Pushed,

    /// A step failed; the branch is left as-is for inspection.
    Failed,
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => f.write_str("not created"),
            Self::BranchCreated => f.write_str("created"),
            Self::PatchesApplying { applied } => write!(f, "applying patches ({applied} done)"),
            Self::PatchesComplete => f.write_str("fully patched"),
            Self::Pushed => f.write_str("pushed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// A branch being built from a fixed number of patches.
///
/// Enforces that patches go in strictly ascending index order and that the
/// branch is only pushed once all of them are applied.
pub struct MigrationBranch {
    git: Git,
    name: String,
    total: usize,
    state: BranchState,
}

impl MigrationBranch {
    /// Prepares a branch that will receive `total` patches.
    pub fn new(git: Git, name: impl Into<String>, total: usize) -> Self {
        Self {
            git,
            name: name.into(),
            total,
            state: BranchState::Initial,
        }
    }

    /// Branch name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &BranchState {
        &self.state
    }

    /// Creates and checks out the branch.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Checkout`] or [`VcsError::InvalidState`].
    pub async fn create(&mut self) -> Result<(), VcsError> {
        self.require(matches!(self.state, BranchState::Initial), "create the branch")?;
        let result = self.git.checkout_branch(&self.name).await;
        self.advance(result, |total| {
            if total == 0 {
                BranchState::PatchesComplete
            } else {
                BranchState::BranchCreated
            }
        })
    }

    /// Applies the next patch.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::OutOfOrder`] if `patch` is not the next index,
    /// [`VcsError::PatchApply`] if git rejects it.
    pub async fn apply(&mut self, patch: &PatchReference) -> Result<(), VcsError> {
        let applied = match self.state {
            BranchState::BranchCreated => 0,
            BranchState::PatchesApplying { applied } => applied,
            _ => {
                return Err(self.invalid("apply a patch"));
            }
        };

        if patch.index != applied {
            self.state = BranchState::Failed;
            return Err(VcsError::OutOfOrder {
                expected: applied,
                found: patch.index,
            });
        }

        let result = self.git.apply_patch(&patch.file_name()).await;
        self.advance(result, |total| {
            if applied + 1 == total {
                BranchState::PatchesComplete
            } else {
                BranchState::PatchesApplying {
                    applied: applied + 1,
                }
            }
        })
    }

    /// Pushes the fully patched branch upstream.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Push`] or [`VcsError::InvalidState`].
    pub async fn push(&mut self) -> Result<(), VcsError> {
        self.require(
            matches!(self.state, BranchState::PatchesComplete),
            "push the branch",
        )?;
        let result = self.git.push(&self.name).await;
        self.advance(result, |_| BranchState::Pushed)
    }

    fn require(&self, allowed: bool, operation: &'static str) -> Result<(), VcsError> {
        if allowed {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> VcsError {
        VcsError::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }

    fn advance(
        &mut self,
        result: Result<(), VcsError>,
        next: impl FnOnce(usize) -> BranchState,
    ) -> Result<(), VcsError> {
        match result {
            Ok(()) => {
                self.state = next(self.total);
                Ok(())
            }
            Err(e) => {
                self.state = BranchState::Failed;
                Err(e)
            }
        }
    }
}
