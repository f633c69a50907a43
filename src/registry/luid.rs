// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{NopackageError, Result};

/// Lifecycle of the program id during one install or uninstall.
///
/// Overrides and icon lookups may still change a computed id, so program
/// records are only reachable once it is finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LuidState {
    #[default]
    Unset,
    Computed(String),
    Finalized(String),
}

impl LuidState {
    /// Record a (re)computed id. A finalized id cannot change.
    pub fn compute(&mut self, luid: impl Into<String>) -> Result<()> {
        let luid = luid.into();
        match self {
            LuidState::Finalized(current) => Err(NopackageError::Registry(format!(
                "Program id '{current}' is finalized and cannot become '{luid}'"
            ))),
            _ => {
                *self = LuidState::Computed(luid);
                Ok(())
            }
        }
    }

    pub fn finalize(&mut self) -> Result<&str> {
        let luid = match self {
            LuidState::Unset => {
                return Err(NopackageError::LuidNotFinalized(
                    "no program id was computed".to_string(),
                ));
            }
            LuidState::Computed(luid) => std::mem::take(luid),
            LuidState::Finalized(_) => return self.finalized(),
        };
        *self = LuidState::Finalized(luid);
        self.finalized()
    }

    /// The id, readable only after finalization.
    pub fn finalized(&self) -> Result<&str> {
        match self {
            LuidState::Finalized(luid) => Ok(luid),
            LuidState::Computed(luid) => Err(NopackageError::LuidNotFinalized(luid.clone())),
            LuidState::Unset => Err(NopackageError::LuidNotFinalized("(unset)".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let mut state = LuidState::default();
        assert!(state.finalized().is_err());
        assert!(state.finalize().is_err());

        state.compute("cura").unwrap();
        state.compute("ultimaker.cura").unwrap();
        assert!(matches!(
            state.finalized(),
            Err(NopackageError::LuidNotFinalized(luid)) if luid == "ultimaker.cura"
        ));

        assert_eq!(state.finalize().unwrap(), "ultimaker.cura");
        assert_eq!(state.finalized().unwrap(), "ultimaker.cura");
        assert!(state.compute("other").is_err());
        assert_eq!(state, LuidState::Finalized("ultimaker.cura".to_string()));
    }
}
