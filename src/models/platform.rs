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
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "64bit")]
    Bit64,
    #[serde(rename = "32bit")]
    Bit32,
    #[serde(rename = "noarch")]
    NoArch,
}

impl Arch {
    pub fn bits(&self) -> Option<u32> {
        match self {
            Arch::Bit64 => Some(64),
            Arch::Bit32 => Some(32),
            Arch::NoArch => None,
        }
    }
}

impl FromStr for Arch {
    type Err = NopackageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "64bit" => Ok(Arch::Bit64),
            "32bit" => Ok(Arch::Bit32),
            "noarch" => Ok(Arch::NoArch),
            _ => Err(NopackageError::ValidationError(format!(
                "Unknown architecture: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arch = match self {
            Arch::Bit64 => "64bit",
            Arch::Bit32 => "32bit",
            Arch::NoArch => "noarch",
        };
        write!(f, "{arch}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Linux,
    Windows,
}

impl FromStr for Platform {
    type Err = NopackageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            _ => Err(NopackageError::ValidationError(format!(
                "Unknown platform: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let platform = match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
        };
        write!(f, "{platform}")
    }
}
