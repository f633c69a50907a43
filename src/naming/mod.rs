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

//! Name, version, platform and architecture inference for artifact names.
//!
//! The pipeline is `tokenizer` (split on delimiters, keeping architecture
//! tokens whole), then `version` (merge the version run), then
//! `package_info` (assemble the identity record). Nothing here touches the
//! filesystem.

pub mod package_info;
pub mod tables;
pub mod text;
pub mod tokenizer;
pub mod version;

pub use package_info::{ClassifyOptions, Classifier, PackageInfo};
pub use tables::NamingTables;
pub use text::{title_case, to_luid};
pub use tokenizer::{find_all_any_ci, split_any};
pub use version::{VersionSplit, is_version, unsplit_version};
